use rulesieve::{resolve_records, validate_record, Resolver};

fn main() {
    // Validate raw attribute sets the way they would arrive from a document
    let raw = [
        [("name", "a"), ("type", "root"), ("weight", "10")],
        [("name", "a"), ("type", "child"), ("weight", "10")],
        [("name", "b"), ("type", "sub"), ("weight", "0")],
        [("name", "b"), ("type", "SUB"), ("weight", "11")],
        [("name", "c"), ("type", ""), ("weight", "3")],
    ];

    let mut resolver = Resolver::new();
    for attrs in &raw {
        match validate_record(attrs) {
            Ok(record) => {
                let outcome = resolver.resolve(record);
                println!("{outcome:?}");
            }
            Err(rejection) => println!("rejected: {rejection}"),
        }
    }
    println!("{}", resolver.stats());

    for record in &resolver.finish() {
        println!("winner: {record}");
    }

    // One-shot resolution of already-validated records
    let winners = resolve_records(raw.iter().filter_map(|a| validate_record(a).ok()));
    println!("{} winners", winners.len());
}
