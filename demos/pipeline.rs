use rulesieve::render::RuleDocument;
use rulesieve::{Pipeline, SieveConfig};

const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rules>
    <rule name="a" type="root" weight="10"/>
    <rule name="a" type="child" weight="10"/>
    <rule name="b" type="sub" weight="10"/>
    <rule name="b" type="root" weight="10"/>
    <rule name="b" type="sub" weight="11"/>
    <rule name="c" type="child" weight="0"/>
    <rule name="c" type="child" weight="9"/>
</rules>
"#;

fn main() {
    let config = SieveConfig::from_toml("[queue]\ncapacity = 2\n").expect("valid config");
    let mut pipeline = Pipeline::new(&config);

    let report = pipeline.run_str(DOCUMENT).expect("pipeline failed");
    println!("{report}");
    println!("state: {}", pipeline.state());

    let document = RuleDocument::from_winners(report.winners());
    print!("{}", document.to_xml());
}
