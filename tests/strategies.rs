use proptest::prelude::*;
use rulesieve::{PriorityClass, Record};

// A small name pool so generated streams contain plenty of duplicates.
const NAMES: &[&str] = &["alpha", "beta", "gamma", "delta", "r-1", "r_2"];

pub fn arb_class() -> impl Strategy<Value = PriorityClass> {
    prop::sample::select(PriorityClass::VALID.to_vec())
}

/// Generate a valid record drawn from the shared name pool.
pub fn arb_record() -> impl Strategy<Value = Record> {
    (prop::sample::select(NAMES), arb_class(), 1_u32..=50)
        .prop_map(|(name, class, weight)| Record::new(name, class, weight).unwrap())
}

/// Attribute values that may or may not form a valid record.
pub fn arb_raw_attributes() -> impl Strategy<Value = (Option<String>, Option<String>, Option<String>)>
{
    let name = prop::option::of(prop_oneof![
        Just(String::new()),
        "[a-z]{1,8}".prop_map(String::from),
    ]);
    let class = prop::option::of(prop_oneof![
        Just(String::new()),
        Just("root".to_owned()),
        Just("SUB".to_owned()),
        Just("Child".to_owned()),
        Just("bogus".to_owned()),
    ]);
    let weight = prop::option::of(prop_oneof![
        Just(String::new()),
        Just("abc".to_owned()),
        (-5_i32..=50).prop_map(|w| w.to_string()),
    ]);
    (name, class, weight)
}

/// Render records as a rule document.
pub fn document(records: &[Record]) -> String {
    let mut xml = String::from("<rules>\n");
    for r in records {
        xml.push_str(&format!(
            "  <rule name=\"{}\" type=\"{}\" weight=\"{}\"/>\n",
            r.name(),
            r.class(),
            r.weight()
        ));
    }
    xml.push_str("</rules>\n");
    xml
}
