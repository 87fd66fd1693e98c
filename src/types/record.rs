use std::fmt;

use super::priority::PriorityClass;
use super::rejection::Rejection;

/// A validated rule entry.
///
/// Identity for resolution is `name` alone; `(class, weight)` is the
/// precedence key. Construction goes through [`Record::new`], so every
/// `Record` has a non-empty name, a valid class, and a positive weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub struct Record {
    name: String,
    class: PriorityClass,
    weight: u32,
}

impl Record {
    /// # Errors
    ///
    /// Returns [`Rejection`] if the name is empty, the class is
    /// [`PriorityClass::Invalid`], or the weight is zero.
    pub fn new(
        name: impl Into<String>,
        class: PriorityClass,
        weight: u32,
    ) -> Result<Self, Rejection> {
        let name = name.into();
        if name.is_empty() {
            return Err(Rejection::EmptyName);
        }
        if !class.is_valid() {
            return Err(Rejection::InvalidType {
                value: class.as_str().to_owned(),
            });
        }
        if weight == 0 {
            return Err(Rejection::NonPositiveWeight {
                value: weight.to_string(),
            });
        }
        Ok(Self {
            name,
            class,
            weight,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn class(&self) -> PriorityClass {
        self.class
    }

    #[must_use]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// The `(class rank, weight)` pair compared during resolution.
    #[must_use]
    pub fn precedence(&self) -> (u8, u32) {
        // `new` rejects Invalid, so rank is always present.
        (self.class.rank().unwrap_or(0), self.weight)
    }

    /// Whether `self` strictly outranks `other` under the precedence order.
    #[must_use]
    pub fn outranks(&self, other: &Record) -> bool {
        self.precedence() > other.precedence()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<rule name=\"{}\" type=\"{}\" weight=\"{}\"/>",
            self.name, self.class, self.weight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record() {
        let r = Record::new("a", PriorityClass::Child, 10).unwrap();
        assert_eq!(r.name(), "a");
        assert_eq!(r.class(), PriorityClass::Child);
        assert_eq!(r.weight(), 10);
    }

    #[test]
    fn empty_name_rejected() {
        assert_eq!(
            Record::new("", PriorityClass::Root, 1),
            Err(Rejection::EmptyName)
        );
    }

    #[test]
    fn invalid_class_rejected() {
        assert!(matches!(
            Record::new("a", PriorityClass::Invalid, 1),
            Err(Rejection::InvalidType { .. })
        ));
    }

    #[test]
    fn zero_weight_rejected() {
        assert!(matches!(
            Record::new("a", PriorityClass::Root, 0),
            Err(Rejection::NonPositiveWeight { .. })
        ));
    }

    #[test]
    fn class_dominates_weight() {
        let child = Record::new("a", PriorityClass::Child, 1).unwrap();
        let sub = Record::new("a", PriorityClass::Sub, 1000).unwrap();
        assert!(child.outranks(&sub));
        assert!(!sub.outranks(&child));
    }

    #[test]
    fn equal_key_does_not_outrank() {
        let a = Record::new("a", PriorityClass::Sub, 5).unwrap();
        let b = a.clone();
        assert!(!a.outranks(&b));
        assert!(!b.outranks(&a));
    }

    #[test]
    fn display_matches_result_markup() {
        let r = Record::new("a", PriorityClass::Root, 3).unwrap();
        assert_eq!(r.to_string(), r#"<rule name="a" type="root" weight="3"/>"#);
    }
}
