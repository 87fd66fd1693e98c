use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The class of a rule, used as the primary tie-break key during resolution.
///
/// Valid classes are ordered `Root < Sub < Child`; `Child` is the most
/// important. Text that names none of them parses to [`PriorityClass::Invalid`],
/// which is unordered with respect to every valid class and is never
/// admitted into a [`Record`](super::Record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityClass {
    Root,
    Sub,
    Child,
    Invalid,
}

impl PriorityClass {
    pub const VALID: [PriorityClass; 3] = [Self::Root, Self::Sub, Self::Child];

    /// Parse a class token case-insensitively. Unknown or empty text yields
    /// [`PriorityClass::Invalid`].
    #[must_use]
    pub fn parse(token: &str) -> Self {
        Self::VALID
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(token))
            .unwrap_or(Self::Invalid)
    }

    /// Integer rank over the valid classes, `None` for `Invalid`.
    #[must_use]
    pub fn rank(self) -> Option<u8> {
        match self {
            Self::Root => Some(1),
            Self::Sub => Some(2),
            Self::Child => Some(3),
            Self::Invalid => None,
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.rank().is_some()
    }

    /// Canonical lowercase spelling, as written to result documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Sub => "sub",
            Self::Child => "child",
            Self::Invalid => "invalid",
        }
    }
}

impl PartialOrd for PriorityClass {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            (None, None) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl FromStr for PriorityClass {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(PriorityClass::parse("root"), PriorityClass::Root);
        assert_eq!(PriorityClass::parse("Root"), PriorityClass::Root);
        assert_eq!(PriorityClass::parse("SUB"), PriorityClass::Sub);
        assert_eq!(PriorityClass::parse("CHILD"), PriorityClass::Child);
        assert_eq!(PriorityClass::parse("cHiLd"), PriorityClass::Child);
    }

    #[test]
    fn unknown_tokens_are_invalid() {
        for token in ["", "test", "children", " root", "root ", "0"] {
            assert_eq!(PriorityClass::parse(token), PriorityClass::Invalid, "{token:?}");
        }
    }

    #[test]
    fn valid_classes_are_totally_ordered() {
        assert!(PriorityClass::Root < PriorityClass::Sub);
        assert!(PriorityClass::Sub < PriorityClass::Child);
        assert!(PriorityClass::Root < PriorityClass::Child);
        assert_eq!(
            PriorityClass::Sub.partial_cmp(&PriorityClass::Sub),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn invalid_is_unordered() {
        for class in PriorityClass::VALID {
            assert_eq!(class.partial_cmp(&PriorityClass::Invalid), None);
            assert_eq!(PriorityClass::Invalid.partial_cmp(&class), None);
        }
        assert!(!PriorityClass::Invalid.is_valid());
    }

    #[test]
    fn display_is_canonical_lowercase() {
        assert_eq!(PriorityClass::parse("CHILD").to_string(), "child");
    }
}
