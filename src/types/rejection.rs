use thiserror::Error;

/// Why a candidate element was not turned into a [`Record`](super::Record).
///
/// Rejections are filtering outcomes, not faults: the element is dropped and
/// traversal continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("missing 'name' attribute")]
    MissingName,

    #[error("empty 'name' attribute")]
    EmptyName,

    #[error("missing 'type' attribute")]
    MissingType,

    #[error("invalid 'type' attribute '{value}'")]
    InvalidType { value: String },

    #[error("missing 'weight' attribute")]
    MissingWeight,

    #[error("'weight' attribute '{value}' is not an integer")]
    MalformedWeight { value: String },

    #[error("'weight' attribute '{value}' must be a positive integer")]
    NonPositiveWeight { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_type_message() {
        let err = Rejection::InvalidType {
            value: "test".into(),
        };
        assert_eq!(err.to_string(), "invalid 'type' attribute 'test'");
    }

    #[test]
    fn malformed_weight_message() {
        let err = Rejection::MalformedWeight {
            value: "ten".into(),
        };
        assert_eq!(err.to_string(), "'weight' attribute 'ten' is not an integer");
    }

    #[test]
    fn non_positive_weight_message() {
        let err = Rejection::NonPositiveWeight { value: "-1".into() };
        assert_eq!(
            err.to_string(),
            "'weight' attribute '-1' must be a positive integer"
        );
    }
}
