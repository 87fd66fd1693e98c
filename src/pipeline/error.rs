use thiserror::Error;

use crate::parse::ParseError;

/// Faults that end a pipeline run.
///
/// Per-record validation failures are not errors; see
/// [`Rejection`](crate::Rejection).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to read source document: {0}")]
    Io(#[from] std::io::Error),

    #[error("resolution queue stalled: rule '{name}' not accepted after {attempts} attempts")]
    QueueStalled { name: String, attempts: u32 },

    #[error("consumer stopped before all rules were published")]
    ConsumerGone,

    #[error("producer stopped without signalling completion")]
    ProducerGone,

    #[error("{task} task panicked")]
    Panicked { task: &'static str },

    #[error("failed to spawn {task} task: {source}")]
    Spawn {
        task: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("pipeline cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Whether the fault came from the source document itself rather than
    /// from coordinating the two tasks.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_stalled_message() {
        let err = PipelineError::QueueStalled {
            name: "a".into(),
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "resolution queue stalled: rule 'a' not accepted after 3 attempts"
        );
        assert!(!err.is_structural());
    }

    #[test]
    fn panicked_message() {
        let err = PipelineError::Panicked { task: "parsing" };
        assert_eq!(err.to_string(), "parsing task panicked");
    }

    #[test]
    fn io_is_structural() {
        let err = PipelineError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert!(err.is_structural());
        assert_eq!(err.to_string(), "failed to read source document: gone");
    }
}
