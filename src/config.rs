//! Run configuration, optionally loaded from a TOML file.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [queue]
//! capacity = 1024
//! poll_interval_us = 500
//! publish_wait_us = 500
//! max_publish_attempts = 20000
//!
//! [path]
//! container = "rules"
//! item = "rule"
//!
//! [render]
//! html = true
//! open = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validate::PathPattern;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    pub queue: QueueConfig,
    pub path: PathConfig,
    pub render: RenderConfig,
}

/// Sizing and timing of the hand-off between producer and consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of records buffered between the two tasks.
    pub capacity: usize,
    /// How long the consumer waits for a record before re-checking whether
    /// the producer has finished.
    pub poll_interval_us: u64,
    /// How long one publish attempt waits for free space.
    pub publish_wait_us: u64,
    /// Publish attempts per record before the run fails as stalled.
    pub max_publish_attempts: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            poll_interval_us: 500,
            publish_wait_us: 500,
            max_publish_attempts: 20_000,
        }
    }
}

impl QueueConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }

    #[must_use]
    pub fn publish_wait(&self) -> Duration {
        Duration::from_micros(self.publish_wait_us)
    }
}

/// Element names that identify record elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub container: String,
    pub item: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            container: "rules".to_owned(),
            item: "rule".to_owned(),
        }
    }
}

impl PathConfig {
    #[must_use]
    pub fn pattern(&self) -> PathPattern {
        PathPattern::new(self.container.clone(), self.item.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Write an HTML rendering next to the result document.
    pub html: bool,
    /// Ask the platform to open the HTML rendering. Failure to open it is
    /// logged and does not fail the run.
    pub open: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            html: true,
            open: true,
        }
    }
}

impl SieveConfig {
    /// Load and validate a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O failure, malformed TOML, or invalid values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML or invalid values.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.queue.capacity == 0 {
            errors.push("queue.capacity must be greater than 0".to_owned());
        }
        if self.queue.poll_interval_us == 0 {
            errors.push("queue.poll_interval_us must be greater than 0".to_owned());
        }
        if self.queue.publish_wait_us == 0 {
            errors.push("queue.publish_wait_us must be greater than 0".to_owned());
        }
        if self.queue.max_publish_attempts == 0 {
            errors.push("queue.max_publish_attempts must be greater than 0".to_owned());
        }
        let segments = [
            ("path.container", &self.path.container),
            ("path.item", &self.path.item),
        ];
        for (key, segment) in segments {
            if segment.is_empty() {
                errors.push(format!("{key} must not be empty"));
            } else if segment.contains(['/', ':']) || segment.chars().any(char::is_whitespace) {
                errors.push(format!("{key} '{segment}' is not a plain element name"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = SieveConfig::from_toml("").unwrap();
        assert_eq!(config, SieveConfig::default());
        assert_eq!(config.queue.poll_interval(), Duration::from_micros(500));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = SieveConfig::from_toml("[queue]\ncapacity = 8\n[path]\nitem = \"policy\"\n").unwrap();
        assert_eq!(config.queue.capacity, 8);
        assert_eq!(config.queue.max_publish_attempts, 20_000);
        assert_eq!(config.path.container, "rules");
        assert_eq!(config.path.pattern(), PathPattern::new("rules", "policy"));
    }

    #[test]
    fn zero_values_rejected() {
        let err = SieveConfig::from_toml("[queue]\ncapacity = 0\npublish_wait_us = 0\n").unwrap_err();
        match err {
            ConfigError::Invalid(problems) => {
                assert_eq!(problems.len(), 2);
                assert!(problems[0].contains("capacity"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn path_segments_must_be_plain_names() {
        let err = SieveConfig::from_toml("[path]\ncontainer = \"a/b\"\nitem = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref p) if p.len() == 2));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            SieveConfig::from_toml("[queue\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = SieveConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(SieveConfig::from_toml(&text).unwrap(), config);
    }
}
