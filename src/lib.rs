pub mod cli;
pub mod config;
mod error;
pub mod parse;
pub mod pipeline;
mod produce;
pub mod render;
mod resolve;
mod types;
mod validate;

pub use config::{ConfigError, SieveConfig};
pub use error::SieveError;
pub use pipeline::{
    resolve_document, CancelToken, Pipeline, PipelineError, PipelineState, PipelineStatus,
    RunReport,
};
pub use produce::{ProducerReport, StreamProducer};
pub use render::{RenderError, RuleDocument};
pub use resolve::{resolve_records, Outcome, Resolver, ResolverStats};
pub use types::{PriorityClass, Record, Rejection, WinnersTable};
pub use validate::{validate_record, AttributeLookup, PathPattern, PathStack};
pub use validate::{NAME_ATTR, TYPE_ATTR, WEIGHT_ATTR};
