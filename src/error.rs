use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::pipeline::PipelineError;
use crate::render::RenderError;

/// Unified error type covering argument checks, configuration, the pipeline,
/// and writing results.
#[derive(Debug, Error)]
pub enum SieveError {
    #[error("invalid input arguments: {0}")]
    InvalidArguments(String),

    #[error("illegal file extension: '{path}' is not an .xml file")]
    IllegalExtension { path: String },

    #[error("source file {} does not exist", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to create destination file {}: {source}", path.display())]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
