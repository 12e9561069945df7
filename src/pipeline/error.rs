//! Per-asset pipeline errors.
//!
//! Every variant is fatal for the one asset it names; other assets continue.

use std::path::PathBuf;
use thiserror::Error;

use crate::image::svg::SvgError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Engine output lacks the aggregated `srcSet`/`width`/`height` bindings.
    #[error("Image '{id}' could not be optimized to JSX")]
    ShapeMismatch { id: String },

    #[error("Image '{id}' is not a valid SVG: {source}")]
    MalformedVector {
        id: String,
        #[source]
        source: SvgError,
    },

    #[error("Image '{id}' could not be processed: {source:#}")]
    Engine {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
