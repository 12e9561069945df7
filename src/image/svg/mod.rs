//! Vector optimization.
//!
//! # Modules
//!
//! - [`tree`]: document model, parsed and serialized with quick-xml
//! - [`passes`]: named rewriting passes and the `preset-default` bundle
//! - [`extract`]: root attribute extraction
//! - [`prefix`]: id/class prefixing
//! - [`optimize`]: stage ordering, conflict detection, multipass
//!
//! # Architecture
//!
//! ```text
//! SVG source
//!     │
//!     ▼
//! ┌────────────────┐
//! │ preset-default │ ──► structural cleanup
//! └───────┬────────┘
//!         ▼
//! ┌──────────────┐
//! │ extract root │ ──► <svg ...> becomes <g>, attributes kept aside
//! └───────┬──────┘
//!         ▼
//! ┌───────────┐
//! │ prefixIds │ ──► unique ids per asset
//! └───────┬───┘
//!         ▼
//!   user passes ──► OptimizedSvg { data, attributes }
//! ```

mod extract;
mod optimize;
mod passes;
mod prefix;
mod tree;

pub use extract::VectorAttributes;
pub use optimize::{OptimizedSvg, PassConflict, SvgPipeline};
pub use passes::PassName;
pub use tree::Attributes;

use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

use crate::config::SvgoConfig;
use crate::log;

#[derive(Debug, Error)]
pub enum SvgError {
    #[error("malformed SVG: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed SVG attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("unsupported entity in SVG: {0}")]
    Escape(#[from] EscapeError),

    #[error("SVG is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("SVG output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("closing tag without a matching element")]
    UnbalancedEnd,

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("second root element <{0}>")]
    MultipleRoots(String),

    #[error("no root element")]
    NoRoot,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Build a pipeline for `config`, logging dropped plugin entries.
pub fn build_pipeline(config: &SvgoConfig) -> SvgPipeline {
    build_pipeline_with(config, |conflict| log!("warning"; "{}", conflict))
}

/// Build a pipeline, reporting each dropped plugin entry to `warn` once.
pub fn build_pipeline_with(
    config: &SvgoConfig,
    mut warn: impl FnMut(&PassConflict),
) -> SvgPipeline {
    let pipeline = SvgPipeline::new(config);
    for conflict in pipeline.conflicts() {
        warn(conflict);
    }
    pipeline
}

/// One-shot optimization of `source`, the contents of the file at `path`.
pub fn optimize_svg(source: &str, path: &str, config: &SvgoConfig) -> Result<OptimizedSvg, SvgError> {
    build_pipeline(config).run(source, path)
}
