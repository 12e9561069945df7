//! Raster image variants.
//!
//! # Modules
//!
//! - [`aggregate`]: folds variants into one responsive descriptor
//! - [`format`]: output-format registry (`as` directive)
//! - [`engine`]: bundled resize/encode engine
//!
//! # Architecture
//!
//! ```text
//! DirectiveSet
//!      │
//!      ▼
//! ┌──────────────┐
//! │ RasterEngine │ ──► Vec<ProcessedVariant>  (one per size/format job)
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │ OutputFormat │ ──► FormatOutput (jsx: AggregatedRasterDescriptor)
//! └──────────────┘
//! ```

mod aggregate;
mod engine;
mod format;

pub use aggregate::{AggregatedRasterDescriptor, aggregate};
pub use engine::ImageEngine;
pub use format::{FormatOutput, OutputFormat};
pub(crate) use format::{js_number, js_string};
pub(crate) use engine::check_variants;

use anyhow::Result;
use serde::Serialize;
use std::future::Future;
use std::path::Path;

use crate::directive::DirectiveSet;

/// Encoded output format of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    Webp,
    Avif,
    Png,
    Jpeg,
}

impl EncodeFormat {
    /// Parse a `format` directive value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "webp" => Some(Self::Webp),
            "avif" => Some(Self::Avif),
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// One processed output of an asset (a single size/format combination).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedVariant {
    /// Public URL of the variant.
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub format: EncodeFormat,
}

/// Producer of variants for a resolved directive set.
///
/// Implementations expand list directives (`w=200;400`) into concrete jobs and
/// return one variant per job, in directive order.
pub trait RasterEngine: Send + Sync {
    fn process(
        &self,
        source: &Path,
        directives: &DirectiveSet,
    ) -> impl Future<Output = Result<Vec<ProcessedVariant>>> + Send;

    /// Whether sources with this dotted, lower-cased extension can be read.
    /// Requests for other raster extensions are left unclaimed.
    fn decodes(&self, _extension: &str) -> bool {
        true
    }
}
