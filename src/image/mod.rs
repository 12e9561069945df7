//! Asset processing.
//!
//! # Modules
//!
//! - [`raster`]: resized/re-encoded variants and their aggregation
//! - [`svg`]: vector optimization and root attribute extraction

pub mod raster;
pub mod svg;
