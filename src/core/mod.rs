//! Core types - pure abstractions shared across the codebase.

mod category;
mod driver;
mod id;

pub use category::{AssetKind, MARKER};
pub use driver::BuildMode;
pub use id::{AssetIdentifier, QueryParams};
