//! Source generators.
//!
//! - **Component**: JSX modules wrapping raster descriptors and vector props

pub mod component;

pub use component::{generate_raster, generate_vector, raster_module};
