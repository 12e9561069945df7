//! `[output]` section configuration.
//!
//! Where the bundled raster engine writes variants and how they are addressed.
//!
//! # Example
//!
//! ```toml
//! [output]
//! dir = "dist/assets"     # Variant files (relative to project root)
//! baseUrl = "/assets"     # Public URL prefix used in srcSet entries
//! modules = "dist/jsx"    # Generated component modules (build command)
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub base_url: String,
    pub modules: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dist/assets"),
            base_url: "/assets".to_string(),
            modules: PathBuf::from("dist/jsx"),
        }
    }
}

impl OutputConfig {
    /// Resolve relative directories against the project root.
    pub fn normalize(&mut self, root: &Path) {
        if self.dir.is_relative() {
            self.dir = root.join(&self.dir);
        }
        if self.modules.is_relative() {
            self.modules = root.join(&self.modules);
        }
    }

    /// Public URL of an emitted file.
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), filename)
    }
}
