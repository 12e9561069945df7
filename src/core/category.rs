//! Asset category definitions.

/// Marker parameter opting an import into the pipeline.
pub const MARKER: &str = "jsx";

/// Kind of image asset, determines generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Bitmap image - resized into variants and rendered as `<img srcSet>`
    Raster,
    /// SVG - optimized and inlined into an `<svg>` component
    Vector,
}

impl AssetKind {
    pub const RASTER_EXTENSIONS: &'static [&'static str] =
        &[".jpg", ".jpeg", ".png", ".webp", ".gif", ".avif", ".tiff"];

    pub const VECTOR_EXTENSION: &'static str = ".svg";

    /// Detect asset kind from a dotted extension (`".jpg"`).
    ///
    /// Case-insensitive. Returns `None` for unsupported extensions.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if Self::RASTER_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Raster)
        } else if ext == Self::VECTOR_EXTENSION {
            Some(Self::Vector)
        } else {
            None
        }
    }

    /// Display name for this asset kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::Vector => "vector",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        for ext in AssetKind::RASTER_EXTENSIONS {
            assert_eq!(AssetKind::from_extension(ext), Some(AssetKind::Raster));
        }
        assert_eq!(AssetKind::from_extension(".JPG"), Some(AssetKind::Raster));
        assert_eq!(AssetKind::from_extension(".svg"), Some(AssetKind::Vector));
        assert_eq!(AssetKind::from_extension(".bmp"), None);
        assert_eq!(AssetKind::from_extension(""), None);
    }
}
