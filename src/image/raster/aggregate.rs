//! The `jsx` output-format reducer.

use serde::Serialize;

use super::ProcessedVariant;

/// Responsive descriptor embedded in generated raster modules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedRasterDescriptor {
    #[serde(rename = "srcSet")]
    pub src_set: String,
    /// Width of the largest variant; `None` when there were no variants.
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Fold variants into `{ srcSet, width, height }`.
///
/// `srcSet` keeps input order. Dimensions come from the first variant with the
/// strictly largest width. Empty input yields an empty `srcSet` and no
/// dimensions.
pub fn aggregate(variants: &[ProcessedVariant]) -> AggregatedRasterDescriptor {
    let mut src_set = String::new();
    let mut largest: Option<&ProcessedVariant> = None;

    for (i, variant) in variants.iter().enumerate() {
        if i > 0 {
            src_set.push_str(", ");
        }
        src_set.push_str(&format!("{} {}w", variant.src, variant.width));

        if largest.is_none_or(|l| variant.width > l.width) {
            largest = Some(variant);
        }
    }

    AggregatedRasterDescriptor {
        src_set,
        width: largest.map(|v| v.width),
        height: largest.map(|v| v.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::raster::EncodeFormat;

    fn variant(src: &str, width: u32, height: u32) -> ProcessedVariant {
        ProcessedVariant {
            src: src.to_string(),
            width,
            height,
            format: EncodeFormat::Webp,
        }
    }

    #[test]
    fn test_empty_input() {
        let descriptor = aggregate(&[]);
        assert_eq!(descriptor.src_set, "");
        assert_eq!(descriptor.width, None);
        assert_eq!(descriptor.height, None);
    }

    #[test]
    fn test_src_set_keeps_input_order() {
        let variants = [
            variant("/a-800.webp", 800, 400),
            variant("/a-200.webp", 200, 100),
            variant("/a-400.webp", 400, 200),
        ];
        let descriptor = aggregate(&variants);
        assert_eq!(
            descriptor.src_set,
            "/a-800.webp 800w, /a-200.webp 200w, /a-400.webp 400w"
        );
        assert_eq!(descriptor.width, Some(800));
        assert_eq!(descriptor.height, Some(400));
    }

    #[test]
    fn test_first_max_wins_on_ties() {
        let variants = [
            variant("/a.webp", 600, 300),
            variant("/b.avif", 600, 450),
            variant("/c.webp", 200, 100),
        ];
        let descriptor = aggregate(&variants);
        assert_eq!(descriptor.width, Some(600));
        assert_eq!(descriptor.height, Some(300));
    }

    #[test]
    fn test_single_variant() {
        let descriptor = aggregate(&[variant("/only.png", 32, 16)]);
        assert_eq!(descriptor.src_set, "/only.png 32w");
        assert_eq!((descriptor.width, descriptor.height), (Some(32), Some(16)));
    }
}
