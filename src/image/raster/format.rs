//! Output-format registry.
//!
//! The `as` directive selects how an asset's variants are reduced into the
//! value its module exports. The set of formats is closed: each name maps to a
//! pure reducer, and the lookup by name happens once, when the directive is read.

use super::{AggregatedRasterDescriptor, ProcessedVariant, aggregate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// `{ srcSet, width, height }` for the generated `<img>` component.
    Jsx,
    /// A bare `srcset` attribute string.
    Srcset,
    /// The variant list as-is.
    Metadata,
}

/// Reduced value of one asset's variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutput {
    Jsx(AggregatedRasterDescriptor),
    Srcset(String),
    Metadata(Vec<ProcessedVariant>),
}

impl OutputFormat {
    pub const ALL: [Self; 3] = [Self::Jsx, Self::Srcset, Self::Metadata];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Jsx => "jsx",
            Self::Srcset => "srcset",
            Self::Metadata => "metadata",
        }
    }

    /// Reducer registered for this format.
    pub fn reducer(self) -> fn(&[ProcessedVariant]) -> FormatOutput {
        match self {
            Self::Jsx => |v| FormatOutput::Jsx(aggregate(v)),
            Self::Srcset => |v| FormatOutput::Srcset(aggregate(v).src_set),
            Self::Metadata => |v| FormatOutput::Metadata(v.to_vec()),
        }
    }

    pub fn reduce(self, variants: &[ProcessedVariant]) -> FormatOutput {
        (self.reducer())(variants)
    }
}

impl FormatOutput {
    /// Module text as the engine emits it for an asset import.
    ///
    /// The `jsx` emission exports `srcSet`, `width` and `height` as named
    /// bindings ahead of its default export, which is what the component
    /// generator splices onto.
    pub fn emit_module(&self) -> String {
        match self {
            Self::Jsx(descriptor) => format!(
                "export const srcSet = {};\nexport const width = {};\nexport const height = {};\nexport default {{ srcSet, width, height }};\n",
                js_string(&descriptor.src_set),
                js_number(descriptor.width),
                js_number(descriptor.height),
            ),
            Self::Srcset(src_set) => format!("export default {};\n", js_string(src_set)),
            Self::Metadata(variants) => format!(
                "export default {};\n",
                serde_json::to_string(variants).unwrap_or_else(|_| "[]".to_string())
            ),
        }
    }
}

/// JavaScript string literal.
pub(crate) fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// JavaScript number literal, `undefined` when absent.
pub(crate) fn js_number(n: Option<u32>) -> String {
    n.map_or_else(|| "undefined".to_string(), |n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::raster::EncodeFormat;

    fn variants() -> Vec<ProcessedVariant> {
        vec![
            ProcessedVariant {
                src: "/assets/a-1.webp".to_string(),
                width: 200,
                height: 100,
                format: EncodeFormat::Webp,
            },
            ProcessedVariant {
                src: "/assets/a-2.webp".to_string(),
                width: 400,
                height: 200,
                format: EncodeFormat::Webp,
            },
        ]
    }

    #[test]
    fn test_registry_names() {
        for format in OutputFormat::ALL {
            assert_eq!(OutputFormat::from_name(format.name()), Some(format));
        }
        assert_eq!(OutputFormat::from_name("picture"), None);
    }

    #[test]
    fn test_jsx_reducer() {
        let FormatOutput::Jsx(descriptor) = OutputFormat::Jsx.reduce(&variants()) else {
            panic!("expected jsx output");
        };
        assert_eq!(descriptor.src_set, "/assets/a-1.webp 200w, /assets/a-2.webp 400w");
        assert_eq!(descriptor.width, Some(400));
    }

    #[test]
    fn test_jsx_emission_exports_bindings() {
        let code = OutputFormat::Jsx.reduce(&variants()).emit_module();
        assert!(code.contains("export const srcSet = \"/assets/a-1.webp 200w, /assets/a-2.webp 400w\";"));
        assert!(code.contains("export const width = 400;"));
        assert!(code.contains("export const height = 200;"));
        assert!(code.contains("export default { srcSet, width, height };"));
    }

    #[test]
    fn test_jsx_emission_without_variants() {
        let code = OutputFormat::Jsx.reduce(&[]).emit_module();
        assert!(code.contains("export const srcSet = \"\";"));
        assert!(code.contains("export const width = undefined;"));
    }

    #[test]
    fn test_srcset_and_metadata_emission() {
        let code = OutputFormat::Srcset.reduce(&variants()).emit_module();
        assert_eq!(
            code,
            "export default \"/assets/a-1.webp 200w, /assets/a-2.webp 400w\";\n"
        );

        let code = OutputFormat::Metadata.reduce(&variants()).emit_module();
        assert!(code.starts_with("export default [{\"src\":\"/assets/a-1.webp\",\"width\":200"));
        assert!(code.contains("\"format\":\"webp\""));
    }
}
