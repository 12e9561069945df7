//! Pass pipeline assembly and execution.
//!
//! Stage order is fixed:
//!
//! 1. `preset-default` members, filtered by `defaultPresetOverrides`
//!    (`removeViewBox` stays off unless explicitly enabled)
//! 2. root extraction
//! 3. `prefixIds`, unless disabled
//! 4. user passes from `svgo.plugins`
//!
//! User entries that name a fixed stage are dropped with a warning; the
//! fixed stage still runs with its own settings.

use std::fmt;

use super::extract::{VectorAttributes, extract_root};
use super::passes::{Pass, PassContext, PassName};
use super::prefix::PrefixIds;
use super::tree::{Attributes, Document, nodes_to_markup};
use super::SvgError;
use crate::config::{PluginEntry, PrefixIdsParams, SvgoConfig};

/// Upper bound on rounds when `multipass` is set.
const MAX_ROUNDS: usize = 10;

/// Optimized vector output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedSvg {
    /// Full optimized markup (root renamed to `g`).
    pub data: String,
    pub attributes: VectorAttributes,
}

/// A user plugin entry that was not added to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassConflict {
    /// The entry names a stage that is always present.
    Reserved {
        name: &'static str,
        option: &'static str,
    },
    Unknown(String),
    InvalidParams { name: String, reason: String },
}

impl fmt::Display for PassConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved { name, option } => write!(
                f,
                "You are trying to use the {name} SVGO plugin. This plugin is already included \
                 by default, you can customize it through the {option} option."
            ),
            Self::Unknown(name) => write!(f, "unknown SVGO plugin `{name}` ignored"),
            Self::InvalidParams { name, reason } => {
                write!(f, "SVGO plugin `{name}` ignored: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Stage {
    Preset(Vec<PassName>),
    ExtractRoot,
    PrefixIds(PrefixIdsParams),
    User(Pass),
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Self::Preset(_) => PassName::PRESET_DEFAULT,
            Self::ExtractRoot => "extractRoot",
            Self::PrefixIds(_) => PassName::PREFIX_IDS,
            Self::User(pass) => pass.name(),
        }
    }
}

/// Pipeline built once from configuration, run per asset.
#[derive(Debug, Clone)]
pub struct SvgPipeline {
    stages: Vec<Stage>,
    ctx: PassContext,
    multipass: bool,
    conflicts: Vec<PassConflict>,
}

impl SvgPipeline {
    pub fn new(config: &SvgoConfig) -> Self {
        let preset = PassName::PRESET
            .into_iter()
            .filter(|pass| {
                config
                    .default_preset_overrides
                    .get(pass.name())
                    .copied()
                    .unwrap_or(*pass != PassName::RemoveViewBox)
            })
            .collect();

        let mut stages = vec![Stage::Preset(preset), Stage::ExtractRoot];
        if let Some(params) = config.prefix_ids.params() {
            stages.push(Stage::PrefixIds(params));
        }

        let mut conflicts = Vec::new();
        for entry in &config.plugins {
            match user_pass(entry) {
                Ok(pass) => stages.push(Stage::User(pass)),
                Err(conflict) => conflicts.push(conflict),
            }
        }

        let ctx = PassContext {
            float_precision: config
                .float_precision
                .unwrap_or(PassContext::default().float_precision),
        };

        Self {
            stages,
            ctx,
            multipass: config.multipass,
            conflicts,
        }
    }

    /// Entries dropped while building.
    pub fn conflicts(&self) -> &[PassConflict] {
        &self.conflicts
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Optimize one asset. `path` names the prefix when none is configured.
    pub fn run(&self, source: &str, path: &str) -> Result<OptimizedSvg, SvgError> {
        let mut doc = Document::parse(source)?;
        let mut extracted = Attributes::default();
        let rounds = if self.multipass { MAX_ROUNDS } else { 1 };

        let mut data = String::new();
        for _ in 0..rounds {
            doc = self.run_once(doc, path, &mut extracted);
            let next = doc.to_markup()?;
            let shrank = data.is_empty() || next.len() < data.len();
            data = next;
            if !shrank {
                break;
            }
        }

        let attributes = VectorAttributes {
            attributes: extracted,
            inner_html: Some(nodes_to_markup(&doc.root.children)?),
        };
        Ok(OptimizedSvg { data, attributes })
    }

    fn run_once(&self, mut doc: Document, path: &str, extracted: &mut Attributes) -> Document {
        for stage in &self.stages {
            match stage {
                Stage::Preset(members) => {
                    for &member in members {
                        Pass::Builtin(member).apply(&mut doc, &self.ctx);
                    }
                }
                Stage::ExtractRoot => {
                    let (rest, attributes) = extract_root(doc);
                    doc = rest;
                    extracted.merge(attributes);
                }
                Stage::PrefixIds(params) => PrefixIds::new(params, path).apply(&mut doc),
                Stage::User(pass) => pass.apply(&mut doc, &self.ctx),
            }
        }
        doc
    }
}

fn user_pass(entry: &PluginEntry) -> Result<Pass, PassConflict> {
    let name = entry.name();
    if name == PassName::PRESET_DEFAULT {
        return Err(PassConflict::Reserved {
            name: PassName::PRESET_DEFAULT,
            option: "defaultPresetOverrides",
        });
    }
    if name == PassName::PREFIX_IDS {
        return Err(PassConflict::Reserved {
            name: PassName::PREFIX_IDS,
            option: "prefixIds",
        });
    }

    match PassName::from_name(name) {
        None => Err(PassConflict::Unknown(name.to_string())),
        Some(PassName::RemoveAttrs) => {
            let invalid = |reason: String| PassConflict::InvalidParams {
                name: name.to_string(),
                reason,
            };
            let patterns = remove_attrs_patterns(entry)
                .ok_or_else(|| invalid("`attrs` must be a string or a list of strings".into()))?;
            Pass::remove_attrs(&patterns).map_err(|e| invalid(e.to_string()))
        }
        Some(pass) => Ok(Pass::Builtin(pass)),
    }
}

fn remove_attrs_patterns(entry: &PluginEntry) -> Option<Vec<String>> {
    match entry.params()?.get("attrs")? {
        toml::Value::String(pattern) => Some(vec![pattern.clone()]),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PrefixIdsOption, test_parse_config};

    const ICON: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!-- Generator: Sketch -->
<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24" fill="none">
  <title>icon</title>
  <defs><clipPath id="clip"><rect width="24" height="24"/></clipPath></defs>
  <g clip-path="url(#clip)">
    <path id="p" d="M12.00001 2L2 22h20z" fill="currentColor"/>
  </g>
  <g></g>
</svg>
"##;

    fn svgo(toml: &str) -> SvgoConfig {
        test_parse_config(toml).svgo
    }

    #[test]
    fn test_default_stage_order() {
        let pipeline = SvgPipeline::new(&SvgoConfig::default());
        assert_eq!(
            pipeline.stage_names(),
            vec!["preset-default", "extractRoot", "prefixIds"]
        );
        assert!(pipeline.conflicts().is_empty());
    }

    #[test]
    fn test_optimize_defaults() {
        let out = SvgPipeline::new(&SvgoConfig::default())
            .run(ICON, "/src/icon.svg")
            .unwrap();

        assert_eq!(
            out.attributes.attributes.iter().collect::<Vec<_>>(),
            vec![
                ("xmlns", "http://www.w3.org/2000/svg"),
                ("width", "24"),
                ("height", "24"),
                ("viewBox", "0 0 24 24"),
                ("fill", "none"),
            ]
        );
        assert!(out.data.starts_with("<g>"));
        assert!(!out.data.contains("<title>"));
        assert!(!out.data.contains("Sketch"));
        assert!(out.data.contains(r#"id="icon_svg__clip""#));
        assert!(out.data.contains("url(#icon_svg__clip)"));
        assert!(out.data.contains(r#"d="M12.00001 2L2 22h20z""#));
        assert_eq!(
            out.attributes.inner_html.as_deref(),
            out.data.strip_prefix("<g>").and_then(|s| s.strip_suffix("</g>"))
        );
    }

    #[test]
    fn test_reoptimizing_output_extracts_nothing() {
        let pipeline = SvgPipeline::new(&SvgoConfig::default());
        let first = pipeline.run(ICON, "icon.svg").unwrap();
        let second = pipeline.run(&first.data, "icon.svg").unwrap();
        assert!(second.attributes.attributes.is_empty());
        assert_eq!(second.data, first.data);
    }

    #[test]
    fn test_prefix_ids_disabled_keeps_ids() {
        let config = SvgoConfig {
            prefix_ids: PrefixIdsOption::Toggle(false),
            ..SvgoConfig::default()
        };
        let pipeline = SvgPipeline::new(&config);
        assert!(!pipeline.stage_names().contains(&"prefixIds"));

        let out = pipeline.run(ICON, "icon.svg").unwrap();
        assert!(out.data.contains(r#"id="clip""#));
        assert_eq!(out.attributes.get("viewBox"), Some("0 0 24 24"));
    }

    #[test]
    fn test_reserved_names_dropped() {
        let config = svgo(
            r#"
            [svgo]
            plugins = ["preset-default", { name = "prefixIds" }, "removeDimensions", "nope"]
            "#,
        );
        let pipeline = SvgPipeline::new(&config);

        assert_eq!(
            pipeline.stage_names(),
            vec!["preset-default", "extractRoot", "prefixIds", "removeDimensions"]
        );
        assert_eq!(pipeline.conflicts().len(), 3);
        assert_eq!(
            pipeline.conflicts()[0].to_string(),
            "You are trying to use the preset-default SVGO plugin. This plugin is already \
             included by default, you can customize it through the defaultPresetOverrides option."
        );
        assert!(pipeline.conflicts()[1].to_string().ends_with("through the prefixIds option."));
        assert_eq!(pipeline.conflicts()[2], PassConflict::Unknown("nope".to_string()));
    }

    #[test]
    fn test_preset_overrides() {
        let config = svgo(
            r#"
            [svgo.defaultPresetOverrides]
            removeTitle = false
            removeViewBox = true
            "#,
        );
        let out = SvgPipeline::new(&config).run(ICON, "icon.svg").unwrap();
        assert!(out.data.contains("<title>icon</title>"));
        assert_eq!(out.attributes.get("viewBox"), None);
    }

    #[test]
    fn test_float_precision() {
        let config = svgo("[svgo]\nfloatPrecision = 1");
        let out = SvgPipeline::new(&config)
            .run(r#"<svg><rect x="1.26" y="0.04"/></svg>"#, "a.svg")
            .unwrap();
        assert_eq!(out.data, r#"<g><rect x="1.3" y="0"/></g>"#);
    }

    #[test]
    fn test_remove_attrs_params() {
        let config = svgo(
            r#"
            [svgo]
            plugins = [{ name = "removeAttrs", params = { attrs = ["fill", "stroke"] } }]
            "#,
        );
        let out = SvgPipeline::new(&config)
            .run(r#"<svg fill="red"><path d="M0 0" fill="red" stroke="blue"/></svg>"#, "a.svg")
            .unwrap();
        // Extraction runs first, so the root `fill` survives as a prop.
        assert_eq!(out.attributes.get("fill"), Some("red"));
        assert_eq!(out.data, r#"<g><path d="M0 0"/></g>"#);

        let config = svgo("[svgo]\nplugins = [\"removeAttrs\"]");
        assert!(matches!(
            SvgPipeline::new(&config).conflicts(),
            [PassConflict::InvalidParams { .. }]
        ));
    }

    #[test]
    fn test_multipass_converges() {
        let config = svgo("[svgo]\nmultipass = true");
        let out = SvgPipeline::new(&config).run(ICON, "icon.svg").unwrap();
        let single = SvgPipeline::new(&SvgoConfig::default())
            .run(ICON, "icon.svg")
            .unwrap();
        assert_eq!(out, single);
    }

    #[test]
    fn test_malformed_source() {
        let result = SvgPipeline::new(&SvgoConfig::default()).run("<svg><g></svg>", "a.svg");
        assert!(result.is_err());
    }
}
