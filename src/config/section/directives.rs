//! `[jsxDirectives]` section and the top-level `enabled` switch.
//!
//! # Example
//!
//! ```toml
//! enabled = "only-production"   # true | false | "only-production"
//!
//! [jsxDirectives]
//! quality = "80"
//! format = "avif"
//! w = "320;640;1280"
//! ```
//!
//! Directives set here sit between the built-in defaults and the per-import
//! query string.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::BuildMode;
use crate::image::raster::EncodeFormat;

/// Whether the pipeline runs at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "EnabledRepr")]
pub enum Enabled {
    #[default]
    Always,
    Never,
    /// Only for production-like builds; development passes assets through.
    OnlyProduction,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EnabledRepr {
    Toggle(bool),
    Mode(String),
}

impl TryFrom<EnabledRepr> for Enabled {
    type Error = String;

    fn try_from(repr: EnabledRepr) -> Result<Self, Self::Error> {
        match repr {
            EnabledRepr::Toggle(true) => Ok(Self::Always),
            EnabledRepr::Toggle(false) => Ok(Self::Never),
            EnabledRepr::Mode(mode) if mode == "only-production" => Ok(Self::OnlyProduction),
            EnabledRepr::Mode(mode) => Err(format!(
                "invalid `enabled` value `{mode}`, expected true, false or \"only-production\""
            )),
        }
    }
}

impl Enabled {
    pub fn is_active(self, mode: BuildMode) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::OnlyProduction => mode.production,
        }
    }
}

/// A directive default; TOML integers are accepted and stringified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DirectiveValue {
    Text(String),
    Integer(i64),
    Flag(bool),
}

impl DirectiveValue {
    pub fn as_directive(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            // presence-only flags carry an empty value
            Self::Flag(_) => String::new(),
        }
    }
}

/// User-supplied global directive overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct JsxDirectives(pub BTreeMap<String, DirectiveValue>);

impl JsxDirectives {
    const QUALITY: FieldPath = FieldPath::new("jsxDirectives.quality");
    const FORMAT: FieldPath = FieldPath::new("jsxDirectives.format");
    const AS: FieldPath = FieldPath::new("jsxDirectives.as");

    /// Directive pairs in key order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(_, v)| !matches!(v, DirectiveValue::Flag(false)))
            .map(|(k, v)| (k.clone(), v.as_directive()))
            .collect()
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(quality) = self.0.get("quality") {
            let valid = quality
                .as_directive()
                .parse::<u8>()
                .is_ok_and(|q| (1..=100).contains(&q));
            if !valid {
                diag.error(Self::QUALITY, "quality must be an integer between 1 and 100");
            }
        }

        if let Some(format) = self.0.get("format") {
            for name in format.as_directive().split(';') {
                if EncodeFormat::from_name(name).is_none() {
                    diag.error_with_hint(
                        Self::FORMAT,
                        format!("unknown output format `{name}`"),
                        "use one of webp, avif, png, jpeg",
                    );
                }
            }
        }

        if self.0.contains_key("as") {
            diag.warn(Self::AS, "`as` is always set to `jsx` and will be ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_enabled_parsing() {
        assert_eq!(test_parse_config("").enabled, Enabled::Always);
        assert_eq!(test_parse_config("enabled = false").enabled, Enabled::Never);
        assert_eq!(
            test_parse_config("enabled = \"only-production\"").enabled,
            Enabled::OnlyProduction
        );
        assert!(toml::from_str::<crate::config::PipelineConfig>("enabled = \"sometimes\"").is_err());
    }

    #[test]
    fn test_enabled_is_active() {
        assert!(Enabled::Always.is_active(BuildMode::DEVELOPMENT));
        assert!(!Enabled::Never.is_active(BuildMode::PRODUCTION));
        assert!(Enabled::OnlyProduction.is_active(BuildMode::PRODUCTION));
        assert!(!Enabled::OnlyProduction.is_active(BuildMode::DEVELOPMENT));
    }

    #[test]
    fn test_directive_values_stringified() {
        let config = test_parse_config("[jsxDirectives]\nquality = 80\nformat = \"avif\"");
        assert_eq!(
            config.jsx_directives.pairs(),
            vec![
                ("format".to_string(), "avif".to_string()),
                ("quality".to_string(), "80".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_quality_and_format() {
        let config = test_parse_config("[jsxDirectives]\nquality = \"0\"\nformat = \"bmp\"");
        let mut diag = ConfigDiagnostics::new();
        config.jsx_directives.validate(&mut diag);
        assert_eq!(diag.errors().len(), 2);

        let config = test_parse_config("[jsxDirectives]\nquality = \"90\"\nformat = \"avif;webp\"");
        let mut diag = ConfigDiagnostics::new();
        config.jsx_directives.validate(&mut diag);
        assert!(!diag.has_errors());
    }
}
