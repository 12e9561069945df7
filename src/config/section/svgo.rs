//! `[svgo]` section configuration.
//!
//! SVG optimization settings for `*.svg?jsx` imports.
//!
//! # Example
//!
//! ```toml
//! [svgo]
//! floatPrecision = 2      # Rounding for numeric attribute values (default: 3)
//! multipass = true        # Repeat passes while output keeps shrinking
//! prefixIds = false       # Or a table: { prefix = "icon", delim = "-" }
//! plugins = ["removeDimensions", { name = "removeAttrs", params = { attrs = ["fill"] } }]
//!
//! [svgo.defaultPresetOverrides]
//! removeTitle = false     # Keep <title> for accessibility
//! removeViewBox = true    # Re-enable (disabled by default)
//! ```
//!
//! # Behavior
//!
//! - `preset-default` and `prefixIds` always run at fixed positions; listing
//!   them in `plugins` is dropped with a warning.
//! - `removeViewBox` is off unless explicitly overridden, so extracted root
//!   attributes keep their intrinsic sizing.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::image::svg::PassName;

/// A user-supplied pass: a bare name or `{ name, params }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PluginEntry {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        params: Option<toml::Table>,
    },
}

impl PluginEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Full { name, .. } => name,
        }
    }

    pub fn params(&self) -> Option<&toml::Table> {
        match self {
            Self::Name(_) => None,
            Self::Full { params, .. } => params.as_ref(),
        }
    }
}

/// Parameters of the `prefixIds` pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrefixIdsParams {
    /// Prefix; defaults to the asset's file name.
    pub prefix: Option<String>,
    pub delim: String,
    pub prefix_ids: bool,
    pub prefix_class_names: bool,
}

impl Default for PrefixIdsParams {
    fn default() -> Self {
        Self {
            prefix: None,
            delim: "__".to_string(),
            prefix_ids: true,
            prefix_class_names: true,
        }
    }
}

/// `prefixIds = false` disables the pass; `true` or a table enables it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PrefixIdsOption {
    Toggle(bool),
    Params(PrefixIdsParams),
}

impl Default for PrefixIdsOption {
    fn default() -> Self {
        Self::Toggle(true)
    }
}

impl PrefixIdsOption {
    /// Effective params, or `None` when the pass is disabled.
    pub fn params(&self) -> Option<PrefixIdsParams> {
        match self {
            Self::Toggle(false) => None,
            Self::Toggle(true) => Some(PrefixIdsParams::default()),
            Self::Params(params) => Some(params.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SvgoConfig {
    /// Decimal places kept by numeric cleanup (pass default: 3).
    pub float_precision: Option<u8>,

    /// Repeat the pass pipeline while output keeps shrinking.
    pub multipass: bool,

    /// Extra passes, run after the fixed ones.
    pub plugins: Vec<PluginEntry>,

    /// Toggles for `preset-default` members.
    pub default_preset_overrides: BTreeMap<String, bool>,

    pub prefix_ids: PrefixIdsOption,
}

impl SvgoConfig {
    const FLOAT_PRECISION: FieldPath = FieldPath::new("svgo.floatPrecision");
    const PLUGINS: FieldPath = FieldPath::new("svgo.plugins");
    const OVERRIDES: FieldPath = FieldPath::new("svgo.defaultPresetOverrides");

    /// Validate SVG configuration.
    ///
    /// # Checks
    /// - `floatPrecision` within 0..=20
    /// - every plugin name is a known pass
    /// - every override names a `preset-default` member
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(precision) = self.float_precision
            && precision > 20
        {
            diag.error(Self::FLOAT_PRECISION, "floatPrecision must be between 0 and 20");
        }

        for plugin in &self.plugins {
            let name = plugin.name();
            if name == PassName::PRESET_DEFAULT || name == PassName::PREFIX_IDS {
                continue;
            }
            if PassName::from_name(name).is_none() {
                let known: Vec<&str> = PassName::EXTRA.iter().map(|p| p.name()).collect();
                diag.error_with_hint(
                    Self::PLUGINS,
                    format!("unknown plugin `{name}`"),
                    format!("extra passes: {}", known.join(", ")),
                );
            }
        }

        for name in self.default_preset_overrides.keys() {
            let is_member = PassName::from_name(name).is_some_and(PassName::in_preset);
            if !is_member {
                diag.warn(
                    Self::OVERRIDES,
                    format!("`{name}` is not part of preset-default and will be ignored"),
                );
            }
        }
    }
}
