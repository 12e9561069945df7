//! Configuration section definitions.
//!
//! Each module corresponds to a section in `jsximg.toml`:
//!
//! | Module       | TOML Section       | Purpose                             |
//! |--------------|--------------------|-------------------------------------|
//! | `directives` | `[jsxDirectives]`  | Global directive overrides, enabled |
//! | `svgo`       | `[svgo]`           | SVG pass pipeline                   |
//! | `output`     | `[output]`         | Variant/module output locations     |

mod directives;
mod output;
mod svgo;

pub use directives::{DirectiveValue, Enabled, JsxDirectives};
pub use output::OutputConfig;
pub use svgo::{PluginEntry, PrefixIdsOption, PrefixIdsParams, SvgoConfig};
