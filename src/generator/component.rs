//! JSX component emission.
//!
//! Raster modules render `<img>` from the `srcSet`/`width`/`height` bindings;
//! vector modules render `<svg>` spreading the extracted root attributes.
//! Caller props are always spread last so they win on collision.

use crate::image::raster::{AggregatedRasterDescriptor, js_number, js_string};
use crate::image::svg::VectorAttributes;
use crate::pipeline::PipelineError;

/// Substring proving the engine emitted the aggregated bindings.
pub const SENTINEL: &str = "srcSet";

const DEFAULT_EXPORT: &str = "export default";

/// Splice the image component onto engine-emitted module text.
///
/// Everything from the engine's own `export default` onwards is replaced.
/// Without one, the component is appended after the whole text.
pub fn generate_raster(existing_code: &str, id: &str) -> Result<String, PipelineError> {
    if !existing_code.contains(SENTINEL) {
        return Err(PipelineError::ShapeMismatch { id: id.to_string() });
    }

    let head = existing_code
        .find(DEFAULT_EXPORT)
        .map_or(existing_code, |at| &existing_code[..at]);

    let mut code = head.to_string();
    if !code.is_empty() && !code.ends_with('\n') {
        code.push('\n');
    }
    code.push_str(&image_component(true, true));
    Ok(code)
}

/// Module for a descriptor handed over directly, without engine text.
///
/// Absent dimensions export `undefined` and are left off the `<img>`.
pub fn raster_module(descriptor: &AggregatedRasterDescriptor) -> String {
    format!(
        "export const srcSet = {};\nexport const width = {};\nexport const height = {};\n{}",
        js_string(&descriptor.src_set),
        js_number(descriptor.width),
        js_number(descriptor.height),
        image_component(descriptor.width.is_some(), descriptor.height.is_some()),
    )
}

/// Module rendering `<svg>` with the extracted attributes.
pub fn generate_vector(attributes: &VectorAttributes) -> String {
    format!(
        "export default function SvgImage(props) {{\n  return <svg {{...{}}} {{...props}} />;\n}}\n",
        attributes.to_json()
    )
}

fn image_component(width: bool, height: bool) -> String {
    let mut attrs = vec!["srcSet={srcSet}"];
    if width {
        attrs.push("width={width}");
    }
    if height {
        attrs.push("height={height}");
    }
    attrs.extend([r#"decoding="async""#, r#"loading="lazy""#, "{...props}"]);

    let attrs: String = attrs.iter().map(|a| format!("      {a}\n")).collect();
    format!("export default function Image(props) {{\n  return (\n    <img\n{attrs}    />\n  );\n}}\n")
}
