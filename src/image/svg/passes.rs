//! Tree-rewriting passes.
//!
//! Each pass is addressed by its camelCase name in configuration. The
//! `preset-default` bundle runs its members in a fixed order; the remaining
//! passes only run when listed under `svgo.plugins`.

use regex::Regex;
use std::sync::LazyLock;

use super::tree::{Document, Element, Node};

/// A named pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassName {
    RemoveDoctype,
    RemoveXmlProcInst,
    RemoveComments,
    RemoveMetadata,
    RemoveEditorsNsData,
    CleanupAttrs,
    CleanupNumericValues,
    RemoveViewBox,
    RemoveHiddenElems,
    RemoveEmptyText,
    RemoveEmptyAttrs,
    RemoveEmptyContainers,
    RemoveUnusedNs,
    RemoveTitle,
    RemoveDesc,
    RemoveDimensions,
    RemoveXmlns,
    RemoveStyleElement,
    RemoveScriptElement,
    RemoveRasterImages,
    RemoveAttrs,
}

impl PassName {
    /// Name of the bundle that is always applied.
    pub const PRESET_DEFAULT: &'static str = "preset-default";
    /// Name of the id-prefixing pass, configured through `svgo.prefixIds`.
    pub const PREFIX_IDS: &'static str = "prefixIds";

    /// `preset-default` members in run order.
    pub const PRESET: [Self; 15] = [
        Self::RemoveDoctype,
        Self::RemoveXmlProcInst,
        Self::RemoveComments,
        Self::RemoveMetadata,
        Self::RemoveEditorsNsData,
        Self::CleanupAttrs,
        Self::CleanupNumericValues,
        Self::RemoveViewBox,
        Self::RemoveHiddenElems,
        Self::RemoveEmptyText,
        Self::RemoveEmptyAttrs,
        Self::RemoveEmptyContainers,
        Self::RemoveUnusedNs,
        Self::RemoveTitle,
        Self::RemoveDesc,
    ];

    pub const EXTRA: [Self; 6] = [
        Self::RemoveDimensions,
        Self::RemoveXmlns,
        Self::RemoveStyleElement,
        Self::RemoveScriptElement,
        Self::RemoveRasterImages,
        Self::RemoveAttrs,
    ];

    pub fn all() -> impl Iterator<Item = Self> {
        Self::PRESET.into_iter().chain(Self::EXTRA)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().find(|pass| pass.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::RemoveDoctype => "removeDoctype",
            Self::RemoveXmlProcInst => "removeXMLProcInst",
            Self::RemoveComments => "removeComments",
            Self::RemoveMetadata => "removeMetadata",
            Self::RemoveEditorsNsData => "removeEditorsNSData",
            Self::CleanupAttrs => "cleanupAttrs",
            Self::CleanupNumericValues => "cleanupNumericValues",
            Self::RemoveViewBox => "removeViewBox",
            Self::RemoveHiddenElems => "removeHiddenElems",
            Self::RemoveEmptyText => "removeEmptyText",
            Self::RemoveEmptyAttrs => "removeEmptyAttrs",
            Self::RemoveEmptyContainers => "removeEmptyContainers",
            Self::RemoveUnusedNs => "removeUnusedNS",
            Self::RemoveTitle => "removeTitle",
            Self::RemoveDesc => "removeDesc",
            Self::RemoveDimensions => "removeDimensions",
            Self::RemoveXmlns => "removeXMLNS",
            Self::RemoveStyleElement => "removeStyleElement",
            Self::RemoveScriptElement => "removeScriptElement",
            Self::RemoveRasterImages => "removeRasterImages",
            Self::RemoveAttrs => "removeAttrs",
        }
    }

    pub fn in_preset(self) -> bool {
        Self::PRESET.contains(&self)
    }
}

/// Settings shared by all passes of one run.
#[derive(Debug, Clone)]
pub struct PassContext {
    pub float_precision: u8,
}

impl Default for PassContext {
    fn default() -> Self {
        Self { float_precision: 3 }
    }
}

/// A pass ready to run, with its parameters resolved.
#[derive(Debug, Clone)]
pub enum Pass {
    Builtin(PassName),
    /// `removeAttrs` with anchored attribute-name patterns.
    RemoveAttrs(Vec<Regex>),
}

impl Pass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Builtin(name) => name.name(),
            Self::RemoveAttrs(_) => PassName::RemoveAttrs.name(),
        }
    }

    /// Build a `removeAttrs` pass from `attrs` patterns.
    pub fn remove_attrs<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(&format!("^(?:{})$", p.as_ref())))
            .collect::<Result<_, _>>()?;
        Ok(Self::RemoveAttrs(patterns))
    }

    pub fn apply(&self, doc: &mut Document, ctx: &PassContext) {
        match self {
            Self::RemoveAttrs(patterns) => doc.root.walk_mut(&mut |el| {
                el.attributes
                    .retain(|name, _| !patterns.iter().any(|p| p.is_match(name)));
            }),
            Self::Builtin(name) => apply_builtin(*name, doc, ctx),
        }
    }
}

fn apply_builtin(name: PassName, doc: &mut Document, ctx: &PassContext) {
    match name {
        PassName::RemoveDoctype => retain_all(doc, |node| !matches!(node, Node::Doctype(_))),
        PassName::RemoveXmlProcInst => retain_all(doc, |node| !is_xml_declaration(node)),
        PassName::RemoveComments => retain_all(doc, |node| match node {
            Node::Comment(text) => text.starts_with('!'),
            _ => true,
        }),
        PassName::RemoveMetadata => remove_elements(doc, |el| el.name == "metadata"),
        PassName::RemoveEditorsNsData => remove_editors_data(doc),
        PassName::CleanupAttrs => doc.root.walk_mut(&mut |el| {
            for (_, value) in el.attributes.iter_mut() {
                *value = collapse_whitespace(value);
            }
        }),
        PassName::CleanupNumericValues => cleanup_numeric_values(doc, ctx.float_precision),
        PassName::RemoveViewBox => remove_view_box(doc),
        PassName::RemoveHiddenElems => remove_elements(doc, is_hidden),
        PassName::RemoveEmptyText => remove_elements(doc, |el| match el.name.as_str() {
            "text" | "tspan" => el.children.is_empty(),
            "tref" => !el.attributes.has("xlink:href"),
            _ => false,
        }),
        PassName::RemoveEmptyAttrs => doc.root.walk_mut(&mut |el| {
            el.attributes.retain(|name, value| {
                !value.is_empty() || CONDITIONAL_ATTRS.contains(&name)
            });
        }),
        PassName::RemoveEmptyContainers => remove_empty_containers(&mut doc.root),
        PassName::RemoveUnusedNs => remove_unused_ns(doc),
        PassName::RemoveTitle => remove_elements(doc, |el| el.name == "title"),
        PassName::RemoveDesc => remove_elements(doc, |el| {
            el.name == "desc"
                && match el.children.as_slice() {
                    [] => true,
                    [Node::Text(text)] => {
                        text.starts_with("Created with") || text.starts_with("Created using")
                    }
                    _ => false,
                }
        }),
        PassName::RemoveDimensions => remove_dimensions(doc),
        PassName::RemoveXmlns => doc.root.walk_mut(&mut |el| {
            if el.name == "svg" {
                el.attributes.remove("xmlns");
            }
        }),
        PassName::RemoveStyleElement => remove_elements(doc, |el| el.name == "style"),
        PassName::RemoveScriptElement => remove_elements(doc, |el| el.name == "script"),
        PassName::RemoveRasterImages => remove_elements(doc, is_raster_image),
        // Without patterns there is nothing to remove.
        PassName::RemoveAttrs => {}
    }
}

const CONDITIONAL_ATTRS: &[&str] = &["requiredFeatures", "requiredExtensions", "systemLanguage"];

const CONTAINER_ELEMENTS: &[&str] = &[
    "a", "defs", "g", "marker", "mask", "missing-glyph", "pattern", "svg", "switch", "symbol",
];

const EDITOR_NAMESPACES: &[&str] = &[
    "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://inkscape.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://www.inkscape.org/namespaces/inkscape",
    "http://www.bohemiancoding.com/sketch/ns",
    "http://ns.adobe.com/AdobeIllustrator/10.0/",
    "http://ns.adobe.com/Graphs/1.0/",
    "http://ns.adobe.com/AdobeSVGViewerExtensions/3.0/",
    "http://ns.adobe.com/Variables/1.0/",
    "http://ns.adobe.com/SaveForWeb/1.0/",
    "http://ns.adobe.com/Extensibility/1.0/",
    "http://ns.adobe.com/Flows/1.0/",
    "http://ns.adobe.com/ImageReplacement/1.0/",
    "http://ns.adobe.com/GenericCustomNamespace/1.0/",
    "http://ns.adobe.com/XPath/1.0/",
    "http://schemas.microsoft.com/visio/2003/SVGExtensions/",
    "http://taptrix.com/vectorillustrator/svg_extensions",
    "http://www.figma.com/figma/ns",
    "http://purl.org/dc/elements/1.1/",
    "http://creativecommons.org/ns#",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
    "http://www.serif.com/",
    "http://www.vector.evaxdesign.sk",
];

static NUMERIC_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)(px|pt|pc|mm|cm|m|in|ft|em|ex|%)?$")
        .expect("valid numeric regex")
});

static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*|\s+").expect("valid separator regex"));

static RASTER_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\.|image/)(jpe?g|png|gif)").expect("valid raster href regex")
});

/// Drop matching nodes from the prolog, epilog and tree.
fn retain_all(doc: &mut Document, keep: impl Fn(&Node) -> bool) {
    doc.prolog.retain(|node| keep(node));
    doc.epilog.retain(|node| keep(node));
    doc.root.retain_nodes(&mut |node| keep(node));
}

/// Drop descendant elements matching `remove`. The root is never removed.
fn remove_elements(doc: &mut Document, remove: impl Fn(&Element) -> bool) {
    doc.root.retain_nodes(&mut |node| match node {
        Node::Element(el) => !remove(el),
        _ => true,
    });
}

fn is_xml_declaration(node: &Node) -> bool {
    matches!(node, Node::Instruction(content) if content == "xml" || content.starts_with("xml "))
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_hidden(el: &Element) -> bool {
    let attr = |name| el.attributes.get(name).map(str::trim);
    if attr("display") == Some("none") || attr("opacity") == Some("0") {
        return true;
    }
    let is_zero = |name| attr(name).is_some_and(|v| v.parse::<f64>().is_ok_and(|n| n == 0.0));
    match el.name.as_str() {
        "circle" => is_zero("r"),
        "ellipse" => is_zero("rx") || is_zero("ry"),
        "rect" => is_zero("width") || is_zero("height"),
        "path" => attr("d").is_none_or(str::is_empty),
        _ => false,
    }
}

fn is_raster_image(el: &Element) -> bool {
    el.name == "image"
        && ["xlink:href", "href"]
            .iter()
            .filter_map(|name| el.attributes.get(name))
            .any(|href| RASTER_HREF.is_match(href))
}

fn remove_editors_data(doc: &mut Document) {
    let prefixes: Vec<String> = doc
        .root
        .attributes
        .iter()
        .filter(|(_, uri)| EDITOR_NAMESPACES.contains(uri))
        .filter_map(|(name, _)| name.strip_prefix("xmlns:"))
        .map(|prefix| format!("{prefix}:"))
        .collect();

    if prefixes.is_empty() {
        return;
    }
    let is_editor = |name: &str| prefixes.iter().any(|p| name.starts_with(p.as_str()));

    doc.root.attributes.retain(|name, value| {
        !(name.starts_with("xmlns:") && EDITOR_NAMESPACES.contains(&value))
    });
    remove_elements(doc, |el| is_editor(&el.name));
    doc.root.walk_mut(&mut |el| el.attributes.retain(|name, _| !is_editor(name)));
}

fn cleanup_numeric_values(doc: &mut Document, precision: u8) {
    doc.root.walk_mut(&mut |el| {
        for (name, value) in el.attributes.iter_mut() {
            let cleaned = match name {
                "version" => None,
                "viewBox" => round_list(value, precision),
                _ => round_value(value, precision),
            };
            if let Some(cleaned) = cleaned {
                *value = cleaned;
            }
        }
    });
}

fn round_list(value: &str, precision: u8) -> Option<String> {
    let rounded: Vec<String> = LIST_SEPARATOR
        .split(value.trim())
        .map(|n| n.parse::<f64>().ok().map(|n| format_number(n, precision)))
        .collect::<Option<_>>()?;
    Some(rounded.join(" "))
}

/// Round a number with an optional unit. `px` is the default and dropped.
fn round_value(value: &str, precision: u8) -> Option<String> {
    let caps = NUMERIC_VALUE.captures(value)?;
    let number = caps[1].parse::<f64>().ok()?;
    let unit = match caps.get(2).map_or("", |m| m.as_str()) {
        "px" => "",
        unit => unit,
    };
    Some(format!("{}{unit}", format_number(number, precision)))
}

/// Round to `precision` places and drop the leading zero of fractions.
pub(crate) fn format_number(number: f64, precision: u8) -> String {
    let scale = 10f64.powi(i32::from(precision));
    let rounded = (number * scale).round() / scale + 0.0;
    let text = rounded.to_string();
    if let Some(rest) = text.strip_prefix("0.") {
        format!(".{rest}")
    } else if let Some(rest) = text.strip_prefix("-0.") {
        format!("-.{rest}")
    } else {
        text
    }
}

fn remove_view_box(doc: &mut Document) {
    // Nested `svg` elements keep their viewBox.
    if doc.root.name == "svg" {
        strip_view_box(&mut doc.root);
    }
    doc.root.walk_descendants_mut(&mut |el| {
        if el.name == "pattern" || el.name == "symbol" {
            strip_view_box(el);
        }
    });
}

fn strip_view_box(el: &mut Element) {
    let attrs = &el.attributes;
    let redundant = match (attrs.get("viewBox"), attrs.get("width"), attrs.get("height")) {
        (Some(view_box), Some(width), Some(height)) => {
            let parts: Vec<&str> = LIST_SEPARATOR.split(view_box.trim()).collect();
            parts.len() == 4
                && parts[0] == "0"
                && parts[1] == "0"
                && parts[2] == width.trim_end_matches("px")
                && parts[3] == height.trim_end_matches("px")
        }
        _ => false,
    };
    if redundant {
        el.attributes.remove("viewBox");
    }
}

fn remove_empty_containers(el: &mut Element) {
    for child in &mut el.children {
        if let Node::Element(child) = child {
            remove_empty_containers(child);
        }
    }
    if el.name == "switch" {
        return;
    }
    el.children.retain(|node| match node {
        Node::Element(child) => !is_empty_container(child),
        _ => true,
    });
}

fn is_empty_container(el: &Element) -> bool {
    CONTAINER_ELEMENTS.contains(&el.name.as_str())
        && el.children.is_empty()
        && !(el.name == "pattern" && !el.attributes.is_empty())
        && !(el.name == "mask" && el.attributes.has("id"))
        && !(el.name == "g" && el.attributes.has("filter"))
}

fn remove_unused_ns(doc: &mut Document) {
    let mut used: Vec<String> = Vec::new();
    doc.root.walk(&mut |el| {
        let names = std::iter::once(el.name.as_str())
            .chain(el.attributes.iter().map(|(name, _)| name))
            .filter(|name| !name.starts_with("xmlns"));
        for name in names {
            if let Some((prefix, _)) = name.split_once(':')
                && !used.iter().any(|u| u == prefix)
            {
                used.push(prefix.to_string());
            }
        }
    });

    doc.root.attributes.retain(|name, _| match name.strip_prefix("xmlns:") {
        Some(prefix) => used.iter().any(|u| u == prefix),
        None => true,
    });
}

fn remove_dimensions(doc: &mut Document) {
    doc.root.walk_mut(&mut |el| {
        if el.name != "svg" {
            return;
        }
        if el.attributes.has("viewBox") {
            el.attributes.remove("width");
            el.attributes.remove("height");
            return;
        }
        let number = |name| {
            el.attributes
                .get(name)
                .and_then(|v| v.trim_end_matches("px").parse::<f64>().ok())
        };
        if let (Some(width), Some(height)) = (number("width"), number("height")) {
            el.attributes.set("viewBox", format!("0 0 {width} {height}"));
            el.attributes.remove("width");
            el.attributes.remove("height");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(pass: PassName, source: &str) -> String {
        let mut doc = Document::parse(source).unwrap();
        Pass::Builtin(pass).apply(&mut doc, &PassContext::default());
        doc.to_markup().unwrap()
    }

    #[test]
    fn test_names_round_trip() {
        for pass in PassName::all() {
            assert_eq!(PassName::from_name(pass.name()), Some(pass));
        }
        assert_eq!(PassName::from_name(PassName::PRESET_DEFAULT), None);
        assert!(PassName::RemoveTitle.in_preset());
        assert!(!PassName::RemoveDimensions.in_preset());
    }

    #[test]
    fn test_prolog_cleanup() {
        let source = r#"<?xml version="1.0"?><!DOCTYPE svg><!-- a --><svg><!--! keep --><g/></svg>"#;
        let out = run(PassName::RemoveXmlProcInst, source);
        assert!(!out.contains("<?xml"));
        let out = run(PassName::RemoveDoctype, source);
        assert!(!out.contains("DOCTYPE"));
        let out = run(PassName::RemoveComments, source);
        assert!(!out.contains("<!-- a -->"));
        assert!(out.contains("<!--! keep -->"));
    }

    #[test]
    fn test_cleanup_numeric_values() {
        let out = run(
            PassName::CleanupNumericValues,
            r#"<svg viewBox="0, 0, 24.00001 24" width="10.12345px" height="0.5em" version="1.10"/>"#,
        );
        assert_eq!(
            out,
            r#"<svg viewBox="0 0 24 24" width="10.123" height=".5em" version="1.10"/>"#
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.5, 3), ".5");
        assert_eq!(format_number(-0.25, 3), "-.25");
        assert_eq!(format_number(-0.0001, 3), "0");
        assert_eq!(format_number(12.0, 3), "12");
        assert_eq!(format_number(1.23456, 1), "1.2");
    }

    #[test]
    fn test_remove_view_box_only_when_redundant() {
        let out = run(
            PassName::RemoveViewBox,
            r#"<svg width="24" height="24px" viewBox="0 0 24 24"/>"#,
        );
        assert!(!out.contains("viewBox"));

        let out = run(
            PassName::RemoveViewBox,
            r#"<svg width="48" height="48" viewBox="0 0 24 24"/>"#,
        );
        assert!(out.contains("viewBox"));
    }

    #[test]
    fn test_remove_empty_containers() {
        let out = run(
            PassName::RemoveEmptyContainers,
            r#"<svg><g><g/></g><g filter="url(#f)"/><defs/><path d="M0 0"/></svg>"#,
        );
        assert_eq!(out, r#"<svg><g filter="url(#f)"/><path d="M0 0"/></svg>"#);
    }

    #[test]
    fn test_remove_hidden_elems() {
        let out = run(
            PassName::RemoveHiddenElems,
            r#"<svg><rect width="0" height="5"/><circle r="2"/><g display="none"><path d="M0 0"/></g><path/></svg>"#,
        );
        assert_eq!(out, r#"<svg><circle r="2"/></svg>"#);
    }

    #[test]
    fn test_editor_and_unused_namespaces() {
        let source = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:foo="urn:foo" inkscape:version="1.0"><inkscape:grid/><use xlink:href="#a"/></svg>"##;
        let out = run(PassName::RemoveEditorsNsData, source);
        assert!(!out.contains("inkscape"));
        let out = run(PassName::RemoveUnusedNs, &out);
        assert!(!out.contains("xmlns:foo"));
        assert!(out.contains("xmlns:xlink"));
        assert!(out.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    }

    #[test]
    fn test_remove_desc_keeps_authored_text() {
        let out = run(
            PassName::RemoveDesc,
            "<svg><desc>Created with Sketch.</desc><desc>A red circle</desc></svg>",
        );
        assert_eq!(out, "<svg><desc>A red circle</desc></svg>");
    }

    #[test]
    fn test_remove_dimensions() {
        let out = run(PassName::RemoveDimensions, r#"<svg width="24" height="12"/>"#);
        assert_eq!(out, r#"<svg viewBox="0 0 24 12"/>"#);
    }

    #[test]
    fn test_remove_attrs_patterns() {
        let mut doc =
            Document::parse(r#"<svg fill="red"><path fill="blue" stroke="red" data-x="1"/></svg>"#)
                .unwrap();
        Pass::remove_attrs(&["fill", "data-.*"][..])
            .unwrap()
            .apply(&mut doc, &PassContext::default());
        assert_eq!(doc.to_markup().unwrap(), r#"<svg><path stroke="red"/></svg>"#);
    }

    #[test]
    fn test_remove_raster_images() {
        let out = run(
            PassName::RemoveRasterImages,
            r#"<svg><image href="a.PNG"/><image href="b.svg"/></svg>"#,
        );
        assert_eq!(out, r#"<svg><image href="b.svg"/></svg>"#);
    }
}
