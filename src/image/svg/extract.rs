//! Root attribute extraction.
//!
//! The generated component renders its own `<svg>` element, so the document
//! root gives up its attributes and becomes a plain `<g>`. The removed
//! attributes travel alongside the tree instead of being stashed on it.

use serde_json::{Map, Value};

use super::tree::{Attributes, Document};

/// Props for the generated `<svg>` component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorAttributes {
    /// Root attributes in source order.
    pub attributes: Attributes,
    /// Serialized children of the root.
    pub inner_html: Option<String>,
}

impl VectorAttributes {
    pub const INNER_HTML_KEY: &'static str = "dangerouslySetInnerHTML";

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// JSON object spread onto the component: the root attributes followed by
    /// `dangerouslySetInnerHTML: { __html }`.
    pub fn to_json(&self) -> Value {
        let mut map: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(v)))
            .collect();
        if let Some(html) = &self.inner_html {
            let mut inner = Map::new();
            inner.insert("__html".to_string(), Value::from(html.as_str()));
            map.insert(Self::INNER_HTML_KEY.to_string(), Value::Object(inner));
        }
        Value::Object(map)
    }
}

/// Strip the root `<svg>` of its attributes and rename it to `<g>`.
///
/// Only the document root is affected, and only when it is an `svg` element;
/// otherwise the document comes back unchanged with nothing extracted.
pub fn extract_root(mut doc: Document) -> (Document, Attributes) {
    if doc.root.name != "svg" {
        return (doc, Attributes::default());
    }
    let attributes = doc.root.attributes.take();
    doc.root.name = "g".to_string();
    (doc, attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_root_only() {
        let doc = Document::parse(
            r#"<svg viewBox="0 0 10 10" fill="none"><svg width="5"><path d="M0 0"/></svg></svg>"#,
        )
        .unwrap();
        let (doc, attributes) = extract_root(doc);

        assert_eq!(
            attributes.iter().collect::<Vec<_>>(),
            vec![("viewBox", "0 0 10 10"), ("fill", "none")]
        );
        assert_eq!(
            doc.to_markup().unwrap(),
            r#"<g><svg width="5"><path d="M0 0"/></svg></g>"#
        );
    }

    #[test]
    fn test_non_svg_root_untouched() {
        let doc = Document::parse(r#"<g id="x"/>"#).unwrap();
        let (doc, attributes) = extract_root(doc);
        assert!(attributes.is_empty());
        assert_eq!(doc.root.attributes.get("id"), Some("x"));
    }

    #[test]
    fn test_second_extraction_is_noop() {
        let doc = Document::parse(r#"<svg viewBox="0 0 1 1"><path d="M0 0"/></svg>"#).unwrap();
        let (doc, _) = extract_root(doc);
        let (doc, attributes) = extract_root(doc);
        assert!(attributes.is_empty());
        assert_eq!(doc.root.name, "g");
    }

    #[test]
    fn test_to_json_key_order() {
        let props = VectorAttributes {
            attributes: [("viewBox", "0 0 1 1"), ("fill", "red")].into_iter().collect(),
            inner_html: Some("<path/>".to_string()),
        };
        assert_eq!(
            props.to_json().to_string(),
            r#"{"viewBox":"0 0 1 1","fill":"red","dangerouslySetInnerHTML":{"__html":"<path/>"}}"#
        );
    }
}
