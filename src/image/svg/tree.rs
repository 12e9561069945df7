//! Minimal SVG document tree.
//!
//! Parsed with `quick-xml`, serialized back compactly (no indentation,
//! childless elements self-closed). Attribute values are stored unescaped;
//! text content is stored as it appeared in the source (still escaped).

use quick_xml::{
    Reader, Writer,
    escape::unescape,
    events::{BytesCData, BytesEnd, BytesStart, BytesText, Event},
};
use std::borrow::Cow;
use std::io::Write;

use super::SvgError;

/// Elements whose whitespace-only text is significant.
const TEXT_ELEMENTS: &[&str] = &[
    "text", "textPath", "tref", "tspan", "title", "desc", "style", "script", "pre",
];

/// Ordered attribute list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a value, keeping the position of an existing attribute.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(pos).1)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.0.retain(|(k, v)| keep(k, v));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut String)> {
        self.0.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Move all attributes out, leaving this list empty.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Append `other`, later values winning on collision.
    pub fn merge(&mut self, other: Self) {
        for (k, v) in other.0 {
            self.set(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::default();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::default(),
            children: Vec::new(),
        }
    }

    /// Child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Visit this element and all descendants, parents first.
    pub fn walk(&self, f: &mut impl FnMut(&Element)) {
        f(self);
        for child in self.child_elements() {
            child.walk(f);
        }
    }

    /// Mutably visit descendants (not `self`), parents first.
    pub fn walk_descendants_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                f(el);
                el.walk_descendants_mut(f);
            }
        }
    }

    /// Mutably visit this element and all descendants, parents first.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        self.walk_descendants_mut(f);
    }

    /// Drop descendant nodes for which `keep` is false, deepest first.
    pub fn retain_nodes(&mut self, keep: &mut impl FnMut(&Node) -> bool) {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.retain_nodes(keep);
            }
        }
        self.children.retain(|node| keep(node));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Escaped character data.
    Text(String),
    CData(String),
    Comment(String),
    /// `<?...?>` content, including the XML declaration.
    Instruction(String),
    Doctype(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// A parsed document: prolog nodes, one root element, trailing nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

impl Document {
    /// Parse SVG markup.
    pub fn parse(source: &str) -> Result<Self, SvgError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut text = String::new();

        loop {
            let event = reader.read_event()?;

            if !matches!(event, Event::Text(_) | Event::GeneralRef(_)) && !text.is_empty() {
                if let Some(parent) = stack.last_mut() {
                    push_text(parent, std::mem::take(&mut text));
                } else {
                    text.clear();
                }
            }

            let node = match event {
                Event::Start(start) => {
                    stack.push(element_from(&start)?);
                    continue;
                }
                Event::End(_) => {
                    let el = stack.pop().ok_or(SvgError::UnbalancedEnd)?;
                    Node::Element(el)
                }
                Event::Empty(start) => Node::Element(element_from(&start)?),
                Event::Text(t) => {
                    text.push_str(utf8(&t)?);
                    continue;
                }
                Event::GeneralRef(r) => {
                    text.push('&');
                    text.push_str(utf8(&r)?);
                    text.push(';');
                    continue;
                }
                Event::CData(c) => Node::CData(utf8(&c)?.to_string()),
                Event::Comment(c) => Node::Comment(utf8(&c)?.to_string()),
                Event::Decl(d) => Node::Instruction(utf8(&d)?.to_string()),
                Event::PI(p) => Node::Instruction(utf8(&p)?.to_string()),
                Event::DocType(d) => Node::Doctype(utf8(&d)?.trim().to_string()),
                Event::Eof => break,
            };

            match (stack.last_mut(), node) {
                (Some(parent), node) => parent.children.push(node),
                (None, Node::Element(el)) if root.is_none() => root = Some(el),
                (None, Node::Element(el)) => return Err(SvgError::MultipleRoots(el.name)),
                (None, node) if root.is_none() => prolog.push(node),
                (None, node) => epilog.push(node),
            }
        }

        if let Some(open) = stack.pop() {
            return Err(SvgError::Unclosed(open.name));
        }

        Ok(Self {
            prolog,
            root: root.ok_or(SvgError::NoRoot)?,
            epilog,
        })
    }

    /// Serialize the whole document.
    pub fn to_markup(&self) -> Result<String, SvgError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }
        Ok(String::from_utf8(writer.into_inner())?)
    }
}

/// Serialize a node list (e.g. an element's children).
pub fn nodes_to_markup(nodes: &[Node]) -> Result<String, SvgError> {
    let mut writer = Writer::new(Vec::new());
    for node in nodes {
        write_node(&mut writer, node)?;
    }
    Ok(String::from_utf8(writer.into_inner())?)
}

fn utf8(bytes: &[u8]) -> Result<&str, SvgError> {
    Ok(std::str::from_utf8(bytes)?)
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, SvgError> {
    let mut el = Element::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr?;
        let key = utf8(attr.key.as_ref())?;
        let value = unescape(utf8(&attr.value)?)?;
        el.attributes.set(key, value.into_owned());
    }
    Ok(el)
}

/// Append text to `parent`, dropping insignificant whitespace.
fn push_text(parent: &mut Element, text: String) {
    if TEXT_ELEMENTS.contains(&parent.name.as_str()) {
        parent.children.push(Node::Text(text));
    } else if !text.trim().is_empty() {
        parent.children.push(Node::Text(text.trim().to_string()));
    }
}

/// Escape a double-quoted attribute value. Apostrophes stay literal.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), SvgError> {
    match node {
        Node::Element(el) => write_element(writer, el)?,
        Node::Text(text) => writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?,
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        Node::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
        }
        Node::Instruction(content) => write!(writer.get_mut(), "<?{content}?>")?,
        Node::Doctype(content) => write!(writer.get_mut(), "<!DOCTYPE {content}>")?,
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<(), SvgError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (name, value) in el.attributes.iter() {
        let value = escape_attribute(value);
        start.push_attribute((name.as_bytes(), value.as_bytes()));
    }

    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &el.children {
            write_node(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let source = r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">
  <g fill="red">
    <path d="M0 0h24v24H0z"/>
  </g>
</svg>
"#;
        let doc = Document::parse(source).unwrap();
        assert_eq!(doc.prolog, vec![Node::Instruction("xml version=\"1.0\"".to_string())]);
        assert_eq!(doc.root.name, "svg");
        assert_eq!(doc.root.attributes.get("viewBox"), Some("0 0 24 24"));
        assert_eq!(doc.root.child_elements().count(), 1);

        assert_eq!(
            doc.to_markup().unwrap(),
            r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><g fill="red"><path d="M0 0h24v24H0z"/></g></svg>"#
        );
    }

    #[test]
    fn test_attribute_values_unescaped_and_reescaped() {
        let doc = Document::parse(r#"<svg data-x="a &amp; b &lt; c"/>"#).unwrap();
        assert_eq!(doc.root.attributes.get("data-x"), Some("a & b < c"));
        let markup = doc.to_markup().unwrap();
        assert!(markup.contains("a &amp; b &lt; c"));
    }

    #[test]
    fn test_text_whitespace_rules() {
        let doc = Document::parse("<svg>\n  <text> a &amp; b </text>\n  <g>  x  </g></svg>").unwrap();
        let markup = doc.to_markup().unwrap();
        assert_eq!(markup, "<svg><text> a &amp; b </text><g>x</g></svg>");
    }

    #[test]
    fn test_malformed_sources() {
        assert!(Document::parse("<svg><g></svg>").is_err());
        assert!(Document::parse("<svg>").is_err());
        assert!(Document::parse("").is_err());
        assert!(Document::parse("<svg/><svg/>").is_err());
        assert!(Document::parse("not markup at all").is_err());
    }

    #[test]
    fn test_attributes_ops() {
        let mut attrs: Attributes = [("a", "1"), ("b", "2")].into_iter().collect();
        attrs.set("a", "3");
        assert_eq!(attrs.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
        assert_eq!(attrs.remove("a"), Some("3".to_string()));
        assert_eq!(attrs.len(), 1);

        let taken = attrs.take();
        assert!(attrs.is_empty());
        assert_eq!(taken.get("b"), Some("2"));
    }

    #[test]
    fn test_nodes_to_markup() {
        let doc = Document::parse(r#"<svg><circle r="1"/><rect width="2"/></svg>"#).unwrap();
        assert_eq!(
            nodes_to_markup(&doc.root.children).unwrap(),
            r#"<circle r="1"/><rect width="2"/>"#
        );
    }
}
