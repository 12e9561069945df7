//! Directive resolution.
//!
//! Directives are the transform parameters handed to the raster engine. For a
//! request carrying the `jsx` marker they are layered, lowest precedence first:
//!
//! ```text
//! built-in defaults  ->  [jsxDirectives]  ->  request query  ->  as=jsx
//! ```
//!
//! A request without the marker resolves to the empty set, meaning the asset is
//! not intercepted.

use std::fmt;

use crate::config::JsxDirectives;
use crate::core::{AssetIdentifier, MARKER};
use crate::image::raster::OutputFormat;

/// Ordered directive mapping.
///
/// A key keeps the position of its first insertion; re-inserting replaces the
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet(Vec<(String, String)>);

impl DirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Overlay `pairs`; later pairs win on collision.
    pub fn extend<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in pairs {
            self.insert(k, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Semicolon-separated list value (`"200;400"` -> `["200", "400"]`).
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .map(|v| v.split(';').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DirectiveSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Query-string form, e.g. `format=webp&quality=75&withoutEnlargement=`.
impl fmt::Display for DirectiveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish();
        f.write_str(&encoded)
    }
}

/// Built-in defaults for marker requests.
pub fn builtin_defaults() -> DirectiveSet {
    [
        ("format", "webp"),
        ("quality", "75"),
        ("w", "200;400;600;800;1200"),
        ("withoutEnlargement", ""),
    ]
    .into_iter()
    .collect()
}

/// Layers defaults, global overrides and request overrides.
#[derive(Debug, Clone)]
pub struct DirectiveResolver {
    defaults: DirectiveSet,
    globals: DirectiveSet,
}

impl DirectiveResolver {
    pub fn new(defaults: DirectiveSet, globals: DirectiveSet) -> Self {
        Self { defaults, globals }
    }

    /// Resolver with built-in defaults and the configured `[jsxDirectives]`.
    pub fn from_config(directives: &JsxDirectives) -> Self {
        Self::new(builtin_defaults(), directives.pairs().into_iter().collect())
    }

    /// Resolve the directive set for a request.
    ///
    /// Returns the empty set when the marker parameter is absent.
    pub fn resolve(&self, id: &AssetIdentifier) -> DirectiveSet {
        if !id.params.has(MARKER) {
            return DirectiveSet::new();
        }

        let mut set = self.defaults.clone();
        set.extend(self.globals.iter());
        set.extend(id.params.iter().filter(|(k, _)| *k != MARKER));
        set.insert("as", OutputFormat::Jsx.name());
        set
    }
}

impl Default for DirectiveResolver {
    fn default() -> Self {
        Self::new(builtin_defaults(), DirectiveSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(resolver: &DirectiveResolver, raw: &str) -> DirectiveSet {
        resolver.resolve(&AssetIdentifier::parse(raw))
    }

    #[test]
    fn test_without_marker_is_empty() {
        let resolver = DirectiveResolver::default();
        assert!(resolve(&resolver, "photo.jpg").is_empty());
        assert!(resolve(&resolver, "photo.jpg?w=200&format=png").is_empty());
    }

    #[test]
    fn test_builtin_defaults() {
        let set = resolve(&DirectiveResolver::default(), "photo.jpg?jsx");
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![
                ("format", "webp"),
                ("quality", "75"),
                ("w", "200;400;600;800;1200"),
                ("withoutEnlargement", ""),
                ("as", "jsx"),
            ]
        );
        assert!(!set.has("jsx"));
    }

    #[test]
    fn test_layering_precedence() {
        let defaults: DirectiveSet = [("format", "webp"), ("w", "200;400")].into_iter().collect();
        let globals: DirectiveSet = [("quality", "80")].into_iter().collect();
        let resolver = DirectiveResolver::new(defaults, globals);

        let set = resolve(&resolver, "photo.jpg?w=100&jsx");
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![("format", "webp"), ("w", "100"), ("quality", "80"), ("as", "jsx")]
        );
    }

    #[test]
    fn test_request_overrides_globals() {
        let globals: DirectiveSet = [("quality", "80"), ("format", "avif")].into_iter().collect();
        let resolver = DirectiveResolver::new(builtin_defaults(), globals);

        let set = resolve(&resolver, "f.jpg?w=600&h=400&format=png&jsx");
        assert_eq!(set.get("format"), Some("png"));
        assert_eq!(set.get("quality"), Some("80"));
        assert_eq!(set.get("w"), Some("600"));
        assert_eq!(set.get("h"), Some("400"));
    }

    #[test]
    fn test_as_cannot_be_overridden() {
        let globals: DirectiveSet = [("as", "srcset")].into_iter().collect();
        let resolver = DirectiveResolver::new(builtin_defaults(), globals);
        let set = resolve(&resolver, "photo.jpg?as=metadata&jsx");
        assert_eq!(set.get("as"), Some("jsx"));
    }

    #[test]
    fn test_repeated_request_key_last_wins() {
        let set = resolve(&DirectiveResolver::default(), "a.png?jsx&w=100&w=300");
        assert_eq!(set.get("w"), Some("300"));
    }

    #[test]
    fn test_list_and_display() {
        let set: DirectiveSet = [("w", "200; 400;;600"), ("withoutEnlargement", "")]
            .into_iter()
            .collect();
        assert_eq!(set.list("w"), vec!["200", "400", "600"]);
        assert!(set.list("h").is_empty());
        assert_eq!(set.to_string(), "w=200%3B+400%3B%3B600&withoutEnlargement=");
    }
}
