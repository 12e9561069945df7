//! Asset identifier parsing.
//!
//! An identifier is an import path with an optional query string carrying
//! transform directives, e.g. `~/images/a.jpg?w=600&format=webp&jsx`.

use std::path::Path;

/// Query parameters of an identifier, in source order.
///
/// Multi-valued: a key may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Parse an `application/x-www-form-urlencoded` query (without leading `?`).
    pub fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An identifier split into path and query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetIdentifier {
    /// The identifier as received.
    pub raw: String,
    /// Filesystem path (never contains query characters).
    pub path: String,
    /// `""` when there is no `?`, otherwise `"?" + rest`.
    pub query: String,
    pub params: QueryParams,
}

impl AssetIdentifier {
    /// Split `raw` on its first `?`. Total: any string is accepted.
    pub fn parse(raw: &str) -> Self {
        let (path, rest) = match raw.split_once('?') {
            Some((path, rest)) => (path, Some(rest)),
            None => (raw, None),
        };

        Self {
            raw: raw.to_string(),
            path: path.to_string(),
            query: rest.map(|q| format!("?{q}")).unwrap_or_default(),
            params: rest.map(QueryParams::parse).unwrap_or_default(),
        }
    }

    /// Lower-cased extension of `path` including the dot (`".jpg"`), or `""`.
    pub fn extension(&self) -> String {
        Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default()
    }

    /// File stem of `path`, used for naming outputs.
    pub fn stem(&self) -> &str {
        Path::new(&self.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("asset")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_query() {
        let id = AssetIdentifier::parse("/src/images/photo.jpg");
        assert_eq!(id.path, "/src/images/photo.jpg");
        assert_eq!(id.query, "");
        assert!(id.params.is_empty());
    }

    #[test]
    fn test_parse_with_query() {
        let id = AssetIdentifier::parse("f.jpg?w=600&h=400&format=webp&jsx");
        assert_eq!(id.path, "f.jpg");
        assert_eq!(id.query, "?w=600&h=400&format=webp&jsx");
        assert_eq!(id.params.get("w"), Some("600"));
        assert_eq!(id.params.get("jsx"), Some(""));
        assert!(id.params.has("jsx"));
        assert!(!id.params.has("quality"));
    }

    #[test]
    fn test_parse_splits_on_first_question_mark() {
        let id = AssetIdentifier::parse("a.svg?jsx?x=1");
        assert_eq!(id.path, "a.svg");
        assert_eq!(id.query, "?jsx?x=1");
        assert!(!id.path.contains('?'));
    }

    #[test]
    fn test_parse_empty_query() {
        let id = AssetIdentifier::parse("a.png?");
        assert_eq!(id.query, "?");
        assert!(id.params.is_empty());
    }

    #[test]
    fn test_params_multi_valued_and_decoded() {
        let id = AssetIdentifier::parse("a.png?w=100&w=200&alt=a+b%21");
        assert_eq!(id.params.get_all("w").collect::<Vec<_>>(), vec!["100", "200"]);
        assert_eq!(id.params.get("alt"), Some("a b!"));
    }

    #[test]
    fn test_extension_and_stem() {
        let id = AssetIdentifier::parse("/img/Logo.Dark.SVG?jsx");
        assert_eq!(id.extension(), ".svg");
        assert_eq!(id.stem(), "Logo.Dark");
        assert_eq!(AssetIdentifier::parse("README").extension(), "");
    }
}
