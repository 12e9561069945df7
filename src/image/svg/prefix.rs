//! Id and class-name prefixing.
//!
//! Keeps ids unique when several inline SVGs share one page. References are
//! rewritten along with the ids they point at: `href="#a"`, `xlink:href="#a"`
//! and `url(#a)` inside any attribute value.

use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

use super::tree::Document;
use crate::config::PrefixIdsParams;

static URL_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(['"]?)#([^'")\s]+)(['"]?)\s*\)"#).expect("valid url() regex")
});

/// Resolved prefixing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixIds {
    /// Full prefix including the delimiter.
    prefix: String,
    ids: bool,
    class_names: bool,
}

impl PrefixIds {
    /// Resolve params against the asset path. Without an explicit prefix the
    /// file name is used, with `.` and spaces replaced by `_`.
    pub fn new(params: &PrefixIdsParams, path: &str) -> Self {
        let base = params.prefix.clone().unwrap_or_else(|| {
            Path::new(path)
                .file_name()
                .map(|name| escape_identifier(&name.to_string_lossy()))
                .unwrap_or_else(|| "prefix".to_string())
        });
        Self {
            prefix: format!("{base}{}", params.delim),
            ids: params.prefix_ids,
            class_names: params.prefix_class_names,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn apply(&self, doc: &mut Document) {
        doc.root.walk_mut(&mut |el| {
            for (name, value) in el.attributes.iter_mut() {
                let rewritten = match name {
                    "id" if self.ids => self.prefixed(value),
                    "class" if self.class_names => Some(
                        value
                            .split_whitespace()
                            .map(|class| self.prefixed(class).unwrap_or_else(|| class.to_string()))
                            .collect::<Vec<_>>()
                            .join(" "),
                    ),
                    "href" | "xlink:href" if self.ids => value
                        .strip_prefix('#')
                        .and_then(|id| self.prefixed(id))
                        .map(|id| format!("#{id}")),
                    _ if self.ids && value.contains("url(") => Some(self.rewrite_urls(value)),
                    _ => None,
                };
                if let Some(rewritten) = rewritten {
                    *value = rewritten;
                }
            }
        });
    }

    /// `None` when already prefixed or empty.
    fn prefixed(&self, ident: &str) -> Option<String> {
        if ident.is_empty() || ident.starts_with(&self.prefix) {
            return None;
        }
        Some(format!("{}{ident}", self.prefix))
    }

    fn rewrite_urls(&self, value: &str) -> String {
        URL_REFERENCE
            .replace_all(value, |caps: &Captures| {
                let id = &caps[2];
                let id = self.prefixed(id).unwrap_or_else(|| id.to_string());
                format!("url({}#{id}{})", &caps[1], &caps[3])
            })
            .into_owned()
    }
}

fn escape_identifier(name: &str) -> String {
    name.replace(['.', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix_ids(path: &str) -> PrefixIds {
        PrefixIds::new(&PrefixIdsParams::default(), path)
    }

    fn run(prefix: &PrefixIds, source: &str) -> String {
        let mut doc = Document::parse(source).unwrap();
        prefix.apply(&mut doc);
        doc.to_markup().unwrap()
    }

    #[test]
    fn test_prefix_from_file_name() {
        assert_eq!(prefix_ids("/src/icons/my logo.svg").prefix(), "my_logo_svg__");
        assert_eq!(prefix_ids("").prefix(), "prefix__");
    }

    #[test]
    fn test_explicit_prefix_and_delim() {
        let params = PrefixIdsParams {
            prefix: Some("brand".to_string()),
            delim: "-".to_string(),
            ..PrefixIdsParams::default()
        };
        assert_eq!(PrefixIds::new(&params, "/a.svg").prefix(), "brand-");
    }

    #[test]
    fn test_rewrites_ids_and_references() {
        let out = run(
            &prefix_ids("a.svg"),
            r##"<svg><defs><linearGradient id="g"/></defs><rect fill="url(#g)" class="x y"/><use href="#g"/><use xlink:href="#g"/></svg>"##,
        );
        assert_eq!(
            out,
            r##"<svg><defs><linearGradient id="a_svg__g"/></defs><rect fill="url(#a_svg__g)" class="a_svg__x a_svg__y"/><use href="#a_svg__g"/><use xlink:href="#a_svg__g"/></svg>"##
        );
    }

    #[test]
    fn test_idempotent() {
        let prefix = prefix_ids("a.svg");
        let once = run(&prefix, r##"<svg><path id="p" style="fill:url('#p')"/></svg>"##);
        assert_eq!(run(&prefix, &once), once);
        assert!(once.contains("url('#a_svg__p')"));
    }

    #[test]
    fn test_class_names_only() {
        let params = PrefixIdsParams {
            prefix_ids: false,
            ..PrefixIdsParams::default()
        };
        let out = run(&PrefixIds::new(&params, "b.svg"), r#"<svg><g id="k" class="c"/></svg>"#);
        assert_eq!(out, r#"<svg><g id="k" class="b_svg__c"/></svg>"#);
    }
}
