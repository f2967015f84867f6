//! Identifier namespacing and reference rewriting
//!
//! Renaming happens in two passes over the tree: [`collect_id_map`] records
//! every `old -> new` pair without touching anything, then [`rewrite_ids`]
//! renames declarations and rewrites `url(#id)` and exact `#id` references.
//! References that appear before their target in document order are
//! therefore handled the same as ones that appear after it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::document::Element;

static URL_REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"url\(#([^)]+)\)").unwrap());

/// Prefix used when a file name has nothing left after sanitizing
const FALLBACK_PREFIX: &str = "svg";

/// Mapping from original `id` values to their prefixed replacements
pub type IdMap = HashMap<String, String>;

/// File-specific identifier prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPrefix(String);

impl IdPrefix {
    /// Sanitize a file stem: anything outside `[A-Za-z0-9_-]` becomes `_`
    pub fn from_file_stem(stem: &str) -> Self {
        let sanitized: String = stem
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if sanitized.is_empty() {
            Self(FALLBACK_PREFIX.to_string())
        } else {
            Self(sanitized)
        }
    }

    /// Prefix for the file at `path`, from its name without extension
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        Self::from_file_stem(&stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<prefix>_<id>`
    pub fn apply(&self, id: &str) -> String {
        format!("{}_{}", self.0, id)
    }

    /// Whether `id` already carries this prefix from an earlier run
    pub fn is_applied(&self, id: &str) -> bool {
        id.strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First pass: map every element `id` that still needs the prefix
///
/// An id whose prefixed form is already declared in the document keeps its
/// original name, so no two elements end up sharing an id.
pub fn collect_id_map(root: &Element, prefix: &IdPrefix) -> IdMap {
    let mut declared = HashSet::new();
    root.walk(&mut |elem| {
        if let Some(id) = elem.attr("id") {
            declared.insert(id.to_string());
        }
    });

    let mut map = IdMap::new();
    for id in &declared {
        if id.is_empty() || prefix.is_applied(id) {
            continue;
        }
        let new_id = prefix.apply(id);
        if declared.contains(&new_id) {
            debug!(id = %id, taken = %new_id, "prefixed id already declared, keeping original");
            continue;
        }
        map.insert(id.clone(), new_id);
    }
    map
}

/// Second pass: rename `id` declarations and rewrite references
///
/// Returns the number of `id` attributes renamed.
pub fn rewrite_ids(root: &mut Element, map: &IdMap) -> usize {
    if map.is_empty() {
        return 0;
    }

    let mut renamed = 0;
    root.walk_mut(&mut |elem| {
        for attr in elem.attributes_mut() {
            if attr.name == "id" {
                if let Some(new_id) = map.get(&attr.value) {
                    attr.value = new_id.clone();
                    renamed += 1;
                }
            } else if let Some(rewritten) = rewrite_reference(&attr.value, map) {
                attr.value = rewritten;
            }
        }
    });
    renamed
}

/// Rewrite `url(#id)` occurrences and an exact `#id` value
///
/// Returns `None` when the value is unchanged.
pub fn rewrite_reference(value: &str, map: &IdMap) -> Option<String> {
    let mut rewritten = URL_REFERENCE
        .replace_all(value, |caps: &Captures<'_>| match map.get(&caps[1]) {
            Some(new_id) => format!("url(#{})", new_id),
            None => caps[0].to_string(),
        })
        .into_owned();

    if let Some(target) = rewritten.strip_prefix('#') {
        if let Some(new_id) = map.get(target) {
            rewritten = format!("#{}", new_id);
        }
    }

    (rewritten != value).then_some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(pairs: &[(&str, &str)]) -> IdMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prefix_from_file_stem() {
        assert_eq!(IdPrefix::from_file_stem("arrow-left").as_str(), "arrow-left");
        assert_eq!(IdPrefix::from_file_stem("my icon.v2").as_str(), "my_icon_v2");
        assert_eq!(IdPrefix::from_file_stem("caf\u{e9}").as_str(), "caf_");
        assert_eq!(IdPrefix::from_file_stem("").as_str(), "svg");
    }

    #[test]
    fn test_prefix_from_path() {
        let prefix = IdPrefix::from_path(Path::new("icons/Home Icon.SVG"));
        assert_eq!(prefix.as_str(), "Home_Icon");
    }

    #[test]
    fn test_is_applied_requires_separator() {
        let prefix = IdPrefix::from_file_stem("icon");
        assert!(prefix.is_applied("icon_grad"));
        assert!(!prefix.is_applied("iconic"));
        assert!(!prefix.is_applied("grad"));
    }

    #[test]
    fn test_rewrite_url_reference() {
        let map = map_of(&[("grad", "icon_grad")]);
        assert_eq!(
            rewrite_reference("url(#grad)", &map).as_deref(),
            Some("url(#icon_grad)")
        );
        assert_eq!(
            rewrite_reference("fill:url(#grad);stroke:url(#other)", &map).as_deref(),
            Some("fill:url(#icon_grad);stroke:url(#other)")
        );
        assert_eq!(rewrite_reference("url(#other)", &map), None);
    }

    #[test]
    fn test_rewrite_exact_fragment_only() {
        let map = map_of(&[("x", "icon_x")]);
        assert_eq!(rewrite_reference("#x", &map).as_deref(), Some("#icon_x"));
        assert_eq!(rewrite_reference("seeAlso#x", &map), None);
        assert_eq!(rewrite_reference("#x y", &map), None);
        assert_eq!(rewrite_reference("#y", &map), None);
    }

    #[test]
    fn test_collect_skips_already_prefixed() {
        let root = Element::new("svg")
            .with_child(Element::new("linearGradient").with_attr("id", "icon_grad"))
            .with_child(Element::new("clipPath").with_attr("id", "clip"));
        let map = collect_id_map(&root, &IdPrefix::from_file_stem("icon"));
        assert_eq!(map, map_of(&[("clip", "icon_clip")]));
    }

    #[test]
    fn test_collect_never_renames_onto_declared_id() {
        let mut root = Element::new("svg")
            .with_child(Element::new("g").with_attr("id", "x"))
            .with_child(Element::new("g").with_attr("id", "icon_x"))
            .with_child(Element::new("use").with_attr("href", "#x"));
        let map = collect_id_map(&root, &IdPrefix::from_file_stem("icon"));
        assert!(map.is_empty());

        assert_eq!(rewrite_ids(&mut root, &map), 0);
        let ids: Vec<Option<&str>> = root.child_elements().map(|e| e.attr("id")).collect();
        assert_eq!(ids, vec![Some("x"), Some("icon_x"), None]);
        let refs: Vec<Option<&str>> = root.child_elements().map(|e| e.attr("href")).collect();
        assert_eq!(refs[2], Some("#x"));
    }

    #[test]
    fn test_rewrite_handles_reference_before_declaration() {
        let mut root = Element::new("svg")
            .with_child(Element::new("use").with_attr("href", "#shape"))
            .with_child(Element::new("path").with_attr("id", "shape"));
        let map = collect_id_map(&root, &IdPrefix::from_file_stem("star"));
        let renamed = rewrite_ids(&mut root, &map);

        assert_eq!(renamed, 1);
        let children: Vec<&Element> = root.child_elements().collect();
        assert_eq!(children[0].attr("href"), Some("#star_shape"));
        assert_eq!(children[1].attr("id"), Some("star_shape"));
    }
}
