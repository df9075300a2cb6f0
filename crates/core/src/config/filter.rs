use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Wildcard markers accepted at the end of a `removeAttributes` pattern.
const WILDCARD_MARKERS: &[&str] = &["\\w+", "*"];

/// Filtering rules applied to a cloned selection before conversion.
///
/// Every section is optional: an absent key or a key holding the wrong JSON
/// type deserializes to an empty section, which disables that rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Tags whose whole subtree is removed
    #[serde(default, deserialize_with = "lenient")]
    pub remove_tags: Vec<String>,
    /// Attribute patterns, tested in order; exact names or prefix wildcards like `data-\w+`
    #[serde(default, deserialize_with = "lenient")]
    pub remove_attributes: Vec<String>,
    /// Per-tag attributes that survive `remove_attributes`
    #[serde(default, deserialize_with = "lenient")]
    pub keep_attributes_on_tags: BTreeMap<String, Vec<String>>,
    /// Class names whose elements are removed
    #[serde(default, deserialize_with = "lenient")]
    pub remove_elements_with_classes: Vec<String>,
    /// Ids whose first matching element is removed
    #[serde(default, deserialize_with = "lenient")]
    pub remove_elements_with_ids: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let remove_tags = [
            "script", "style", "link", "meta", "iframe", "noscript", "object", "embed", "button", "input", "textarea",
            "select", "option", "form", "video", "audio", "canvas", "map", "area", "track", "applet", "bgsound",
            "blink", "isindex", "keygen", "marquee", "menuitem", "nextid", "noembed", "param", "source",
        ];
        let remove_attributes = [
            "style",
            "onclick",
            "onload",
            "onerror",
            "onmouseover",
            "onmouseout",
            "onfocus",
            "onblur",
            "target",
            "contenteditable",
            "draggable",
            "tabindex",
        ];

        let mut keep_attributes_on_tags = BTreeMap::new();
        keep_attributes_on_tags.insert("img".to_string(), to_strings(&["src", "alt", "title"]));
        keep_attributes_on_tags.insert("a".to_string(), to_strings(&["href", "title"]));

        Self {
            remove_tags: to_strings(&remove_tags),
            remove_attributes: to_strings(&remove_attributes),
            keep_attributes_on_tags,
            remove_elements_with_classes: Vec::new(),
            remove_elements_with_ids: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// A config with every rule disabled.
    pub fn empty() -> Self {
        Self {
            remove_tags: Vec::new(),
            remove_attributes: Vec::new(),
            keep_attributes_on_tags: BTreeMap::new(),
            remove_elements_with_classes: Vec::new(),
            remove_elements_with_ids: Vec::new(),
        }
    }

    /// Whether `tag` is listed in `remove_tags` (case-insensitive).
    pub fn removes_tag(&self, tag: &str) -> bool {
        self.remove_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Attributes exempted from removal on `tag`; empty when the tag has no entry.
    pub fn kept_attributes(&self, tag: &str) -> &[String] {
        self.keep_attributes_on_tags
            .get(tag)
            .or_else(|| self.keep_attributes_on_tags.get(&tag.to_lowercase()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Compiled `remove_attributes` patterns, in declaration order.
    pub fn attribute_patterns(&self) -> Vec<AttributePattern> {
        self.remove_attributes.iter().map(|p| AttributePattern::parse(p)).collect()
    }

    /// Decides whether `attr` must be stripped from an element named `tag`.
    ///
    /// Exemptions from `keep_attributes_on_tags` win over any pattern match.
    pub fn should_remove_attribute(&self, tag: &str, attr: &str, patterns: &[AttributePattern]) -> bool {
        let lowered = attr.to_lowercase();
        if self.kept_attributes(tag).iter().any(|keep| *keep == lowered) {
            return false;
        }
        patterns.iter().any(|pattern| pattern.matches(attr))
    }
}

/// A single `removeAttributes` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributePattern {
    /// Matches one attribute name exactly
    Exact(String),
    /// Matches every attribute name starting with the prefix
    Prefix(String),
}

impl AttributePattern {
    /// Parse a pattern; a trailing `\w+` or `*` turns the rest into a prefix.
    pub fn parse(pattern: &str) -> Self {
        for marker in WILDCARD_MARKERS {
            if let Some(prefix) = pattern.strip_suffix(marker) {
                return AttributePattern::Prefix(prefix.to_string());
            }
        }
        AttributePattern::Exact(pattern.to_string())
    }

    pub fn matches(&self, attr: &str) -> bool {
        match self {
            AttributePattern::Exact(name) => attr == name,
            AttributePattern::Prefix(prefix) => attr.starts_with(prefix.as_str()),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Deserialize a section, degrading to its empty value when the JSON shape is wrong.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        tracing::warn!(%err, "ignoring malformed filter section");
        T::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = FilterConfig::default();
        assert_eq!(config.remove_tags.len(), 31);
        assert!(config.removes_tag("script"));
        assert!(config.removes_tag("IFRAME"));
        assert!(!config.removes_tag("p"));
        assert_eq!(config.kept_attributes("img"), ["src", "alt", "title"]);
        assert!(config.kept_attributes("div").is_empty());
    }

    #[rstest]
    #[case("style", "style", true)]
    #[case("style", "styles", false)]
    #[case("data-\\w+", "data-id", true)]
    #[case("data-\\w+", "aria-label", false)]
    #[case("aria-*", "aria-hidden", true)]
    #[case("on*", "onclick", true)]
    fn test_attribute_pattern(#[case] pattern: &str, #[case] attr: &str, #[case] expected: bool) {
        assert_eq!(AttributePattern::parse(pattern).matches(attr), expected);
    }

    #[test]
    fn test_keep_takes_precedence() {
        let config = FilterConfig {
            remove_attributes: vec!["title".to_string(), "href".to_string()],
            ..FilterConfig::default()
        };
        let patterns = config.attribute_patterns();

        assert!(!config.should_remove_attribute("a", "href", &patterns));
        assert!(!config.should_remove_attribute("a", "title", &patterns));
        assert!(config.should_remove_attribute("span", "title", &patterns));
    }

    #[test]
    fn test_malformed_section_is_no_rule() {
        let json = r#"{"removeTags": "script", "removeAttributes": ["style"], "keepAttributesOnTags": 3}"#;
        let config: FilterConfig = serde_json::from_str(json).unwrap();

        assert!(config.remove_tags.is_empty());
        assert_eq!(config.remove_attributes, vec!["style".to_string()]);
        assert!(config.keep_attributes_on_tags.is_empty());
        assert!(config.remove_elements_with_ids.is_empty());
    }

    #[test]
    fn test_serialized_keys() {
        let value = serde_json::to_value(FilterConfig::default()).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "removeTags",
            "removeAttributes",
            "keepAttributesOnTags",
            "removeElementsWithClasses",
            "removeElementsWithIds",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
    }
}
