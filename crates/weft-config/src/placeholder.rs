//! Mustache-style placeholder expansion.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::AttrValue;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("valid regex"));

/// Expand `{{name}}` tokens against resolved attributes.
///
/// Unknown names are left verbatim and reported back, not erased: callers
/// turn them into warnings, since literal `{{…}}` text can legitimately
/// pass through from the document.
pub fn expand_placeholders(
    input: &str,
    resolved: &IndexMap<String, AttrValue>,
) -> (String, Vec<String>) {
    let mut unknown = Vec::new();
    let expanded = PLACEHOLDER
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match resolved.get(name) {
                Some(value) => value.render(),
                None => {
                    unknown.push(name.to_string());
                    caps[0].to_string()
                }
            }
        })
        .into_owned();
    (expanded, unknown)
}

/// True if the string contains any placeholder token.
pub fn has_placeholders(input: &str) -> bool {
    PLACEHOLDER.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved() -> IndexMap<String, AttrValue> {
        let mut map = IndexMap::new();
        map.insert("lang".to_string(), AttrValue::from("de"));
        map.insert("toc".to_string(), AttrValue::Bool(false));
        map.insert("toc-depth".to_string(), AttrValue::Number(3.0));
        map
    }

    #[test]
    fn expands_known_names() {
        let (out, unknown) =
            expand_placeholders("lang={{lang}} depth={{ toc-depth }}", &resolved());
        assert_eq!(out, "lang=de depth=3");
        assert!(unknown.is_empty());
    }

    #[test]
    fn false_bool_renders_empty() {
        let (out, _) = expand_placeholders("[{{toc}}]", &resolved());
        assert_eq!(out, "[]");
    }

    #[test]
    fn unknown_names_stay_verbatim() {
        let (out, unknown) = expand_placeholders("{{missing}} {{lang}}", &resolved());
        assert_eq!(out, "{{missing}} de");
        assert_eq!(unknown, vec!["missing".to_string()]);
    }

    #[test]
    fn detection() {
        assert!(has_placeholders("a {{b}} c"));
        assert!(!has_placeholders("plain text"));
    }
}
