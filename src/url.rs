//! Literal, bookmarkable URLs built from a URL template and a model.
//!
//! Placeholders take the form `{name}` and are replaced by the model entry of
//! the same name. Entries not consumed by a placeholder are appended as query
//! parameters.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::{value_to_string, Model};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

/// Errors that can occur while building a URL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    /// A placeholder names a variable the model does not hold
    #[error("Unable to find URL template variable '{name}' in source model")]
    MissingTemplateVariable { name: String },

    /// A context relative URL points at another origin
    #[error("URL '{url}' leaves the application")]
    ExternalTarget { url: String },
}

/// Whether `url` names another origin: it carries a scheme (`https:`,
/// `javascript:`) or is protocol relative (`//host`, `/\host`).
pub fn is_external_url(url: &str) -> bool {
    let url = url.trim_start();
    if url.starts_with("//") || url.starts_with("/\\") || url.starts_with('\\') {
        return true;
    }
    let end = url.find(['/', '?', '#']).unwrap_or(url.len());
    let Some((scheme, _)) = url[..end].split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// How substituted values and query parameters are written into the URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlEncoding {
    /// Values are inserted as their string form, unescaped.
    #[default]
    None,
    /// Values and query names are percent-encoded.
    Percent,
}

impl UrlEncoding {
    fn apply(self, text: &str) -> String {
        match self {
            UrlEncoding::None => text.to_string(),
            UrlEncoding::Percent => urlencoding::encode(text).into_owned(),
        }
    }
}

/// Stateless builder, safe to share between requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookmarkableUrlBuilder {
    encoding: UrlEncoding,
}

impl BookmarkableUrlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(encoding: UrlEncoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> UrlEncoding {
        self.encoding
    }

    /// Build a literal URL.
    ///
    /// # Arguments
    /// * `template` - URL template, e.g. `/hotels/{id}`
    /// * `model` - values for placeholders; leftovers become query parameters
    /// * `context_path` - prefix for context relative URLs
    /// * `context_relative` - whether `/`-rooted URLs get `context_path`
    ///
    /// # Errors
    /// Returns `UrlError::MissingTemplateVariable` when a placeholder has no
    /// model entry.
    pub fn build(
        &self,
        template: &str,
        model: Option<&Model>,
        context_path: &str,
        context_relative: bool,
    ) -> Result<String, UrlError> {
        let mut used: HashSet<&str> = HashSet::new();
        let mut url = String::with_capacity(template.len());
        let mut last = 0;

        for captures in PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let name = name.as_str();
            let Some((key, value)) = model.and_then(|m| m.get_key_value(name)) else {
                return Err(UrlError::MissingTemplateVariable {
                    name: name.to_string(),
                });
            };
            url.push_str(&template[last..whole.start()]);
            url.push_str(&self.encoding.apply(&value_to_string(value)));
            used.insert(key.as_str());
            last = whole.end();
        }
        url.push_str(&template[last..]);

        if let Some(model) = model {
            let mut separator = if url.contains('?') { '&' } else { '?' };
            for (name, value) in model {
                if used.contains(name.as_str()) {
                    continue;
                }
                for item in query_values(value) {
                    url.push(separator);
                    url.push_str(&self.encoding.apply(name));
                    url.push('=');
                    url.push_str(&self.encoding.apply(&item));
                    separator = '&';
                }
            }
        }

        if context_relative && url.starts_with('/') {
            url.insert_str(0, context_path);
        }

        tracing::trace!(template = %template, url = %url, "Built bookmarkable URL");
        Ok(url)
    }
}

/// Arrays expand to one query parameter per element.
fn query_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(value_to_string).collect(),
        other => vec![value_to_string(other)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(entries: &[(&str, Value)]) -> Model {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_substitutes_all_placeholders() {
        let m = model(&[("cd", json!("CD")), ("gh", json!("GH"))]);
        let url = BookmarkableUrlBuilder::new()
            .build("/ab/{cd}/ef/{gh}", Some(&m), "/context", false)
            .unwrap();
        assert_eq!(url, "/ab/CD/ef/GH");
    }

    #[test]
    fn test_leftover_entries_become_query_parameters() {
        let m = model(&[("cd", json!("CD")), ("gh", json!("GH"))]);
        let url = BookmarkableUrlBuilder::new()
            .build("/ab/{cd}", Some(&m), "/context", false)
            .unwrap();
        assert_eq!(url, "/ab/CD?gh=GH");
    }

    #[test]
    fn test_query_parameters_follow_model_order() {
        let m = model(&[("z", json!(1)), ("a", json!(2)), ("m", json!("x"))]);
        let url = BookmarkableUrlBuilder::new()
            .build("/list", Some(&m), "", false)
            .unwrap();
        assert_eq!(url, "/list?z=1&a=2&m=x");
    }

    #[test]
    fn test_existing_query_is_extended() {
        let m = model(&[("page", json!(2))]);
        let url = BookmarkableUrlBuilder::new()
            .build("/search?q=x", Some(&m), "", false)
            .unwrap();
        assert_eq!(url, "/search?q=x&page=2");
    }

    #[test]
    fn test_array_values_repeat_parameter() {
        let m = model(&[("tag", json!(["a", "b"]))]);
        let url = BookmarkableUrlBuilder::new()
            .build("/t", Some(&m), "", false)
            .unwrap();
        assert_eq!(url, "/t?tag=a&tag=b");
    }

    #[test]
    fn test_missing_variable_fails() {
        let m = model(&[("cd", json!("CD"))]);
        let err = BookmarkableUrlBuilder::new()
            .build("/ab/{cd}/{missing}", Some(&m), "", false)
            .unwrap_err();
        assert_eq!(
            err,
            UrlError::MissingTemplateVariable {
                name: "missing".to_string()
            }
        );
        assert!(err.to_string().contains("'missing'"));
    }

    #[test]
    fn test_placeholder_without_model_fails() {
        let err = BookmarkableUrlBuilder::new()
            .build("/ab/{cd}", None, "", false)
            .unwrap_err();
        assert!(matches!(err, UrlError::MissingTemplateVariable { name } if name == "cd"));
    }

    #[test]
    fn test_variable_names_are_case_sensitive() {
        let m = model(&[("CD", json!("x"))]);
        let result = BookmarkableUrlBuilder::new().build("/ab/{cd}", Some(&m), "", false);
        assert!(result.is_err());
    }

    #[test]
    fn test_context_relative_prefixes_rooted_paths() {
        let url = BookmarkableUrlBuilder::new()
            .build("/ab", Some(&Model::new()), "/context", true)
            .unwrap();
        assert_eq!(url, "/context/ab");
    }

    #[test]
    fn test_relative_paths_are_never_prefixed() {
        let url = BookmarkableUrlBuilder::new()
            .build("ab", Some(&Model::new()), "/context", true)
            .unwrap();
        assert_eq!(url, "ab");
    }

    #[test]
    fn test_no_context_prefix_when_not_context_relative() {
        let url = BookmarkableUrlBuilder::new()
            .build("/ab", None, "/context", false)
            .unwrap();
        assert_eq!(url, "/ab");
    }

    #[test]
    fn test_values_are_unescaped_by_default() {
        let m = model(&[("q", json!("a b&c")), ("p", json!("x/y"))]);
        let url = BookmarkableUrlBuilder::new()
            .build("/find/{p}", Some(&m), "", false)
            .unwrap();
        assert_eq!(url, "/find/x/y?q=a b&c");
    }

    #[test]
    fn test_percent_encoding_option() {
        let m = model(&[("q", json!("a b&c")), ("p", json!("x/y"))]);
        let builder = BookmarkableUrlBuilder::with_encoding(UrlEncoding::Percent);
        let url = builder.build("/find/{p}", Some(&m), "", false).unwrap();
        assert_eq!(url, "/find/x%2Fy?q=a%20b%26c");
    }

    #[test]
    fn test_external_url_detection() {
        for url in [
            "https://evil.example/phish",
            "//evil.example/x",
            "/\\evil.example",
            "javascript:alert(1)",
            "  HTTP://evil.example",
        ] {
            assert!(is_external_url(url), "{url} should be external");
        }
        for url in ["/hotels/{id}", "hotels/list", "/search?next=https://x", "/a:b", ""] {
            assert!(!is_external_url(url), "{url} should stay local");
        }
    }
}
