//! URL string helpers: separator normalisation and `{placeholder}` filling.
//!
//! These are the pure pieces of URL composition; walking the ancestor chain
//! lives with the tree in [`book`](crate::book). Placeholder substitution is
//! a scan-replace-resume loop rather than a single pass — each replacement
//! shifts later byte positions, and the scan must continue from the updated
//! string.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::types::DataMap;

/// `\{(\w*)\}`
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w*)\}").expect("invalid placeholder regex"));

/// `/{2,}`
static SEPARATOR_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("invalid separator regex"));

/// Collapse every run of consecutive separators into a single `/`.
///
/// Applied while concatenating ancestor fragments, so chapters may carry
/// leading and trailing slashes freely.
pub(crate) fn collapse_separators(url: &str) -> String {
    SEPARATOR_RUN_RE.replace_all(url, "/").into_owned()
}

/// Collapse the first doubled separator, once.
///
/// Request-time normalisation: after the route fragment is appended (and
/// placeholders filled), at most one junction double remains.
pub(crate) fn collapse_once(url: &str) -> String {
    url.replacen("//", "/", 1)
}

/// Strip exactly one trailing separator, normalising collection URLs.
pub(crate) fn trim_trailing_separator(mut url: String) -> String {
    if url.ends_with('/') {
        url.pop();
    }
    url
}

/// Replace every `{name}` token with the matching field from `data`.
///
/// A missing or null field becomes the empty string, never a literal
/// `{name}` left in the URL. String values are inserted bare; any other
/// value is inserted as its JSON text. The scan resumes after each inserted
/// value, so a value containing braces is never re-matched.
pub(crate) fn fill_placeholders(url: &str, data: &DataMap) -> String {
    let mut out = url.to_string();
    let mut cursor = 0;
    while let Some(found) = PLACEHOLDER_RE.captures(&out[cursor..]) {
        let token = found.get(0).expect("regex match has a whole-match group");
        let value = token_value(data.get(&found[1]));
        let start = cursor + token.start();
        let end = cursor + token.end();
        out.replace_range(start..end, &value);
        cursor = start + value.len();
    }
    out
}

fn token_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// --- tests -------------------------------------------------------------------
