//! Template resolution against a message tree.
//!
//! Three syntaxes, tried in this order:
//! 1. `{{path}}` - the whole string; yields the first match, type preserved.
//! 2. `{[path]}` - the whole string; yields a sequence of every match.
//! 3. `{path}` embedded anywhere - the first occurrence is replaced by the
//!    first match rendered as text.
//!
//! Zero matches is an error for forms 1 and 3 but an empty sequence for form 2.
//! Nothing is cached: every call parses its path again.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::path::JsonPath;
use crate::domain::AdapterError;

static VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{(.*)\}\}$").expect("valid regex"));
static ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\[(.*)\]\}$").expect("valid regex"));
static EMBEDDED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"));

/// A template string classified into one of the three syntaxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template<'a> {
    /// `{{path}}`
    Value(&'a str),
    /// `{[path]}`
    All(&'a str),
    /// `...{path}...`; `span` covers the braces.
    Embedded { path: &'a str, span: Range<usize> },
}

impl<'a> Template<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        if let Some(caps) = VALUE_RE.captures(s) {
            return caps.get(1).map(|m| Template::Value(m.as_str()));
        }
        if let Some(caps) = ARRAY_RE.captures(s) {
            return caps.get(1).map(|m| Template::All(m.as_str()));
        }
        let caps = EMBEDDED_RE.captures(s)?;
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        Some(Template::Embedded {
            path: inner.as_str(),
            span: whole.range(),
        })
    }
}

/// Resolve one template string against `message`.
pub fn resolve(message: &Value, template: &str) -> Result<Value, AdapterError> {
    let unresolved = || AdapterError::UnresolvedPath(template.to_string());

    match Template::parse(template).ok_or_else(unresolved)? {
        Template::Value(path) => {
            let path = JsonPath::parse(path)?;
            path.query(message)
                .into_iter()
                .next()
                .cloned()
                .ok_or_else(unresolved)
        }
        Template::All(path) => {
            let path = JsonPath::parse(path)?;
            Ok(Value::Array(path.query(message).into_iter().cloned().collect()))
        }
        Template::Embedded { path, span } => {
            let path = JsonPath::parse(path)?;
            let first = path.query(message).into_iter().next().ok_or_else(unresolved)?;

            let mut out = String::with_capacity(template.len());
            out.push_str(&template[..span.start]);
            out.push_str(&as_text(first));
            out.push_str(&template[span.end..]);
            Ok(Value::String(out))
        }
    }
}

/// Walk a config tree and resolve every text leaf.
///
/// Sequences keep their order, mappings keep their keys, and every other
/// value passes through untouched.
pub fn resolve_config_object(message: &Value, config: Value) -> Result<Value, AdapterError> {
    match config {
        Value::String(s) => resolve(message, &s),
        Value::Array(items) => items
            .into_iter()
            .map(|item| resolve_config_object(message, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                let resolved = resolve_config_object(message, value)?;
                out.insert(key, resolved);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
