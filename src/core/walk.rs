//! Traversal of string fields in YAML trees.
//!
//! Visits every string value held under a mapping key, recursing through
//! nested mappings and sequences. Paths use `a.b[0].c` notation.

use serde_yaml::{Mapping, Value};

use crate::core::types::FieldPath;
use crate::error::Result;

/// A string field found in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringField<'a> {
    /// Key the value sits under (last path segment).
    pub key: String,
    /// Full dotted path.
    pub path: FieldPath,
    pub value: &'a str,
}

/// Collect every string field under `mapping`, in document order.
pub fn string_fields(mapping: &Mapping) -> Vec<StringField<'_>> {
    let mut out = Vec::new();
    collect_mapping(mapping, "", &mut out);
    out
}

fn collect_mapping<'a>(mapping: &'a Mapping, parent: &str, out: &mut Vec<StringField<'a>>) {
    for (key, value) in mapping {
        let Some(name) = key_name(key) else { continue };
        let path = join_path(parent, &name);
        match value {
            Value::String(s) => out.push(StringField {
                key: name,
                path,
                value: s,
            }),
            Value::Mapping(child) => collect_mapping(child, &path, out),
            Value::Sequence(items) => collect_sequence(items, &path, out),
            _ => {}
        }
    }
}

fn collect_sequence<'a>(items: &'a [Value], parent: &str, out: &mut Vec<StringField<'a>>) {
    for (i, item) in items.iter().enumerate() {
        let path = format!("{}[{}]", parent, i);
        match item {
            Value::Mapping(child) => collect_mapping(child, &path, out),
            Value::Sequence(nested) => collect_sequence(nested, &path, out),
            _ => {}
        }
    }
}

/// Callback for [`visit_strings_mut`]: `(key, path, value)`.
pub type VisitMut<'f> = dyn FnMut(&str, &str, &mut String) -> Result<()> + 'f;

/// Visit every string field under `mapping` mutably, stopping at the first error.
pub fn visit_strings_mut(mapping: &mut Mapping, visit: &mut VisitMut<'_>) -> Result<()> {
    visit_mapping_mut(mapping, "", visit)
}

fn visit_mapping_mut(mapping: &mut Mapping, parent: &str, visit: &mut VisitMut<'_>) -> Result<()> {
    for (key, value) in mapping.iter_mut() {
        let Some(name) = key_name(key) else { continue };
        let path = join_path(parent, &name);
        match value {
            Value::String(s) => visit(&name, &path, s)?,
            Value::Mapping(child) => visit_mapping_mut(child, &path, visit)?,
            Value::Sequence(items) => visit_sequence_mut(items, &path, visit)?,
            _ => {}
        }
    }
    Ok(())
}

fn visit_sequence_mut(items: &mut [Value], parent: &str, visit: &mut VisitMut<'_>) -> Result<()> {
    for (i, item) in items.iter_mut().enumerate() {
        let path = format!("{}[{}]", parent, i);
        match item {
            Value::Mapping(child) => visit_mapping_mut(child, &path, visit)?,
            Value::Sequence(nested) => visit_sequence_mut(nested, &path, visit)?,
            _ => {}
        }
    }
    Ok(())
}

/// Display name of a mapping key; `None` for keys that are not scalars.
pub(crate) fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Dotted path of `name` under `parent`.
pub(crate) fn join_path(parent: &str, name: &str) -> FieldPath {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}
