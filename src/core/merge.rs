//! Merging of the `common` block under an instance block.
//!
//! [`merge`] is a pure function: it never mutates its inputs. The instance
//! wins key by key. When both sides hold a mapping under the same key the
//! two mappings are overlaid one level deep; anything below that level is
//! taken from the instance as a whole.

use serde_yaml::{Mapping, Value};

/// Overlay `instance` on `common`.
///
/// Key order: `common`'s keys in their original order, then keys that only
/// the instance defines.
pub fn merge(common: &Mapping, instance: &Mapping) -> Mapping {
    let mut merged = Mapping::new();

    for (key, base) in common {
        let value = match (base, instance.get(key)) {
            (Value::Mapping(base), Some(Value::Mapping(over))) => Value::Mapping(overlay(base, over)),
            (_, Some(over)) => over.clone(),
            (base, None) => base.clone(),
        };
        merged.insert(key.clone(), value);
    }

    for (key, value) in instance {
        if !common.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }

    merged
}

/// Shallow overlay: every key of `over` replaces the same key in `base`.
fn overlay(base: &Mapping, over: &Mapping) -> Mapping {
    let mut out = base.clone();
    for (key, value) in over {
        out.insert(key.clone(), value.clone());
    }
    out
}
