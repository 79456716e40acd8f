//! JSON merge-patch over option values
//!
//! Implements the RFC 7386 semantics multiple components rely on, precisely:
//! an explicit `null` deletes the key, a nested object deep-merges
//! recursively, and every other value replaces. A key absent from the patch
//! is a no-op. Patching an object onto an existing non-object value is a
//! no-op for that key.

use serde_json::{Map, Value};

/// Applies a single key-value patch onto `to`.
pub fn patch(to: &mut Map<String, Value>, key: &str, value: &Value) {
    if value.is_null() {
        to.remove(key);
        return;
    }

    if let Value::Object(nested) = value {
        // a missing or null target becomes a fresh object; any other
        // non-object target stops the patch for this key
        match to.get(key) {
            None | Some(Value::Null) => {
                to.insert(key.to_string(), Value::Object(Map::new()));
            }
            Some(Value::Object(_)) => {}
            Some(_) => return,
        }
        let target = match to.get_mut(key) {
            Some(Value::Object(target)) => target,
            _ => unreachable!("target was just ensured to be an object"),
        };
        for (k, v) in nested {
            patch(target, k, v);
        }
        return;
    }

    to.insert(key.to_string(), value.clone());
}

/// Merges `from` into `to`, deeply, using [`patch`] per key. Non-object
/// inputs leave `to` untouched.
pub fn merge(to: &mut Value, from: &Value) {
    let (to, from) = match (to, from) {
        (Value::Object(to), Value::Object(from)) => (to, from),
        _ => return,
    };

    for (k, v) in from {
        patch(to, k, v);
    }
}
