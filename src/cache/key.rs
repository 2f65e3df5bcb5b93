//! Cache Key Module
//!
//! Derives stable cache keys from a function label and its arguments, or
//! from an explicit `cache_key` carried by the first argument.

use std::fmt::Write;

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Deepest nesting level that contributes to a fingerprint.
pub const MAX_KEY_DEPTH: usize = 8;

/// Field on the first argument that pins the cache key.
pub const EXPLICIT_KEY_FIELD: &str = "cache_key";

// == Key Generator ==
/// Computes cache keys for wrapped function calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyGenerator {
    /// Re-hash explicit keys instead of using them verbatim
    hash_explicit: bool,
}

impl KeyGenerator {
    /// Creates a key generator.
    pub fn new(hash_explicit: bool) -> Self {
        Self { hash_explicit }
    }

    /// Computes the key for one call.
    ///
    /// The explicit key on the unfiltered first argument wins; otherwise the
    /// positions in `skip` are dropped and the rest feed [`derive_key`].
    pub fn key_for(&self, name: &str, args: &[Value], skip: &[usize]) -> String {
        if let Some(key) = args.first().and_then(|first| self.explicit_key(first)) {
            return key;
        }

        let key_args: Vec<&Value> = args
            .iter()
            .enumerate()
            .filter(|(i, _)| !skip.contains(i))
            .map(|(_, arg)| arg)
            .collect();

        derive_key_from(name, &key_args)
    }

    /// Returns the caller-pinned key, if the value carries one.
    ///
    /// Null, `false`, zero and empty strings do not count as a key.
    pub fn explicit_key(&self, first: &Value) -> Option<String> {
        let pinned = first.get(EXPLICIT_KEY_FIELD)?;
        let raw = match pinned {
            Value::Null | Value::Bool(false) => return None,
            Value::Number(n) if n.as_f64() == Some(0.0) => return None,
            Value::String(s) if s.is_empty() => return None,
            Value::String(s) => s.clone(),
            other => fingerprint(other),
        };

        if self.hash_explicit {
            Some(sha256_hex(&raw))
        } else {
            Some(raw)
        }
    }
}

// == Derive Key ==
/// Derives a key from a function label and its (already filtered) arguments.
pub fn derive_key(name: &str, args: &[Value]) -> String {
    let refs: Vec<&Value> = args.iter().collect();
    derive_key_from(name, &refs)
}

fn derive_key_from(name: &str, args: &[&Value]) -> String {
    // Shape of {"a": [...], "f": name}: root at depth 0, the list at 1
    let mut out = String::from("{\"a\":[");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_fingerprint(arg, 2, &mut out);
    }
    out.push_str("],\"f\":");
    write_fingerprint(&Value::String(name.to_string()), 1, &mut out);
    out.push('}');

    sha256_hex(&out)
}

// == Fingerprint ==
/// Renders a bounded-depth structural fingerprint of a value.
///
/// Object fields are visited in sorted order; anything nested deeper than
/// [`MAX_KEY_DEPTH`] renders as nothing.
pub fn fingerprint(value: &Value) -> String {
    let mut out = String::new();
    write_fingerprint(value, 0, &mut out);
    out
}

fn write_fingerprint(value: &Value, depth: usize, out: &mut String) {
    if depth > MAX_KEY_DEPTH {
        return;
    }

    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_fingerprint(item, depth + 1, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}:", Value::String(name.clone()));
                write_fingerprint(field, depth + 1, out);
            }
            out.push('}');
        }
        scalar => {
            let _ = write!(out, "{}", scalar);
        }
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
