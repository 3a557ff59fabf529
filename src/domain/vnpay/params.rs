//! Canonical gateway parameter mapping.
//!
//! The gateway signs (and expects us to re-sign) a canonical query string:
//! empty values dropped, keys in ascending byte order, values form-encoded
//! with `+` for space. Ordering and encoding must match the gateway's
//! reference bit-for-bit or legitimate requests fail verification, so the
//! rule lives here in one place instead of being a convention each call
//! site repeats.

use std::collections::BTreeMap;

/// An ordered key/value parameter mapping with the canonicalization rule
/// built in.
///
/// `insert` silently drops empty values (they are never part of the signed
/// payload), and the backing `BTreeMap` keeps keys in ascending byte order
/// so serialization is deterministic regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSet {
    entries: BTreeMap<String, String>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from decoded query pairs, e.g. an inbound callback.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut set = Self::new();
        for (k, v) in pairs {
            set.insert(k, v);
        }
        set
    }

    /// Adds a parameter. Empty values are dropped, matching the rule that
    /// absent and empty parameters are never signed.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.entries.insert(key.into(), value);
    }

    /// Removes a parameter, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Keeps only keys carrying the given prefix. Callback payloads may
    /// include unrelated query noise; only gateway-prefixed fields are part
    /// of the signed payload.
    pub fn retain_prefixed(&mut self, prefix: &str) {
        self.entries.retain(|k, _| k.starts_with(prefix));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Serializes to the canonical query string: `key=encodedValue` pairs
    /// joined by `&`, keys ascending, no leading or trailing separator.
    pub fn canonical_query(&self) -> String {
        let mut query = String::new();
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                query.push('&');
            }
            query.push_str(key);
            query.push('=');
            query.push_str(&form_encode(value));
        }
        query
    }
}

/// Form-style percent encoding: space becomes `+`, reserved bytes become
/// uppercase `%XX` escapes. The gateway's safe set is `A-Za-z0-9_.-~`,
/// which differs from `form_urlencoded` on exactly two bytes: `*` must be
/// escaped and `~` must not.
fn form_encode(value: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    encoded.replace('*', "%2A").replace("%7E", "~")
}
