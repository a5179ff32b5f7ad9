//! # Ordered NVP Parameter Sets
//!
//! [`NvpParams`] is the request body before form encoding. Field order is
//! preserved as inserted, and inserting a key that is already present
//! replaces its value without moving it. That is the merge rule the
//! adapter relies on: injected credentials and caller overrides land on
//! top of earlier fields with the same name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field names whose values must never appear in logs or debug output.
pub const SENSITIVE_FIELDS: &[&str] = &["PWD", "SIGNATURE"];

/// An ordered set of name-value pairs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NvpParams(IndexMap<String, String>);

impl NvpParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field. Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Merge `other` into `self`; fields of `other` win on collision.
    pub fn merge(&mut self, other: &NvpParams) {
        for (k, v) in other.iter() {
            self.0.insert(k.to_string(), v.to_string());
        }
    }

    /// Remove a field, keeping the relative order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Encode as an `application/x-www-form-urlencoded` body.
    pub fn to_form_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl std::fmt::Debug for NvpParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            if SENSITIVE_FIELDS.contains(&k) {
                map.entry(&k, &"[REDACTED]");
            } else {
                map.entry(&k, &v);
            }
        }
        map.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for NvpParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl<K, V> Extend<(K, V)> for NvpParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for NvpParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_existing_key_keeps_position() {
        let mut p = NvpParams::from([("A", "1"), ("B", "2"), ("C", "3")]);
        let prev = p.insert("B", "20");
        assert_eq!(prev.as_deref(), Some("2"));
        let keys: Vec<_> = p.keys().collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(p.get("B"), Some("20"));
    }

    #[test]
    fn merge_overrides_collisions_and_appends_new_keys() {
        let mut base = NvpParams::from([("USER", "u"), ("METHOD", "X")]);
        let overrides = NvpParams::from([("METHOD", "Y"), ("EXTRA", "1")]);
        base.merge(&overrides);
        assert_eq!(base.get("METHOD"), Some("Y"));
        assert_eq!(base.keys().collect::<Vec<_>>(), vec!["USER", "METHOD", "EXTRA"]);
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut p = NvpParams::from([("a", "1"), ("METHOD", "m"), ("b", "2")]);
        assert_eq!(p.remove("METHOD").as_deref(), Some("m"));
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(p.remove("METHOD").is_none());
    }

    #[test]
    fn form_body_is_url_encoded_in_order() {
        let p = NvpParams::from([("NOTE", "a b&c"), ("AMT", "10.00")]);
        assert_eq!(p.to_form_body(), "NOTE=a+b%26c&AMT=10.00");
    }

    #[test]
    fn debug_redacts_credentials() {
        let p = NvpParams::from([("USER", "merchant"), ("PWD", "hunter2"), ("SIGNATURE", "sig")]);
        let out = format!("{p:?}");
        assert!(out.contains("merchant"));
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("\"sig\""));
        assert!(out.contains("[REDACTED]"));
    }

    #[test]
    fn serializes_as_flat_object() {
        let p = NvpParams::from([("B", "2"), ("A", "1")]);
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"B":"2","A":"1"}"#);
    }
}
