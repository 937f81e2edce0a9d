//! Payload diff computation
//!
//! Classifies every key of two payloads as added, removed, changed or
//! unchanged. Empty maps are simply empty sets.

use std::collections::BTreeMap;

/// Keys present in `a` but absent from `b`, sorted
pub fn key_diff(a: &BTreeMap<String, String>, b: &BTreeMap<String, String>) -> Vec<String> {
    a.keys().filter(|k| !b.contains_key(*k)).cloned().collect()
}

/// Keys present in both maps with differing values, mapped to `a`'s value
pub fn updated_existing(
    a: &BTreeMap<String, String>,
    b: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    a.iter()
        .filter(|(k, a_val)| b.get(*k).is_some_and(|b_val| b_val != *a_val))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Classification of payload keys between an original and an edited secret
///
/// The four sets are pairwise disjoint and together cover every key of
/// either payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
    pub unchanged: Vec<String>,
}

impl PayloadDiff {
    pub fn compute(original: &BTreeMap<String, String>, edited: &BTreeMap<String, String>) -> Self {
        let unchanged = original
            .iter()
            .filter(|(k, v)| edited.get(*k) == Some(*v))
            .map(|(k, _)| k.clone())
            .collect();

        Self {
            added: key_diff(edited, original),
            removed: key_diff(original, edited),
            changed: updated_existing(edited, original).into_keys().collect(),
            unchanged,
        }
    }

    /// Keys whose new value must be encrypted, sorted
    pub fn to_encrypt(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .added
            .iter()
            .chain(self.changed.iter())
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// True when no key was added, removed or changed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// One-line summary, key names only
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} changed, {} removed, {} unchanged",
            self.added.len(),
            self.changed.len(),
            self.removed.len(),
            self.unchanged.len()
        )
    }
}
