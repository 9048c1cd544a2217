//! InstanceQueue: ordered ids with their inverse index and kinds.
//!
//! The sequence, the id to position index and the id to kind map only
//! change through the methods here, so the index is always the exact
//! inverse of the sequence.

use std::collections::HashMap;

use potato_core::models::InstanceKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, InstanceKind)>", into = "Vec<(String, InstanceKind)>")]
pub struct InstanceQueue {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    kinds: HashMap<String, InstanceKind>,
}

impl InstanceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append ids not already queued. Returns how many were added.
    pub fn extend<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, InstanceKind)>,
    {
        let mut added = 0;
        for (id, kind) in entries {
            if self.index.contains_key(&id) {
                continue;
            }
            self.index.insert(id.clone(), self.ids.len());
            self.kinds.insert(id.clone(), kind);
            self.ids.push(id);
            added += 1;
        }
        added
    }

    /// Replace the order with a permutation of the current ids.
    /// Returns false, leaving the queue untouched, if `order` is not one.
    pub(crate) fn set_order(&mut self, order: Vec<String>) -> bool {
        if order.len() != self.ids.len() || !order.iter().all(|id| self.index.contains_key(id)) {
            return false;
        }
        let index: HashMap<String, usize> = order
            .iter()
            .enumerate()
            .map(|(pos, id)| (id.clone(), pos))
            .collect();
        if index.len() != order.len() {
            return false;
        }
        self.index = index;
        self.ids = order;
        true
    }

    /// Drop ids failing the predicate, keeping the order of the rest.
    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        let entries: Vec<(String, InstanceKind)> = self
            .iter()
            .filter(|(id, _)| keep(*id))
            .map(|(id, kind)| (id.to_string(), kind))
            .collect();
        *self = Self::from(entries);
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, pos: usize) -> Option<&str> {
        self.ids.get(pos).map(String::as_str)
    }

    pub fn kind(&self, id: &str) -> Option<InstanceKind> {
        self.kinds.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `(id, kind)` in queue order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, InstanceKind)> + '_ {
        self.ids.iter().map(|id| {
            let kind = self.kinds.get(id).copied().unwrap_or(InstanceKind::Item);
            (id.as_str(), kind)
        })
    }

    pub fn count_kind(&self, kind: InstanceKind) -> usize {
        self.kinds.values().filter(|k| **k == kind).count()
    }
}

impl From<Vec<(String, InstanceKind)>> for InstanceQueue {
    fn from(entries: Vec<(String, InstanceKind)>) -> Self {
        let mut q = Self::new();
        q.extend(entries);
        q
    }
}

impl From<InstanceQueue> for Vec<(String, InstanceKind)> {
    fn from(q: InstanceQueue) -> Self {
        q.iter().map(|(id, kind)| (id.to_string(), kind)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(ids: &[&str]) -> InstanceQueue {
        InstanceQueue::from(
            ids.iter()
                .map(|id| (id.to_string(), InstanceKind::Item))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn extend_skips_duplicates_and_indexes() {
        let mut queue = q(&["a", "b"]);
        let added = queue.extend([
            ("b".to_string(), InstanceKind::Item),
            ("c".to_string(), InstanceKind::PostAnnotationPage),
        ]);
        assert_eq!(added, 1);
        assert_eq!(queue.position("c"), Some(2));
        assert_eq!(queue.kind("c"), Some(InstanceKind::PostAnnotationPage));
    }

    #[test]
    fn set_order_rejects_non_permutations() {
        let mut queue = q(&["a", "b", "c"]);
        assert!(!queue.set_order(vec!["a".into(), "b".into()]));
        assert!(!queue.set_order(vec!["a".into(), "a".into(), "b".into()]));
        assert!(!queue.set_order(vec!["a".into(), "b".into(), "z".into()]));
        assert_eq!(queue.ids(), &["a", "b", "c"]);
        assert!(queue.set_order(vec!["c".into(), "a".into(), "b".into()]));
        assert_eq!(queue.position("c"), Some(0));
        assert_eq!(queue.position("b"), Some(2));
    }

    #[test]
    fn retain_reindexes() {
        let mut queue = q(&["a", "b", "c"]);
        queue.retain(|id| id != "b");
        assert_eq!(queue.position("c"), Some(1));
        assert!(!queue.contains("b"));
    }
}
