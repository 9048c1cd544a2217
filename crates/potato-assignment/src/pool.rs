//! Insertion-ordered map of instance id to remaining quota.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Ids with quota left, in insertion order. An id that runs out is removed;
/// one that comes back takes its old slot again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(String, usize)>", into = "Vec<(String, usize)>")]
pub struct UnassignedPool {
    order: BTreeMap<u64, String>,
    entries: HashMap<String, (u64, usize)>,
    /// Slots of exhausted ids.
    retired: HashMap<String, u64>,
    next_seq: u64,
}

impl UnassignedPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add quota to an id. A new id is appended; an exhausted one returns to
    /// its previous slot. Zero is a no-op.
    pub fn add(&mut self, id: &str, quota: usize) {
        if quota == 0 {
            return;
        }
        if let Some((_, q)) = self.entries.get_mut(id) {
            *q += quota;
            return;
        }
        let seq = self.retired.remove(id).unwrap_or_else(|| {
            self.next_seq += 1;
            self.next_seq - 1
        });
        self.order.insert(seq, id.to_string());
        self.entries.insert(id.to_string(), (seq, quota));
    }

    /// Take one unit. Returns the quota left, or `None` if the id is absent.
    pub fn take_one(&mut self, id: &str) -> Option<usize> {
        let (seq, quota) = self.entries.get_mut(id).map(|(s, q)| {
            *q -= 1;
            (*s, *q)
        })?;
        if quota == 0 {
            self.entries.remove(id);
            self.order.remove(&seq);
            self.retired.insert(id.to_string(), seq);
        }
        Some(quota)
    }

    pub fn quota(&self, id: &str) -> Option<usize> {
        self.entries.get(id).map(|(_, q)| *q)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all remaining quota.
    pub fn total(&self) -> usize {
        self.entries.values().map(|(_, q)| q).sum()
    }

    /// `(id, quota)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.order
            .values()
            .filter_map(|id| self.entries.get(id).map(|(_, q)| (id.as_str(), *q)))
    }
}

impl From<Vec<(String, usize)>> for UnassignedPool {
    fn from(pairs: Vec<(String, usize)>) -> Self {
        let mut pool = Self::new();
        for (id, quota) in pairs {
            pool.add(&id, quota);
        }
        pool
    }
}

impl From<UnassignedPool> for Vec<(String, usize)> {
    fn from(pool: UnassignedPool) -> Self {
        pool.iter().map(|(id, q)| (id.to_string(), q)).collect()
    }
}
