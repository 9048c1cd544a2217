//! Output of the compute phase and the per-pass report.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

/// Why an id landed where it did in the new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// Ranked by confidence; `schema` is the most confident classifier.
    Classifier { schema: Option<String> },
    Random,
    /// Beyond the inference cap, appended unranked.
    Deferred,
}

/// New ordering for the unlabeled pool plus the protected set.
#[derive(Debug, Clone)]
pub struct ReorderPlan {
    pub pass_id: Uuid,
    pub new_order: Vec<String>,
    /// Ids any annotator has answered; their relative order never changes.
    pub exposed: HashSet<String>,
    pub selections: BTreeMap<String, Selection>,
    pub trained_schemas: Vec<String>,
    pub skipped_schemas: Vec<String>,
}

impl ReorderPlan {
    pub fn count(&self, selection: &Selection) -> usize {
        self.selections
            .values()
            .filter(|s| std::mem::discriminant(*s) == std::mem::discriminant(selection))
            .count()
    }
}

/// A user whose reorder was rejected. Their queue is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserFailure {
    pub user_id: String,
    pub error: String,
}

/// Outcome of one active learning pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    pub pass_id: Uuid,
    /// False when active learning is switched off.
    pub ran: bool,
    pub trained_schemas: Vec<String>,
    pub skipped_schemas: Vec<String>,
    pub ranked: usize,
    pub random: usize,
    pub deferred: usize,
    pub users_reordered: usize,
    pub failures: Vec<UserFailure>,
    /// Cancelled while applying; users after the cut keep their old order.
    pub cancelled: bool,
}

impl PassReport {
    pub fn skipped() -> Self {
        Self {
            pass_id: Uuid::new_v4(),
            ran: false,
            trained_schemas: Vec::new(),
            skipped_schemas: Vec::new(),
            ranked: 0,
            random: 0,
            deferred: 0,
            users_reordered: 0,
            failures: Vec::new(),
            cancelled: false,
        }
    }
}

/// One from `ranked`, then one from `random`, until both run out.
pub fn interleave(ranked: Vec<String>, random: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(ranked.len() + random.len());
    let mut ranked = ranked.into_iter();
    let mut random = random.into_iter();
    loop {
        let a = ranked.next();
        let b = random.next();
        if a.is_none() && b.is_none() {
            break;
        }
        out.extend(a);
        out.extend(b);
    }
    out
}
