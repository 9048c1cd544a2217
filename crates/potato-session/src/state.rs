//! UserAnnotationState: one annotator's queue, cursor, answers and gates.

use std::collections::{BTreeMap, HashSet};

use potato_core::errors::LearningError;
use potato_core::models::{
    BehaviorData, ConsentStatus, InstanceKind, LabelAnnotation, PrestudyStatus, SpanAnnotation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gates::{GateEvent, Gates};
use crate::queue::InstanceQueue;

/// Where an annotator is in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserPhase {
    /// Nothing granted, no gate pending, nothing answered yet.
    New,
    AwaitingConsent,
    AwaitingPrestudy,
    /// Gates resolved, waiting for a batch.
    Ready,
    /// Batch granted, nothing finished.
    Assigned,
    Annotating,
    /// All granted work finished, or locked out by a failed prestudy.
    Exhausted,
}

/// Result of [`UserAnnotationState::set_annotation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationUpdate {
    /// Stored labels or spans differ from before.
    pub changed: bool,
    pub event: Option<GateEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnnotationState {
    pub user_id: String,
    queue: InstanceQueue,
    cursor: usize,
    labels: BTreeMap<String, LabelAnnotation>,
    spans: BTreeMap<String, Vec<SpanAnnotation>>,
    behavior: BTreeMap<String, BehaviorData>,
    pub prestudy_status: PrestudyStatus,
    pub consent_status: ConsentStatus,
}

impl UserAnnotationState {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            queue: InstanceQueue::new(),
            cursor: 0,
            labels: BTreeMap::new(),
            spans: BTreeMap::new(),
            behavior: BTreeMap::new(),
            prestudy_status: PrestudyStatus::Unknown,
            consent_status: ConsentStatus::Unknown,
        }
    }

    // --- Queue ---

    pub fn queue(&self) -> &InstanceQueue {
        &self.queue
    }

    /// Append to the queue. Already-queued ids are skipped.
    pub fn extend_queue<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, InstanceKind)>,
    {
        self.queue.extend(entries)
    }

    /// Drop queued ids failing `keep`, then clamp the cursor.
    pub fn retain_queue<F: FnMut(&str) -> bool>(&mut self, keep: F) {
        self.queue.retain(keep);
        self.clamp_cursor();
    }

    /// Real instances granted to this user.
    pub fn assigned_count(&self) -> usize {
        self.queue.count_kind(InstanceKind::Item)
    }

    // --- Cursor ---

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_id(&self) -> Option<&str> {
        self.queue.get(self.cursor)
    }

    /// Move by `delta`, clamped to the queue. Returns whether the cursor moved.
    pub fn advance(&mut self, delta: isize) -> bool {
        let target = self.cursor.saturating_add_signed(delta);
        self.goto(target)
    }

    /// Jump to `position`, clamped to the queue. Moving back over a prestudy
    /// item once the prestudy is resolved is refused.
    pub fn goto(&mut self, position: usize) -> bool {
        if self.queue.is_empty() {
            return false;
        }
        let target = position.min(self.queue.len() - 1);
        if target < self.cursor && self.prestudy_status.is_resolved() {
            let crosses_prestudy = (target..self.cursor).any(|pos| {
                self.queue
                    .get(pos)
                    .and_then(|id| self.queue.kind(id))
                    .is_some_and(|k| k == InstanceKind::Prestudy)
            });
            if crosses_prestudy {
                debug!(user_id = %self.user_id, target, "refused move back into resolved prestudy");
                return false;
            }
        }
        let moved = target != self.cursor;
        self.cursor = target;
        moved
    }

    /// Put the cursor on the first item without an answer (or the last one).
    pub fn move_to_first_unanswered(&mut self) {
        let first_open = self
            .queue
            .ids()
            .iter()
            .position(|id| !self.has_answer(id));
        self.cursor = first_open.unwrap_or(self.queue.len().saturating_sub(1));
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.queue.len().saturating_sub(1));
    }

    // --- Answers ---

    pub fn labels(&self, instance_id: &str) -> Option<&LabelAnnotation> {
        self.labels.get(instance_id)
    }

    pub fn spans(&self, instance_id: &str) -> Option<&[SpanAnnotation]> {
        self.spans.get(instance_id).map(Vec::as_slice)
    }

    pub fn behavior(&self, instance_id: &str) -> Option<&BehaviorData> {
        self.behavior.get(instance_id)
    }

    pub fn all_labels(&self) -> &BTreeMap<String, LabelAnnotation> {
        &self.labels
    }

    pub fn all_spans(&self) -> &BTreeMap<String, Vec<SpanAnnotation>> {
        &self.spans
    }

    pub fn all_behavior(&self) -> &BTreeMap<String, BehaviorData> {
        &self.behavior
    }

    fn has_answer(&self, id: &str) -> bool {
        self.labels.contains_key(id) || self.spans.get(id).is_some_and(|s| !s.is_empty())
    }

    /// Ids with labels or a non-empty span list, of any kind.
    pub fn answered_ids(&self) -> HashSet<&str> {
        self.labels
            .keys()
            .map(String::as_str)
            .chain(
                self.spans
                    .iter()
                    .filter(|(_, s)| !s.is_empty())
                    .map(|(id, _)| id.as_str()),
            )
            .collect()
    }

    /// Overwrite the answer for one instance. Empty labels and spans delete
    /// the stored entry. Behavior is stored only when it differs.
    pub fn set_annotation(
        &mut self,
        instance_id: &str,
        labels: LabelAnnotation,
        spans: Vec<SpanAnnotation>,
        behavior: BehaviorData,
        gates: &Gates,
    ) -> AnnotationUpdate {
        let labels = labels.normalized();
        let mut changed = if labels.is_empty() {
            self.labels.remove(instance_id).is_some()
        } else {
            let same = self.labels.get(instance_id) == Some(&labels);
            if !same {
                self.labels.insert(instance_id.to_string(), labels.clone());
            }
            !same
        };

        if spans.is_empty() {
            changed |= self
                .spans
                .remove(instance_id)
                .is_some_and(|old| !old.is_empty());
        } else if self.spans.get(instance_id) != Some(&spans) {
            self.spans.insert(instance_id.to_string(), spans);
            changed = true;
        }

        if !behavior.is_empty() && self.behavior.get(instance_id) != Some(&behavior) {
            self.behavior.insert(instance_id.to_string(), behavior);
        }

        let mut event = None;
        if gates.is_consent_item(instance_id) && !labels.is_empty() {
            let agreed = gates.is_agreement(&labels);
            if self.consent_status.resolve(agreed) {
                event = Some(if agreed {
                    GateEvent::ConsentAgreed
                } else {
                    GateEvent::ConsentDeclined
                });
            }
        } else if gates.is_prestudy_item(self.queue.kind(instance_id))
            && !self.prestudy_status.is_resolved()
        {
            event = Some(GateEvent::PrestudyAnswered);
        }

        AnnotationUpdate { changed, event }
    }

    /// Distinct real instances with labels or non-empty spans.
    pub fn finished_count(&self) -> usize {
        self.answered_ids()
            .into_iter()
            .filter(|id| self.queue.kind(id) == Some(InstanceKind::Item))
            .count()
    }

    // --- Reordering ---

    /// Re-rank the part of the queue nobody has seen yet.
    ///
    /// Ids at or before the cursor and ids in `exposed` stay in front in
    /// their current order; then come the queued ids of `new_order`; then
    /// every other remaining id in its current order.
    pub fn reorder_suffix(
        &mut self,
        new_order: &[String],
        exposed: &HashSet<String>,
    ) -> Result<(), LearningError> {
        let ids = self.queue.ids();
        let mut result: Vec<String> = Vec::with_capacity(ids.len());
        let mut placed: HashSet<&str> = HashSet::with_capacity(ids.len());

        for (pos, id) in ids.iter().enumerate() {
            if pos <= self.cursor || exposed.contains(id) {
                result.push(id.clone());
                placed.insert(id);
            }
        }
        for id in new_order {
            if let Some(pos) = self.queue.position(id) {
                let queued = &ids[pos];
                if placed.insert(queued) {
                    result.push(queued.clone());
                }
            }
        }
        for id in ids {
            if placed.insert(id) {
                result.push(id.clone());
            }
        }

        let expected = ids.len();
        let actual = result.len();
        if actual != expected || !self.queue.set_order(result) {
            return Err(LearningError::ReorderLengthMismatch {
                user_id: self.user_id.clone(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    // --- Phase ---

    pub fn phase(&self, gates: &Gates) -> UserPhase {
        let assigned = self.assigned_count();
        if assigned > 0 {
            let finished = self.finished_count();
            return if finished >= assigned {
                UserPhase::Exhausted
            } else if finished == 0 {
                UserPhase::Assigned
            } else {
                UserPhase::Annotating
            };
        }
        if gates.consent_required && self.consent_status != ConsentStatus::Agreed {
            return UserPhase::AwaitingConsent;
        }
        if gates.prestudy_enabled {
            match self.prestudy_status {
                PrestudyStatus::Unknown => return UserPhase::AwaitingPrestudy,
                PrestudyStatus::Failed => return UserPhase::Exhausted,
                PrestudyStatus::Passed => return UserPhase::Ready,
            }
        }
        if gates.consent_required {
            UserPhase::Ready
        } else {
            UserPhase::New
        }
    }
}
