//! TaskAssignmentRegistry: the campaign-wide quota ledger.
//!
//! Every operation takes the single ledger mutex, so each is atomic and
//! [`TaskAssignmentRegistry::grant`] can sample and reserve without another
//! user slipping in between.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use potato_catalog::InstanceCatalog;
use potato_core::config::SamplingStrategy;
use potato_core::errors::AssignmentError;
use potato_core::models::InstanceKind;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::pool::UnassignedPool;
use crate::sampler::{inject_test_questions, sample};

/// Serializable ledger contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryState {
    pub unassigned: UnassignedPool,
    /// Instance id to the users that received it, in grant order.
    pub assigned: BTreeMap<String, Vec<String>>,
    /// Quota each tracked instance started with.
    pub initial_quota: BTreeMap<String, usize>,
    pub test_question_ids: Vec<String>,
    pub prestudy_ids: Vec<String>,
    pub pre_annotation_pages: Vec<String>,
    pub post_annotation_pages: Vec<String>,
    pub prestudy_passed_pages: Vec<String>,
    pub prestudy_failed_pages: Vec<String>,
    pub prestudy_passed_users: Vec<String>,
    pub prestudy_failed_users: Vec<String>,
}

impl RegistryState {
    /// Quota-tracked grants currently outstanding.
    pub fn assigned_total(&self) -> usize {
        self.assigned
            .iter()
            .filter(|(id, _)| self.initial_quota.contains_key(*id))
            .map(|(_, users)| users.len())
            .sum()
    }

    pub fn initial_total(&self) -> usize {
        self.initial_quota.values().sum()
    }
}

/// Thread-safe quota ledger shared by every annotator.
pub struct TaskAssignmentRegistry {
    state: Mutex<RegistryState>,
}

impl TaskAssignmentRegistry {
    /// Route test questions, prestudy items and pages into their pools and
    /// seed every real item with `labels_per_instance` (or its override).
    pub fn initialize(
        catalog: &InstanceCatalog,
        labels_per_instance: usize,
        quota_overrides: &BTreeMap<String, usize>,
    ) -> Self {
        let mut state = RegistryState::default();
        for inst in catalog.iter() {
            let id = inst.id.clone();
            match inst.kind {
                InstanceKind::Item => {
                    let quota = quota_overrides
                        .get(&id)
                        .copied()
                        .unwrap_or(labels_per_instance);
                    if quota > 0 {
                        state.unassigned.add(&id, quota);
                        state.initial_quota.insert(id, quota);
                    }
                }
                InstanceKind::TestQuestion => state.test_question_ids.push(id),
                InstanceKind::Prestudy => state.prestudy_ids.push(id),
                InstanceKind::PreAnnotationPage => state.pre_annotation_pages.push(id),
                InstanceKind::PostAnnotationPage => state.post_annotation_pages.push(id),
                InstanceKind::PrestudyPassedPage => state.prestudy_passed_pages.push(id),
                InstanceKind::PrestudyFailedPage => state.prestudy_failed_pages.push(id),
            }
        }
        info!(
            tracked = state.initial_quota.len(),
            total_quota = state.initial_total(),
            test_questions = state.test_question_ids.len(),
            prestudy = state.prestudy_ids.len(),
            "task assignment registry initialized"
        );
        Self::from_state(state)
    }

    /// Rebuild from a snapshot.
    pub fn from_state(state: RegistryState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Clone of the current ledger.
    pub fn snapshot(&self) -> RegistryState {
        self.ledger().clone()
    }

    /// Swap in a restored ledger.
    pub fn replace(&self, state: RegistryState) {
        *self.ledger() = state;
    }

    fn ledger(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take one unit of quota for `user_id`.
    pub fn reserve(&self, instance_id: &str, user_id: &str) -> Result<(), AssignmentError> {
        let mut state = self.ledger();
        reserve_locked(&mut state, instance_id, user_id)
    }

    /// Inverse of [`reserve`](Self::reserve). Untracked ids (test questions)
    /// only lose the user entry.
    pub fn release(&self, instance_id: &str, user_id: &str) -> Result<(), AssignmentError> {
        let mut state = self.ledger();
        release_locked(&mut state, instance_id, user_id)
    }

    /// Release everything a user holds, one entry per reservation. Returns
    /// the released ids.
    pub fn release_user(&self, user_id: &str) -> Vec<String> {
        let mut state = self.ledger();
        let held: Vec<String> = state
            .assigned
            .iter()
            .flat_map(|(id, users)| {
                users.iter().filter(|u| *u == user_id).map(move |_| id.clone())
            })
            .collect();
        for id in &held {
            if let Err(e) = release_locked(&mut state, id, user_id) {
                warn!(
                    user_id = %user_id,
                    instance_id = %id,
                    error = %e,
                    "release failed for a held id"
                );
            }
        }
        state.prestudy_passed_users.retain(|u| u != user_id);
        state.prestudy_failed_users.retain(|u| u != user_id);
        debug!(user_id = %user_id, released = held.len(), "released user reservations");
        held
    }

    /// Sample a batch, inject test questions and reserve it, atomically.
    ///
    /// A too-small test pool fails before anything is reserved.
    pub fn grant<R: Rng>(
        &self,
        user_id: &str,
        k: usize,
        strategy: SamplingStrategy,
        test_questions: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, AssignmentError> {
        let mut state = self.ledger();
        let sampled = sample(&state.unassigned, k, strategy, rng);
        let batch = if test_questions > 0 {
            inject_test_questions(sampled.clone(), &state.test_question_ids, test_questions, rng)?
        } else {
            sampled.clone()
        };
        for id in &sampled {
            reserve_locked(&mut state, id, user_id)?;
        }
        let untracked: Vec<String> = batch
            .iter()
            .filter(|id| !state.initial_quota.contains_key(*id))
            .cloned()
            .collect();
        for id in untracked {
            state.assigned.entry(id).or_default().push(user_id.to_string());
        }
        debug!(user_id = %user_id, granted = sampled.len(), batch = batch.len(), "batch granted");
        Ok(batch)
    }

    /// Sum of all remaining quota.
    pub fn remaining_count(&self) -> usize {
        self.ledger().unassigned.total()
    }

    /// True once remaining quota is at most `factor` of one batch.
    pub fn is_saturated(&self, instance_per_annotator: usize, factor: f64) -> bool {
        self.remaining_count() as f64 <= factor * instance_per_annotator as f64
    }

    pub fn quota_of(&self, instance_id: &str) -> Option<usize> {
        self.ledger().unassigned.quota(instance_id)
    }

    pub fn assigned_users(&self, instance_id: &str) -> Vec<String> {
        self.ledger()
            .assigned
            .get(instance_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Record a prestudy outcome once per user.
    pub fn record_prestudy_result(&self, user_id: &str, passed: bool) {
        let mut state = self.ledger();
        let known = state.prestudy_passed_users.iter().any(|u| u == user_id)
            || state.prestudy_failed_users.iter().any(|u| u == user_id);
        if known {
            return;
        }
        if passed {
            state.prestudy_passed_users.push(user_id.to_string());
        } else {
            state.prestudy_failed_users.push(user_id.to_string());
        }
    }

    pub fn prestudy_ids(&self) -> Vec<String> {
        self.ledger().prestudy_ids.clone()
    }

    pub fn pre_annotation_pages(&self) -> Vec<String> {
        self.ledger().pre_annotation_pages.clone()
    }

    pub fn post_annotation_pages(&self) -> Vec<String> {
        self.ledger().post_annotation_pages.clone()
    }

    pub fn prestudy_passed_pages(&self) -> Vec<String> {
        self.ledger().prestudy_passed_pages.clone()
    }

    pub fn prestudy_failed_pages(&self) -> Vec<String> {
        self.ledger().prestudy_failed_pages.clone()
    }
}

fn reserve_locked(
    state: &mut RegistryState,
    instance_id: &str,
    user_id: &str,
) -> Result<(), AssignmentError> {
    state
        .unassigned
        .take_one(instance_id)
        .ok_or_else(|| AssignmentError::NotFound {
            instance_id: instance_id.to_string(),
        })?;
    state
        .assigned
        .entry(instance_id.to_string())
        .or_default()
        .push(user_id.to_string());
    Ok(())
}

fn release_locked(
    state: &mut RegistryState,
    instance_id: &str,
    user_id: &str,
) -> Result<(), AssignmentError> {
    let not_assigned = || AssignmentError::NotAssigned {
        instance_id: instance_id.to_string(),
        user_id: user_id.to_string(),
    };
    let users = state.assigned.get_mut(instance_id).ok_or_else(not_assigned)?;
    let pos = users.iter().position(|u| u == user_id).ok_or_else(not_assigned)?;
    users.remove(pos);
    if users.is_empty() {
        state.assigned.remove(instance_id);
    }
    if state.initial_quota.contains_key(instance_id) {
        state.unassigned.add(instance_id, 1);
    }
    Ok(())
}
