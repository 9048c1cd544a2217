//! AnnotationEngine: owns every subsystem of one campaign.
//!
//! Lock order is user entry, then the sampling RNG, then the registry. The
//! registry never calls back into user state, and nothing that iterates all
//! users runs while a user entry is held.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use potato_assignment::TaskAssignmentRegistry;
use potato_catalog::{CatalogBuilder, InstanceCatalog};
use potato_core::config::StorageBackend;
use potato_core::errors::{ConfigError, PotatoError, PotatoResult};
use potato_core::models::{
    behavior_from_form, BehaviorData, Instance, LabelAnnotation, PrestudyStatus, SpanAnnotation,
};
use potato_core::traits::ISnapshotStore;
use potato_core::PotatoConfig;
use potato_learning::{ActiveLearningCoordinator, CancellationToken, PassReport};
use potato_observability::{events, init_tracing};
use potato_session::{
    assign_instances, initial_queue, resolve_prestudy, CampaignStatistics, GateEvent, Gates,
    UserAnnotationState, UserPhase, UserStateManager, UserStatistics,
};
use potato_storage::{InMemorySnapshotStore, SqliteSnapshotStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::navigation::Navigation;
use crate::persistence::load_registry_snapshot;

/// The annotation workflow of one campaign.
pub struct AnnotationEngine {
    pub(crate) config: PotatoConfig,
    pub(crate) catalog: InstanceCatalog,
    pub(crate) registry: TaskAssignmentRegistry,
    pub(crate) users: UserStateManager,
    pub(crate) gates: Gates,
    pub(crate) learner: ActiveLearningCoordinator,
    pub(crate) store: Arc<dyn ISnapshotStore>,
    /// Sampling RNG shared by every grant.
    rng: Mutex<StdRng>,
}

impl AnnotationEngine {
    /// Wire an engine around a loaded catalog and a snapshot store. A
    /// registry saved by an earlier run replaces the freshly seeded one;
    /// users stay in the store until [`restore`](Self::restore) or first use.
    pub fn new(
        config: PotatoConfig,
        catalog: InstanceCatalog,
        store: Arc<dyn ISnapshotStore>,
    ) -> PotatoResult<Self> {
        config.validate()?;
        let gates = Gates::from_config(&config)?;
        let registry = TaskAssignmentRegistry::initialize(
            &catalog,
            config.assignment.labels_per_instance,
            &config.assignment.quota_overrides,
        );
        if let Some(state) = load_registry_snapshot(store.as_ref())? {
            registry.replace(state);
            info!(remaining = registry.remaining_count(), "stored registry adopted");
        }
        let learner = ActiveLearningCoordinator::new(
            config.active_learning.clone(),
            config.item_properties.text_key.clone(),
        );
        let rng = match config.assignment.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            instances = catalog.len(),
            real = catalog.real_count(),
            store = store.name(),
            "annotation engine ready"
        );
        Ok(Self {
            config,
            catalog,
            registry,
            users: UserStateManager::new(),
            gates,
            learner,
            store,
            rng: Mutex::new(rng),
        })
    }

    /// Load the catalog from the configured data files (relative to
    /// `base_dir`) and open the configured snapshot store.
    pub fn from_config(config: PotatoConfig, base_dir: &Path) -> PotatoResult<Self> {
        init_tracing(&config.observability);
        config.validate()?;
        let catalog = CatalogBuilder::new(&config).load_files(base_dir)?.build()?;
        let store: Arc<dyn ISnapshotStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemorySnapshotStore::new()),
            StorageBackend::Sqlite => {
                Arc::new(SqliteSnapshotStore::open(&base_dir.join(&config.storage.db_path))?)
            }
        };
        Self::new(config, catalog, store)
    }

    /// Engine backed by an in-memory snapshot store.
    pub fn in_memory(config: PotatoConfig, catalog: InstanceCatalog) -> PotatoResult<Self> {
        Self::new(config, catalog, Arc::new(InMemorySnapshotStore::new()))
    }

    // --- Accessors ---

    pub fn config(&self) -> &PotatoConfig {
        &self.config
    }

    pub fn catalog(&self) -> &InstanceCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &TaskAssignmentRegistry {
        &self.registry
    }

    pub fn users(&self) -> &UserStateManager {
        &self.users
    }

    pub fn gates(&self) -> &Gates {
        &self.gates
    }

    pub fn store(&self) -> &dyn ISnapshotStore {
        self.store.as_ref()
    }

    fn sampling_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cloned state of a known user.
    pub fn user(&self, user_id: &str) -> PotatoResult<UserAnnotationState> {
        self.users.get(user_id).ok_or_else(|| user_not_found(user_id))
    }

    pub fn phase(&self, user_id: &str) -> PotatoResult<UserPhase> {
        self.users
            .with_user(user_id, |state| state.phase(&self.gates))
            .ok_or_else(|| user_not_found(user_id))
    }

    // --- Users ---

    /// Existing state, else a stored snapshot, else a fresh annotator.
    ///
    /// A fresh annotator gets the pre-annotation pages (and prestudy items)
    /// and, when no gate is configured, an immediate batch. New annotators
    /// are refused once the campaign is saturated.
    pub fn get_or_create_user_state(&self, user_id: &str) -> PotatoResult<UserAnnotationState> {
        if let Some(state) = self.users.get(user_id) {
            return Ok(state);
        }
        if let Some(state) = self.load_user_snapshot(user_id)? {
            self.users.insert_new(state);
            return self.user(user_id);
        }
        if self.campaign_saturated() {
            let remaining = self.registry.remaining_count();
            events::campaign_saturated(user_id, remaining);
            return Err(PotatoError::CampaignSaturated { remaining });
        }

        let mut state = UserAnnotationState::new(user_id);
        state.extend_queue(initial_queue(&self.registry, &self.catalog, &self.config));
        if !self.users.insert_new(state) {
            // Lost a creation race; the winner already assigned.
            return self.user(user_id);
        }
        if !self.gates.consent_required && !self.gates.prestudy_enabled {
            self.users
                .with_user_mut(user_id, |state| self.try_assign(state))
                .transpose()?;
        }
        debug!(user_id = %user_id, "annotator created");
        self.persist_assignment(user_id)?;
        self.user(user_id)
    }

    /// Grant a batch if the gates allow it. Returns the number of queue
    /// entries added.
    fn try_assign(&self, state: &mut UserAnnotationState) -> PotatoResult<usize> {
        if !self.config.assignment.enabled {
            return Ok(0);
        }
        let before = state.queue().len();
        let granted = {
            let mut rng = self.sampling_rng();
            assign_instances(state, &self.registry, &self.catalog, &self.config, &mut *rng)?
        };
        let added = state.queue().len() - before;
        if granted {
            events::instances_assigned(&state.user_id, state.assigned_count(), state.queue().len());
        }
        Ok(added)
    }

    fn try_resolve_prestudy(&self, state: &mut UserAnnotationState) -> PotatoResult<()> {
        let status = {
            let mut rng = self.sampling_rng();
            resolve_prestudy(state, &self.registry, &self.catalog, &self.config, &mut *rng)?
        };
        match status {
            Some(PrestudyStatus::Passed) => {
                events::gate_resolved(&state.user_id, "prestudy", "passed");
                if state.assigned_count() > 0 {
                    events::instances_assigned(
                        &state.user_id,
                        state.assigned_count(),
                        state.queue().len(),
                    );
                }
            }
            Some(PrestudyStatus::Failed) => {
                events::gate_resolved(&state.user_id, "prestudy", "failed");
            }
            _ => {}
        }
        Ok(())
    }

    // --- Submissions ---

    /// Store one answer and react to gate transitions. Returns whether the
    /// stored labels or spans changed.
    pub fn record_submission(
        &self,
        user_id: &str,
        instance_id: &str,
        labels: LabelAnnotation,
        spans: Vec<SpanAnnotation>,
        behavior: BehaviorData,
    ) -> PotatoResult<bool> {
        if !self.catalog.contains(instance_id) {
            return Err(instance_not_found(instance_id));
        }
        let (changed, gate_event) = self
            .users
            .with_user_mut(user_id, |state| -> PotatoResult<(bool, bool)> {
                if !state.queue().contains(instance_id) {
                    return Err(instance_not_found(instance_id));
                }
                let update =
                    state.set_annotation(instance_id, labels, spans, behavior, &self.gates);
                match update.event {
                    Some(GateEvent::ConsentAgreed) => {
                        events::gate_resolved(user_id, "consent", "agreed");
                        if !self.gates.prestudy_enabled || state.prestudy_status.is_resolved() {
                            self.try_assign(state)?;
                        }
                    }
                    Some(GateEvent::ConsentDeclined) => {
                        events::gate_resolved(user_id, "consent", "declined");
                    }
                    Some(GateEvent::PrestudyAnswered) => self.try_resolve_prestudy(state)?,
                    None => {}
                }
                if update.changed {
                    events::annotation_recorded(user_id, instance_id, state.finished_count());
                }
                Ok((update.changed, update.event.is_some()))
            })
            .ok_or_else(|| user_not_found(user_id))??;

        if gate_event {
            self.persist_assignment(user_id)?;
        } else if changed && self.config.storage.persist_on_submit {
            self.persist_user(user_id)?;
        }
        Ok(changed)
    }

    /// [`record_submission`](Self::record_submission) from raw form fields:
    /// `schema:::label` keys become labels, `behavior_*` keys behavior data.
    pub fn record_form_submission(
        &self,
        user_id: &str,
        instance_id: &str,
        fields: &[(&str, &str)],
    ) -> PotatoResult<bool> {
        let labels = LabelAnnotation::from_form(fields.iter().copied());
        let behavior = behavior_from_form(fields.iter().copied());
        self.record_submission(user_id, instance_id, labels, Vec::new(), behavior)
    }

    // --- Navigation ---

    /// Instance under the user's cursor.
    pub fn current_instance(&self, user_id: &str) -> PotatoResult<Instance> {
        let id = self
            .users
            .with_user(user_id, |state| state.current_id().map(str::to_string))
            .ok_or_else(|| user_not_found(user_id))?
            .ok_or_else(|| PotatoError::EmptyQueue {
                user_id: user_id.to_string(),
            })?;
        self.catalog
            .get(&id)
            .cloned()
            .ok_or_else(|| instance_not_found(&id))
    }

    /// Move the cursor. Returns whether it moved.
    pub fn navigate(&self, user_id: &str, navigation: Navigation) -> PotatoResult<bool> {
        self.users
            .with_user_mut(user_id, |state| {
                let before = state.cursor();
                match navigation {
                    Navigation::Forward => state.advance(1),
                    Navigation::Back => state.advance(-1),
                    Navigation::Advance(delta) => state.advance(delta),
                    Navigation::GoTo(position) => state.goto(position),
                    Navigation::FirstUnanswered => {
                        state.move_to_first_unanswered();
                        state.cursor() != before
                    }
                }
            })
            .ok_or_else(|| user_not_found(user_id))
    }

    // --- Campaign ---

    /// True once remaining quota drops to `saturation_factor` of one batch.
    /// Never saturated with assignment disabled.
    pub fn campaign_saturated(&self) -> bool {
        let assignment = &self.config.assignment;
        assignment.enabled
            && self
                .registry
                .is_saturated(assignment.instance_per_annotator, assignment.saturation_factor)
    }

    /// Whether the finished-annotation count has reached the next
    /// `update_rate` multiple.
    pub fn active_learning_due(&self) -> bool {
        self.learner.is_due(self.users.total_finished())
    }

    /// Retrain and reorder every queue. A report with `ran == false` when
    /// active learning is disabled.
    pub fn run_active_learning_pass(&self) -> PotatoResult<PassReport> {
        self.run_active_learning_pass_with(&CancellationToken::new())
    }

    /// As [`run_active_learning_pass`](Self::run_active_learning_pass),
    /// stopping early when `cancel` fires. Users already reordered keep
    /// their new order; the rest are untouched.
    pub fn run_active_learning_pass_with(
        &self,
        cancel: &CancellationToken,
    ) -> PotatoResult<PassReport> {
        let report = self.learner.run_pass(&self.catalog, &self.users, cancel)?;
        if report.ran {
            events::active_learning_completed(
                &report.pass_id.to_string(),
                report.users_reordered,
                report.failures.len(),
            );
            if report.users_reordered > 0 {
                self.persist_users()?;
            }
        }
        Ok(report)
    }

    pub fn user_statistics(&self, user_id: &str) -> PotatoResult<UserStatistics> {
        self.users
            .with_user(user_id, UserStatistics::from_state)
            .ok_or_else(|| user_not_found(user_id))
    }

    pub fn campaign_statistics(&self) -> CampaignStatistics {
        CampaignStatistics::from_states(self.users.snapshots().iter())
    }

    /// Label order shown to `user_id` for `schema_name`.
    pub fn option_order(&self, user_id: &str, schema_name: &str) -> PotatoResult<Vec<String>> {
        let schema = self
            .config
            .schema(schema_name)
            .ok_or_else(|| ConfigError::UnknownSchema {
                name: schema_name.to_string(),
            })?;
        Ok(crate::options::option_order(user_id, schema))
    }
}

pub(crate) fn user_not_found(user_id: &str) -> PotatoError {
    PotatoError::UserNotFound {
        user_id: user_id.to_string(),
    }
}

fn instance_not_found(instance_id: &str) -> PotatoError {
    PotatoError::InstanceNotFound {
        instance_id: instance_id.to_string(),
    }
}
