//! ActiveLearningCoordinator: two-phase re-ranking of the unlabeled pool.
//!
//! [`ActiveLearningCoordinator::plan`] works on cloned user states without
//! holding any user lock. [`apply_plan`] then reorders one user at a time
//! under that user's lock; a rejected reorder leaves that user untouched.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use potato_catalog::InstanceCatalog;
use potato_core::config::ActiveLearningConfig;
use potato_core::constants::NO_LABEL;
use potato_core::errors::LearningError;
use potato_core::models::{Instance, InstanceKind, LabelAnnotation};
use potato_session::{UserAnnotationState, UserStateManager};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::cancellation::{Cancellable, CancellationToken};
use crate::classifier::{build_pipeline, TextPipeline};
use crate::plan::{interleave, PassReport, ReorderPlan, Selection, UserFailure};
use crate::resolution::resolve_annotations;

pub struct ActiveLearningCoordinator {
    config: ActiveLearningConfig,
    /// Payload field holding the text to classify.
    text_key: String,
    /// Guard: only one pass at a time.
    is_running: Arc<AtomicBool>,
    rng: Mutex<StdRng>,
}

impl ActiveLearningCoordinator {
    pub fn new(config: ActiveLearningConfig, text_key: impl Into<String>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            text_key: text_key.into(),
            is_running: Arc::new(AtomicBool::new(false)),
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &ActiveLearningConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// A pass is due on every positive multiple of `update_rate`.
    pub fn is_due(&self, total_finished: usize) -> bool {
        self.config.enabled
            && self.config.update_rate > 0
            && total_finished > 0
            && total_finished % self.config.update_rate == 0
    }

    /// Plan on snapshots, then apply per user. Disabled: a report with
    /// `ran == false` and nothing touched.
    pub fn run_pass(
        &self,
        catalog: &InstanceCatalog,
        users: &UserStateManager,
        cancel: &CancellationToken,
    ) -> Result<PassReport, LearningError> {
        if !self.config.enabled {
            warn!("active learning pass requested but active learning is disabled");
            return Ok(PassReport::skipped());
        }
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(LearningError::AlreadyRunning);
        }

        let result = self
            .plan(catalog, &users.snapshots(), cancel)
            .map(|plan| apply_plan(&plan, users, cancel));

        self.is_running.store(false, Ordering::SeqCst);
        result
    }

    /// Compute the new order of the unlabeled pool. Touches no user state.
    pub fn plan(
        &self,
        catalog: &InstanceCatalog,
        states: &[UserAnnotationState],
        cancel: &CancellationToken,
    ) -> Result<ReorderPlan, LearningError> {
        let pass_id = Uuid::new_v4();
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut by_instance: BTreeMap<&str, Vec<&LabelAnnotation>> = BTreeMap::new();
        let mut exposed: HashSet<String> = HashSet::new();
        for state in states {
            for (id, labels) in state.all_labels() {
                by_instance.entry(id.as_str()).or_default().push(labels);
            }
            exposed.extend(state.answered_ids().into_iter().map(str::to_string));
        }

        let mut resolved: BTreeMap<&str, &LabelAnnotation> = BTreeMap::new();
        for (id, annotations) in &by_instance {
            if let Some(choice) =
                resolve_annotations(annotations, self.config.resolution_strategy, &mut *rng)
            {
                resolved.insert(*id, choice);
            }
        }

        let schemas: Vec<String> = if self.config.schemas.is_empty() {
            let seen: BTreeSet<&String> = resolved
                .values()
                .flat_map(|labels| labels.iter().map(|(schema, _)| schema))
                .collect();
            seen.into_iter().cloned().collect()
        } else {
            self.config.schemas.clone()
        };

        // Training rows: instances with an answer in at least one schema.
        let rows: Vec<(&Instance, &LabelAnnotation)> = resolved
            .iter()
            .filter(|(_, labels)| schemas.iter().any(|s| first_label(labels, s).is_some()))
            .filter_map(|(id, labels)| Some((catalog.get(id)?, *labels)))
            .collect();
        let texts: Vec<String> = rows.iter().map(|(inst, _)| self.text_of(inst)).collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let mut pipelines: Vec<(String, TextPipeline)> = Vec::new();
        let mut skipped_schemas = Vec::new();
        for schema in &schemas {
            cancel.checkpoint()?;
            let labels: Vec<String> = rows
                .iter()
                .map(|(_, la)| first_label(la, schema).unwrap_or_else(|| NO_LABEL.to_string()))
                .collect();
            let distinct: BTreeSet<&String> = labels.iter().collect();
            if distinct.len() < 2 {
                warn!(
                    schema = %schema,
                    distinct = distinct.len(),
                    "too few distinct labels for active learning, skipping schema"
                );
                skipped_schemas.push(schema.clone());
                continue;
            }
            let mut pipeline = build_pipeline(
                self.config.classifier,
                self.config.vectorizer,
                self.config.hashing_dimensions,
            );
            match pipeline.fit(schema, &text_refs, &labels) {
                Ok(()) => {
                    debug!(schema = %schema, rows = labels.len(), model = %pipeline.describe(), "classifier trained");
                    pipelines.push((schema.clone(), pipeline));
                }
                Err(e) => {
                    warn!(schema = %schema, error = %e, "classifier training failed, skipping schema");
                    skipped_schemas.push(schema.clone());
                }
            }
        }

        let mut unlabeled: Vec<String> = catalog
            .iter()
            .filter(|inst| inst.kind == InstanceKind::Item && !by_instance.contains_key(inst.id.as_str()))
            .map(|inst| inst.id.clone())
            .collect();
        unlabeled.shuffle(&mut *rng);
        drop(rng);

        let total = unlabeled.len();
        let pct = self.config.random_sample_percent.clamp(0.0, 100.0);
        let random_len = ((total as f64 * pct / 100.0).round() as usize).min(total);
        let random = unlabeled.split_off(total - random_len);
        let mut head = unlabeled;
        let deferred = match self.config.max_inferred_predictions {
            Some(cap) if cap < head.len() => head.split_off(cap),
            _ => Vec::new(),
        };

        cancel.checkpoint()?;
        let mut scored: Vec<(String, f64, Option<String>)> = head
            .into_par_iter()
            .map(|id| {
                let text = catalog.get(&id).map(|inst| self.text_of(inst)).unwrap_or_default();
                let mut best = (0.0, None);
                for (schema, pipeline) in &pipelines {
                    let confidence = pipeline.confidence(&text);
                    if confidence > best.0 {
                        best = (confidence, Some(schema.clone()));
                    }
                }
                (id, best.0, best.1)
            })
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(CmpOrdering::Equal));

        let mut selections = BTreeMap::new();
        let mut ranked = Vec::with_capacity(scored.len());
        for (id, _, schema) in scored {
            selections.insert(id.clone(), Selection::Classifier { schema });
            ranked.push(id);
        }
        for id in &random {
            selections.insert(id.clone(), Selection::Random);
        }
        for id in &deferred {
            selections.insert(id.clone(), Selection::Deferred);
        }
        let mut new_order = interleave(ranked, random);
        new_order.extend(deferred);

        let trained_schemas: Vec<String> = pipelines.into_iter().map(|(s, _)| s).collect();
        info!(
            pass_id = %pass_id,
            trained = trained_schemas.len(),
            skipped = skipped_schemas.len(),
            unlabeled = total,
            "active learning plan computed"
        );
        Ok(ReorderPlan {
            pass_id,
            new_order,
            exposed,
            selections,
            trained_schemas,
            skipped_schemas,
        })
    }

    fn text_of(&self, inst: &Instance) -> String {
        inst.field_str(&self.text_key)
            .unwrap_or_else(|| inst.displayed_text.clone())
    }
}

/// First selected label of `schema`, if any.
fn first_label(labels: &LabelAnnotation, schema: &str) -> Option<String> {
    labels
        .schema(schema)?
        .iter()
        .find(|(_, value)| !value.is_empty())
        .map(|(label, _)| label.clone())
}

/// Apply `plan` user by user. The protected set is widened with answers
/// recorded since the plan was computed. Cancellation stops before the next
/// user; finished users keep their new order.
pub fn apply_plan(
    plan: &ReorderPlan,
    users: &UserStateManager,
    cancel: &CancellationToken,
) -> PassReport {
    let user_ids = users.user_ids();
    let mut exposed = plan.exposed.clone();
    for user_id in &user_ids {
        users.with_user(user_id, |state| {
            exposed.extend(state.answered_ids().into_iter().map(str::to_string));
        });
    }

    let mut report = PassReport {
        pass_id: plan.pass_id,
        ran: true,
        trained_schemas: plan.trained_schemas.clone(),
        skipped_schemas: plan.skipped_schemas.clone(),
        ranked: plan.count(&Selection::Classifier { schema: None }),
        random: plan.count(&Selection::Random),
        deferred: plan.count(&Selection::Deferred),
        users_reordered: 0,
        failures: Vec::new(),
        cancelled: false,
    };

    for user_id in &user_ids {
        if cancel.is_cancelled() {
            warn!(pass_id = %plan.pass_id, "active learning pass cancelled while applying");
            report.cancelled = true;
            break;
        }
        let outcome = users.with_user_mut(user_id, |state| {
            state.reorder_suffix(&plan.new_order, &exposed)
        });
        match outcome {
            Some(Ok(())) => report.users_reordered += 1,
            Some(Err(e)) => {
                error!(pass_id = %plan.pass_id, user_id = %user_id, error = %e, "reorder rejected");
                report.failures.push(UserFailure {
                    user_id: user_id.clone(),
                    error: e.to_string(),
                });
            }
            // Dropped between planning and applying.
            None => {}
        }
    }
    report
}
