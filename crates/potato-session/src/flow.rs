//! Gated assignment flow: initial queues, batch grants and prestudy scoring.

use potato_assignment::TaskAssignmentRegistry;
use potato_catalog::InstanceCatalog;
use potato_core::config::PotatoConfig;
use potato_core::errors::AssignmentError;
use potato_core::models::{ConsentStatus, InstanceKind, PrestudyStatus};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::state::UserAnnotationState;

/// Queue of a brand-new user.
///
/// With assignment on: pre-annotation pages, then prestudy items when the
/// prestudy is enabled. With assignment off: the whole catalog in order.
pub fn initial_queue(
    registry: &TaskAssignmentRegistry,
    catalog: &InstanceCatalog,
    config: &PotatoConfig,
) -> Vec<(String, InstanceKind)> {
    if !config.assignment.enabled {
        return catalog.iter().map(|i| (i.id.clone(), i.kind)).collect();
    }
    let mut ids = registry.pre_annotation_pages();
    if config.prestudy.enabled {
        ids.extend(registry.prestudy_ids());
    }
    with_kinds(ids, catalog)
}

/// Grant a batch if every gate allows it.
///
/// Returns `Ok(false)` without touching the state when the user already
/// holds real work, a gate is unresolved, or the pool is empty. A failed
/// prestudy only appends the failed pages.
pub fn assign_instances<R: Rng>(
    state: &mut UserAnnotationState,
    registry: &TaskAssignmentRegistry,
    catalog: &InstanceCatalog,
    config: &PotatoConfig,
    rng: &mut R,
) -> Result<bool, AssignmentError> {
    let user_id = state.user_id.clone();
    if state.assigned_count() > 0 {
        warn!(user_id = %user_id, "refused assignment: user already holds instances");
        return Ok(false);
    }
    if config.prestudy.enabled && state.prestudy_status == PrestudyStatus::Unknown {
        warn!(user_id = %user_id, "refused assignment: prestudy unresolved");
        return Ok(false);
    }
    if config.consent.enabled && state.consent_status != ConsentStatus::Agreed {
        warn!(user_id = %user_id, "refused assignment: consent not given");
        return Ok(false);
    }
    if state.prestudy_status == PrestudyStatus::Failed {
        let pages = with_kinds(registry.prestudy_failed_pages(), catalog);
        state.extend_queue(pages);
        info!(user_id = %user_id, "prestudy failed; showing failed pages");
        return Ok(false);
    }

    let assignment = &config.assignment;
    let batch = registry.grant(
        &user_id,
        assignment.instance_per_annotator,
        assignment.sampling_strategy,
        assignment.test_question_per_annotator,
        rng,
    )?;
    if batch.is_empty() {
        warn!(user_id = %user_id, "no unassigned instances left");
        return Ok(false);
    }

    let mut ids = Vec::new();
    if state.prestudy_status == PrestudyStatus::Passed {
        ids.extend(registry.prestudy_passed_pages());
    }
    let granted = batch.len();
    ids.extend(batch);
    ids.extend(registry.post_annotation_pages());
    state.extend_queue(with_kinds(ids, catalog));
    info!(
        user_id = %user_id,
        granted,
        queue_len = state.queue().len(),
        "instances assigned"
    );
    Ok(true)
}

/// Score the prestudy. `None` while any prestudy item is unanswered.
pub fn evaluate_prestudy(
    state: &UserAnnotationState,
    catalog: &InstanceCatalog,
    config: &PotatoConfig,
) -> Option<bool> {
    let prestudy = &config.prestudy;
    let schema_type = config.schema(&prestudy.question_key)?.annotation_type;
    let items: Vec<&str> = state
        .queue()
        .iter()
        .filter(|(_, kind)| *kind == InstanceKind::Prestudy)
        .map(|(id, _)| id)
        .collect();
    if items.is_empty() {
        return Some(true);
    }

    let mut correct = 0usize;
    for id in &items {
        let answer = state
            .labels(id)?
            .resolve(&prestudy.question_key, schema_type)?
            .as_key();
        let mapped = prestudy.answer_mapping.get(&answer).cloned().unwrap_or(answer);
        let expected = catalog
            .get(id)
            .and_then(|inst| inst.field_str(&prestudy.groundtruth_key));
        if expected.as_deref() == Some(mapped.as_str()) {
            correct += 1;
        }
    }
    let score = correct as f64 / items.len() as f64;
    debug!(user_id = %state.user_id, score, "prestudy scored");
    Some(score >= prestudy.minimum_score)
}

/// Score the prestudy and, once complete, record the outcome on the user
/// and in the registry, then try to assign. Returns the resolved status.
pub fn resolve_prestudy<R: Rng>(
    state: &mut UserAnnotationState,
    registry: &TaskAssignmentRegistry,
    catalog: &InstanceCatalog,
    config: &PotatoConfig,
    rng: &mut R,
) -> Result<Option<PrestudyStatus>, AssignmentError> {
    if state.prestudy_status.is_resolved() {
        return Ok(Some(state.prestudy_status));
    }
    let Some(passed) = evaluate_prestudy(state, catalog, config) else {
        return Ok(None);
    };
    state.prestudy_status.resolve(passed);
    registry.record_prestudy_result(&state.user_id, passed);
    info!(user_id = %state.user_id, passed, "prestudy resolved");
    assign_instances(state, registry, catalog, config, rng)?;
    Ok(Some(state.prestudy_status))
}

fn with_kinds(ids: Vec<String>, catalog: &InstanceCatalog) -> Vec<(String, InstanceKind)> {
    ids.into_iter()
        .map(|id| {
            let kind = catalog.kind_of(&id).unwrap_or(InstanceKind::Item);
            (id, kind)
        })
        .collect()
}

