//! Structured log events for workflow transitions.

/// A batch was granted to an annotator.
pub fn instances_assigned(user_id: &str, granted: usize, queue_len: usize) {
    tracing::info!(
        event = "instances_assigned",
        user_id = %user_id,
        granted = granted,
        queue_len = queue_len,
        "instances assigned"
    );
}

/// A submission changed stored answers.
pub fn annotation_recorded(user_id: &str, instance_id: &str, finished: usize) {
    tracing::debug!(
        event = "annotation_recorded",
        user_id = %user_id,
        instance_id = %instance_id,
        finished = finished,
        "annotation recorded"
    );
}

/// Consent or prestudy resolved for an annotator.
pub fn gate_resolved(user_id: &str, gate: &str, outcome: &str) {
    tracing::info!(
        event = "gate_resolved",
        user_id = %user_id,
        gate = %gate,
        outcome = %outcome,
        "gate resolved"
    );
}

pub fn active_learning_completed(pass_id: &str, users_reordered: usize, failures: usize) {
    tracing::info!(
        event = "active_learning_completed",
        pass_id = %pass_id,
        users_reordered = users_reordered,
        failures = failures,
        "active learning pass completed"
    );
}

/// A new annotator was refused because remaining quota is too low.
pub fn campaign_saturated(user_id: &str, remaining: usize) {
    tracing::warn!(
        event = "campaign_saturated",
        user_id = %user_id,
        remaining = remaining,
        "campaign saturated, annotator refused"
    );
}

pub fn users_dropped(user_ids: &[String], released: usize) {
    tracing::info!(
        event = "users_dropped",
        user_ids = ?user_ids,
        released = released,
        "users dropped"
    );
}
