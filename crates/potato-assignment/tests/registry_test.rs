use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use potato_assignment::TaskAssignmentRegistry;
use potato_core::config::SamplingStrategy;
use potato_core::errors::AssignmentError;
use potato_core::models::InstanceKind;
use test_fixtures::{catalog_from, catalog_of, instance, item, seeded_rng};

fn conserved(registry: &TaskAssignmentRegistry) -> bool {
    let s = registry.snapshot();
    s.unassigned.total() + s.assigned_total() == s.initial_total()
}

// ── Initialization ──

#[test]
fn initialize_routes_special_ids_into_their_pools() {
    let catalog = catalog_from(vec![
        instance("intro", "hi", InstanceKind::PreAnnotationPage),
        item("doc_1", "a"),
        item("doc_2", "b"),
        instance("q_testing_x", "t", InstanceKind::TestQuestion),
        instance("prestudy_1", "p", InstanceKind::Prestudy),
        instance("bye", "bye", InstanceKind::PostAnnotationPage),
    ]);
    let mut overrides = BTreeMap::new();
    overrides.insert("doc_2".to_string(), 0);
    let registry = TaskAssignmentRegistry::initialize(&catalog, 3, &overrides);

    let s = registry.snapshot();
    assert_eq!(s.unassigned.len(), 1);
    assert_eq!(registry.quota_of("doc_1"), Some(3));
    assert_eq!(registry.quota_of("doc_2"), None);
    assert_eq!(s.test_question_ids, vec!["q_testing_x"]);
    assert_eq!(registry.prestudy_ids(), vec!["prestudy_1"]);
    assert_eq!(registry.pre_annotation_pages(), vec!["intro"]);
    assert_eq!(registry.post_annotation_pages(), vec!["bye"]);
    assert_eq!(registry.remaining_count(), 3);
}

// ── Reserve / release ──

#[test]
fn reserve_decrements_and_removes_at_zero() {
    let registry = TaskAssignmentRegistry::initialize(&catalog_of(1), 2, &BTreeMap::new());
    registry.reserve("doc_0", "alice").unwrap();
    assert_eq!(registry.quota_of("doc_0"), Some(1));
    registry.reserve("doc_0", "bob").unwrap();
    assert_eq!(registry.quota_of("doc_0"), None);
    assert_eq!(registry.assigned_users("doc_0"), vec!["alice", "bob"]);

    let err = registry.reserve("doc_0", "carol").unwrap_err();
    assert!(matches!(err, AssignmentError::NotFound { .. }));
    assert!(conserved(&registry));
}

#[test]
fn release_of_unheld_instance_is_rejected() {
    let registry = TaskAssignmentRegistry::initialize(&catalog_of(1), 2, &BTreeMap::new());
    let err = registry.release("doc_0", "alice").unwrap_err();
    assert!(matches!(err, AssignmentError::NotAssigned { .. }));
}

#[test]
fn release_user_returns_quota() {
    let registry = TaskAssignmentRegistry::initialize(&catalog_of(3), 1, &BTreeMap::new());
    let mut rng = seeded_rng(1);
    let batch = registry
        .grant("alice", 2, SamplingStrategy::Ordered, 0, &mut rng)
        .unwrap();
    assert_eq!(batch, vec!["doc_0", "doc_1"]);
    assert_eq!(registry.remaining_count(), 1);

    let released = registry.release_user("alice");
    assert_eq!(released.len(), 2);
    assert_eq!(registry.remaining_count(), 3);
    let order: Vec<String> = registry
        .snapshot()
        .unassigned
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();
    assert_eq!(order, vec!["doc_0", "doc_1", "doc_2"]);
    assert!(conserved(&registry));
}

#[test]
fn release_user_returns_every_reservation_of_an_id() {
    let registry = TaskAssignmentRegistry::initialize(&catalog_of(2), 2, &BTreeMap::new());
    registry.reserve("doc_0", "alice").unwrap();
    registry.reserve("doc_0", "alice").unwrap();
    registry.reserve("doc_1", "bob").unwrap();
    assert_eq!(registry.remaining_count(), 1);

    let released = registry.release_user("alice");
    assert_eq!(released, vec!["doc_0", "doc_0"]);
    assert_eq!(registry.quota_of("doc_0"), Some(2));
    assert_eq!(registry.assigned_users("doc_1"), vec!["bob"]);
    assert!(registry.assigned_users("doc_0").is_empty());
    assert!(conserved(&registry));
}

// ── Grant ──

#[test]
fn grant_injects_and_records_test_questions() {
    let mut instances: Vec<_> = (0..4).map(|i| item(&format!("doc_{i}"), "x")).collect();
    instances.push(instance("t_testing_a", "t", InstanceKind::TestQuestion));
    instances.push(instance("t_testing_b", "t", InstanceKind::TestQuestion));
    let registry = TaskAssignmentRegistry::initialize(&catalog_from(instances), 1, &BTreeMap::new());
    let mut rng = seeded_rng(9);

    let batch = registry
        .grant("alice", 3, SamplingStrategy::Random, 1, &mut rng)
        .unwrap();
    assert_eq!(batch.len(), 4);
    assert_eq!(batch.iter().filter(|id| id.contains("testing")).count(), 1);
    assert_eq!(registry.remaining_count(), 1);
    assert!(conserved(&registry));
}

#[test]
fn grant_with_small_test_pool_reserves_nothing() {
    let mut instances: Vec<_> = (0..4).map(|i| item(&format!("doc_{i}"), "x")).collect();
    instances.push(instance("t_testing_a", "t", InstanceKind::TestQuestion));
    let registry = TaskAssignmentRegistry::initialize(&catalog_from(instances), 1, &BTreeMap::new());
    let mut rng = seeded_rng(9);

    let err = registry
        .grant("alice", 3, SamplingStrategy::Random, 2, &mut rng)
        .unwrap_err();
    assert!(matches!(err, AssignmentError::InsufficientPool { .. }));
    assert_eq!(registry.remaining_count(), 4);
}

#[test]
fn ten_by_two_campaign_saturates_after_five_users() {
    let registry = TaskAssignmentRegistry::initialize(&catalog_of(10), 2, &BTreeMap::new());
    let mut rng = seeded_rng(42);
    for user in ["u1", "u2", "u3", "u4", "u5"] {
        let batch = registry
            .grant(user, 4, SamplingStrategy::Random, 0, &mut rng)
            .unwrap();
        assert_eq!(batch.len(), 4);
        let unique: std::collections::HashSet<_> = batch.iter().collect();
        assert_eq!(unique.len(), 4, "a user never gets the same instance twice");
    }
    let s = registry.snapshot();
    assert!(s.unassigned.is_empty());
    assert_eq!(s.assigned.len(), 10);
    assert!(s.assigned.values().all(|users| users.len() == 2));
    assert!(registry.is_saturated(4, 0.7));
}

#[test]
fn saturation_threshold_uses_factor() {
    let registry = TaskAssignmentRegistry::initialize(&catalog_of(3), 1, &BTreeMap::new());
    // 3 remaining vs 0.7 * 4 = 2.8
    assert!(!registry.is_saturated(4, 0.7));
    registry.reserve("doc_0", "a").unwrap();
    assert!(registry.is_saturated(4, 0.7));
    assert!(!registry.is_saturated(4, 0.4));
}

#[test]
fn prestudy_results_are_recorded_once() {
    let registry = TaskAssignmentRegistry::initialize(&catalog_of(1), 1, &BTreeMap::new());
    registry.record_prestudy_result("alice", true);
    registry.record_prestudy_result("alice", false);
    let s = registry.snapshot();
    assert_eq!(s.prestudy_passed_users, vec!["alice"]);
    assert!(s.prestudy_failed_users.is_empty());
}

#[test]
fn snapshot_round_trips_through_json() {
    let registry = TaskAssignmentRegistry::initialize(&catalog_of(4), 2, &BTreeMap::new());
    registry.reserve("doc_2", "alice").unwrap();
    let json = serde_json::to_string(&registry.snapshot()).unwrap();
    let restored = TaskAssignmentRegistry::from_state(serde_json::from_str(&json).unwrap());
    assert_eq!(restored.quota_of("doc_2"), Some(1));
    assert_eq!(restored.assigned_users("doc_2"), vec!["alice"]);
    assert_eq!(restored.remaining_count(), 7);
}

// ── Concurrency ──

#[test]
fn concurrent_grants_never_oversubscribe() {
    let registry = Arc::new(TaskAssignmentRegistry::initialize(
        &catalog_of(20),
        2,
        &BTreeMap::new(),
    ));
    let handles: Vec<_> = (0..10)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let mut rng = seeded_rng(t);
                registry
                    .grant(&format!("user_{t}"), 4, SamplingStrategy::Random, 0, &mut rng)
                    .unwrap()
                    .len()
            })
        })
        .collect();
    let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(granted, 40);
    let s = registry.snapshot();
    assert!(s.assigned.values().all(|users| users.len() <= 2));
    assert!(conserved(&registry));
}
