use std::collections::BTreeSet;
use std::sync::Arc;

use potato_agreement::{AgreementValue, OverallAgreement};
use potato_catalog::InstanceCatalog;
use potato_core::config::{PotatoConfig, StorageBackend};
use potato_core::errors::{ConfigError, PotatoError};
use potato_core::models::{AnnotationSchema, InstanceKind, PrestudyStatus, SchemaType};
use potato_engine::{AnnotationEngine, Navigation, SchemaSelection, UserSelection};
use potato_session::UserPhase;
use potato_storage::SqliteSnapshotStore;
use serde_json::Value;
use test_fixtures::{catalog_from, catalog_of, instance, item, item_ids, sentiment_config};

fn engine_with(config: PotatoConfig, catalog: InstanceCatalog) -> AnnotationEngine {
    AnnotationEngine::in_memory(config, catalog).unwrap()
}

fn quota_config(labels_per_instance: usize, instance_per_annotator: usize) -> PotatoConfig {
    let mut config = sentiment_config();
    config.assignment.labels_per_instance = labels_per_instance;
    config.assignment.instance_per_annotator = instance_per_annotator;
    config
}

fn whole_catalog_config() -> PotatoConfig {
    let mut config = sentiment_config();
    config.assignment.enabled = false;
    config
}

fn choose(engine: &AnnotationEngine, user: &str, instance: &str, label: &str) -> bool {
    let key = format!("sentiment:::{label}");
    engine
        .record_form_submission(user, instance, &[(key.as_str(), "true")])
        .unwrap()
}

// ── Assignment ──

#[test]
fn five_annotators_exhaust_the_pool_with_each_item_labeled_twice() {
    let engine = engine_with(quota_config(2, 4), catalog_of(10));
    for i in 0..5 {
        let state = engine.get_or_create_user_state(&format!("user_{i}")).unwrap();
        assert_eq!(state.assigned_count(), 4);
        let distinct: BTreeSet<&String> = state.queue().ids().iter().collect();
        assert_eq!(distinct.len(), 4);
    }

    assert_eq!(engine.registry().remaining_count(), 0);
    assert!(engine.campaign_saturated());
    for id in item_ids(10) {
        assert_eq!(engine.registry().assigned_users(&id).len(), 2, "{id}");
    }

    let err = engine.get_or_create_user_state("late").unwrap_err();
    assert!(matches!(err, PotatoError::CampaignSaturated { remaining: 0 }));
    assert!(!engine.users().contains("late"));
}

#[test]
fn existing_annotators_are_returned_unchanged() {
    let engine = engine_with(quota_config(1, 3), catalog_of(9));
    let first = engine.get_or_create_user_state("alice").unwrap();
    let again = engine.get_or_create_user_state("alice").unwrap();
    assert_eq!(first, again);
    assert_eq!(engine.registry().remaining_count(), 6);
}

#[test]
fn disabled_assignment_hands_out_the_whole_catalog() {
    let engine = engine_with(whole_catalog_config(), catalog_of(6));
    let state = engine.get_or_create_user_state("alice").unwrap();
    assert_eq!(state.queue().ids(), item_ids(6).as_slice());
    assert_eq!(state.assigned_count(), 6);
    assert!(!engine.campaign_saturated());
}

// ── Submissions and navigation ──

#[test]
fn submit_navigate_and_clear() {
    let engine = engine_with(quota_config(1, 3), catalog_of(5));
    let state = engine.get_or_create_user_state("alice").unwrap();
    let x = engine.current_instance("alice").unwrap().id;
    assert_eq!(Some(x.as_str()), state.current_id());

    assert!(choose(&engine, "alice", &x, "positive"));
    let labels = engine.user("alice").unwrap().labels(&x).cloned().unwrap();
    assert_eq!(
        labels.schema("sentiment").unwrap().get("positive").map(String::as_str),
        Some("true")
    );
    assert!(!choose(&engine, "alice", &x, "positive"));

    assert!(engine.navigate("alice", Navigation::Advance(1)).unwrap());
    let next = engine.current_instance("alice").unwrap();
    assert_eq!(next.id, state.queue().ids()[1]);

    assert!(engine.record_form_submission("alice", &x, &[]).unwrap());
    assert!(engine.user("alice").unwrap().labels(&x).is_none());
    assert_eq!(engine.phase("alice").unwrap(), UserPhase::Assigned);
}

#[test]
fn navigation_is_clamped_and_can_jump_to_open_work() {
    let engine = engine_with(whole_catalog_config(), catalog_of(4));
    engine.get_or_create_user_state("alice").unwrap();
    assert!(engine.navigate("alice", Navigation::GoTo(100)).unwrap());
    assert_eq!(engine.current_instance("alice").unwrap().id, "doc_3");
    assert!(!engine.navigate("alice", Navigation::Forward).unwrap());

    choose(&engine, "alice", "doc_0", "negative");
    choose(&engine, "alice", "doc_1", "negative");
    assert!(engine.navigate("alice", Navigation::FirstUnanswered).unwrap());
    assert_eq!(engine.current_instance("alice").unwrap().id, "doc_2");
    assert!(engine.navigate("alice", Navigation::Back).unwrap());
    assert_eq!(engine.current_instance("alice").unwrap().id, "doc_1");
}

#[test]
fn lookups_fail_with_typed_errors() {
    let engine = engine_with(quota_config(1, 3), catalog_of(5));
    let state = engine.get_or_create_user_state("alice").unwrap();

    let err = engine.current_instance("ghost").unwrap_err();
    assert!(matches!(err, PotatoError::UserNotFound { .. }));
    let err = engine.navigate("ghost", Navigation::Forward).unwrap_err();
    assert!(matches!(err, PotatoError::UserNotFound { .. }));

    let err = engine
        .record_form_submission("alice", "no_such_doc", &[])
        .unwrap_err();
    assert!(matches!(err, PotatoError::InstanceNotFound { .. }));

    let not_mine = item_ids(5)
        .into_iter()
        .find(|id| !state.queue().contains(id))
        .unwrap();
    let err = engine
        .record_form_submission("alice", &not_mine, &[("sentiment:::positive", "true")])
        .unwrap_err();
    assert!(matches!(err, PotatoError::InstanceNotFound { instance_id } if instance_id == not_mine));
}

#[test]
fn behavior_fields_feed_user_statistics() {
    let engine = engine_with(whole_catalog_config(), catalog_of(3));
    engine.get_or_create_user_state("alice").unwrap();
    engine
        .record_form_submission(
            "alice",
            "doc_0",
            &[
                ("sentiment:::positive", "true"),
                ("behavior_time_string", "Time spent: 0d 0h 1m 30s "),
            ],
        )
        .unwrap();
    engine
        .record_form_submission(
            "alice",
            "doc_1",
            &[
                ("sentiment:::neutral", "true"),
                ("behavior_time_string", "Time spent: 0d 0h 0m 30s "),
            ],
        )
        .unwrap();

    let stats = engine.user_statistics("alice").unwrap();
    assert_eq!(stats.annotated, 2);
    assert_eq!(stats.total_seconds, 120);
    assert_eq!(stats.average_seconds, Some(60.0));

    let campaign = engine.campaign_statistics();
    assert_eq!(campaign.total_users, 1);
    assert_eq!(campaign.total_finished, 2);
    assert_eq!(campaign.finished_users, 0);
}

// ── Gates ──

fn consent_catalog() -> InstanceCatalog {
    catalog_from(vec![
        instance("consent", "agree?", InstanceKind::PreAnnotationPage),
        item("a", "x"),
        item("b", "y"),
        item("c", "z"),
    ])
}

#[test]
fn consent_unlocks_assignment() {
    let mut config = quota_config(1, 3);
    config.consent.enabled = true;
    let question = config.consent.question_key.clone();
    let engine = engine_with(config, consent_catalog());

    let state = engine.get_or_create_user_state("alice").unwrap();
    assert_eq!(state.queue().ids(), &["consent"]);
    assert_eq!(engine.phase("alice").unwrap(), UserPhase::AwaitingConsent);

    let yes = format!("{question}:::Yes");
    engine
        .record_form_submission("alice", "consent", &[(yes.as_str(), "true")])
        .unwrap();
    assert_eq!(engine.user("alice").unwrap().assigned_count(), 3);
    assert_eq!(engine.phase("alice").unwrap(), UserPhase::Assigned);
    assert_eq!(engine.registry().remaining_count(), 0);
}

#[test]
fn declined_consent_grants_nothing() {
    let mut config = quota_config(1, 3);
    config.consent.enabled = true;
    let question = config.consent.question_key.clone();
    let engine = engine_with(config, consent_catalog());
    engine.get_or_create_user_state("bob").unwrap();

    let no = format!("{question}:::No");
    engine
        .record_form_submission("bob", "consent", &[(no.as_str(), "true")])
        .unwrap();
    assert_eq!(engine.user("bob").unwrap().assigned_count(), 0);
    assert_eq!(engine.registry().remaining_count(), 3);
}

#[test]
fn passing_the_prestudy_through_submissions() {
    let mut config = quota_config(1, 2);
    config.prestudy.enabled = true;
    config.prestudy.question_key = "sentiment".into();
    config.prestudy.minimum_score = 1.0;
    let mut gold = instance("prestudy_1", "gate", InstanceKind::Prestudy);
    gold.payload
        .insert("gold_label".into(), Value::String("positive".into()));
    let catalog = catalog_from(vec![gold, item("a", "x"), item("b", "y")]);
    let engine = engine_with(config, catalog);

    engine.get_or_create_user_state("carol").unwrap();
    assert_eq!(engine.phase("carol").unwrap(), UserPhase::AwaitingPrestudy);
    choose(&engine, "carol", "prestudy_1", "positive");

    let state = engine.user("carol").unwrap();
    assert_eq!(state.prestudy_status, PrestudyStatus::Passed);
    assert_eq!(state.assigned_count(), 2);
    assert_eq!(engine.registry().snapshot().prestudy_passed_users, vec!["carol"]);
}

// ── Active learning ──

#[test]
fn fully_random_pass_permutes_everything_after_the_labeled_head() {
    let mut config = whole_catalog_config();
    config.active_learning.enabled = true;
    config.active_learning.update_rate = 1;
    config.active_learning.random_sample_percent = 100.0;
    let engine = engine_with(config, catalog_of(20));
    engine.get_or_create_user_state("alice").unwrap();
    choose(&engine, "alice", "doc_0", "positive");
    assert!(engine.active_learning_due());

    let report = engine.run_active_learning_pass().unwrap();
    assert!(report.ran);
    assert_eq!(report.users_reordered, 1);
    assert_eq!(report.ranked, 0);
    assert_eq!(report.random, 19);

    let queue = engine.user("alice").unwrap().queue().ids().to_vec();
    assert_eq!(queue[0], "doc_0");
    let tail: BTreeSet<&String> = queue[1..].iter().collect();
    let expected = item_ids(20);
    let expected_tail: BTreeSet<&String> = expected[1..].iter().collect();
    assert_eq!(tail, expected_tail);
    assert_ne!(&queue[1..], &expected[1..]);
}

#[test]
fn disabled_active_learning_is_a_no_op() {
    let engine = engine_with(whole_catalog_config(), catalog_of(5));
    let before = engine.get_or_create_user_state("alice").unwrap();
    let report = engine.run_active_learning_pass().unwrap();
    assert!(!report.ran);
    assert!(!engine.active_learning_due());
    assert_eq!(engine.user("alice").unwrap(), before);
}

// ── Agreement ──

#[test]
fn identical_annotators_agree_perfectly() {
    let engine = engine_with(whole_catalog_config(), catalog_of(5));
    let answers = ["positive", "negative", "positive", "neutral", "negative"];
    for user in ["alice", "bob"] {
        engine.get_or_create_user_state(user).unwrap();
        for (id, label) in item_ids(5).iter().zip(answers) {
            choose(&engine, user, id, label);
        }
    }

    let report = engine
        .compute_agreement(&UserSelection::All, &SchemaSelection::Named("sentiment".into()))
        .unwrap();
    assert_eq!(report.per_schema["sentiment"], AgreementValue::Scalar { alpha: 1.0 });
    assert_eq!(report.overall, OverallAgreement::Mean { alpha: 1.0 });

    let solo = engine
        .compute_agreement(&UserSelection::Only(vec!["alice".into()]), &SchemaSelection::All)
        .unwrap();
    assert!(!solo.per_schema["sentiment"].is_computable());
    assert_eq!(solo.overall, OverallAgreement::NotApplicable);
}

#[test]
fn agreement_rejects_unknown_users_and_schemas() {
    let engine = engine_with(whole_catalog_config(), catalog_of(2));
    let err = engine
        .compute_agreement(&UserSelection::Only(vec!["ghost".into()]), &SchemaSelection::All)
        .unwrap_err();
    assert!(matches!(err, PotatoError::UserNotFound { .. }));
    let err = engine
        .compute_agreement(&UserSelection::All, &SchemaSelection::Named("nope".into()))
        .unwrap_err();
    assert!(matches!(
        err,
        PotatoError::ConfigError(ConfigError::UnknownSchema { .. })
    ));
}

// ── Dropped users ──

#[test]
fn dropping_a_user_returns_their_quota() {
    let engine = engine_with(quota_config(1, 3), catalog_of(6));
    engine.get_or_create_user_state("alice").unwrap();
    assert_eq!(engine.registry().remaining_count(), 3);

    let archived = engine.drop_users(&["alice".to_string()]).unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].assigned_count(), 3);
    assert_eq!(engine.registry().remaining_count(), 6);
    assert!(!engine.users().contains("alice"));
    assert!(engine.store().load_user("alice").unwrap().is_none());

    let err = engine.drop_users(&["alice".to_string()]).unwrap_err();
    assert!(matches!(err, PotatoError::UserNotFound { .. }));
}

// ── Persistence ──

#[test]
fn sqlite_snapshots_restore_users_and_registry() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("potato.db");
    let first = AnnotationEngine::new(
        quota_config(1, 3),
        catalog_of(9),
        Arc::new(SqliteSnapshotStore::open(&db).unwrap()),
    )
    .unwrap();
    first.get_or_create_user_state("alice").unwrap();
    let x = first.current_instance("alice").unwrap().id;
    choose(&first, "alice", &x, "neutral");
    first.persist().unwrap();
    let saved = first.user("alice").unwrap();

    let second = AnnotationEngine::new(
        quota_config(1, 3),
        catalog_of(9),
        Arc::new(SqliteSnapshotStore::open(&db).unwrap()),
    )
    .unwrap();
    assert_eq!(second.registry().remaining_count(), 6);
    assert_eq!(second.restore().unwrap(), 1);
    assert_eq!(second.user("alice").unwrap(), saved);
    assert_eq!(second.registry().remaining_count(), 6);
}

#[test]
fn stored_users_are_loaded_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("potato.db");
    let first = AnnotationEngine::new(
        quota_config(1, 3),
        catalog_of(9),
        Arc::new(SqliteSnapshotStore::open(&db).unwrap()),
    )
    .unwrap();
    let saved = first.get_or_create_user_state("alice").unwrap();

    let second = AnnotationEngine::new(
        quota_config(1, 3),
        catalog_of(9),
        Arc::new(SqliteSnapshotStore::open(&db).unwrap()),
    )
    .unwrap();
    assert_eq!(second.get_or_create_user_state("alice").unwrap(), saved);
    assert_eq!(second.registry().remaining_count(), 6);
}

#[test]
fn grants_survive_a_restart_without_an_explicit_persist() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("potato.db");
    let open = || {
        AnnotationEngine::new(
            quota_config(1, 3),
            catalog_of(6),
            Arc::new(SqliteSnapshotStore::open(&db).unwrap()),
        )
        .unwrap()
    };
    let first = open();
    let alice = first.get_or_create_user_state("alice").unwrap();
    drop(first);

    let second = open();
    assert_eq!(second.restore().unwrap(), 1);
    assert_eq!(second.registry().remaining_count(), 3);
    let bob = second.get_or_create_user_state("bob").unwrap();
    let alice_items: BTreeSet<&String> = alice.queue().ids().iter().collect();
    let overlap: Vec<&String> = bob
        .queue()
        .ids()
        .iter()
        .filter(|id| alice_items.contains(id))
        .collect();
    assert!(overlap.is_empty(), "granted twice with quota 1: {overlap:?}");
    assert_eq!(second.registry().remaining_count(), 0);
}

#[test]
fn a_partially_failed_drop_still_saves_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("potato.db");
    let open = || {
        AnnotationEngine::new(
            quota_config(1, 3),
            catalog_of(6),
            Arc::new(SqliteSnapshotStore::open(&db).unwrap()),
        )
        .unwrap()
    };
    let first = open();
    first.get_or_create_user_state("alice").unwrap();
    let err = first
        .drop_users(&["alice".to_string(), "ghost".to_string()])
        .unwrap_err();
    assert!(matches!(err, PotatoError::UserNotFound { .. }));
    assert!(!first.users().contains("alice"));
    assert_eq!(first.registry().remaining_count(), 6);
    drop(first);

    assert_eq!(open().registry().remaining_count(), 6);
}

#[test]
fn restored_queues_drop_instances_missing_from_the_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("potato.db");
    let first = AnnotationEngine::new(
        whole_catalog_config(),
        catalog_of(6),
        Arc::new(SqliteSnapshotStore::open(&db).unwrap()),
    )
    .unwrap();
    first.get_or_create_user_state("alice").unwrap();

    let smaller = AnnotationEngine::new(
        whole_catalog_config(),
        catalog_of(4),
        Arc::new(SqliteSnapshotStore::open(&db).unwrap()),
    )
    .unwrap();
    smaller.restore().unwrap();
    assert_eq!(smaller.user("alice").unwrap().queue().ids(), item_ids(4).as_slice());
}

#[test]
fn export_writes_one_line_per_answer() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(whole_catalog_config(), catalog_of(3));
    engine.get_or_create_user_state("alice").unwrap();
    choose(&engine, "alice", "doc_0", "positive");
    choose(&engine, "alice", "doc_2", "negative");

    let path = dir.path().join("out.jsonl");
    assert_eq!(engine.export(&path).unwrap(), 2);
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 2);
    assert!(written.lines().next().unwrap().contains("\"doc_0\""));
}

// ── Construction ──

#[test]
fn from_config_loads_files_and_opens_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("items.jsonl"),
        "{\"id\": \"a\", \"text\": \"x\"}\n{\"id\": \"b\", \"text\": \"y\"}\n",
    )
    .unwrap();
    let mut config = quota_config(1, 2);
    config.data_files = vec!["items.jsonl".into()];
    config.storage.backend = StorageBackend::Sqlite;

    let engine = AnnotationEngine::from_config(config, dir.path()).unwrap();
    assert_eq!(engine.catalog().real_count(), 2);
    assert_eq!(engine.store().name(), "sqlite");
    assert!(dir.path().join("potato.db").exists());
}

#[test]
fn invalid_config_is_rejected_at_startup() {
    let mut config = sentiment_config();
    config.annotation_schemes.clear();
    let err = AnnotationEngine::in_memory(config, catalog_of(1)).err().unwrap();
    assert!(matches!(err, PotatoError::ConfigError(ConfigError::NoSchemas)));
}

// ── Option randomization ──

#[test]
fn option_order_is_stable_per_annotator() {
    let mut config = sentiment_config();
    let mut aspects = AnnotationSchema::new(
        "aspects",
        SchemaType::Multirate,
        &["plot", "acting", "music", "pacing", "visuals", "dialogue"],
    );
    aspects.option_randomization = true;
    config.annotation_schemes.push(aspects);
    let engine = engine_with(config, catalog_of(1));

    let order = engine.option_order("alice", "aspects").unwrap();
    assert_eq!(order, engine.option_order("alice", "aspects").unwrap());
    assert_eq!(order.len(), 6);
    assert_eq!(
        engine.option_order("alice", "sentiment").unwrap(),
        vec!["positive", "negative", "neutral"]
    );
    assert!(engine.option_order("alice", "missing").is_err());
}
