use potato_core::config::ActiveLearningConfig;
use potato_learning::{interleave, ActiveLearningCoordinator, CancellationToken};
use proptest::prelude::*;
use test_fixtures::catalog_of;

proptest! {
    #[test]
    fn interleave_keeps_every_id_and_each_side_in_order(
        ranked_len in 0usize..20,
        random_len in 0usize..20,
    ) {
        let ranked: Vec<String> = (0..ranked_len).map(|i| format!("r{i}")).collect();
        let random: Vec<String> = (0..random_len).map(|i| format!("x{i}")).collect();
        let out = interleave(ranked.clone(), random.clone());
        prop_assert_eq!(out.len(), ranked_len + random_len);
        let r: Vec<String> = out.iter().filter(|id| id.starts_with('r')).cloned().collect();
        let x: Vec<String> = out.iter().filter(|id| id.starts_with('x')).cloned().collect();
        prop_assert_eq!(r, ranked);
        prop_assert_eq!(x, random);
    }

    #[test]
    fn plan_is_a_permutation_of_the_unlabeled_pool(
        n in 0usize..25,
        pct in 0.0f64..=100.0,
        cap in proptest::option::of(0usize..10),
        seed in any::<u64>(),
    ) {
        let catalog = catalog_of(n);
        let config = ActiveLearningConfig {
            enabled: true,
            random_sample_percent: pct,
            max_inferred_predictions: cap,
            seed: Some(seed),
            ..ActiveLearningConfig::default()
        };
        let coordinator = ActiveLearningCoordinator::new(config, "text");
        let plan = coordinator.plan(&catalog, &[], &CancellationToken::new()).unwrap();
        let mut got = plan.new_order.clone();
        got.sort();
        let mut want = test_fixtures::item_ids(n);
        want.sort();
        prop_assert_eq!(got, want);
    }
}
