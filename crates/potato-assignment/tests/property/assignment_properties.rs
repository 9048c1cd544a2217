use std::collections::BTreeMap;

use potato_assignment::{sample_random, TaskAssignmentRegistry};
use potato_core::config::SamplingStrategy;
use proptest::prelude::*;
use test_fixtures::{catalog_of, item_ids, seeded_rng};

proptest! {
    #[test]
    fn quota_is_conserved_across_grants_and_releases(
        n in 1usize..15,
        quota in 1usize..4,
        batch in 1usize..6,
        users in 1usize..8,
        drop_every in 1usize..4,
        seed in any::<u64>(),
    ) {
        let registry = TaskAssignmentRegistry::initialize(&catalog_of(n), quota, &BTreeMap::new());
        let mut rng = seeded_rng(seed);
        for u in 0..users {
            let user = format!("u{u}");
            registry.grant(&user, batch, SamplingStrategy::Random, 0, &mut rng).unwrap();
            let s = registry.snapshot();
            prop_assert_eq!(s.unassigned.total() + s.assigned_total(), n * quota);
            if u % drop_every == 0 {
                registry.release_user(&user);
                let s = registry.snapshot();
                prop_assert_eq!(s.unassigned.total() + s.assigned_total(), n * quota);
            }
        }
    }

    #[test]
    fn reserve_then_release_restores_prior_state(
        n in 1usize..10,
        quota in 1usize..3,
        pick in any::<prop::sample::Index>(),
    ) {
        let registry = TaskAssignmentRegistry::initialize(&catalog_of(n), quota, &BTreeMap::new());
        let id = item_ids(n)[pick.index(n)].clone();
        let before = serde_json::to_value(registry.snapshot()).unwrap();
        registry.reserve(&id, "alice").unwrap();
        registry.release(&id, "alice").unwrap();
        let after = serde_json::to_value(registry.snapshot()).unwrap();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn random_sample_is_bounded_and_live(
        n in 0usize..20,
        quota in 1usize..3,
        k in 0usize..30,
        seed in any::<u64>(),
    ) {
        let registry = TaskAssignmentRegistry::initialize(&catalog_of(n), quota, &BTreeMap::new());
        let pool = registry.snapshot().unassigned;
        let mut rng = seeded_rng(seed);
        let picked = sample_random(&pool, k, &mut rng);
        prop_assert!(picked.len() <= k.min(pool.len()));
        prop_assert_eq!(picked.len(), k.min(pool.len()));
        for id in &picked {
            prop_assert!(pool.quota(id).unwrap_or(0) > 0);
        }
    }
}
