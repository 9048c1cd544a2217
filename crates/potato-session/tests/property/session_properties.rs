use std::collections::HashSet;

use potato_core::models::{BehaviorData, InstanceKind};
use potato_session::{Gates, UserAnnotationState};
use proptest::prelude::*;
use test_fixtures::labels;

fn queued(n: usize, cursor: usize) -> UserAnnotationState {
    let mut state = UserAnnotationState::new("p");
    state.extend_queue((0..n).map(|i| (format!("doc_{i}"), InstanceKind::Item)));
    state.goto(cursor);
    state
}

proptest! {
    #[test]
    fn reorder_is_a_permutation_with_a_stable_prefix(
        n in 1usize..30,
        cursor in 0usize..30,
        order in proptest::collection::vec(0usize..40, 0..40),
        exposed in proptest::collection::vec(0usize..30, 0..10),
    ) {
        let mut state = queued(n, cursor);
        let before: Vec<String> = state.queue().ids().to_vec();
        let cursor = state.cursor();
        let new_order: Vec<String> = order.iter().map(|i| format!("doc_{i}")).collect();
        let exposed: HashSet<String> = exposed.iter().map(|i| format!("doc_{i}")).collect();

        state.reorder_suffix(&new_order, &exposed).unwrap();
        let after = state.queue().ids().to_vec();

        let mut sorted_before = before.clone();
        let mut sorted_after = after.clone();
        sorted_before.sort();
        sorted_after.sort();
        prop_assert_eq!(sorted_before, sorted_after);
        prop_assert_eq!(&after[..=cursor], &before[..=cursor]);

        let kept: Vec<&String> = before
            .iter()
            .enumerate()
            .filter(|(pos, id)| *pos <= cursor || exposed.contains(*id))
            .map(|(_, id)| id)
            .collect();
        let head: Vec<&String> = after.iter().take(kept.len()).collect();
        prop_assert_eq!(head, kept);
    }

    #[test]
    fn empty_order_keeps_the_queue(n in 1usize..20, cursor in 0usize..20) {
        let mut state = queued(n, cursor);
        let before = state.queue().ids().to_vec();
        state.reorder_suffix(&[], &HashSet::new()).unwrap();
        prop_assert_eq!(state.queue().ids(), before.as_slice());
    }

    #[test]
    fn resubmitting_the_same_answer_is_unchanged(
        label in prop::sample::select(vec!["positive", "negative", "neutral"]),
    ) {
        let gates = Gates::open();
        let mut state = queued(1, 0);
        let first = state.set_annotation("doc_0", labels(&[("sentiment", label)]), vec![], BehaviorData::new(), &gates);
        let second = state.set_annotation("doc_0", labels(&[("sentiment", label)]), vec![], BehaviorData::new(), &gates);
        prop_assert!(first.changed);
        prop_assert!(!second.changed);
        prop_assert_eq!(state.finished_count(), 1);
    }
}
