use potato_core::models::LabelAnnotation;
use proptest::prelude::*;

fn form_fields() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec(
        (
            "[a-z]{1,4}(:::[a-z]{1,4})?",
            prop_oneof![Just(String::new()), "[a-z]{1,3}"],
        ),
        0..10,
    )
}

proptest! {
    #[test]
    fn normalizing_twice_changes_nothing(fields in form_fields()) {
        let parsed = LabelAnnotation::from_form(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let once = parsed.normalized();
        prop_assert_eq!(once.clone().normalized(), once);
    }

    #[test]
    fn parsed_forms_hold_no_empty_values(fields in form_fields()) {
        let parsed = LabelAnnotation::from_form(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        for (_, answers) in parsed.iter() {
            prop_assert!(answers.values().all(|v| !v.is_empty()));
        }
    }

    #[test]
    fn keys_without_separator_are_ignored(keys in proptest::collection::vec("[a-z]{1,6}", 0..8)) {
        let parsed = LabelAnnotation::from_form(keys.iter().map(|k| (k.as_str(), "true")));
        prop_assert!(parsed.is_empty());
    }
}
