use potato_agreement::{krippendorff_alpha, Metric};
use proptest::prelude::*;

fn units() -> impl Strategy<Value = Vec<Vec<f64>>> {
    proptest::collection::vec(
        proptest::collection::vec((0u8..5).prop_map(f64::from), 0..4),
        1..12,
    )
}

proptest! {
    #[test]
    fn alpha_never_exceeds_one(units in units()) {
        for metric in [Metric::Nominal, Metric::Interval] {
            if let Some(alpha) = krippendorff_alpha(&units, metric) {
                prop_assert!(alpha <= 1.0 + 1e-9);
                prop_assert!(alpha.is_finite());
            }
        }
    }

    #[test]
    fn identical_raters_agree_fully(values in proptest::collection::vec(0u8..5, 1..12)) {
        let units: Vec<Vec<f64>> = values.iter().map(|v| vec![f64::from(*v); 2]).collect();
        prop_assert_eq!(krippendorff_alpha(&units, Metric::Nominal), Some(1.0));
        prop_assert_eq!(krippendorff_alpha(&units, Metric::Interval), Some(1.0));
    }

    #[test]
    fn unit_order_does_not_matter(units in units()) {
        let mut reversed = units.clone();
        reversed.reverse();
        let a = krippendorff_alpha(&units, Metric::Interval);
        let b = krippendorff_alpha(&reversed, Metric::Interval);
        match (a, b) {
            (Some(x), Some(y)) => prop_assert!((x - y).abs() < 1e-9),
            (x, y) => prop_assert_eq!(x, y),
        }
    }
}
