use std::collections::BTreeMap;

use serde::Serialize;

/// Agreement for one schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgreementValue {
    Scalar { alpha: f64 },
    /// Multiselect: one alpha per label that had pairable ratings.
    PerLabel { alphas: BTreeMap<String, f64> },
    NotComputable { reason: String },
}

impl AgreementValue {
    pub fn not_computable(reason: impl Into<String>) -> Self {
        Self::NotComputable {
            reason: reason.into(),
        }
    }

    /// Scalar alpha, or the mean over labels. `None` if not computable.
    pub fn as_mean(&self) -> Option<f64> {
        match self {
            Self::Scalar { alpha } => Some(*alpha),
            Self::PerLabel { alphas } if !alphas.is_empty() => {
                Some(alphas.values().sum::<f64>() / alphas.len() as f64)
            }
            _ => None,
        }
    }

    pub fn is_computable(&self) -> bool {
        self.as_mean().is_some()
    }
}

/// Mean over schemas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverallAgreement {
    Mean { alpha: f64 },
    NotApplicable,
}

impl OverallAgreement {
    /// The mean rounded to two decimals, as shown on the admin page.
    pub fn rounded(&self) -> Option<f64> {
        match self {
            Self::Mean { alpha } => Some((alpha * 100.0).round() / 100.0),
            Self::NotApplicable => None,
        }
    }
}

/// Mean of every computable value; per-label values count as their own mean.
/// The mean is kept at full precision; [`OverallAgreement::rounded`] is the
/// display value.
pub fn overall_average<'a, I>(values: I) -> OverallAgreement
where
    I: IntoIterator<Item = &'a AgreementValue>,
{
    let means: Vec<f64> = values.into_iter().filter_map(AgreementValue::as_mean).collect();
    if means.is_empty() {
        return OverallAgreement::NotApplicable;
    }
    OverallAgreement::Mean {
        alpha: means.iter().sum::<f64>() / means.len() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_label_values_are_averaged_first() {
        let mut alphas = BTreeMap::new();
        alphas.insert("a".to_string(), 1.0);
        alphas.insert("b".to_string(), 0.0);
        let values = [
            AgreementValue::PerLabel { alphas },
            AgreementValue::Scalar { alpha: 1.0 },
            AgreementValue::not_computable("no raters"),
        ];
        assert_eq!(overall_average(&values), OverallAgreement::Mean { alpha: 0.75 });
    }

    #[test]
    fn rounding_is_for_display_only() {
        let values = [
            AgreementValue::Scalar { alpha: 1.0 },
            AgreementValue::Scalar { alpha: 0.0 },
            AgreementValue::Scalar { alpha: 0.0 },
        ];
        let overall = overall_average(&values);
        match overall {
            OverallAgreement::Mean { alpha } => assert!((alpha - 1.0 / 3.0).abs() < 1e-12),
            other => panic!("expected a mean, got {other:?}"),
        }
        assert_eq!(overall.rounded(), Some(0.33));
        assert_eq!(OverallAgreement::NotApplicable.rounded(), None);
    }

    #[test]
    fn nothing_computable_is_not_applicable() {
        let values = [AgreementValue::not_computable("x")];
        assert_eq!(overall_average(&values), OverallAgreement::NotApplicable);
        assert_eq!(overall_average(&[]), OverallAgreement::NotApplicable);
    }
}
