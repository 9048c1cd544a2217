//! Krippendorff's alpha over reliability units.
//!
//! A unit is the list of values the raters gave one item; missing ratings
//! are simply absent. Only units with at least two values are pairable.

/// Distance between two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// 0 when equal, 1 otherwise.
    Nominal,
    /// Squared difference.
    Interval,
}

impl Metric {
    pub fn distance(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Nominal => {
                if a == b {
                    0.0
                } else {
                    1.0
                }
            }
            Self::Interval => (a - b) * (a - b),
        }
    }
}

/// Alpha over `units`. `None` when no unit is pairable.
///
/// Uses the coincidence form `1 - (n - 1) * Do / De`, where `Do` sums the
/// within-unit pair distances weighted by `1 / (m_u - 1)` and `De` sums the
/// distances over every pair of pairable values. A zero expected
/// disagreement (a single value throughout) scores 1.0.
pub fn krippendorff_alpha(units: &[Vec<f64>], metric: Metric) -> Option<f64> {
    let pairable: Vec<&Vec<f64>> = units.iter().filter(|u| u.len() >= 2).collect();
    if pairable.is_empty() {
        return None;
    }

    let mut observed = 0.0;
    for unit in &pairable {
        let weight = 1.0 / (unit.len() - 1) as f64;
        let mut within = 0.0;
        for (i, a) in unit.iter().enumerate() {
            for (j, b) in unit.iter().enumerate() {
                if i != j {
                    within += metric.distance(*a, *b);
                }
            }
        }
        observed += weight * within;
    }

    let values: Vec<f64> = pairable.iter().flat_map(|u| u.iter().copied()).collect();
    let n = values.len() as f64;
    let mut expected = 0.0;
    for (i, a) in values.iter().enumerate() {
        for b in &values[i + 1..] {
            expected += 2.0 * metric.distance(*a, *b);
        }
    }

    if expected == 0.0 {
        return Some(1.0);
    }
    Some(1.0 - (n - 1.0) * observed / expected)
}
