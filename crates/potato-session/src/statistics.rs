//! Working-time and progress statistics.

use std::sync::LazyLock;

use potato_core::constants::TIME_STRING_FIELD;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::state::UserAnnotationState;

static TIME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+)d\s+(\d+)h\s+(\d+)m\s+(\d+)s").ok());

/// Seconds in a client timer string such as `Time spent: 0d 0h 0m 5s `.
/// `None` when the string does not match or the total overflows.
pub fn parse_time_string(s: &str) -> Option<u64> {
    let caps = TIME_PATTERN.as_ref()?.captures(s)?;
    [86_400u64, 3_600, 60, 1]
        .into_iter()
        .enumerate()
        .try_fold(0u64, |total, (i, unit)| {
            let value = caps.get(i + 1)?.as_str().parse::<u64>().ok()?;
            total.checked_add(value.checked_mul(unit)?)
        })
}

/// `45 seconds`, `2.5 minutes`, `1.2 hours`.
pub fn human_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{seconds} seconds")
    } else if seconds < 3_600 {
        format!("{:.1} minutes", seconds as f64 / 60.0)
    } else {
        format!("{:.1} hours", seconds as f64 / 3_600.0)
    }
}

/// Progress of one annotator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatistics {
    pub annotated: usize,
    pub total_seconds: u64,
    pub working_time: String,
    /// `None` until something is annotated.
    pub average_seconds: Option<f64>,
}

impl UserStatistics {
    pub fn from_state(state: &UserAnnotationState) -> Self {
        let total_seconds: u64 = state
            .all_behavior()
            .values()
            .filter_map(|b| match b.get(TIME_STRING_FIELD) {
                Some(Value::String(s)) => parse_time_string(s),
                _ => None,
            })
            .fold(0, u64::saturating_add);
        let annotated = state.all_labels().len();
        let average_seconds = (annotated > 0)
            .then(|| (total_seconds as f64 / annotated as f64 * 10.0).round() / 10.0);
        Self {
            annotated,
            total_seconds,
            working_time: human_duration(total_seconds),
            average_seconds,
        }
    }
}

/// Campaign-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CampaignStatistics {
    pub total_users: usize,
    /// Users that finished every real instance they were granted.
    pub finished_users: usize,
    pub total_finished: usize,
}

impl CampaignStatistics {
    pub fn from_states<'a, I>(states: I) -> Self
    where
        I: IntoIterator<Item = &'a UserAnnotationState>,
    {
        let mut stats = Self::default();
        for state in states {
            let finished = state.finished_count();
            stats.total_users += 1;
            stats.total_finished += finished;
            let assigned = state.assigned_count();
            if assigned > 0 && finished >= assigned {
                stats.finished_users += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use potato_core::models::{BehaviorData, InstanceKind, LabelAnnotation};

    use super::*;
    use crate::Gates;

    #[test]
    fn parses_client_timer_strings() {
        assert_eq!(parse_time_string("Time spent: 0d 0h 0m 5s "), Some(5));
        assert_eq!(parse_time_string("Time spent: 1d 1h 1m 1s"), Some(90_061));
        assert_eq!(parse_time_string("garbage"), None);
    }

    #[test]
    fn oversized_timer_fields_are_discarded() {
        assert_eq!(parse_time_string("Time spent: 999999999999999d 0h 0m 5s "), None);
        assert_eq!(parse_time_string("Time spent: 0d 0h 0m 99999999999999999999s"), None);
    }

    #[test]
    fn working_time_saturates_instead_of_wrapping() {
        let gates = Gates::open();
        let mut state = UserAnnotationState::new("u");
        state.extend_queue([
            ("a".to_string(), InstanceKind::Item),
            ("b".to_string(), InstanceKind::Item),
        ]);
        let near_max = format!("0d 0h 0m {}s", u64::MAX - 1);
        for id in ["a", "b"] {
            let mut labels = LabelAnnotation::new();
            labels.insert("sentiment", "positive", "true");
            let mut behavior = BehaviorData::new();
            behavior.insert(TIME_STRING_FIELD.to_string(), Value::String(near_max.clone()));
            state.set_annotation(id, labels, vec![], behavior, &gates);
        }
        assert_eq!(UserStatistics::from_state(&state).total_seconds, u64::MAX);
    }

    #[test]
    fn durations_pick_a_unit() {
        assert_eq!(human_duration(42), "42 seconds");
        assert_eq!(human_duration(150), "2.5 minutes");
        assert_eq!(human_duration(5_400), "1.5 hours");
    }
}
