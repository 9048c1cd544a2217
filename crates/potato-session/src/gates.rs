//! Consent and prestudy gate settings, resolved once from the config.

use potato_core::config::PotatoConfig;
use potato_core::errors::ConfigError;
use potato_core::models::{InstanceKind, LabelAnnotation};
use regex::Regex;

/// Gate transition reported by a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    ConsentAgreed,
    ConsentDeclined,
    /// A prestudy item was answered; the caller should score the prestudy.
    PrestudyAnswered,
}

/// Which gates are active and how their items are recognized.
#[derive(Debug, Clone)]
pub struct Gates {
    pub consent_required: bool,
    consent_pattern: Option<Regex>,
    consent_question: String,
    consent_agree_label: String,
    pub prestudy_enabled: bool,
}

impl Gates {
    pub fn from_config(config: &PotatoConfig) -> Result<Self, ConfigError> {
        let consent_pattern = if config.consent.enabled {
            let re = Regex::new(&config.consent.instance_pattern).map_err(|e| {
                ConfigError::InvalidValue {
                    field: "consent.instance_pattern".to_string(),
                    reason: e.to_string(),
                }
            })?;
            Some(re)
        } else {
            None
        };
        Ok(Self {
            consent_required: config.consent.enabled,
            consent_pattern,
            consent_question: config.consent.question_key.clone(),
            consent_agree_label: config.consent.agree_label.clone(),
            prestudy_enabled: config.prestudy.enabled,
        })
    }

    /// No gate at all.
    pub fn open() -> Self {
        Self {
            consent_required: false,
            consent_pattern: None,
            consent_question: String::new(),
            consent_agree_label: String::new(),
            prestudy_enabled: false,
        }
    }

    pub fn is_consent_item(&self, instance_id: &str) -> bool {
        self.consent_pattern
            .as_ref()
            .is_some_and(|re| re.is_match(instance_id))
    }

    /// True when the consent schema holds the agree label set to `true`.
    pub fn is_agreement(&self, labels: &LabelAnnotation) -> bool {
        labels
            .schema(&self.consent_question)
            .and_then(|answers| answers.get(&self.consent_agree_label))
            .is_some_and(|v| v == "true")
    }

    pub fn is_prestudy_item(&self, kind: Option<InstanceKind>) -> bool {
        self.prestudy_enabled && kind == Some(InstanceKind::Prestudy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consent_items_match_only_when_enabled() {
        let mut config = PotatoConfig::default();
        assert!(!Gates::from_config(&config).unwrap().is_consent_item("consent"));
        config.consent.enabled = true;
        config.consent.instance_pattern = "^consent_".to_string();
        let gates = Gates::from_config(&config).unwrap();
        assert!(gates.is_consent_item("consent_form"));
        assert!(!gates.is_consent_item("doc_consent"));
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let mut config = PotatoConfig::default();
        config.consent.enabled = true;
        config.consent.instance_pattern = "(".to_string();
        assert!(matches!(
            Gates::from_config(&config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn agreement_needs_true_on_agree_label() {
        let gates = Gates::from_config(&PotatoConfig::default()).unwrap();
        let q = potato_core::config::defaults::DEFAULT_CONSENT_QUESTION_KEY;
        let mut yes = LabelAnnotation::new();
        yes.insert(q, "Yes", "true");
        let mut no = LabelAnnotation::new();
        no.insert(q, "No", "true");
        assert!(gates.is_agreement(&yes));
        assert!(!gates.is_agreement(&no));
    }
}
