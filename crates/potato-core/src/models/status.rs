use serde::{Deserialize, Serialize};

/// Outcome of the prestudy gate. Leaves `Unknown` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrestudyStatus {
    #[default]
    Unknown,
    Passed,
    Failed,
}

impl PrestudyStatus {
    pub fn is_resolved(self) -> bool {
        self != Self::Unknown
    }

    /// Record the outcome. Returns false if already resolved.
    pub fn resolve(&mut self, passed: bool) -> bool {
        if self.is_resolved() {
            return false;
        }
        *self = if passed { Self::Passed } else { Self::Failed };
        true
    }
}

/// Outcome of the consent gate. Leaves `Unknown` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConsentStatus {
    #[default]
    Unknown,
    Agreed,
    Declined,
}

impl ConsentStatus {
    pub fn is_resolved(self) -> bool {
        self != Self::Unknown
    }

    /// Record the answer. Returns false if already resolved.
    pub fn resolve(&mut self, agreed: bool) -> bool {
        if self.is_resolved() {
            return false;
        }
        *self = if agreed { Self::Agreed } else { Self::Declined };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prestudy_status_is_write_once() {
        let mut s = PrestudyStatus::Unknown;
        assert!(s.resolve(false));
        assert!(!s.resolve(true));
        assert_eq!(s, PrestudyStatus::Failed);
    }

    #[test]
    fn consent_status_is_write_once() {
        let mut s = ConsentStatus::default();
        assert!(!s.is_resolved());
        assert!(s.resolve(true));
        assert!(!s.resolve(false));
        assert_eq!(s, ConsentStatus::Agreed);
    }
}
