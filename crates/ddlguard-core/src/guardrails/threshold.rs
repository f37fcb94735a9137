//! Warn/fail thresholds and the decision between them.

use parking_lot::RwLock;
use tracing::info;

/// Warn and fail ceilings for one guardrail. `None` disables a ceiling.
///
/// The pair is replaced as a whole, so a copy is always a consistent
/// snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThresholdPolicy {
    warn: Option<u32>,
    fail: Option<u32>,
}

/// Outcome of comparing one value against a [`ThresholdPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Warn { threshold: u32 },
    Fail { threshold: u32 },
}

impl ThresholdPolicy {
    /// Both ceilings disabled.
    pub const DISABLED: ThresholdPolicy = ThresholdPolicy {
        warn: None,
        fail: None,
    };

    pub fn new(warn: Option<u32>, fail: Option<u32>) -> Self {
        Self { warn, fail }
    }

    pub fn warn_threshold(&self) -> Option<u32> {
        self.warn
    }

    pub fn fail_threshold(&self) -> Option<u32> {
        self.fail
    }

    /// Whether any ceiling is set.
    pub fn is_enabled(&self) -> bool {
        self.warn.is_some() || self.fail.is_some()
    }

    /// Compare `value` against the ceilings.
    ///
    /// Comparisons are strict: a value equal to a threshold is allowed. The
    /// fail ceiling is checked first, so a value above both only fails.
    pub fn evaluate(&self, value: u32) -> Verdict {
        match (self.fail, self.warn) {
            (Some(fail), _) if value > fail => Verdict::Fail { threshold: fail },
            (_, Some(warn)) if value > warn => Verdict::Warn { threshold: warn },
            _ => Verdict::Allow,
        }
    }
}

/// A named, runtime-adjustable threshold guardrail.
#[derive(Debug)]
pub struct Threshold {
    name: &'static str,
    policy: RwLock<ThresholdPolicy>,
}

impl Threshold {
    pub fn new(name: &'static str, policy: ThresholdPolicy) -> Self {
        Self {
            name,
            policy: RwLock::new(policy),
        }
    }

    /// Guardrail name as used in configuration and logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Snapshot of the current policy.
    pub fn policy(&self) -> ThresholdPolicy {
        *self.policy.read()
    }

    /// Replace the policy.
    pub fn set_policy(&self, policy: ThresholdPolicy) {
        *self.policy.write() = policy;
        info!(
            guardrail = self.name,
            warn = ?policy.warn_threshold(),
            fail = ?policy.fail_threshold(),
            enabled = policy.is_enabled(),
            "guardrail thresholds updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: ThresholdPolicy = ThresholdPolicy {
        warn: Some(2),
        fail: Some(4),
    };

    #[test]
    fn test_at_or_below_warn_is_allowed() {
        assert_eq!(POLICY.evaluate(1), Verdict::Allow);
        assert_eq!(POLICY.evaluate(2), Verdict::Allow);
    }

    #[test]
    fn test_between_thresholds_warns() {
        assert_eq!(POLICY.evaluate(3), Verdict::Warn { threshold: 2 });
        assert_eq!(POLICY.evaluate(4), Verdict::Warn { threshold: 2 });
    }

    #[test]
    fn test_above_fail_fails() {
        assert_eq!(POLICY.evaluate(5), Verdict::Fail { threshold: 4 });
        assert_eq!(POLICY.evaluate(u32::MAX), Verdict::Fail { threshold: 4 });
    }

    #[test]
    fn test_disabled_ceilings() {
        assert_eq!(ThresholdPolicy::DISABLED.evaluate(u32::MAX), Verdict::Allow);
        assert!(!ThresholdPolicy::DISABLED.is_enabled());

        let warn_only = ThresholdPolicy::new(Some(2), None);
        assert_eq!(warn_only.evaluate(u32::MAX), Verdict::Warn { threshold: 2 });

        let fail_only = ThresholdPolicy::new(None, Some(4));
        assert_eq!(fail_only.evaluate(4), Verdict::Allow);
        assert_eq!(fail_only.evaluate(5), Verdict::Fail { threshold: 4 });
    }

    #[test]
    fn test_fail_at_or_below_warn_never_warns() {
        let inverted = ThresholdPolicy::new(Some(4), Some(2));
        assert_eq!(inverted.evaluate(2), Verdict::Allow);
        assert_eq!(inverted.evaluate(3), Verdict::Fail { threshold: 2 });
        assert_eq!(inverted.evaluate(5), Verdict::Fail { threshold: 2 });

        let equal = ThresholdPolicy::new(Some(3), Some(3));
        assert_eq!(equal.evaluate(3), Verdict::Allow);
        assert_eq!(equal.evaluate(4), Verdict::Fail { threshold: 3 });
    }

    #[test]
    fn test_threshold_cell_snapshots() {
        let threshold = Threshold::new("vector_dimensions", ThresholdPolicy::DISABLED);
        let before = threshold.policy();
        threshold.set_policy(POLICY);

        assert_eq!(before, ThresholdPolicy::DISABLED);
        assert_eq!(threshold.policy(), POLICY);
        assert_eq!(threshold.name(), "vector_dimensions");
    }
}
