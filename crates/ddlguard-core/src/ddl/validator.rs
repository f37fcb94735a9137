//! Statement-level guardrail validation.

use std::sync::Arc;

use tracing::warn;

use crate::guardrails::{
    Decision, ElementLabel, GuardrailEvaluator, GuardrailRegistry, GuardrailViolation,
};
use crate::security::{ExclusionPredicate, Principal, SuperuserExclusion};
use crate::types::TypeExpression;

/// Verdict on a whole DDL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    Accepted,
    /// Accepted; the warnings are reported to the client in element order.
    AcceptedWithWarnings(Vec<String>),
    /// Not applied.
    Rejected(GuardrailViolation),
}

impl StatementOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, StatementOutcome::Rejected(_))
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            StatementOutcome::AcceptedWithWarnings(warnings) => warnings,
            _ => &[],
        }
    }

    /// Convert to a result, keeping the warnings.
    pub fn into_result(self) -> Result<Vec<String>, GuardrailViolation> {
        match self {
            StatementOutcome::Accepted => Ok(Vec::new()),
            StatementOutcome::AcceptedWithWarnings(warnings) => Ok(warnings),
            StatementOutcome::Rejected(violation) => Err(violation),
        }
    }
}

/// Runs the vector dimensions guardrail over every element a statement
/// declares.
#[derive(Clone)]
pub struct SchemaOperationValidator {
    registry: Arc<GuardrailRegistry>,
    exclusion: Arc<dyn ExclusionPredicate>,
    evaluator: GuardrailEvaluator,
}

impl SchemaOperationValidator {
    /// Validator exempting internal and superuser principals.
    pub fn new(registry: Arc<GuardrailRegistry>) -> Self {
        Self::with_exclusion(registry, Arc::new(SuperuserExclusion))
    }

    pub fn with_exclusion(
        registry: Arc<GuardrailRegistry>,
        exclusion: Arc<dyn ExclusionPredicate>,
    ) -> Self {
        Self {
            registry,
            exclusion,
            evaluator: GuardrailEvaluator::vector_dimensions(),
        }
    }

    pub fn registry(&self) -> &Arc<GuardrailRegistry> {
        &self.registry
    }

    /// Validate the declared elements of one statement.
    ///
    /// The first failure rejects the statement and stops evaluation.
    /// Otherwise every warning is collected. Thresholds are read once, so the
    /// whole statement is judged against one warn/fail pair even if they are
    /// updated meanwhile.
    pub fn validate(
        &self,
        elements: &[(ElementLabel, TypeExpression)],
        principal: &Principal,
    ) -> StatementOutcome {
        let policy = self.registry.vector_dimensions().policy();
        let mut warnings = Vec::new();

        for (label, ty) in elements {
            let decisions =
                self.evaluator
                    .check(label, ty, principal, &policy, self.exclusion.as_ref());

            for decision in decisions {
                match decision {
                    Decision::Allowed => {}
                    Decision::Warned(message) => warnings.push(message),
                    Decision::Failed(message) => {
                        warn!(
                            guardrail = self.evaluator.guardrail(),
                            element = %label,
                            principal = %principal,
                            %message,
                            "statement rejected by guardrail"
                        );
                        return StatementOutcome::Rejected(GuardrailViolation::new(
                            self.evaluator.guardrail(),
                            message,
                        ));
                    }
                }
            }
        }

        if warnings.is_empty() {
            StatementOutcome::Accepted
        } else {
            StatementOutcome::AcceptedWithWarnings(warnings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{NoExclusion, RoleExclusion};
    use crate::types::ScalarType;

    fn vector(dimensions: u32) -> TypeExpression {
        TypeExpression::vector(TypeExpression::scalar(ScalarType::Int), dimensions).unwrap()
    }

    fn validator() -> SchemaOperationValidator {
        let registry = Arc::new(GuardrailRegistry::new());
        registry.set_vector_dimensions_threshold(2, 4).unwrap();
        SchemaOperationValidator::new(registry)
    }

    fn alice() -> Principal {
        Principal::user("alice")
    }

    #[test]
    fn test_accepted() {
        let elements = vec![
            (ElementLabel::column("k"), TypeExpression::scalar(ScalarType::Int)),
            (ElementLabel::column("v"), vector(2)),
        ];
        assert_eq!(validator().validate(&elements, &alice()), StatementOutcome::Accepted);
        assert_eq!(validator().validate(&[], &alice()), StatementOutcome::Accepted);
    }

    #[test]
    fn test_all_warnings_in_order() {
        let elements = vec![
            (ElementLabel::column("a"), vector(3)),
            (ElementLabel::column("b"), vector(1)),
            (ElementLabel::column("c"), TypeExpression::list(vector(4))),
        ];
        let outcome = validator().validate(&elements, &alice());
        assert_eq!(
            outcome.warnings(),
            &[
                "Column a has a vector of 3 dimensions, this exceeds the warning threshold of 2."
                    .to_string(),
                "Column c has a vector of 4 dimensions, this exceeds the warning threshold of 2."
                    .to_string(),
            ]
        );
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_first_failure_rejects() {
        let elements = vec![
            (ElementLabel::field("a"), vector(3)),
            (ElementLabel::field("b"), vector(5)),
            (ElementLabel::field("c"), vector(6)),
        ];
        let outcome = validator().validate(&elements, &alice());
        let violation = outcome.clone().into_result().unwrap_err();
        assert_eq!(violation.guardrail, "vector_dimensions");
        assert_eq!(
            violation.to_string(),
            "Field b has a vector of 5 dimensions, this exceeds the failure threshold of 4."
        );
        assert!(!outcome.is_accepted());
        assert!(outcome.warnings().is_empty());
    }

    #[test]
    fn test_exempt_principals() {
        let elements = vec![(ElementLabel::column("v"), vector(1000))];
        let validator = validator();
        assert_eq!(validator.validate(&elements, &Principal::Internal), StatementOutcome::Accepted);
        assert_eq!(
            validator.validate(&elements, &Principal::superuser("cassandra")),
            StatementOutcome::Accepted
        );

        let strict = SchemaOperationValidator::with_exclusion(
            Arc::clone(validator.registry()),
            Arc::new(NoExclusion),
        );
        assert!(!strict.validate(&elements, &Principal::superuser("cassandra")).is_accepted());

        let roles = SchemaOperationValidator::with_exclusion(
            Arc::clone(validator.registry()),
            Arc::new(RoleExclusion::new(["etl"])),
        );
        assert!(roles.validate(&elements, &Principal::user("etl")).is_accepted());
        assert!(!roles.validate(&elements, &alice()).is_accepted());
    }

    #[test]
    fn test_threshold_changes_apply_to_next_statement() {
        let validator = validator();
        let elements = vec![(ElementLabel::column("v"), vector(3))];
        assert!(matches!(
            validator.validate(&elements, &alice()),
            StatementOutcome::AcceptedWithWarnings(_)
        ));

        validator.registry().set_vector_dimensions_threshold(-1, 2).unwrap();
        assert!(matches!(
            validator.validate(&elements, &alice()),
            StatementOutcome::Rejected(_)
        ));

        validator.registry().set_vector_dimensions_threshold(-1, -1).unwrap();
        assert_eq!(validator.validate(&elements, &alice()), StatementOutcome::Accepted);
    }

    /// Raises the thresholds the first time it is consulted.
    struct TightenOnFirstCheck {
        registry: Arc<GuardrailRegistry>,
        done: std::sync::atomic::AtomicBool,
    }

    impl ExclusionPredicate for TightenOnFirstCheck {
        fn is_exempt(&self, _principal: &Principal) -> bool {
            if !self.done.swap(true, std::sync::atomic::Ordering::SeqCst) {
                self.registry.set_vector_dimensions_threshold(-1, 1).unwrap();
            }
            false
        }
    }

    /// Counts WARN events emitted while it is the default subscriber.
    struct WarnCounter(Arc<std::sync::atomic::AtomicUsize>);

    impl tracing::Subscriber for WarnCounter {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn test_rejection_logged_once() {
        let elements = vec![
            (ElementLabel::column("a"), vector(3)),
            (ElementLabel::column("b"), TypeExpression::tuple(vec![vector(5), vector(6)])),
        ];
        let warnings = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let outcome = tracing::subscriber::with_default(WarnCounter(warnings.clone()), || {
            validator().validate(&elements, &alice())
        });

        assert!(!outcome.is_accepted());
        // One for the warning on `a`, one for the rejection.
        assert_eq!(warnings.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_one_policy_per_statement() {
        let registry = Arc::new(GuardrailRegistry::new());
        registry.set_vector_dimensions_threshold(2, 4).unwrap();
        let validator = SchemaOperationValidator::with_exclusion(
            Arc::clone(&registry),
            Arc::new(TightenOnFirstCheck {
                registry: Arc::clone(&registry),
                done: Default::default(),
            }),
        );
        let elements = vec![
            (ElementLabel::column("a"), vector(3)),
            (ElementLabel::column("b"), vector(3)),
        ];

        // The update lands while the statement is being checked.
        let outcome = validator.validate(&elements, &alice());
        assert_eq!(outcome.warnings().len(), 2);
        assert_eq!(registry.vector_dimensions_fail_threshold(), Some(1));

        assert!(!validator.validate(&elements, &alice()).is_accepted());
    }

    #[test]
    fn test_idempotent() {
        let validator = validator();
        let elements = vec![(ElementLabel::column("v"), TypeExpression::map(vector(3), vector(5)))];
        assert_eq!(
            validator.validate(&elements, &alice()),
            validator.validate(&elements, &alice())
        );
    }
}
