//! Shared schema state and guardrail settings.

use std::sync::Arc;

use ddlguard_core::guardrails::{GuardrailRegistry, GuardrailsConfig};
use ddlguard_core::security::{ExclusionPredicate, Principal, RoleExclusion, SuperuserExclusion};
use ddlguard_core::{Catalog, SchemaOperationValidator};
use tracing::info;

use crate::error::Result;
use crate::session::Session;

/// An in-memory schema with its guardrails.
///
/// Cheap to clone; clones share the catalog and thresholds.
#[derive(Clone)]
pub struct Database {
    catalog: Arc<Catalog>,
    validator: SchemaOperationValidator,
}

impl Database {
    /// A database with every guardrail disabled.
    pub fn new() -> Self {
        Self::with_parts(Arc::new(GuardrailRegistry::new()), Arc::new(SuperuserExclusion))
    }

    /// A database configured from `config`.
    ///
    /// Roles listed in `exempt_roles` bypass guardrails along with superusers.
    pub fn with_config(config: &GuardrailsConfig) -> Result<Self> {
        let registry = Arc::new(GuardrailRegistry::from_config(config)?);
        let exclusion: Arc<dyn ExclusionPredicate> = if config.exempt_roles.is_empty() {
            Arc::new(SuperuserExclusion)
        } else {
            let rule = RoleExclusion::new(config.exempt_roles.iter().cloned());
            let mut roles: Vec<&str> = rule.roles().collect();
            roles.sort_unstable();
            info!(?roles, "roles exempt from guardrails");
            Arc::new(rule)
        };
        Ok(Self::with_parts(registry, exclusion))
    }

    /// A database with an explicit exemption rule.
    pub fn with_parts(
        registry: Arc<GuardrailRegistry>,
        exclusion: Arc<dyn ExclusionPredicate>,
    ) -> Self {
        Self {
            catalog: Arc::new(Catalog::new()),
            validator: SchemaOperationValidator::with_exclusion(registry, exclusion),
        }
    }

    /// Open a session executing as `principal`.
    pub fn session(&self, principal: Principal) -> Session {
        Session::new(self.clone(), principal)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn guardrails(&self) -> &Arc<GuardrailRegistry> {
        self.validator.registry()
    }

    pub(crate) fn validator(&self) -> &SchemaOperationValidator {
        &self.validator
    }

    /// Change the vector dimension thresholds. `-1` disables a threshold.
    ///
    /// Takes effect for the next element checked by any session.
    pub fn set_vector_dimensions_threshold(&self, warn: i64, fail: i64) -> Result<()> {
        self.guardrails().set_vector_dimensions_threshold(warn, fail)?;
        Ok(())
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        let db = Database::new();
        assert_eq!(db.guardrails().vector_dimensions_warn_threshold(), None);
        assert_eq!(db.guardrails().vector_dimensions_fail_threshold(), None);
    }

    #[test]
    fn test_with_config() {
        let config = GuardrailsConfig::new().with_vector_dimensions_thresholds(2, 4);
        let db = Database::with_config(&config).unwrap();
        assert_eq!(db.guardrails().vector_dimensions_warn_threshold(), Some(2));

        let bad = GuardrailsConfig::new().with_vector_dimensions_thresholds(-3, 4);
        assert!(Database::with_config(&bad).is_err());
    }

    #[test]
    fn test_clones_share_state() {
        let db = Database::new();
        let other = db.clone();
        other.set_vector_dimensions_threshold(8, 16).unwrap();
        assert_eq!(db.guardrails().vector_dimensions_fail_threshold(), Some(16));
        assert!(Arc::ptr_eq(db.catalog(), other.catalog()));
    }
}
