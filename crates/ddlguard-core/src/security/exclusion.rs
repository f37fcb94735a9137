//! Guardrail exemption rules.

use std::collections::HashSet;

use super::principal::Principal;

/// Decides whether a principal bypasses guardrails.
pub trait ExclusionPredicate: Send + Sync {
    /// Returns true if guardrails should not be applied to `principal`.
    fn is_exempt(&self, principal: &Principal) -> bool;
}

/// Internal operations and superusers are exempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperuserExclusion;

impl ExclusionPredicate for SuperuserExclusion {
    fn is_exempt(&self, principal: &Principal) -> bool {
        principal.is_internal() || principal.is_superuser()
    }
}

/// Nobody is exempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExclusion;

impl ExclusionPredicate for NoExclusion {
    fn is_exempt(&self, _principal: &Principal) -> bool {
        false
    }
}

/// Superuser rule plus a fixed set of exempt role names.
#[derive(Debug, Clone, Default)]
pub struct RoleExclusion {
    roles: HashSet<String>,
}

impl RoleExclusion {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}

impl ExclusionPredicate for RoleExclusion {
    fn is_exempt(&self, principal: &Principal) -> bool {
        if SuperuserExclusion.is_exempt(principal) {
            return true;
        }
        principal.role().is_some_and(|role| self.roles.contains(role))
    }
}
