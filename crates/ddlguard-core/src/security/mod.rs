//! Who is executing a statement, and who the guardrails skip.
//!
//! Guardrails apply to ordinary users. Internal operations and superusers
//! bypass them; [`ExclusionPredicate`] makes that rule pluggable.

pub mod exclusion;
pub mod principal;

pub use exclusion::{ExclusionPredicate, NoExclusion, RoleExclusion, SuperuserExclusion};
pub use principal::Principal;
