//! Executing principal.

use std::fmt;

/// The identity a statement runs as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// The system itself, e.g. schema bootstrap.
    Internal,
    /// An authenticated superuser role.
    Superuser(String),
    /// An authenticated ordinary role.
    User(String),
    /// No authentication.
    Anonymous,
}

impl Principal {
    pub fn superuser(name: impl Into<String>) -> Self {
        Principal::Superuser(name.into())
    }

    pub fn user(name: impl Into<String>) -> Self {
        Principal::User(name.into())
    }

    /// Role name, if authenticated.
    pub fn role(&self) -> Option<&str> {
        match self {
            Principal::Superuser(name) | Principal::User(name) => Some(name),
            Principal::Internal | Principal::Anonymous => None,
        }
    }

    pub fn is_superuser(&self) -> bool {
        matches!(self, Principal::Superuser(_))
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Principal::Internal)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Internal => write!(f, "<internal>"),
            Principal::Superuser(name) | Principal::User(name) => write!(f, "{}", name),
            Principal::Anonymous => write!(f, "<anonymous>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role() {
        assert_eq!(Principal::user("alice").role(), Some("alice"));
        assert_eq!(Principal::superuser("cassandra").role(), Some("cassandra"));
        assert_eq!(Principal::Internal.role(), None);
        assert_eq!(Principal::Anonymous.role(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Principal::user("alice").to_string(), "alice");
        assert_eq!(Principal::Internal.to_string(), "<internal>");
    }
}
