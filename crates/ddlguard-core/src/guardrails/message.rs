//! Guardrail message text.

use std::fmt;

/// How severe a threshold breach is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Failure,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Failure => write!(f, "failure"),
        }
    }
}

/// Message for a vector whose dimension count exceeds a threshold.
///
/// `label` is the element label, e.g. `Column v` or `Field v`.
pub fn format_message(
    label: &str,
    severity: Severity,
    dimensions: u32,
    threshold: u32,
) -> String {
    format!(
        "{} has a vector of {} dimensions, this exceeds the {} threshold of {}.",
        label, dimensions, severity, threshold
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_message() {
        assert_eq!(
            format_message("Column v", Severity::Warning, 3, 2),
            "Column v has a vector of 3 dimensions, this exceeds the warning threshold of 2."
        );
    }

    #[test]
    fn test_failure_message() {
        assert_eq!(
            format_message("Field v", Severity::Failure, u32::MAX, 4),
            "Field v has a vector of 4294967295 dimensions, this exceeds the failure threshold of 4."
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Failure);
    }
}
