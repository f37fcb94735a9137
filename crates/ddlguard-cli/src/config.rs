//! Guardrail settings from a config file plus command-line overrides.

use std::path::Path;

use ddlguard::core::guardrails::ConfigurationResult;
use ddlguard::GuardrailsConfig;

/// Load the guardrail configuration.
///
/// Starts from `path` if given, otherwise from defaults (everything
/// disabled). Threshold flags replace the file's values and exempt roles are
/// appended. The result is validated.
pub fn load(
    path: Option<&Path>,
    warn: Option<i64>,
    fail: Option<i64>,
    exempt_roles: &[String],
) -> ConfigurationResult<GuardrailsConfig> {
    let mut config = match path {
        Some(path) => GuardrailsConfig::from_path(path)?,
        None => GuardrailsConfig::default(),
    };

    if let Some(warn) = warn {
        config.vector_dimensions_warn_threshold = warn;
    }
    if let Some(fail) = fail {
        config.vector_dimensions_fail_threshold = fail;
    }
    for role in exempt_roles {
        config = config.with_exempt_role(role.clone());
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlguard::core::ConfigurationError;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = load(None, None, None, &[]).unwrap();
        assert_eq!(config.vector_dimensions_warn_threshold, -1);
        assert_eq!(config.vector_dimensions_fail_threshold, -1);
        assert!(config.exempt_roles.is_empty());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"vector_dimensions_warn_threshold": 512, "vector_dimensions_fail_threshold": 1024, "exempt_roles": ["etl"]}}"#
        )
        .unwrap();

        let config = load(Some(file.path()), None, Some(2048), &["ops".to_string()]).unwrap();
        assert_eq!(config.vector_dimensions_warn_threshold, 512);
        assert_eq!(config.vector_dimensions_fail_threshold, 2048);
        assert_eq!(config.exempt_roles, vec!["etl".to_string(), "ops".to_string()]);
    }

    #[test]
    fn test_invalid_override_rejected() {
        assert!(matches!(
            load(None, Some(0), None, &[]),
            Err(ConfigurationError::Zero { .. })
        ));
        assert!(load(None, None, Some(-5), &[]).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("guardrails.json");
        assert!(matches!(
            load(Some(&missing), None, None, &[]),
            Err(ConfigurationError::Io { .. })
        ));
    }
}
