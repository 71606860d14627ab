//! Input validation for declared secrets.

use crate::core::constants::RESERVED_PREFIX;
use crate::core::types::SecretName;
use crate::error::{ConfigError, Result};

/// The form the platform stores a secret name in.
///
/// Names are matched case-insensitively and listed uppercased, so every
/// declared and referenced name is compared in this form.
pub fn normalize_name(name: &str) -> SecretName {
    name.to_ascii_uppercase()
}

/// Validate a secret name.
///
/// Platform secret names:
/// - Only A-Z, a-z, 0-9, and underscore
/// - Cannot start with a digit
/// - Cannot start with the reserved `GITHUB_` prefix (any case)
/// - Cannot be empty
///
/// # Errors
///
/// Returns `ConfigError::InvalidSecretName` if the name is invalid.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason: String| -> crate::error::Error {
        ConfigError::InvalidSecretName {
            name: name.to_string(),
            reason,
        }
        .into()
    };

    if name.is_empty() {
        return Err(invalid("name is empty".to_string()));
    }

    if let Some(first_char) = name.chars().next() {
        if first_char.is_ascii_digit() {
            return Err(invalid("cannot start with a digit".to_string()));
        }
    }

    for (i, ch) in name.chars().enumerate() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(invalid(format!(
                "invalid character '{}' at position {}. \
                 Only letters, digits, and underscore are allowed",
                ch,
                i + 1
            )));
        }
    }

    if name.to_ascii_uppercase().starts_with(RESERVED_PREFIX) {
        return Err(invalid(format!("the {} prefix is reserved", RESERVED_PREFIX)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("DATABASE_URL").is_ok());
        assert!(validate_name("api_key").is_ok());
        assert!(validate_name("SECRET_123").is_ok());
        assert!(validate_name("_PRIVATE").is_ok());
        assert!(validate_name("A").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(validate_name("").is_err());
        assert!(validate_name("123_KEY").is_err());
        assert!(validate_name("API-KEY").is_err());
        assert!(validate_name("API.KEY").is_err());
        assert!(validate_name("API KEY").is_err());
    }

    #[test]
    fn test_reserved_prefix() {
        assert!(validate_name("GITHUB_TOKEN").is_err());
        assert!(validate_name("github_token").is_err());
        assert!(validate_name("MY_GITHUB_TOKEN").is_ok());
    }

    #[test]
    fn test_error_carries_name() {
        let err = validate_name("BAD-NAME").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::InvalidSecretName { ref name, .. })
                if name == "BAD-NAME"
        ));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("api_key"), "API_KEY");
        assert_eq!(normalize_name("Mixed_Case_1"), "MIXED_CASE_1");
        assert_eq!(normalize_name("ALREADY"), "ALREADY");
    }
}
