//! Client-side form validation. Anything rejected here never reaches the
//! network layer.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{AppError, ErrorKind};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const PASSWORD_SYMBOLS: &str = r#"!@#$%^&*(),.?":{}|<>"#;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    PasswordTooShort,
    #[error("Password must contain an uppercase letter")]
    PasswordNeedsUppercase,
    #[error("Password must contain a lowercase letter")]
    PasswordNeedsLowercase,
    #[error("Password must contain a number")]
    PasswordNeedsDigit,
    #[error("Password must contain a special character")]
    PasswordNeedsSymbol,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("New email must be different from current email")]
    EmailUnchanged,
    #[error("Answer must be at least 2 characters")]
    AnswerTooShort,
    #[error("Enter at least one search field")]
    EmptySearchCriteria,
    #[error("Dates must use the YYYY-MM-DD format")]
    InvalidDate,
    #[error("Username and password are required")]
    MissingCredentials,
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

/// Password policy: length, upper, lower, digit and one symbol from the
/// fixed set the server enforces.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::PasswordNeedsUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::PasswordNeedsLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordNeedsDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(ValidationError::PasswordNeedsSymbol);
    }
    Ok(())
}

/// Email shape check: non-empty local part and domain with a dot, no
/// whitespace anywhere.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return Err(ValidationError::InvalidEmail);
    };
    if host.is_empty() || tld.is_empty() {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Strict `YYYY-MM-DD` calendar date used by the history search form. The
/// shape check keeps chrono from accepting unpadded fields; the parse
/// rejects impossible dates.
#[must_use]
pub fn is_valid_date_string(value: &str) -> bool {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 4 && *i != 7)
            .all(|(_, b)| b.is_ascii_digit());
    shaped && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod password {
        use super::*;

        #[test]
        fn accepts_a_compliant_password() {
            assert_eq!(validate_password("Gl4ss!pass"), Ok(()));
        }

        #[test]
        fn rejects_each_missing_class() {
            assert_eq!(
                validate_password("Sh0r!t"),
                Err(ValidationError::PasswordTooShort)
            );
            assert_eq!(
                validate_password("gl4ss!pass"),
                Err(ValidationError::PasswordNeedsUppercase)
            );
            assert_eq!(
                validate_password("GL4SS!PASS"),
                Err(ValidationError::PasswordNeedsLowercase)
            );
            assert_eq!(
                validate_password("Glass!pass"),
                Err(ValidationError::PasswordNeedsDigit)
            );
            assert_eq!(
                validate_password("Gl4sspass"),
                Err(ValidationError::PasswordNeedsSymbol)
            );
        }

        #[test]
        fn only_listed_symbols_count() {
            assert_eq!(
                validate_password("Gl4ss pass"),
                Err(ValidationError::PasswordNeedsSymbol)
            );
            assert_eq!(validate_password("Gl4ss>pass"), Ok(()));
        }
    }

    mod email {
        use super::*;

        #[test]
        fn accepts_ordinary_addresses() {
            assert_eq!(validate_email("buyer@shop.example.com"), Ok(()));
            assert_eq!(validate_email("a@b.co"), Ok(()));
        }

        #[test]
        fn rejects_malformed_addresses() {
            for bad in ["", "no-at.example.com", "@shop.com", "buyer@shopcom",
                        "buyer@shop.", "buy er@shop.com", "buyer@@shop.com"] {
                assert_eq!(validate_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
            }
        }
    }

    mod dates {
        use super::*;

        #[test]
        fn accepts_iso_dates_only() {
            assert!(is_valid_date_string("2024-03-05"));
            assert!(!is_valid_date_string("2024-3-5"));
            assert!(!is_valid_date_string("05-03-2024"));
            assert!(!is_valid_date_string("2024/03/05"));
            assert!(!is_valid_date_string(""));
        }

        #[test]
        fn rejects_well_shaped_impossible_dates() {
            assert!(!is_valid_date_string("2024-99-99"));
            assert!(!is_valid_date_string("2024-02-31"));
            assert!(!is_valid_date_string("2024-00-10"));
            assert!(is_valid_date_string("2024-02-29"));
        }
    }
}
