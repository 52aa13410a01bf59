//! Registration and login commands.

use serde::Deserialize;

use crate::error::{FieldErrors, UserError, UserResult};

/// Shortest password accepted on registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Lower-cases and trims an email so lookups ignore case.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Command to register a new user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterUser {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
}

impl RegisterUser {
    /// Checks every field. All problems are reported together.
    pub fn validate(&self) -> UserResult<()> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "Name is required".to_string());
        }
        if self.last_name.trim().is_empty() {
            errors.insert("last_name".to_string(), "Last name is required".to_string());
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email".to_string(), "Email is required".to_string());
        } else if !is_plausible_email(email) {
            errors.insert("email".to_string(), "Invalid email format".to_string());
        }

        if self.password.is_empty() {
            errors.insert("password".to_string(), "Password is required".to_string());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                "password".to_string(),
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }

        if self.confirm_password.is_empty() {
            errors.insert(
                "confirm_password".to_string(),
                "Confirm password is required".to_string(),
            );
        } else if self.password != self.confirm_password {
            errors.insert(
                "confirm_password".to_string(),
                "Passwords do not match".to_string(),
            );
        }

        if self.phone.trim().is_empty() {
            errors.insert("phone".to_string(), "Phone is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(UserError::Validation(errors))
        }
    }
}

/// Command to exchange credentials for an access token.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

impl LoginUser {
    pub fn validate(&self) -> UserResult<()> {
        let mut errors = FieldErrors::new();
        if self.email.trim().is_empty() {
            errors.insert("email".to_string(), "Email is required".to_string());
        }
        if self.password.is_empty() {
            errors.insert("password".to_string(), "Password is required".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(UserError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegisterUser {
        RegisterUser {
            name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            email: "Ana@Example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            phone: "+54 261 555 0101".to_string(),
        }
    }

    fn field_errors(err: UserError) -> FieldErrors {
        match err {
            UserError::Validation(fields) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_empty_registration_reports_every_field() {
        let fields = field_errors(RegisterUser::default().validate().unwrap_err());

        assert_eq!(fields["name"], "Name is required");
        assert_eq!(fields["last_name"], "Last name is required");
        assert_eq!(fields["email"], "Email is required");
        assert_eq!(fields["password"], "Password is required");
        assert_eq!(fields["confirm_password"], "Confirm password is required");
        assert_eq!(fields["phone"], "Phone is required");
    }

    #[test]
    fn test_password_rules() {
        let cmd = RegisterUser {
            password: "abc".to_string(),
            confirm_password: "abd".to_string(),
            ..valid()
        };
        let fields = field_errors(cmd.validate().unwrap_err());

        assert_eq!(fields["password"], "Password must be at least 6 characters");
        assert_eq!(fields["confirm_password"], "Passwords do not match");
    }

    #[test]
    fn test_email_format() {
        for email in ["ana", "ana@", "@example.com", "ana@example", "a b@example.com"] {
            let cmd = RegisterUser {
                email: email.to_string(),
                ..valid()
            };
            let fields = field_errors(cmd.validate().unwrap_err());
            assert_eq!(fields["email"], "Invalid email format", "{email}");
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn test_login_requires_both_fields() {
        let fields = field_errors(LoginUser::default().validate().unwrap_err());
        assert_eq!(fields.len(), 2);

        let login = LoginUser {
            email: "ana@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(login.validate().is_ok());
    }
}
