//! Login form rules

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{collect_field_errors, FormErrors};

/// Email and password as typed into the login form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LoginCredentials {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Invalid email")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// Runs the login rules, keeping the first message per field.
pub fn validate_login(credentials: &LoginCredentials) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();
    if let Err(failures) = credentials.validate() {
        collect_field_errors(&failures, &[("email", "email"), ("password", "password")], "", &mut errors);
    }
    errors.into_result()
}
