//! Authentication endpoints (`/api/auth/*`, `/health`) and the form checks
//! that run before them.

use serde::Deserialize;
use thiserror::Error;

use crate::models::patient::is_valid_email;
use crate::models::user::{
    AuthResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, RegisterRequest,
    ResetPasswordRequest, User, VerifyEmailRequest,
};
use crate::services::api::{ApiClient, ApiError, MessageResponse};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Client-side form validation failure; nothing is sent when this is returned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} es requerido")]
    Required(&'static str),

    #[error("El email no es válido")]
    InvalidEmail,

    #[error("Las contraseñas no coinciden")]
    PasswordMismatch,

    #[error("La contraseña debe tener al menos 6 caracteres")]
    PasswordTooShort,
}

pub fn validate_login(email: &str, password: &str) -> Result<LoginRequest, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required("El email"));
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.is_empty() {
        return Err(ValidationError::Required("La contraseña"));
    }
    Ok(LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Checks shared by the reset-password and change-password forms
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required("La contraseña"));
    }
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// `/api/auth/profile` answers either `{user}` or the bare user
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileResponse {
    Wrapped { user: User },
    Bare(User),
}

impl From<ProfileResponse> for User {
    fn from(response: ProfileResponse) -> Self {
        match response {
            ProfileResponse::Wrapped { user } | ProfileResponse::Bare(user) => user,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait AuthApi {
    fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;
    fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;
    /// Profile of the token holder; fails with 401/403 when the token is rejected
    fn profile(&self) -> Result<User, ApiError>;
    fn forgot_password(&self, email: &str) -> Result<ForgotPasswordResponse, ApiError>;
    fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse, ApiError>;
    fn verify_email(&self, token: &str) -> Result<MessageResponse, ApiError>;
    fn health(&self) -> Result<HealthStatus, ApiError>;
}

pub struct AuthService<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

impl AuthApi for AuthService<'_> {
    fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/api/auth/register", request)
    }

    fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.client.post("/api/auth/login", request)?;
        log::info!("Logged in as user {}", response.user.id);
        Ok(response)
    }

    fn profile(&self) -> Result<User, ApiError> {
        self.client
            .get::<ProfileResponse>("/api/auth/profile")
            .map(User::from)
    }

    fn forgot_password(&self, email: &str) -> Result<ForgotPasswordResponse, ApiError> {
        self.client.post(
            "/api/auth/forgot-password",
            &ForgotPasswordRequest {
                email: email.trim().to_string(),
            },
        )
    }

    fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse, ApiError> {
        self.client.post(
            "/api/auth/reset-password",
            &ResetPasswordRequest {
                token: token.to_string(),
                new_password: new_password.to_string(),
            },
        )
    }

    fn verify_email(&self, token: &str) -> Result<MessageResponse, ApiError> {
        self.client.post(
            "/api/auth/verify-email",
            &VerifyEmailRequest {
                token: token.to_string(),
            },
        )
    }

    fn health(&self) -> Result<HealthStatus, ApiError> {
        self.client.get("/health")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_login_requires_valid_email() {
        assert_eq!(
            validate_login("", "secret"),
            Err(ValidationError::Required("El email"))
        );
        assert_eq!(
            validate_login("no-es-email", "secret"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_login("admin@bak.cl", ""),
            Err(ValidationError::Required("La contraseña"))
        );
        let request = validate_login("  admin@bak.cl ", "secret").unwrap();
        assert_eq!(request.email, "admin@bak.cl");
    }

    #[test_case("abcdef", "abcdef", Ok(()) ; "matching and long enough")]
    #[test_case("abcdef", "abcdeg", Err(ValidationError::PasswordMismatch) ; "mismatch")]
    #[test_case("abc", "abc", Err(ValidationError::PasswordTooShort) ; "too short")]
    #[test_case("", "", Err(ValidationError::Required("La contraseña")) ; "empty")]
    fn test_new_password_rules(password: &str, confirmation: &str, expected: Result<(), ValidationError>) {
        assert_eq!(validate_new_password(password, confirmation), expected);
    }

    #[test]
    fn test_profile_accepts_both_shapes() {
        let user = r#"{"id": 1, "email": "a@b.cl", "first_name": "Ana", "last_name": "Rojas", "role": "admin"}"#;
        let wrapped = format!(r#"{{"user": {}}}"#, user);

        let bare: ProfileResponse = serde_json::from_str(user).unwrap();
        let wrapped: ProfileResponse = serde_json::from_str(&wrapped).unwrap();
        assert_eq!(User::from(bare), User::from(wrapped));
    }

    #[test]
    fn test_password_message_names_minimum() {
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "La contraseña debe tener al menos 6 caracteres"
        );
    }
}
