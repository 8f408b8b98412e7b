//! Bearer token checks.
//!
//! The token is only inspected, never verified: the backend owns the signing
//! key. Claims are read to decide whether a round trip to the server is needed.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::services::api::ApiError;
use crate::services::auth::AuthApi;

/// Tokens expiring within this window are re-checked with the server
pub const REFRESH_WINDOW_SECS: i64 = 5 * 60;

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<f64>,
}

/// Local verdict on a token, before any server call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Malformed,
    Expired,
    /// Valid but close to expiry
    ExpiringSoon,
    Fresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValidation {
    Valid { should_refresh: bool },
    Invalid(String),
}

impl TokenValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, TokenValidation::Valid { .. })
    }
}

fn read_claims(token: &str) -> Option<Claims> {
    if token.split('.').count() != 3 {
        return None;
    }

    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

/// Classify a token at `now` from its claims alone
pub fn inspect_token(token: &str, now: DateTime<Utc>) -> TokenState {
    let Some(claims) = read_claims(token) else {
        return TokenState::Malformed;
    };

    let Some(exp) = claims.exp else {
        return TokenState::Fresh;
    };

    let now_secs = now.timestamp() as f64;
    if exp < now_secs {
        TokenState::Expired
    } else if exp < now_secs + REFRESH_WINDOW_SECS as f64 {
        TokenState::ExpiringSoon
    } else {
        TokenState::Fresh
    }
}

/// Expiry instant encoded in the token, if any
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let exp = read_claims(token)?.exp?;
    DateTime::<Utc>::from_timestamp(exp as i64, 0)
}

/// Full check at `now`; tokens inside the refresh window are confirmed with the server
pub fn validate_token_at(token: &str, now: DateTime<Utc>, auth: &dyn AuthApi) -> TokenValidation {
    match inspect_token(token, now) {
        TokenState::Malformed => TokenValidation::Invalid("Formato de token inválido".to_string()),
        TokenState::Expired => TokenValidation::Invalid("Token expirado".to_string()),
        TokenState::Fresh => TokenValidation::Valid {
            should_refresh: false,
        },
        TokenState::ExpiringSoon => match auth.profile() {
            Ok(_) => TokenValidation::Valid {
                should_refresh: true,
            },
            Err(err) => TokenValidation::Invalid(server_rejection_message(&err).to_string()),
        },
    }
}

pub fn validate_token(token: &str, auth: &dyn AuthApi) -> TokenValidation {
    validate_token_at(token, Utc::now(), auth)
}

fn server_rejection_message(err: &ApiError) -> &'static str {
    match err {
        err if err.is_unauthorized() => "Token inválido o expirado",
        ApiError::Network(_) => "Error de red al validar el token",
        _ => "Error al validar el token",
    }
}

/// Seconds left until `token` enters the refresh window; negative once inside
pub fn seconds_until_refresh(token: &str, now: DateTime<Utc>) -> Option<i64> {
    let expiry = token_expiry(token)?;
    Some((expiry - Duration::seconds(REFRESH_WINDOW_SECS) - now).num_seconds())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::auth::MockAuthApi;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
    }

    pub(crate) fn token_expiring_at(exp: DateTime<Utc>) -> String {
        encode(
            &Header::default(),
            &TestClaims {
                sub: "1".to_string(),
                exp: exp.timestamp(),
            },
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_741_600_000, 0).unwrap()
    }

    fn sample_user() -> crate::models::user::User {
        serde_json::from_str(
            r#"{"id": 1, "email": "a@bak.cl", "first_name": "Ana", "last_name": "Rojas", "role": "admin"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(inspect_token("", now()), TokenState::Malformed);
        assert_eq!(inspect_token("a.b", now()), TokenState::Malformed);
        assert_eq!(inspect_token("a.b.c", now()), TokenState::Malformed);
    }

    #[test]
    fn test_expiry_classification() {
        let expired = token_expiring_at(now() - Duration::seconds(1));
        let soon = token_expiring_at(now() + Duration::minutes(4));
        let fresh = token_expiring_at(now() + Duration::hours(2));

        assert_eq!(inspect_token(&expired, now()), TokenState::Expired);
        assert_eq!(inspect_token(&soon, now()), TokenState::ExpiringSoon);
        assert_eq!(inspect_token(&fresh, now()), TokenState::Fresh);
        assert_eq!(token_expiry(&fresh), Some(now() + Duration::hours(2)));
    }

    #[test]
    fn test_fresh_token_skips_server() {
        let auth = MockAuthApi::new();
        let token = token_expiring_at(now() + Duration::hours(1));
        assert_eq!(
            validate_token_at(&token, now(), &auth),
            TokenValidation::Valid {
                should_refresh: false
            }
        );
    }

    #[test]
    fn test_expiring_token_is_checked_with_server() {
        let mut auth = MockAuthApi::new();
        auth.expect_profile().times(1).returning(|| Ok(sample_user()));
        let token = token_expiring_at(now() + Duration::minutes(2));
        assert_eq!(
            validate_token_at(&token, now(), &auth),
            TokenValidation::Valid {
                should_refresh: true
            }
        );
    }

    #[test]
    fn test_server_rejection_messages() {
        let token = token_expiring_at(now() + Duration::minutes(2));

        let mut auth = MockAuthApi::new();
        auth.expect_profile().returning(|| {
            Err(ApiError::Http {
                status: 401,
                message: "Token inválido".to_string(),
            })
        });
        assert_eq!(
            validate_token_at(&token, now(), &auth),
            TokenValidation::Invalid("Token inválido o expirado".to_string())
        );

        let mut auth = MockAuthApi::new();
        auth.expect_profile()
            .returning(|| Err(ApiError::Network("refused".to_string())));
        assert_eq!(
            validate_token_at(&token, now(), &auth),
            TokenValidation::Invalid("Error de red al validar el token".to_string())
        );

        let mut auth = MockAuthApi::new();
        auth.expect_profile().returning(|| {
            Err(ApiError::Http {
                status: 500,
                message: "boom".to_string(),
            })
        });
        assert_eq!(
            validate_token_at(&token, now(), &auth),
            TokenValidation::Invalid("Error al validar el token".to_string())
        );
    }

    #[test]
    fn test_seconds_until_refresh() {
        let token = token_expiring_at(now() + Duration::minutes(10));
        assert_eq!(seconds_until_refresh(&token, now()), Some(300));
    }
}
