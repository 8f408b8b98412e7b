use thiserror::Error;

/// Failure talking to the backend.
///
/// Client-side validation failures never reach this type; they are reported
/// before a request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received
    #[error("Error de red: no se puede conectar al servidor ({0})")]
    Network(String),

    /// Non-2xx response; `message` comes from the structured error body when present
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Response body was not JSON or did not have the expected shape
    #[error("Respuesta inesperada del servidor: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401/403: the session token is no longer accepted
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

/// Pull a display message out of an error body.
///
/// Validation failures arrive as an `errors` array and are joined into one
/// string; otherwise `error` wins over `message`.
pub fn error_message_from_body(body: &serde_json::Value) -> Option<String> {
    if let Some(errors) = body.get("errors").and_then(|value| value.as_array()) {
        let parts: Vec<String> = errors
            .iter()
            .filter_map(|entry| match entry {
                serde_json::Value::String(text) => Some(text.clone()),
                serde_json::Value::Object(map) => map
                    .get("msg")
                    .or_else(|| map.get("message"))
                    .and_then(|value| value.as_str())
                    .map(str::to_string),
                _ => None,
            })
            .filter(|text| !text.trim().is_empty())
            .collect();
        if !parts.is_empty() {
            return Some(parts.join(", "));
        }
    }

    ["error", "message"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(|value| value.as_str()))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_errors_array_is_joined() {
        let body = json!({"errors": ["La fecha es requerida", "El pabellón es requerido"]});
        assert_eq!(
            error_message_from_body(&body).as_deref(),
            Some("La fecha es requerida, El pabellón es requerido")
        );
    }

    #[test]
    fn test_error_field_wins_over_message() {
        let body = json!({"error": "Token inválido", "message": "otro"});
        assert_eq!(error_message_from_body(&body).as_deref(), Some("Token inválido"));

        let body = json!({"message": "No encontrado"});
        assert_eq!(error_message_from_body(&body).as_deref(), Some("No encontrado"));
    }

    #[test]
    fn test_validator_style_objects_are_supported() {
        let body = json!({"errors": [{"msg": "Email inválido", "param": "email"}]});
        assert_eq!(error_message_from_body(&body).as_deref(), Some("Email inválido"));
    }

    #[test]
    fn test_empty_body_has_no_message() {
        assert_eq!(error_message_from_body(&json!({})), None);
        assert_eq!(error_message_from_body(&json!({"errors": []})), None);
    }

    #[test]
    fn test_unauthorized_statuses() {
        let err = ApiError::Http {
            status: 403,
            message: "Prohibido".to_string(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Prohibido");
        assert!(!ApiError::Network("timeout".to_string()).is_unauthorized());
    }
}
