// Backend HTTP client
// Blocking JSON client shared by every API service; callers run it off the UI thread.

mod error;

pub use error::{error_message_from_body, ApiError};

use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::settings::AppConfig;

/// `{message}` body returned by endpoints with nothing else to report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Shared handle to the backend.
///
/// Clones share the bearer token, so logging in on one handle authorizes all of them.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            &config.normalized_base_url(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path), path)
    }

    pub fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        pairs: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url_path = with_query(path, pairs);
        self.send(self.request(Method::GET, &url_path), path)
    }

    pub fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::POST, path).json(body), path)
    }

    pub fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::PUT, path).json(body), path)
    }

    pub fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::PATCH, path).json(body), path)
    }

    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::DELETE, path), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match self.token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, path: &str) -> Result<T, ApiError> {
        let response = builder.send().map_err(|err| {
            log::warn!("Request to {} failed: {}", path, err);
            ApiError::Network(err.to_string())
        })?;
        decode_response(response, path)
    }
}

fn decode_response<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false);

    let text = response
        .text()
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !is_json {
        log::warn!("Non-JSON response from {} (HTTP {})", path, status);
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: format!("HTTP error! status: {}", status.as_u16()),
            });
        }
        return Err(ApiError::Malformed(format!(
            "Server returned non-JSON response: {}",
            snippet(&text)
        )));
    }

    parse_body(status.as_u16(), &text)
}

/// Map a JSON response body to the expected type or to an [`ApiError`]
pub fn parse_body<T: DeserializeOwned>(status: u16, text: &str) -> Result<T, ApiError> {
    let body: serde_json::Value = serde_json::from_str(text)
        .map_err(|err| ApiError::Malformed(format!("invalid JSON: {}", err)))?;

    if !(200..300).contains(&status) {
        let message = error_message_from_body(&body)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status));
        return Err(ApiError::Http { status, message });
    }

    serde_json::from_value(body).map_err(|err| ApiError::Malformed(err.to_string()))
}

/// Append URL-encoded query pairs to a path
pub fn with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }

    let query = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

/// Percent-encode an id before it goes into a path segment
pub fn path_segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

fn snippet(text: &str) -> String {
    text.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        value: u32,
    }

    #[test]
    fn test_with_query_encodes_values() {
        let path = with_query(
            "/api/patients",
            &[("page", "1".to_string()), ("search", "Pérez López".to_string())],
        );
        assert_eq!(path, "/api/patients?page=1&search=P%C3%A9rez%20L%C3%B3pez");
        assert_eq!(with_query("/api/users", &[]), "/api/users");
    }

    #[test]
    fn test_parse_body_success() {
        let payload: Payload = parse_body(200, r#"{"value": 3}"#).unwrap();
        assert_eq!(payload, Payload { value: 3 });
    }

    #[test]
    fn test_parse_body_maps_error_status() {
        let err = parse_body::<Payload>(409, r#"{"error": "Pabellón ocupado"}"#).unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 409,
                message: "Pabellón ocupado".to_string()
            }
        );
    }

    #[test]
    fn test_parse_body_without_message_uses_status() {
        let err = parse_body::<Payload>(500, "{}").unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn test_parse_body_rejects_wrong_shape() {
        let err = parse_body::<Payload>(200, r#"{"other": true}"#).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
        let err = parse_body::<Payload>(200, "<html>").unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn test_clones_share_token() {
        let client = ApiClient::new("http://localhost:3001/", Duration::from_secs(5)).unwrap();
        let clone = client.clone();
        client.set_token(Some("abc".to_string()));
        assert_eq!(clone.token().as_deref(), Some("abc"));
        assert_eq!(clone.base_url(), "http://localhost:3001");
        clone.set_token(None);
        assert!(!client.has_token());
    }
}
