//! Staff directory endpoints (`/api/users`).

use crate::models::user::{
    CreateUserRequest, UpdatePasswordRequest, UpdateUserRequest, User, UserEnvelope,
    UserListResponse, UserQuery,
};
use crate::services::api::{path_segment, ApiClient, ApiError, MessageResponse};

const BASE_PATH: &str = "/api/users";

#[derive(Debug, serde::Deserialize)]
struct UserResponse {
    user: User,
}

pub struct UserService<'a> {
    client: &'a ApiClient,
}

impl<'a> UserService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", BASE_PATH, path_segment(id))
    }

    pub fn list(&self, query: &UserQuery) -> Result<UserListResponse, ApiError> {
        self.client.get_with_query(BASE_PATH, &query.to_pairs())
    }

    pub fn get(&self, id: &str) -> Result<User, ApiError> {
        self.client
            .get::<UserResponse>(&Self::item_path(id))
            .map(|response| response.user)
    }

    pub fn create(&self, request: &CreateUserRequest) -> Result<UserEnvelope, ApiError> {
        let envelope: UserEnvelope = self.client.post(BASE_PATH, request)?;
        log::info!("Created user {} ({})", envelope.user.id, envelope.user.role.as_str());
        Ok(envelope)
    }

    pub fn update(&self, id: &str, request: &UpdateUserRequest) -> Result<UserEnvelope, ApiError> {
        self.client.put(&Self::item_path(id), request)
    }

    pub fn delete(&self, id: &str) -> Result<MessageResponse, ApiError> {
        log::info!("Deleting user {}", id);
        self.client.delete(&Self::item_path(id))
    }

    pub fn activate(&self, id: &str) -> Result<MessageResponse, ApiError> {
        self.client
            .patch(&format!("{}/activate", Self::item_path(id)), &serde_json::json!({}))
    }

    pub fn deactivate(&self, id: &str) -> Result<MessageResponse, ApiError> {
        self.client
            .patch(&format!("{}/deactivate", Self::item_path(id)), &serde_json::json!({}))
    }

    /// Set or clear the active flag
    pub fn set_active(&self, id: &str, active: bool) -> Result<MessageResponse, ApiError> {
        if active {
            self.activate(id)
        } else {
            self.deactivate(id)
        }
    }

    pub fn update_password(&self, id: &str, new_password: &str) -> Result<MessageResponse, ApiError> {
        self.client.patch(
            &format!("{}/password", Self::item_path(id)),
            &UpdatePasswordRequest {
                new_password: new_password.to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_path() {
        assert_eq!(UserService::item_path("12"), "/api/users/12");
    }

    #[test]
    fn test_get_response_shape() {
        let json = r#"{"user": {"id": 3, "email": "d@bak.cl", "first_name": "Dora", "last_name": "Paz", "role": "doctor"}}"#;
        let response: UserResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.user.id, "3");
        assert_eq!(response.user.full_name(), "Dora Paz");
    }
}
