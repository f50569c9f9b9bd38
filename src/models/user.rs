use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Employee,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employee => "employee",
            UserRole::Admin => "admin",
        }
    }
}

fn default_active() -> bool {
    true
}

/// Read-only cached copy of the backend's user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    // Not every payload carries the account fields; a bare login response
    // still has to deserialize.
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_from_wire_json() {
        let json = r#"{
            "id": "7f6b9c1e-7f39-4a8f-9f6d-2f4f2f6a1b2c",
            "email": "jane@example.com",
            "firstName": "Jane",
            "lastName": "Doe",
            "role": "admin",
            "isActive": true,
            "createdAt": "2024-01-10T09:30:00Z"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.role, UserRole::Admin);
        assert!(user.is_active);
        assert!(user.created_at.is_some());
        assert_eq!(user.full_name(), "Jane Doe");
    }

    #[test]
    fn test_user_tolerates_trimmed_auth_payload() {
        let json = r#"{
            "id": "7f6b9c1e-7f39-4a8f-9f6d-2f4f2f6a1b2c",
            "email": "jane@example.com",
            "firstName": "Jane",
            "lastName": "Doe",
            "role": "employee"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_active);
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_register_request_omits_absent_role() {
        let req = RegisterRequest {
            email: "new@example.com".into(),
            password: "secret1".into(),
            first_name: "New".into(),
            last_name: "Hire".into(),
            role: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("role").is_none());
        assert_eq!(json["firstName"], "New");
    }
}
