//! Types for authentication

use serde::{Deserialize, Serialize};

/// User record returned by the login lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: i64,

    /// The user's email address
    pub email: String,

    /// Display name, when the backend has one
    #[serde(default)]
    pub name: Option<String>,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}
