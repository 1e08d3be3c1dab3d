//! User models and the sentinel-admin rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::new_id;

/// The one username that always maps to the administrator role, no matter
/// how the account was created or what storage says.
pub const ADMIN_USERNAME: &str = "xyz";

/// Bootstrap admin credentials seeded into the local user collection on
/// first local login so an admin account always exists offline.
pub const BOOTSTRAP_ADMIN_ID: &str = "default-admin";
pub const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@admin.com";
pub const BOOTSTRAP_ADMIN_PASSWORD: &str = "admin";

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Wire representation, as sent in `x-user-role` headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Role assigned at account creation: admin for the sentinel username,
    /// plain user otherwise.
    #[must_use]
    pub fn for_username(username: &str) -> Self {
        if username == ADMIN_USERNAME {
            Self::Admin
        } else {
            Self::User
        }
    }
}

/// A stored account record. This is the only type that carries the secret
/// password; it never crosses the service boundary.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl UserRecord {
    /// Create a new account record; the role is decided by the sentinel rule.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let username = username.into();
        let role = Role::for_username(&username);
        Self {
            id: new_id(),
            username,
            email: email.into(),
            password: password.into(),
            role,
        }
    }

    /// Record for the bootstrap admin account seeded in local mode.
    #[must_use]
    pub fn bootstrap_admin() -> Self {
        Self {
            id: BOOTSTRAP_ADMIN_ID.to_string(),
            username: ADMIN_USERNAME.to_string(),
            email: BOOTSTRAP_ADMIN_EMAIL.to_string(),
            password: BOOTSTRAP_ADMIN_PASSWORD.to_string(),
            role: Role::Admin,
        }
    }

    /// Safe projection with the secret stripped, the only form ever
    /// persisted to the session slot or returned to callers.
    #[must_use]
    pub fn profile(&self) -> User {
        let mut user = User {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            token: None,
            role: self.role,
        };
        user.enforce_admin_username();
        user
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Safe user projection returned by auth operations and persisted as the
/// active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Re-apply the sentinel-admin correction to a user read from storage.
    ///
    /// Returns `true` when the role was changed so callers can persist the
    /// corrected record.
    pub fn enforce_admin_username(&mut self) -> bool {
        if self.username == ADMIN_USERNAME && self.role != Role::Admin {
            self.role = Role::Admin;
            true
        } else {
            false
        }
    }

    /// The acting-user context threaded into repository/service calls.
    #[must_use]
    pub fn context(&self) -> AuthContext {
        AuthContext {
            user_id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// Explicit acting-user value passed into every data-layer call.
///
/// Derived from the authenticated [`User`]; there is no ambient session
/// state anywhere in the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
