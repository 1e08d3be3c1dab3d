//! Auth service: registration, login, logout, and session restore.
//!
//! State machine: Anonymous -> Authenticated -> Anonymous. Failed calls
//! leave the caller Anonymous. The active session is persisted as the safe
//! user projection only; the secret never leaves the users collection.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::gateway::RemoteGateway;
use crate::models::user::ADMIN_USERNAME;
use crate::models::{User, UserRecord};
use crate::probe::{Availability, Mode};
use crate::store::{LocalStore, StoreExt, SESSION_KEY, USERS_KEY};

pub struct AuthService<S: LocalStore> {
    store: Arc<S>,
    gateway: RemoteGateway,
    availability: Availability,
}

impl<S: LocalStore> AuthService<S> {
    pub fn new(store: Arc<S>, gateway: RemoteGateway, availability: Availability) -> Self {
        Self {
            store,
            gateway,
            availability,
        }
    }

    /// Register a new account and sign it in.
    ///
    /// Fails with [`Error::DuplicateEmail`] when the email is taken. The
    /// sentinel rule decides the role at creation.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let username = required(username, "username")?;
        let email = required(email, "email")?;
        let password = required(password, "password")?;

        let user = match self.availability.mode() {
            Mode::Remote => self.gateway.register(username, email, password).await?.user,
            Mode::Local => {
                let mut users: Vec<UserRecord> = self.store.load_collection_or_default(USERS_KEY)?;
                if users.iter().any(|record| record.email == email) {
                    return Err(Error::DuplicateEmail);
                }
                let record = UserRecord::new(username, email, password);
                let user = record.profile();
                users.push(record);
                self.store.save_collection(USERS_KEY, &users)?;
                user
            }
        };

        self.persist_session(&user)?;
        tracing::info!(username = %user.username, "registered new account");
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// Remote mode trusts the gateway's response. Local mode seeds the
    /// bootstrap admin on first use, then matches credentials exactly.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = required(email, "email")?;
        let password = required(password, "password")?;

        let user = match self.availability.mode() {
            Mode::Remote => self.gateway.login(email, password).await?.user,
            Mode::Local => {
                let mut users: Vec<UserRecord> = self.store.load_collection_or_default(USERS_KEY)?;
                if self.seed_bootstrap_admin(&mut users)? {
                    tracing::info!("seeded bootstrap admin account for local mode");
                }

                users
                    .iter()
                    .find(|record| record.email == email && record.password == password)
                    .map(UserRecord::profile)
                    .ok_or(Error::InvalidCredentials)?
            }
        };

        self.persist_session(&user)?;
        Ok(user)
    }

    /// Clear the active session. Idempotent.
    pub fn logout(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)
    }

    /// Load the persisted active session, if any.
    ///
    /// The sentinel-admin correction is re-applied at load time and written
    /// back when it changed anything.
    pub fn restore_session(&self) -> Result<Option<User>> {
        let Some(mut user) = self.store.load_slot::<User>(SESSION_KEY)? else {
            return Ok(None);
        };
        if user.enforce_admin_username() {
            self.persist_session(&user)?;
        }
        Ok(Some(user))
    }

    /// Ensure the bootstrap admin exists. Returns whether it was added.
    fn seed_bootstrap_admin(&self, users: &mut Vec<UserRecord>) -> Result<bool> {
        if users.iter().any(|record| record.username == ADMIN_USERNAME) {
            return Ok(false);
        }
        users.push(UserRecord::bootstrap_admin());
        self.store.save_collection(USERS_KEY, users)?;
        Ok(true)
    }

    fn persist_session(&self, user: &User) -> Result<()> {
        self.store.save_slot(SESSION_KEY, user)
    }
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::Config;
    use crate::models::user::{BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_PASSWORD};
    use crate::models::Role;
    use crate::store::MemoryStore;

    fn service() -> AuthService<MemoryStore> {
        let config = Config::new("http://127.0.0.1:1/api", "/unused")
            .unwrap()
            .with_probe_timeout(Duration::from_millis(100));
        let gateway = RemoteGateway::new(&config.api_url).unwrap();
        AuthService::new(Arc::new(MemoryStore::new()), gateway, Availability::new())
    }

    #[tokio::test]
    async fn register_assigns_role_by_sentinel_rule() {
        let auth = service();
        let alice = auth.register("alice", "a@x.com", "pw").await.unwrap();
        assert_eq!(alice.role, Role::User);
        let admin = auth.register("xyz", "x@x.com", "pw").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let auth = service();
        auth.register("alice", "a@x.com", "pw").await.unwrap();
        let error = auth.register("alice2", "a@x.com", "pw2").await.unwrap_err();
        assert!(matches!(error, Error::DuplicateEmail));
    }

    #[tokio::test]
    async fn register_refuses_missing_fields_before_io() {
        let auth = service();
        assert!(matches!(
            auth.register("", "a@x.com", "pw").await.unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            auth.register("alice", "a@x.com", "  ").await.unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn first_local_login_seeds_bootstrap_admin() {
        let auth = service();
        let admin = auth
            .login(BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_PASSWORD)
            .await
            .unwrap();
        assert_eq!(admin.username, ADMIN_USERNAME);
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let auth = service();
        auth.register("alice", "a@x.com", "pw").await.unwrap();
        let error = auth.login("a@x.com", "wrong").await.unwrap_err();
        assert!(matches!(error, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_restores_registered_account() {
        let auth = service();
        let registered = auth.register("alice", "a@x.com", "pw").await.unwrap();
        let logged_in = auth.login("a@x.com", "pw").await.unwrap();
        assert_eq!(logged_in.id, registered.id);
        assert_eq!(logged_in.role, Role::User);
    }

    #[tokio::test]
    async fn restore_session_reapplies_sentinel_correction() {
        let auth = service();
        // Simulate a stale persisted projection with the wrong role.
        let stale = User {
            id: "1".to_string(),
            username: ADMIN_USERNAME.to_string(),
            email: "admin@admin.com".to_string(),
            token: None,
            role: Role::User,
        };
        auth.store.save_slot(SESSION_KEY, &stale).unwrap();

        let restored = auth.restore_session().unwrap().unwrap();
        assert_eq!(restored.role, Role::Admin);

        // The correction was written back to storage.
        let persisted: User = auth.store.load_slot(SESSION_KEY).unwrap().unwrap();
        assert_eq!(persisted.role, Role::Admin);
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let auth = service();
        auth.register("alice", "a@x.com", "pw").await.unwrap();
        auth.logout().unwrap();
        auth.logout().unwrap();
        assert!(auth.restore_session().unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_keeps_the_account_record() {
        let auth = service();
        auth.register("alice", "a@x.com", "pw").await.unwrap();
        auth.logout().unwrap();
        assert!(auth.login("a@x.com", "pw").await.is_ok());
    }
}
