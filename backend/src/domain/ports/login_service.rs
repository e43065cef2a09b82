//! Driving port for shared-secret logins.
//!
//! Inbound adapters call it to check a password against the staff or admin
//! secret without knowing where those secrets come from, so handler tests can
//! substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, Password, Role, SharedSecret};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Succeed when `password` matches the secret for `role`.
    async fn authenticate(&self, role: Role, password: &Password) -> Result<(), Error>;
}

/// Login service backed by the configured shared secrets.
///
/// A role without a configured secret cannot log in at all.
#[derive(Debug, Clone, Default)]
pub struct SharedSecretLoginService {
    staff: Option<SharedSecret>,
    admin: Option<SharedSecret>,
}

impl SharedSecretLoginService {
    pub fn new(staff: Option<SharedSecret>, admin: Option<SharedSecret>) -> Self {
        Self { staff, admin }
    }

    /// Whether `role` has a secret configured.
    pub fn is_enabled(&self, role: Role) -> bool {
        self.secret(role).is_some()
    }

    fn secret(&self, role: Role) -> Option<&SharedSecret> {
        match role {
            Role::Staff => self.staff.as_ref(),
            Role::Admin => self.admin.as_ref(),
        }
    }
}

#[async_trait]
impl LoginService for SharedSecretLoginService {
    async fn authenticate(&self, role: Role, password: &Password) -> Result<(), Error> {
        match self.secret(role) {
            Some(secret) if secret.matches(password) => Ok(()),
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}
