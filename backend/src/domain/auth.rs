//! Shared-secret login primitives.
//!
//! Staff and admin each have one shared secret. Inbound adapters build a
//! [`Password`] from the request body and hand it to a login port; the
//! secrets themselves never leave this module.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Which login path a password is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Staff,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staff => f.write_str("staff"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Password supplied by a caller.
///
/// ## Invariants
/// - Not blank once trimmed; the stored value keeps caller whitespace so the
///   comparison stays exact.
///
/// # Examples
/// ```
/// use facility_backend::domain::Password;
///
/// assert!(Password::new("  ").is_err());
/// assert_eq!(Password::new(" hunter2").unwrap().expose(), " hunter2");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(raw: &str) -> Result<Self, LoginValidationError> {
        if raw.trim().is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Borrow the raw password.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Configured shared secret, held as a SHA-256 digest.
///
/// Comparing digests keeps the comparison length-independent and means the
/// plaintext is only held for the duration of construction.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Zeroizing<[u8; 32]>);

impl SharedSecret {
    /// Build a secret, returning `None` for blank configuration.
    pub fn new(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(digest(raw))))
    }

    /// Exact match against the supplied password.
    pub fn matches(&self, password: &Password) -> bool {
        let candidate = digest(password.expose());
        candidate
            .iter()
            .zip(self.0.iter())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(***)")
    }
}

fn digest(raw: &str) -> [u8; 32] {
    Sha256::digest(raw.as_bytes()).into()
}
