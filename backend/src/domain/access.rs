//! Per-request capability set resolved from the session.
//!
//! Inbound adapters read the session once and hand a [`Capabilities`] value
//! to every service call. Guards run before any store access.

use crate::domain::Error;

/// The two independent session bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub authenticated: bool,
    pub admin: bool,
}

impl Capabilities {
    /// No capabilities at all.
    pub const ANONYMOUS: Self = Self {
        authenticated: false,
        admin: false,
    };

    /// Staff session without the admin bit.
    pub const STAFF: Self = Self {
        authenticated: true,
        admin: false,
    };

    /// Staff session that also holds the admin bit.
    pub const ADMIN: Self = Self {
        authenticated: true,
        admin: true,
    };

    /// Fail with `unauthorized` unless the session is authenticated.
    pub fn require_authenticated(self) -> Result<(), Error> {
        if self.authenticated {
            Ok(())
        } else {
            Err(Error::unauthorized("login required"))
        }
    }

    /// Fail unless the session is both authenticated and admin.
    ///
    /// The authentication check runs first so an anonymous caller sees 401
    /// rather than 403.
    ///
    /// # Examples
    /// ```
    /// use facility_backend::domain::{Capabilities, ErrorCode};
    ///
    /// let err = Capabilities::STAFF.require_admin().unwrap_err();
    /// assert_eq!(err.code(), ErrorCode::Forbidden);
    /// ```
    pub fn require_admin(self) -> Result<(), Error> {
        self.require_authenticated()?;
        if self.admin {
            Ok(())
        } else {
            Err(Error::forbidden("admin access required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(Capabilities::ANONYMOUS, Some(ErrorCode::Unauthorized))]
    #[case(Capabilities { authenticated: false, admin: true }, Some(ErrorCode::Unauthorized))]
    #[case(Capabilities::STAFF, None)]
    #[case(Capabilities::ADMIN, None)]
    fn require_authenticated_checks_auth_bit(
        #[case] caps: Capabilities,
        #[case] expected: Option<ErrorCode>,
    ) {
        assert_eq!(caps.require_authenticated().err().map(|e| e.code()), expected);
    }

    #[rstest]
    #[case(Capabilities::ANONYMOUS, Some(ErrorCode::Unauthorized))]
    #[case(Capabilities { authenticated: false, admin: true }, Some(ErrorCode::Unauthorized))]
    #[case(Capabilities::STAFF, Some(ErrorCode::Forbidden))]
    #[case(Capabilities::ADMIN, None)]
    fn require_admin_checks_both_bits(
        #[case] caps: Capabilities,
        #[case] expected: Option<ErrorCode>,
    ) {
        assert_eq!(caps.require_admin().err().map(|e| e.code()), expected);
    }
}
