//! Integer identifiers for facility records.
//!
//! Every table keys its rows with a database-assigned integer. Distinct
//! newtypes stop a restroom id from being passed where a custodian id is
//! expected.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database identifier.
            #[must_use]
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            /// Raw database identifier.
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Stable restroom identifier.
    RestroomId
);
define_id!(
    /// Stable custodian identifier.
    CustodianId
);
define_id!(
    /// Identifier of an appended check.
    CheckId
);
define_id!(
    /// Identifier of a reported incident.
    IncidentId
);
