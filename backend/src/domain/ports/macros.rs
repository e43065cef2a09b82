//! Macro for declaring port error enums with matching constructors.
//!
//! Each variant gets a snake_case constructor. Struct variants take every
//! field as `impl Into<T>`, so `FacilityRepositoryError::query("timeout")`
//! works without an explicit `String` conversion.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum RelayError {
            Offline => "relay offline",
            Timeout { message: String } => "relay timed out: {message}",
            Status { code: u16, message: String } => "relay answered {code}: {message}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(RelayError::offline(), RelayError::Offline);
    }

    #[test]
    fn string_fields_accept_str() {
        let err = RelayError::timeout("5s");
        assert_eq!(err.to_string(), "relay timed out: 5s");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = RelayError::status(503_u16, "busy");
        assert_eq!(
            err,
            RelayError::Status {
                code: 503,
                message: "busy".to_owned(),
            }
        );
        assert_eq!(err.to_string(), "relay answered 503: busy");
    }
}
