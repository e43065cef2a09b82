//! Shared Diesel error mapping for the facility repository.

use tracing::debug;

use crate::domain::ports::FacilityRepositoryError;

use super::pool::PoolError;

/// Map pool errors to connection failures.
pub fn map_pool_error(error: PoolError) -> FacilityRepositoryError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    FacilityRepositoryError::connection(message)
}

/// Map Diesel errors to query or connection failures.
///
/// Driver messages are logged at `debug` and replaced with generic text so
/// SQL details never reach error payloads.
pub fn map_diesel_error(error: diesel::result::Error) -> FacilityRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => FacilityRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => FacilityRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            FacilityRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            FacilityRepositoryError::query("referenced record does not exist")
        }
        _ => FacilityRepositoryError::query("database error"),
    }
}
