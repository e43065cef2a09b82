//! Ports for the monthly audit trail.
//!
//! [`AuditLog`] appends rows as mutations commit. [`AuditArchive`] is the
//! read and delete side used by the monthly report.

use async_trait::async_trait;

use crate::domain::{AuditEntry, AuditPeriod};

use super::define_port_error;

define_port_error! {
    /// Errors raised by audit storage adapters.
    pub enum AuditLogError {
        /// Reading or writing the backing file failed.
        Io { message: String } => "audit storage failed: {message}",
    }
}

/// Complete contents of one month's audit file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append `entry` to the file of the month it occurred in, writing the
    /// header first when the file is new.
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditLogError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditArchive: Send + Sync {
    /// Read the file for `period`, or `None` when nothing was logged.
    async fn read_period(&self, period: AuditPeriod) -> Result<Option<AuditFile>, AuditLogError>;

    /// Delete the file for `period`. Missing files are not an error.
    async fn remove_period(&self, period: AuditPeriod) -> Result<(), AuditLogError>;

    /// Every period that currently has a file, oldest first.
    async fn list_periods(&self) -> Result<Vec<AuditPeriod>, AuditLogError>;
}
