//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed facility repository using Diesel ORM
//! - **memory**: in-process facility repository for development and tests
//! - **broadcast**: Tokio broadcast channel fan-out for change events
//! - **audit**: monthly CSV audit files on disk
//! - **mail**: JSON mail relay over HTTPS
//!
//! Adapters convert between domain types and infrastructure representations
//! and contain no business logic.

pub mod audit;
pub mod broadcast;
pub mod mail;
pub mod memory;
pub mod persistence;
