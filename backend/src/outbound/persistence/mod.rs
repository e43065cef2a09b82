//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and the schema (`schema.rs`) stay private
//! to this module. Connections come from a `bb8` pool driven by
//! `diesel-async`.
//!
//! # Example
//!
//! ```ignore
//! use facility_backend::outbound::persistence::{
//!     DbPool, DieselFacilityRepository, PoolConfig,
//! };
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/facility")).await?;
//! let repo = DieselFacilityRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_facility_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_facility_repository::DieselFacilityRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
