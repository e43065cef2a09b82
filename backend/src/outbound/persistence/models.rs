//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{checks, custodians, incidents, restrooms};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = restrooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RestroomRow {
    pub id: i32,
    pub name: String,
    pub building: String,
    pub floor: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = custodians)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustodianRow {
    pub id: i32,
    pub name: String,
    pub gender: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = checks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CheckRow {
    pub id: i32,
    pub custodian_id: i32,
    pub restroom_id: i32,
    pub checked_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// Insertable check; the database assigns `id`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = checks)]
pub(crate) struct NewCheckRow<'a> {
    pub custodian_id: i32,
    pub restroom_id: i32,
    pub checked_at: DateTime<Utc>,
    pub note: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = incidents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IncidentRow {
    pub id: i32,
    pub custodian_id: i32,
    pub restroom_id: i32,
    pub description: String,
    pub severity: String,
    pub created_at: DateTime<Utc>,
    pub pending: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_checked_by: Option<i32>,
}

/// Insertable incident; always pending on insert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = incidents)]
pub(crate) struct NewIncidentRow<'a> {
    pub custodian_id: i32,
    pub restroom_id: i32,
    pub description: &'a str,
    pub severity: &'a str,
    pub created_at: DateTime<Utc>,
    pub pending: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_checked_by: Option<i32>,
}
