//! JSON request and response bodies for the facility endpoints.
//!
//! Field names are camelCase on the wire. Responses are built from domain
//! records with `From`; requests convert into the domain's request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{LogCheckRequest, ReportIncidentRequest};
use crate::domain::{
    Capabilities, Check, Custodian, CustodianId, Incident, Restroom, RestroomId, RestroomStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestroomDto {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Lobby North")]
    pub name: String,
    #[schema(example = "Main")]
    pub building: String,
    #[schema(example = "G")]
    pub floor: String,
}

impl From<&Restroom> for RestroomDto {
    fn from(value: &Restroom) -> Self {
        Self {
            id: value.id().get(),
            name: value.name().to_owned(),
            building: value.building().to_owned(),
            floor: value.floor().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustodianDto {
    pub id: i32,
    pub name: String,
    /// `male`, `female`, or `other`.
    #[schema(example = "female")]
    pub gender: String,
}

impl From<&Custodian> for CustodianDto {
    fn from(value: &Custodian) -> Self {
        Self {
            id: value.id().get(),
            name: value.name().to_owned(),
            gender: value.gender().as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckDto {
    pub id: i32,
    pub custodian_id: i32,
    pub restroom_id: i32,
    pub checked_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<&Check> for CheckDto {
    fn from(value: &Check) -> Self {
        Self {
            id: value.id().get(),
            custodian_id: value.custodian_id().get(),
            restroom_id: value.restroom_id().get(),
            checked_at: value.checked_at(),
            notes: value.note().map(|note| note.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDto {
    pub id: i32,
    pub custodian_id: i32,
    pub restroom_id: i32,
    pub description: String,
    #[schema(example = "medium")]
    pub severity: String,
    pub created_at: DateTime<Utc>,
    pub pending: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Most recent check on the restroom when the incident was reported.
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_checked_by: Option<i32>,
}

impl From<&Incident> for IncidentDto {
    fn from(value: &Incident) -> Self {
        let last_check = value.last_check();
        Self {
            id: value.id().get(),
            custodian_id: value.custodian_id().get(),
            restroom_id: value.restroom_id().get(),
            description: value.description().as_str().to_owned(),
            severity: value.severity().as_str().to_owned(),
            created_at: value.created_at(),
            pending: value.is_pending(),
            resolved_at: value.resolved_at(),
            last_checked_at: last_check.map(|snapshot| snapshot.checked_at),
            last_checked_by: last_check.map(|snapshot| snapshot.checked_by.get()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestroomStatusDto {
    pub restroom_id: i32,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_checked_by: Option<i32>,
    pub has_active_incident: bool,
}

impl From<RestroomStatus> for RestroomStatusDto {
    fn from(value: RestroomStatus) -> Self {
        Self {
            restroom_id: value.restroom_id.get(),
            last_checked_at: value.last_checked_at,
            last_checked_by: value.last_checked_by.map(CustodianId::get),
            has_active_incident: value.has_active_incident,
        }
    }
}

/// Body of `POST /checks`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogCheckBody {
    pub custodian_id: i32,
    pub restroom_id: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<LogCheckBody> for LogCheckRequest {
    fn from(value: LogCheckBody) -> Self {
        Self {
            custodian_id: CustodianId::new(value.custodian_id),
            restroom_id: RestroomId::new(value.restroom_id),
            note: value.notes,
        }
    }
}

/// Body of `POST /incidents`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportIncidentBody {
    pub custodian_id: i32,
    pub restroom_id: i32,
    pub description: String,
    /// Defaults to `medium`.
    #[serde(default)]
    pub severity: Option<String>,
}

impl From<ReportIncidentBody> for ReportIncidentRequest {
    fn from(value: ReportIncidentBody) -> Self {
        Self {
            custodian_id: CustodianId::new(value.custodian_id),
            restroom_id: RestroomId::new(value.restroom_id),
            description: value.description,
            severity: value.severity,
        }
    }
}

/// Body of `POST /incidents/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveIncidentBody {
    pub incident_id: i32,
}

/// Body of both login endpoints.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordBody {
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusDto {
    pub is_authenticated: bool,
    pub is_admin: bool,
}

impl From<Capabilities> for AuthStatusDto {
    fn from(value: Capabilities) -> Self {
        Self {
            is_authenticated: value.authenticated,
            is_admin: value.admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusDto {
    pub is_admin: bool,
}
