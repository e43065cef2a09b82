//! PostgreSQL-backed `FacilityRepository` implementation using Diesel ORM.
//!
//! Gating is enforced with a row lock on the restroom: both
//! `insert_check_unless_blocked` and `insert_incident` take
//! `SELECT ... FOR UPDATE` on the restroom row before touching checks or
//! incidents. A check transaction therefore either runs entirely before a
//! concurrent incident insert, or waits for it to commit and then sees the
//! new pending row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    CheckInsertion, FacilityRepository, FacilityRepositoryError, ResolveOutcome,
};
use crate::domain::{
    Check, CheckId, CheckNote, Custodian, CustodianId, FacilitySeed, Gender, Incident,
    IncidentDescription, IncidentDraft, IncidentId, LastCheckSnapshot, NewCheck, NewIncident,
    Restroom, RestroomId, Severity,
};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    CheckRow, CustodianRow, IncidentRow, NewCheckRow, NewIncidentRow, RestroomRow,
};
use super::pool::DbPool;
use super::schema::{checks, custodians, incidents, restrooms};

/// Diesel-backed implementation of the facility repository port.
#[derive(Clone)]
pub struct DieselFacilityRepository {
    pool: DbPool,
}

impl DieselFacilityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_restroom(row: RestroomRow) -> Result<Restroom, FacilityRepositoryError> {
    Restroom::new(RestroomId::new(row.id), &row.name, &row.building, &row.floor)
        .map_err(|err| FacilityRepositoryError::query(format!("invalid restroom row: {err}")))
}

fn row_to_custodian(row: CustodianRow) -> Result<Custodian, FacilityRepositoryError> {
    row.gender
        .parse::<Gender>()
        .and_then(|gender| Custodian::new(CustodianId::new(row.id), &row.name, gender))
        .map_err(|err| FacilityRepositoryError::query(format!("invalid custodian row: {err}")))
}

fn row_to_check(row: CheckRow) -> Result<Check, FacilityRepositoryError> {
    let note = CheckNote::parse(row.note.as_deref())
        .map_err(|err| FacilityRepositoryError::query(format!("invalid check row: {err}")))?;
    Ok(Check::from_new(
        CheckId::new(row.id),
        NewCheck {
            custodian_id: CustodianId::new(row.custodian_id),
            restroom_id: RestroomId::new(row.restroom_id),
            checked_at: row.checked_at,
            note,
        },
    ))
}

fn row_to_incident(row: IncidentRow) -> Result<Incident, FacilityRepositoryError> {
    let invalid = |err: &dyn std::fmt::Display| {
        FacilityRepositoryError::query(format!("invalid incident row {}: {err}", row.id))
    };
    let description = IncidentDescription::new(&row.description).map_err(|err| invalid(&err))?;
    let severity = Severity::parse(Some(&row.severity)).map_err(|err| invalid(&err))?;
    let last_check = match (row.last_checked_at, row.last_checked_by) {
        (Some(checked_at), Some(checked_by)) => Some(LastCheckSnapshot {
            checked_at,
            checked_by: CustodianId::new(checked_by),
        }),
        _ => None,
    };
    Incident::new(IncidentDraft {
        id: IncidentId::new(row.id),
        custodian_id: CustodianId::new(row.custodian_id),
        restroom_id: RestroomId::new(row.restroom_id),
        description,
        severity,
        created_at: row.created_at,
        pending: row.pending,
        resolved_at: row.resolved_at,
        last_check,
    })
    .map_err(|err| invalid(&err))
}

fn collect_rows<R, T, F>(rows: Vec<R>, convert: F) -> Result<Vec<T>, FacilityRepositoryError>
where
    F: Fn(R) -> Result<T, FacilityRepositoryError>,
{
    rows.into_iter().map(convert).collect()
}

/// Row-level outcome of the resolve transaction, converted after commit.
enum ResolvedRow {
    Resolved(IncidentRow),
    AlreadyResolved(IncidentRow),
    Missing,
}

#[async_trait]
impl FacilityRepository for DieselFacilityRepository {
    async fn list_restrooms(&self) -> Result<Vec<Restroom>, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RestroomRow> = restrooms::table
            .order(restrooms::id)
            .select(RestroomRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows, row_to_restroom)
    }

    async fn find_restroom(
        &self,
        id: RestroomId,
    ) -> Result<Option<Restroom>, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = restrooms::table
            .find(id.get())
            .select(RestroomRow::as_select())
            .first::<RestroomRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_restroom).transpose()
    }

    async fn list_custodians(&self) -> Result<Vec<Custodian>, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CustodianRow> = custodians::table
            .order(custodians::id)
            .select(CustodianRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows, row_to_custodian)
    }

    async fn find_custodian(
        &self,
        id: CustodianId,
    ) -> Result<Option<Custodian>, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = custodians::table
            .find(id.get())
            .select(CustodianRow::as_select())
            .first::<CustodianRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_custodian).transpose()
    }

    async fn recent_checks(&self, limit: usize) -> Result<Vec<Check>, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<CheckRow> = checks::table
            .order((checks::checked_at.desc(), checks::id.desc()))
            .limit(limit)
            .select(CheckRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows, row_to_check)
    }

    async fn latest_check_for_restroom(
        &self,
        restroom_id: RestroomId,
    ) -> Result<Option<Check>, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = checks::table
            .filter(checks::restroom_id.eq(restroom_id.get()))
            .order((checks::checked_at.desc(), checks::id.desc()))
            .select(CheckRow::as_select())
            .first::<CheckRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_check).transpose()
    }

    async fn list_incidents(&self) -> Result<Vec<Incident>, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<IncidentRow> = incidents::table
            .order((incidents::created_at.desc(), incidents::id.desc()))
            .select(IncidentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows, row_to_incident)
    }

    async fn incidents_for_restroom(
        &self,
        restroom_id: RestroomId,
    ) -> Result<Vec<Incident>, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<IncidentRow> = incidents::table
            .filter(incidents::restroom_id.eq(restroom_id.get()))
            .order((incidents::created_at.desc(), incidents::id.desc()))
            .select(IncidentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows, row_to_incident)
    }

    async fn find_incident(
        &self,
        id: IncidentId,
    ) -> Result<Option<Incident>, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = incidents::table
            .find(id.get())
            .select(IncidentRow::as_select())
            .first::<IncidentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_incident).transpose()
    }

    async fn insert_check_unless_blocked(
        &self,
        check: NewCheck,
    ) -> Result<CheckInsertion, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let restroom_id = check.restroom_id.get();
        let new_row = NewCheckRow {
            custodian_id: check.custodian_id.get(),
            restroom_id,
            checked_at: check.checked_at,
            note: check.note.as_ref().map(CheckNote::as_str),
        };

        let inserted = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    restrooms::table
                        .find(restroom_id)
                        .select(restrooms::id)
                        .for_update()
                        .first::<i32>(conn)
                        .await?;

                    let blocked: bool = diesel::select(exists(
                        incidents::table
                            .filter(incidents::restroom_id.eq(restroom_id))
                            .filter(incidents::pending.eq(true)),
                    ))
                    .get_result(conn)
                    .await?;
                    if blocked {
                        return Ok(None);
                    }

                    diesel::insert_into(checks::table)
                        .values(&new_row)
                        .returning(CheckRow::as_returning())
                        .get_result::<CheckRow>(conn)
                        .await
                        .map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match inserted {
            Some(row) => row_to_check(row).map(CheckInsertion::Inserted),
            None => Ok(CheckInsertion::Blocked),
        }
    }

    async fn insert_incident(
        &self,
        incident: NewIncident,
    ) -> Result<Incident, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let restroom_id = incident.restroom_id.get();
        let new_row = NewIncidentRow {
            custodian_id: incident.custodian_id.get(),
            restroom_id,
            description: incident.description.as_str(),
            severity: incident.severity.as_str(),
            created_at: incident.created_at,
            pending: true,
            last_checked_at: incident.last_check.map(|snapshot| snapshot.checked_at),
            last_checked_by: incident.last_check.map(|snapshot| snapshot.checked_by.get()),
        };

        let row = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    restrooms::table
                        .find(restroom_id)
                        .select(restrooms::id)
                        .for_update()
                        .first::<i32>(conn)
                        .await?;

                    diesel::insert_into(incidents::table)
                        .values(&new_row)
                        .returning(IncidentRow::as_returning())
                        .get_result::<IncidentRow>(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        row_to_incident(row)
    }

    async fn resolve_incident(
        &self,
        id: IncidentId,
        at: DateTime<Utc>,
    ) -> Result<ResolveOutcome, FacilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let incident_id = id.get();

        let resolved = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let Some(current) = incidents::table
                        .find(incident_id)
                        .select(IncidentRow::as_select())
                        .for_update()
                        .first::<IncidentRow>(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(ResolvedRow::Missing);
                    };
                    if !current.pending {
                        return Ok(ResolvedRow::AlreadyResolved(current));
                    }

                    let resolved_at = at.max(current.created_at);
                    diesel::update(incidents::table.find(incident_id))
                        .filter(incidents::pending.eq(true))
                        .set((
                            incidents::pending.eq(false),
                            incidents::resolved_at.eq(Some(resolved_at)),
                        ))
                        .returning(IncidentRow::as_returning())
                        .get_result::<IncidentRow>(conn)
                        .await
                        .map(ResolvedRow::Resolved)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match resolved {
            ResolvedRow::Resolved(row) => row_to_incident(row).map(ResolveOutcome::Resolved),
            ResolvedRow::AlreadyResolved(row) => {
                row_to_incident(row).map(ResolveOutcome::AlreadyResolved)
            }
            ResolvedRow::Missing => Ok(ResolveOutcome::NotFound),
        }
    }

    async fn seed(&self, seed: &FacilitySeed) -> Result<(), FacilityRepositoryError> {
        let restroom_rows: Vec<RestroomRow> = seed
            .restrooms()
            .iter()
            .map(|restroom| RestroomRow {
                id: restroom.id().get(),
                name: restroom.name().to_owned(),
                building: restroom.building().to_owned(),
                floor: restroom.floor().to_owned(),
            })
            .collect();
        let custodian_rows: Vec<CustodianRow> = seed
            .custodians()
            .iter()
            .map(|custodian| CustodianRow {
                id: custodian.id().get(),
                name: custodian.name().to_owned(),
                gender: custodian.gender().as_str().to_owned(),
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                if !restroom_rows.is_empty() {
                    diesel::insert_into(restrooms::table)
                        .values(&restroom_rows)
                        .on_conflict(restrooms::id)
                        .do_nothing()
                        .execute(conn)
                        .await?;
                }
                if !custodian_rows.is_empty() {
                    diesel::insert_into(custodians::table)
                        .values(&custodian_rows)
                        .on_conflict(custodians::id)
                        .do_nothing()
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
