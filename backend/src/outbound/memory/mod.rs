//! In-process facility store.
//!
//! Used when no database URL is configured and by the test suites. All
//! state sits behind one mutex, so the gating decision and the insert in
//! [`FacilityRepository::insert_check_unless_blocked`] form a single
//! critical section.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::gating;
use crate::domain::ports::{
    CheckInsertion, FacilityRepository, FacilityRepositoryError, ResolveOutcome,
};
use crate::domain::{
    Check, CheckId, Custodian, CustodianId, FacilitySeed, Incident, IncidentId, NewCheck,
    NewIncident, Restroom, RestroomId,
};

#[derive(Debug, Default)]
struct Tables {
    restrooms: Vec<Restroom>,
    custodians: Vec<Custodian>,
    checks: Vec<Check>,
    incidents: Vec<Incident>,
    next_check_id: i32,
    next_incident_id: i32,
}

impl Tables {
    fn allocate_check_id(&mut self) -> CheckId {
        self.next_check_id += 1;
        CheckId::new(self.next_check_id)
    }

    fn allocate_incident_id(&mut self) -> IncidentId {
        self.next_incident_id += 1;
        IncidentId::new(self.next_incident_id)
    }
}

/// Mutex-guarded implementation of [`FacilityRepository`].
///
/// Checks and incidents are appended in id order, so reversing a scan
/// yields newest first.
#[derive(Debug, Default)]
pub struct InMemoryFacilityRepository {
    tables: Mutex<Tables>,
}

impl InMemoryFacilityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store already holding `seed`.
    pub fn with_seed(seed: &FacilitySeed) -> Self {
        let mut tables = Tables::default();
        apply_seed(&mut tables, seed);
        Self {
            tables: Mutex::new(tables),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, FacilityRepositoryError> {
        self.tables
            .lock()
            .map_err(|_| FacilityRepositoryError::query("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl FacilityRepository for InMemoryFacilityRepository {
    async fn list_restrooms(&self) -> Result<Vec<Restroom>, FacilityRepositoryError> {
        let mut restrooms = self.lock()?.restrooms.clone();
        restrooms.sort_by_key(Restroom::id);
        Ok(restrooms)
    }

    async fn find_restroom(
        &self,
        id: RestroomId,
    ) -> Result<Option<Restroom>, FacilityRepositoryError> {
        Ok(self.lock()?.restrooms.iter().find(|r| r.id() == id).cloned())
    }

    async fn list_custodians(&self) -> Result<Vec<Custodian>, FacilityRepositoryError> {
        let mut custodians = self.lock()?.custodians.clone();
        custodians.sort_by_key(Custodian::id);
        Ok(custodians)
    }

    async fn find_custodian(
        &self,
        id: CustodianId,
    ) -> Result<Option<Custodian>, FacilityRepositoryError> {
        Ok(self.lock()?.custodians.iter().find(|c| c.id() == id).cloned())
    }

    async fn recent_checks(&self, limit: usize) -> Result<Vec<Check>, FacilityRepositoryError> {
        Ok(self
            .lock()?
            .checks
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn latest_check_for_restroom(
        &self,
        restroom_id: RestroomId,
    ) -> Result<Option<Check>, FacilityRepositoryError> {
        Ok(self
            .lock()?
            .checks
            .iter()
            .rev()
            .find(|check| check.restroom_id() == restroom_id)
            .cloned())
    }

    async fn list_incidents(&self) -> Result<Vec<Incident>, FacilityRepositoryError> {
        Ok(self.lock()?.incidents.iter().rev().cloned().collect())
    }

    async fn incidents_for_restroom(
        &self,
        restroom_id: RestroomId,
    ) -> Result<Vec<Incident>, FacilityRepositoryError> {
        Ok(self
            .lock()?
            .incidents
            .iter()
            .rev()
            .filter(|incident| incident.restroom_id() == restroom_id)
            .cloned()
            .collect())
    }

    async fn find_incident(
        &self,
        id: IncidentId,
    ) -> Result<Option<Incident>, FacilityRepositoryError> {
        Ok(self.lock()?.incidents.iter().find(|i| i.id() == id).cloned())
    }

    async fn insert_check_unless_blocked(
        &self,
        check: NewCheck,
    ) -> Result<CheckInsertion, FacilityRepositoryError> {
        let mut tables = self.lock()?;
        if gating::has_active_incident(check.restroom_id, &tables.incidents) {
            return Ok(CheckInsertion::Blocked);
        }
        let id = tables.allocate_check_id();
        let check = Check::from_new(id, check);
        tables.checks.push(check.clone());
        Ok(CheckInsertion::Inserted(check))
    }

    async fn insert_incident(
        &self,
        incident: NewIncident,
    ) -> Result<Incident, FacilityRepositoryError> {
        let mut tables = self.lock()?;
        let id = tables.allocate_incident_id();
        let incident = Incident::from_new(id, incident);
        tables.incidents.push(incident.clone());
        Ok(incident)
    }

    async fn resolve_incident(
        &self,
        id: IncidentId,
        at: DateTime<Utc>,
    ) -> Result<ResolveOutcome, FacilityRepositoryError> {
        let mut tables = self.lock()?;
        let Some(incident) = tables.incidents.iter_mut().find(|i| i.id() == id) else {
            return Ok(ResolveOutcome::NotFound);
        };
        if incident.resolve(at) {
            Ok(ResolveOutcome::Resolved(incident.clone()))
        } else {
            Ok(ResolveOutcome::AlreadyResolved(incident.clone()))
        }
    }

    async fn seed(&self, seed: &FacilitySeed) -> Result<(), FacilityRepositoryError> {
        let mut tables = self.lock()?;
        apply_seed(&mut tables, seed);
        Ok(())
    }
}

fn apply_seed(tables: &mut Tables, seed: &FacilitySeed) {
    for restroom in seed.restrooms() {
        if !tables.restrooms.iter().any(|r| r.id() == restroom.id()) {
            tables.restrooms.push(restroom.clone());
        }
    }
    for custodian in seed.custodians() {
        if !tables.custodians.iter().any(|c| c.id() == custodian.id()) {
            tables.custodians.push(custodian.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{Gender, IncidentDescription, Severity};
    use rstest::{fixture, rstest};

    #[fixture]
    fn seeded() -> InMemoryFacilityRepository {
        let seed = FacilitySeed::new(
            vec![
                Restroom::new(RestroomId::new(2), "Annex", "Main", "1").expect("valid"),
                Restroom::new(RestroomId::new(1), "Lobby", "Main", "G").expect("valid"),
            ],
            vec![Custodian::new(CustodianId::new(1), "Ana", Gender::Female).expect("valid")],
        )
        .expect("valid seed");
        InMemoryFacilityRepository::with_seed(&seed)
    }

    fn new_check(restroom: i32) -> NewCheck {
        NewCheck {
            custodian_id: CustodianId::new(1),
            restroom_id: RestroomId::new(restroom),
            checked_at: Utc::now(),
            note: None,
        }
    }

    fn new_incident(restroom: i32) -> NewIncident {
        NewIncident {
            custodian_id: CustodianId::new(1),
            restroom_id: RestroomId::new(restroom),
            description: IncidentDescription::new("leak").expect("valid"),
            severity: Severity::default(),
            created_at: Utc::now(),
            last_check: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn restrooms_are_listed_by_id(seeded: InMemoryFacilityRepository) {
        let ids: Vec<_> = seeded
            .list_restrooms()
            .await
            .expect("list")
            .iter()
            .map(Restroom::id)
            .collect();
        assert_eq!(ids, vec![RestroomId::new(1), RestroomId::new(2)]);
    }

    #[rstest]
    #[tokio::test]
    async fn seeding_twice_is_idempotent(seeded: InMemoryFacilityRepository) {
        let seed = FacilitySeed::new(
            vec![Restroom::new(RestroomId::new(1), "Renamed", "Main", "G").expect("valid")],
            Vec::new(),
        )
        .expect("valid seed");
        seeded.seed(&seed).await.expect("reseed");
        let restrooms = seeded.list_restrooms().await.expect("list");
        assert_eq!(restrooms.len(), 2);
        assert_eq!(restrooms[0].name(), "Lobby");
    }

    #[rstest]
    #[tokio::test]
    async fn pending_incident_blocks_check_insert(seeded: InMemoryFacilityRepository) {
        seeded.insert_incident(new_incident(1)).await.expect("insert");
        let outcome = seeded
            .insert_check_unless_blocked(new_check(1))
            .await
            .expect("insert attempt");
        assert_eq!(outcome, CheckInsertion::Blocked);
        assert!(seeded.recent_checks(10).await.expect("list").is_empty());

        let other = seeded
            .insert_check_unless_blocked(new_check(2))
            .await
            .expect("insert attempt");
        assert!(matches!(other, CheckInsertion::Inserted(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn listings_are_newest_first(seeded: InMemoryFacilityRepository) {
        for restroom in [1, 2, 1] {
            seeded
                .insert_check_unless_blocked(new_check(restroom))
                .await
                .expect("insert");
        }
        let checks = seeded.recent_checks(2).await.expect("list");
        let ids: Vec<_> = checks.iter().map(|c| c.id().get()).collect();
        assert_eq!(ids, vec![3, 2]);

        let latest = seeded
            .latest_check_for_restroom(RestroomId::new(1))
            .await
            .expect("latest")
            .expect("present");
        assert_eq!(latest.id(), CheckId::new(3));
    }

    #[rstest]
    #[tokio::test]
    async fn resolve_reports_each_outcome(seeded: InMemoryFacilityRepository) {
        let incident = seeded.insert_incident(new_incident(1)).await.expect("insert");
        let at = incident.created_at();

        let first = seeded.resolve_incident(incident.id(), at).await.expect("resolve");
        let ResolveOutcome::Resolved(resolved) = first else {
            panic!("expected first resolve to transition, got {first:?}");
        };
        assert_eq!(resolved.resolved_at(), Some(at));

        let later = at + chrono::Duration::minutes(5);
        let second = seeded.resolve_incident(incident.id(), later).await.expect("resolve");
        let ResolveOutcome::AlreadyResolved(unchanged) = second else {
            panic!("expected idempotent resolve, got {second:?}");
        };
        assert_eq!(unchanged.resolved_at(), Some(at));

        let missing = seeded
            .resolve_incident(IncidentId::new(99), later)
            .await
            .expect("resolve");
        assert_eq!(missing, ResolveOutcome::NotFound);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checks_and_incident_never_interleave(seeded: InMemoryFacilityRepository) {
        let repo = Arc::new(seeded);
        let incident_repo = Arc::clone(&repo);
        let reporter = tokio::spawn(async move {
            incident_repo
                .insert_incident(new_incident(1))
                .await
                .expect("insert")
        });
        let mut loggers = Vec::new();
        for _ in 0..16 {
            let repo = Arc::clone(&repo);
            loggers.push(tokio::spawn(async move {
                repo.insert_check_unless_blocked(new_check(1))
                    .await
                    .expect("insert attempt")
            }));
        }
        let incident = reporter.await.expect("join");
        for logger in loggers {
            if let CheckInsertion::Inserted(check) = logger.await.expect("join") {
                assert!(check.id().get() > 0);
            }
        }

        // Once the incident is visible nothing further may be inserted.
        let after = repo
            .insert_check_unless_blocked(new_check(1))
            .await
            .expect("insert attempt");
        assert_eq!(after, CheckInsertion::Blocked);
        assert!(incident.is_pending());
    }
}
