//! Test utilities for the backend crate.
//!
//! Shared helpers for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and when the `test-support` feature is on.

pub mod clock {
    //! Controllable clock.

    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Clock that only moves when told to.
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        pub fn advance(&self, delta: Duration) {
            let delta = match TimeDelta::from_std(delta) {
                Ok(delta) => delta,
                Err(error) => {
                    panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
                }
            };
            *self.lock_clock() += delta;
        }

        pub fn advance_seconds(&self, seconds: i64) {
            *self.lock_clock() += TimeDelta::seconds(seconds);
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.lock_clock() = now;
        }

        fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod sleep {
    //! Sleepers for driving the report scheduler without waiting.

    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::domain::ReportSleeper;

    /// Records requested durations and returns immediately.
    #[derive(Default)]
    pub struct RecordingSleeper(Mutex<Vec<Duration>>);

    impl RecordingSleeper {
        pub fn recorded(&self) -> Vec<Duration> {
            match self.0.lock() {
                Ok(entries) => entries.clone(),
                Err(_) => panic!("sleeper mutex"),
            }
        }
    }

    #[async_trait]
    impl ReportSleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            let mut entries = match self.0.lock() {
                Ok(entries) => entries,
                Err(_) => panic!("sleeper mutex"),
            };
            entries.push(duration);
        }
    }
}

pub mod notify {
    //! Recording doubles for the audit log and mailer.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::domain::AuditEntry;
    use crate::domain::ports::{AuditLog, AuditLogError, MailMessage, Mailer, MailerError};

    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("recording mutex"),
        }
    }

    /// Audit log that keeps rows in memory and can be told to fail.
    #[derive(Default)]
    pub struct RecordingAuditLog {
        entries: Mutex<Vec<AuditEntry>>,
        failing: AtomicBool,
    }

    impl RecordingAuditLog {
        pub fn entries(&self) -> Vec<AuditEntry> {
            lock(&self.entries).clone()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl AuditLog for RecordingAuditLog {
        async fn append(&self, entry: &AuditEntry) -> Result<(), AuditLogError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(AuditLogError::io("audit disk unavailable"));
            }
            lock(&self.entries).push(entry.clone());
            Ok(())
        }
    }

    /// Mailer that keeps sent messages in memory.
    pub struct RecordingMailer {
        configured: bool,
        failing: AtomicBool,
        sent: Mutex<Vec<MailMessage>>,
    }

    impl RecordingMailer {
        pub fn configured() -> Self {
            Self {
                configured: true,
                failing: AtomicBool::new(false),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn unconfigured() -> Self {
            Self {
                configured: false,
                ..Self::configured()
            }
        }

        pub fn sent(&self) -> Vec<MailMessage> {
            lock(&self.sent).clone()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn send(&self, message: MailMessage) -> Result<(), MailerError> {
            if !self.configured {
                return Err(MailerError::NotConfigured);
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(MailerError::transport("relay unreachable"));
            }
            lock(&self.sent).push(message);
            Ok(())
        }
    }
}

pub mod harness {
    //! In-process application wiring for handler and scenario tests.

    use std::sync::Arc;

    use actix_session::SessionMiddleware;
    use actix_web::cookie::Key;
    use chrono::{DateTime, TimeZone, Utc};

    use super::clock::MutableClock;
    use super::notify::{RecordingAuditLog, RecordingMailer};
    use crate::domain::ports::{ChangeBroadcaster, LoginService, SharedSecretLoginService};
    use crate::domain::{
        Custodian, CustodianId, EffectDispatcher, FacilitySeed, FacilityService, Gender,
        Restroom, RestroomId, SharedSecret,
    };
    use crate::inbound::http::session_store::MemorySessionStore;
    use crate::inbound::http::state::HttpState;
    use crate::inbound::ws::state::WsState;
    use crate::outbound::broadcast::TokioChangeBroadcaster;
    use crate::outbound::memory::InMemoryFacilityRepository;

    pub const STAFF_PASSWORD: &str = "staff-secret";
    pub const ADMIN_PASSWORD: &str = "admin-secret";

    /// Two restrooms and two custodians with stable ids.
    pub fn small_seed() -> FacilitySeed {
        let restroom = |id, name: &str| {
            Restroom::new(RestroomId::new(id), name, "Main", "1")
                .unwrap_or_else(|err| panic!("seed restroom: {err}"))
        };
        let custodian = |id, name: &str, gender| {
            Custodian::new(CustodianId::new(id), name, gender)
                .unwrap_or_else(|err| panic!("seed custodian: {err}"))
        };
        FacilitySeed::new(
            vec![restroom(1, "Lobby"), restroom(2, "Gym")],
            vec![
                custodian(1, "Ana", Gender::Female),
                custodian(2, "Ben", Gender::Male),
            ],
        )
        .unwrap_or_else(|err| panic!("seed: {err}"))
    }

    pub fn start_of_march() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("valid timestamp"))
    }

    /// Every adapter behind the HTTP and WebSocket state, kept for
    /// inspection.
    pub struct FacilityHarness {
        pub repo: Arc<InMemoryFacilityRepository>,
        pub clock: Arc<MutableClock>,
        pub broadcaster: Arc<TokioChangeBroadcaster>,
        pub audit: Arc<RecordingAuditLog>,
        pub mailer: Arc<RecordingMailer>,
        pub service: Arc<FacilityService<InMemoryFacilityRepository>>,
        pub login: Arc<dyn LoginService>,
        pub sessions: MemorySessionStore,
    }

    impl FacilityHarness {
        pub fn new() -> Self {
            Self::with_mailer(RecordingMailer::configured())
        }

        pub fn with_mailer(mailer: RecordingMailer) -> Self {
            let repo = Arc::new(InMemoryFacilityRepository::with_seed(&small_seed()));
            let clock = Arc::new(MutableClock::new(start_of_march()));
            let broadcaster = Arc::new(TokioChangeBroadcaster::default());
            let audit = Arc::new(RecordingAuditLog::default());
            let mailer = Arc::new(mailer);
            let effects = EffectDispatcher::new(broadcaster.clone(), audit.clone(), mailer.clone());
            let service = Arc::new(FacilityService::new(repo.clone(), clock.clone(), effects));
            let login: Arc<dyn LoginService> = Arc::new(SharedSecretLoginService::new(
                SharedSecret::new(STAFF_PASSWORD),
                SharedSecret::new(ADMIN_PASSWORD),
            ));
            Self {
                repo,
                clock,
                broadcaster,
                audit,
                mailer,
                service,
                login,
                sessions: MemorySessionStore::new(),
            }
        }

        pub fn http_state(&self) -> HttpState {
            HttpState::new(self.login.clone(), self.service.clone(), self.service.clone())
        }

        pub fn ws_state(&self) -> WsState {
            let broadcaster: Arc<dyn ChangeBroadcaster> = self.broadcaster.clone();
            WsState::new(broadcaster, self.sessions.clone())
        }

        /// Session middleware over [`Self::sessions`] with a throwaway key
        /// and an insecure `session` cookie for plain HTTP tests.
        pub fn session_middleware(&self) -> SessionMiddleware<MemorySessionStore> {
            SessionMiddleware::builder(self.sessions.clone(), Key::generate())
                .cookie_name("session".to_owned())
                .cookie_secure(false)
                .build()
        }
    }

    impl Default for FacilityHarness {
        fn default() -> Self {
            Self::new()
        }
    }
}

pub mod fs {
    //! Scratch directories.

    use tempfile::TempDir;

    /// Empty directory removed when the handle drops.
    pub fn scratch_dir() -> TempDir {
        tempfile::tempdir().unwrap_or_else(|err| panic!("scratch dir: {err}"))
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic if not an Object.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => {
                panic!(
                    "schema '{name}' is a $ref to '{}'; resolve the reference first",
                    reference.ref_location
                );
            }
            RefOr::T(Schema::Array(_)) => {
                panic!("schema '{name}' is an Array, not an Object");
            }
            _ => panic!("schema '{name}' has unexpected type"),
        }
    }

    /// Property names of an object schema, in declaration order.
    pub fn property_names(obj: &Object) -> Vec<&str> {
        obj.properties.keys().map(String::as_str).collect()
    }
}
