//! Adapter selection and service wiring.
//!
//! With a database URL the gating engine runs on PostgreSQL; without one it
//! runs on the in-process store. Either way the same notification adapters
//! sit behind the effect dispatcher and the monthly report job.

use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use facility_backend::config::AppSettings;
use facility_backend::domain::ports::{
    AuditArchive, AuditLog, ChangeBroadcaster, DisabledMailer, FacilityRepository, LoginService,
    Mailer, SharedSecretLoginService,
};
use facility_backend::domain::{
    EffectDispatcher, FacilityService, MonthlyReportJob, MonthlyReportScheduler, Role,
    TokioSleeper,
};
use facility_backend::inbound::http::session_store::MemorySessionStore;
use facility_backend::inbound::http::state::HttpState;
use facility_backend::inbound::ws::state::WsState;
use facility_backend::outbound::audit::CsvAuditLog;
use facility_backend::outbound::broadcast::TokioChangeBroadcaster;
use facility_backend::outbound::mail::HttpMailRelay;
use facility_backend::outbound::memory::InMemoryFacilityRepository;
use facility_backend::outbound::persistence::{
    DbPool, DieselFacilityRepository, PoolConfig, run_migrations,
};
use facility_backend::seed::seed_on_startup;

/// Fully wired state for the server and the background scheduler.
pub struct AppStates {
    pub http: HttpState,
    pub ws: WsState,
    pub sessions: MemorySessionStore,
    pub scheduler: MonthlyReportScheduler,
}

/// Notification adapters shared by every store choice.
struct Notifiers {
    broadcaster: Arc<dyn ChangeBroadcaster>,
    audit: Arc<CsvAuditLog>,
    mailer: Arc<dyn Mailer>,
}

fn build_mailer(settings: &AppSettings) -> Result<Arc<dyn Mailer>> {
    match settings.mail_relay()? {
        Some((endpoint, identity)) => {
            info!(endpoint = %endpoint, recipients = identity.to.len(), "mail relay enabled");
            let relay = HttpMailRelay::new(endpoint, settings.mail_timeout(), identity)
                .wrap_err("failed to build mail relay client")?;
            Ok(Arc::new(relay))
        }
        None => {
            warn!("no mail relay configured; incident and report emails are disabled");
            Ok(Arc::new(DisabledMailer))
        }
    }
}

fn build_login(settings: &AppSettings) -> Arc<dyn LoginService> {
    let login = SharedSecretLoginService::new(settings.staff_secret(), settings.admin_secret());
    for role in [Role::Staff, Role::Admin] {
        if !login.is_enabled(role) {
            warn!(%role, "no password configured; logins for this role are refused");
        }
    }
    Arc::new(login)
}

fn build_notifiers(settings: &AppSettings) -> Result<Notifiers> {
    let audit_dir = settings.audit_dir();
    let audit = CsvAuditLog::open(&audit_dir)
        .wrap_err_with(|| format!("failed to open audit directory {}", audit_dir.display()))?;
    Ok(Notifiers {
        broadcaster: Arc::new(TokioChangeBroadcaster::default()),
        audit: Arc::new(audit),
        mailer: build_mailer(settings)?,
    })
}

fn assemble<R>(
    repo: Arc<R>,
    notifiers: Notifiers,
    login: Arc<dyn LoginService>,
    retain_unsent: bool,
) -> AppStates
where
    R: FacilityRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let audit_log: Arc<dyn AuditLog> = notifiers.audit.clone();
    let archive: Arc<dyn AuditArchive> = notifiers.audit;
    let effects = EffectDispatcher::new(
        notifiers.broadcaster.clone(),
        audit_log,
        notifiers.mailer.clone(),
    );
    let service = Arc::new(FacilityService::new(repo, clock.clone(), effects));
    let job = MonthlyReportJob::new(archive, notifiers.mailer).with_retain_unsent(retain_unsent);
    let sessions = MemorySessionStore::new();

    AppStates {
        http: HttpState::new(login, service.clone(), service),
        ws: WsState::new(notifiers.broadcaster, sessions.clone()),
        sessions,
        scheduler: MonthlyReportScheduler::new(job, clock, Arc::new(TokioSleeper)),
    }
}

async fn seeded<R>(repo: R, seed_path: Option<&Path>) -> Result<Arc<R>>
where
    R: FacilityRepository + 'static,
{
    seed_on_startup(&repo, seed_path)
        .await
        .wrap_err("failed to seed restrooms and custodians")?;
    Ok(Arc::new(repo))
}

/// Choose the store, seed it, and wire every service.
pub async fn build_states(settings: &AppSettings) -> Result<AppStates> {
    let notifiers = build_notifiers(settings)?;
    let login = build_login(settings);
    let seed_path = settings.seed_path.as_deref();
    let retain = settings.retain_unsent_reports;

    match settings.database_url.as_deref() {
        Some(url) => {
            run_migrations(url)
                .await
                .wrap_err("failed to apply database migrations")?;
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_size()))
                .await
                .wrap_err("failed to build database pool")?;
            let repo = seeded(DieselFacilityRepository::new(pool), seed_path).await?;
            info!("using PostgreSQL store");
            Ok(assemble(repo, notifiers, login, retain))
        }
        None => {
            let repo = seeded(InMemoryFacilityRepository::new(), seed_path).await?;
            warn!("no database configured; data lives in memory and is lost on restart");
            Ok(assemble(repo, notifiers, login, retain))
        }
    }
}
