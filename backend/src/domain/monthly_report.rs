//! Monthly audit report.
//!
//! Shortly after midnight UTC on the first of each month the previous
//! month's audit file is mailed as an attachment and then removed. A failed
//! send keeps the file so it can be recovered by hand. On startup any file
//! from an earlier month is reported first, so a run missed while the
//! service was down still happens.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::AuditPeriod;
use crate::domain::ports::{AuditArchive, MailAttachment, MailMessage, Mailer};

/// Minutes past midnight on the 1st at which the report runs.
pub const REPORT_MINUTE: u32 = 5;

/// What a single report run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Nothing was logged in the period.
    NoFile,
    /// The file was mailed and removed.
    Sent,
    /// Mail is not configured; the file was removed unsent.
    DiscardedUnsent,
    /// Mail is not configured; the file was kept.
    RetainedUnsent,
    /// The send failed; the file was kept.
    SendFailed,
    /// The archive could not be read.
    ArchiveFailed,
}

/// First report instant strictly after `now`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use facility_backend::domain::next_run_after;
///
/// let now = Utc.with_ymd_and_hms(2026, 3, 17, 12, 0, 0).unwrap();
/// assert_eq!(
///     next_run_after(now),
///     Utc.with_ymd_and_hms(2026, 4, 1, 0, 5, 0).unwrap()
/// );
/// ```
pub fn next_run_after(now: DateTime<Utc>) -> DateTime<Utc> {
    let this_month = run_instant(now.year(), now.month());
    match this_month {
        Some(at) if at > now => at,
        _ => {
            let (year, month) = if now.month() == 12 {
                (now.year() + 1, 1)
            } else {
                (now.year(), now.month() + 1)
            };
            run_instant(year, month).unwrap_or(now)
        }
    }
}

fn run_instant(year: i32, month: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, REPORT_MINUTE, 0)
        .single()
}

fn report_message(period: AuditPeriod, file_name: String, contents: Vec<u8>) -> MailMessage {
    MailMessage {
        subject: format!("Restroom audit report {period}"),
        body: format!("Attached is the audit log for {period}.\n"),
        attachments: vec![MailAttachment {
            file_name,
            content_type: "text/csv".to_owned(),
            data: contents,
        }],
    }
}

/// Mails and clears the previous month's audit file.
#[derive(Clone)]
pub struct MonthlyReportJob {
    archive: Arc<dyn AuditArchive>,
    mailer: Arc<dyn Mailer>,
    retain_unsent: bool,
}

impl MonthlyReportJob {
    pub fn new(archive: Arc<dyn AuditArchive>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            archive,
            mailer,
            retain_unsent: false,
        }
    }

    /// Keep the file when mail is not configured instead of removing it.
    #[must_use]
    pub fn with_retain_unsent(mut self, retain: bool) -> Self {
        self.retain_unsent = retain;
        self
    }

    /// Report on the month before the one containing `now`.
    pub async fn run_once(&self, now: DateTime<Utc>) -> ReportOutcome {
        self.report(AuditPeriod::containing(now).previous()).await
    }

    /// Report every stored month before the one containing `now`, oldest
    /// first. The current month is still being written and is left alone.
    pub async fn catch_up(&self, now: DateTime<Utc>) -> Vec<(AuditPeriod, ReportOutcome)> {
        let current = AuditPeriod::containing(now);
        let mut periods = match self.archive.list_periods().await {
            Ok(periods) => periods,
            Err(err) => {
                warn!(error = %err, "failed to list audit files; skipping catch-up");
                return Vec::new();
            }
        };
        periods.sort_unstable();
        periods.dedup();

        let mut outcomes = Vec::new();
        for period in periods.into_iter().filter(|period| *period < current) {
            info!(%period, "reporting audit file left from an earlier month");
            outcomes.push((period, self.report(period).await));
        }
        outcomes
    }

    async fn report(&self, period: AuditPeriod) -> ReportOutcome {
        let file = match self.archive.read_period(period).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                info!(%period, "no audit file for period");
                return ReportOutcome::NoFile;
            }
            Err(err) => {
                warn!(%period, error = %err, "failed to read audit file");
                return ReportOutcome::ArchiveFailed;
            }
        };

        if !self.mailer.is_configured() {
            if self.retain_unsent {
                warn!(%period, file = %file.file_name, "mail not configured; keeping audit file");
                return ReportOutcome::RetainedUnsent;
            }
            warn!(%period, file = %file.file_name, "mail not configured; discarding audit file");
            self.remove(period).await;
            return ReportOutcome::DiscardedUnsent;
        }

        let message = report_message(period, file.file_name, file.contents);
        match self.mailer.send(message).await {
            Ok(()) => {
                info!(%period, "monthly audit report sent");
                self.remove(period).await;
                ReportOutcome::Sent
            }
            Err(err) => {
                warn!(%period, error = %err, "monthly audit report failed; keeping file");
                ReportOutcome::SendFailed
            }
        }
    }

    async fn remove(&self, period: AuditPeriod) {
        if let Err(err) = self.archive.remove_period(period).await {
            warn!(%period, error = %err, "failed to remove audit file");
        }
    }
}

/// Abstraction over sleeping so the scheduler can be driven in tests.
#[async_trait]
pub trait ReportSleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by Tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl ReportSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs [`MonthlyReportJob`] at the start of every month.
pub struct MonthlyReportScheduler {
    job: MonthlyReportJob,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn ReportSleeper>,
}

impl MonthlyReportScheduler {
    pub fn new(
        job: MonthlyReportJob,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn ReportSleeper>,
    ) -> Self {
        Self {
            job,
            clock,
            sleeper,
        }
    }

    /// Sleep until the next report instant, then run the job once.
    pub async fn tick(&self) -> ReportOutcome {
        let now = self.clock.utc();
        let due = next_run_after(now);
        let wait = (due - now).to_std().unwrap_or(Duration::ZERO);
        info!(due = %due, "next monthly audit report scheduled");
        self.sleeper.sleep(wait).await;
        self.job.run_once(due).await
    }

    /// Report files left from months before the current one.
    pub async fn catch_up(&self) -> Vec<(AuditPeriod, ReportOutcome)> {
        self.job.catch_up(self.clock.utc()).await
    }

    /// Catch up once, then run forever.
    pub async fn run(self) {
        for (period, outcome) in self.catch_up().await {
            info!(%period, ?outcome, "audit catch-up run finished");
        }
        loop {
            let outcome = self.tick().await;
            info!(?outcome, "monthly audit report run finished");
        }
    }
}

#[cfg(test)]
#[path = "monthly_report_tests.rs"]
mod tests;
