//! Tests for the monthly audit report job and scheduler.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    AuditFile, AuditLogError, MailerError, MockAuditArchive, MockMailer,
};
use crate::test_support::clock::MutableClock;
use crate::test_support::notify::RecordingMailer;
use crate::test_support::sleep::RecordingSleeper;

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn february() -> AuditPeriod {
    AuditPeriod::new(2026, 2).expect("valid month")
}

#[fixture]
fn february_file() -> AuditFile {
    AuditFile {
        file_name: "audit-2026-02.csv".to_owned(),
        contents: b"Date,Type,Restroom,Custodian,Details\n".to_vec(),
    }
}

fn archive_with(file: Option<AuditFile>, removals: usize) -> MockAuditArchive {
    let mut archive = MockAuditArchive::new();
    archive
        .expect_read_period()
        .with(eq(february()))
        .times(1)
        .return_once(move |_| Ok(file));
    archive
        .expect_remove_period()
        .with(eq(february()))
        .times(removals)
        .returning(|_| Ok(()));
    archive
}

fn configured_mailer(result: Result<(), MailerError>) -> MockMailer {
    let mut mailer = MockMailer::new();
    mailer.expect_is_configured().return_const(true);
    mailer
        .expect_send()
        .withf(|message| {
            message.subject.contains("2026-02")
                && message.attachments.len() == 1
                && message.attachments[0].file_name == "audit-2026-02.csv"
                && message.attachments[0].content_type == "text/csv"
        })
        .times(1)
        .return_once(move |_| result);
    mailer
}

fn unconfigured_mailer() -> MockMailer {
    let mut mailer = MockMailer::new();
    mailer.expect_is_configured().return_const(false);
    mailer.expect_send().times(0);
    mailer
}

#[rstest]
#[case(at(2026, 3, 17, 12, 0), at(2026, 4, 1, 0, 5))]
#[case(at(2026, 3, 1, 0, 0), at(2026, 3, 1, 0, 5))]
#[case(at(2026, 3, 1, 0, 5), at(2026, 4, 1, 0, 5))]
#[case(at(2026, 12, 31, 23, 59), at(2027, 1, 1, 0, 5))]
fn next_run_is_first_of_month_after_now(
    #[case] now: DateTime<Utc>,
    #[case] expected: DateTime<Utc>,
) {
    assert_eq!(next_run_after(now), expected);
}

#[rstest]
#[tokio::test]
async fn missing_file_is_a_no_op() {
    let mut mailer = MockMailer::new();
    mailer.expect_send().times(0);
    let job = MonthlyReportJob::new(Arc::new(archive_with(None, 0)), Arc::new(mailer));

    assert_eq!(job.run_once(at(2026, 3, 1, 0, 5)).await, ReportOutcome::NoFile);
}

#[rstest]
#[tokio::test]
async fn sent_report_removes_file(february_file: AuditFile) {
    let job = MonthlyReportJob::new(
        Arc::new(archive_with(Some(february_file), 1)),
        Arc::new(configured_mailer(Ok(()))),
    );

    assert_eq!(job.run_once(at(2026, 3, 1, 0, 5)).await, ReportOutcome::Sent);
}

#[rstest]
#[tokio::test]
async fn failed_send_keeps_file(february_file: AuditFile) {
    let job = MonthlyReportJob::new(
        Arc::new(archive_with(Some(february_file), 0)),
        Arc::new(configured_mailer(Err(MailerError::transport("timeout")))),
    );

    assert_eq!(
        job.run_once(at(2026, 3, 1, 0, 5)).await,
        ReportOutcome::SendFailed
    );
}

#[rstest]
#[case(false, 1, ReportOutcome::DiscardedUnsent)]
#[case(true, 0, ReportOutcome::RetainedUnsent)]
#[tokio::test]
async fn unconfigured_mail_honours_retention(
    february_file: AuditFile,
    #[case] retain: bool,
    #[case] removals: usize,
    #[case] expected: ReportOutcome,
) {
    let job = MonthlyReportJob::new(
        Arc::new(archive_with(Some(february_file), removals)),
        Arc::new(unconfigured_mailer()),
    )
    .with_retain_unsent(retain);

    assert_eq!(job.run_once(at(2026, 3, 1, 0, 5)).await, expected);
}

#[rstest]
#[tokio::test]
async fn unreadable_archive_is_reported() {
    let mut archive = MockAuditArchive::new();
    archive
        .expect_read_period()
        .return_once(|_| Err(AuditLogError::io("permission denied")));
    archive.expect_remove_period().times(0);
    let job = MonthlyReportJob::new(Arc::new(archive), Arc::new(unconfigured_mailer()));

    assert_eq!(
        job.run_once(at(2026, 3, 1, 0, 5)).await,
        ReportOutcome::ArchiveFailed
    );
}

#[rstest]
#[tokio::test]
async fn scheduler_sleeps_until_next_month_then_reports_previous(february_file: AuditFile) {
    let clock = Arc::new(MutableClock::new(at(2026, 2, 28, 23, 0)));
    let sleeper = Arc::new(RecordingSleeper::default());
    let job = MonthlyReportJob::new(
        Arc::new(archive_with(Some(february_file), 1)),
        Arc::new(configured_mailer(Ok(()))),
    );
    let scheduler = MonthlyReportScheduler::new(job, clock, sleeper.clone());

    assert_eq!(scheduler.tick().await, ReportOutcome::Sent);
    assert_eq!(sleeper.recorded(), vec![Duration::from_secs(65 * 60)]);
}

fn file_for(period: AuditPeriod) -> AuditFile {
    AuditFile {
        file_name: period.file_name(),
        contents: b"Date,Type,Restroom,Custodian,Details\n".to_vec(),
    }
}

fn listing_archive(stored: Vec<AuditPeriod>, removable: Vec<AuditPeriod>) -> MockAuditArchive {
    let mut archive = MockAuditArchive::new();
    archive
        .expect_list_periods()
        .times(1)
        .return_once(move || Ok(stored));
    archive
        .expect_read_period()
        .returning(|period| Ok(Some(file_for(period))));
    archive
        .expect_remove_period()
        .withf(move |period| removable.contains(period))
        .returning(|_| Ok(()));
    archive
}

#[rstest]
#[tokio::test]
async fn catch_up_reports_earlier_months_oldest_first() {
    let december = AuditPeriod::new(2025, 12).expect("valid month");
    let march = AuditPeriod::new(2026, 3).expect("valid month");
    let archive = listing_archive(vec![march, february(), december], vec![december, february()]);
    let mailer = Arc::new(RecordingMailer::configured());
    let job = MonthlyReportJob::new(Arc::new(archive), mailer.clone());

    let outcomes = job.catch_up(at(2026, 3, 10, 8, 0)).await;

    assert_eq!(
        outcomes,
        vec![
            (december, ReportOutcome::Sent),
            (february(), ReportOutcome::Sent)
        ]
    );
    let subjects: Vec<_> = mailer.sent().into_iter().map(|m| m.subject).collect();
    assert_eq!(
        subjects,
        vec![
            "Restroom audit report 2025-12",
            "Restroom audit report 2026-02"
        ]
    );
}

#[rstest]
#[tokio::test]
async fn catch_up_without_a_listing_does_nothing() {
    let mut archive = MockAuditArchive::new();
    archive
        .expect_list_periods()
        .return_once(|| Err(AuditLogError::io("permission denied")));
    archive.expect_read_period().times(0);
    archive.expect_remove_period().times(0);
    let job = MonthlyReportJob::new(Arc::new(archive), Arc::new(unconfigured_mailer()));

    assert!(job.catch_up(at(2026, 3, 10, 8, 0)).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn restart_after_the_first_still_reports_last_month() {
    let clock = Arc::new(MutableClock::new(at(2026, 3, 1, 9, 30)));
    let sleeper = Arc::new(RecordingSleeper::default());
    let archive = listing_archive(vec![february()], vec![february()]);
    let mailer = Arc::new(RecordingMailer::configured());
    let job = MonthlyReportJob::new(Arc::new(archive), mailer.clone());
    let scheduler = MonthlyReportScheduler::new(job, clock, sleeper.clone());

    let outcomes = scheduler.catch_up().await;

    assert_eq!(outcomes, vec![(february(), ReportOutcome::Sent)]);
    assert_eq!(mailer.sent().len(), 1);
    assert!(sleeper.recorded().is_empty());
}
