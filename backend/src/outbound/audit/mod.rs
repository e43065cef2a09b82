//! Monthly CSV audit files stored in a capability-scoped directory.
//!
//! One file per calendar month, named `audit-YYYY-MM.csv`. Appends are
//! serialised through a lock so the header is written exactly once per file.

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;

use crate::domain::ports::{AuditArchive, AuditFile, AuditLog, AuditLogError};
use crate::domain::{AUDIT_HEADER, AuditEntry, AuditPeriod};

/// CSV implementation of [`AuditLog`] and [`AuditArchive`].
#[derive(Debug, Clone)]
pub struct CsvAuditLog {
    dir: Arc<Dir>,
    write_lock: Arc<Mutex<()>>,
}

impl CsvAuditLog {
    /// Open (creating if needed) the audit directory at `path`.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self::from_dir(dir))
    }

    pub fn from_dir(dir: Dir) -> Self {
        Self {
            dir: Arc::new(dir),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, AuditLogError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir, &Mutex<()>) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        let lock = Arc::clone(&self.write_lock);
        tokio::task::spawn_blocking(move || op(&dir, &lock))
            .await
            .map_err(|err| AuditLogError::io(format!("audit task failed: {err}")))?
            .map_err(|err| AuditLogError::io(err.to_string()))
    }
}

fn append_row(dir: &Dir, lock: &Mutex<()>, name: &str, row: &str) -> io::Result<()> {
    let _guard = lock
        .lock()
        .map_err(|_| io::Error::other("audit write lock poisoned"))?;
    let is_new = !dir.exists(name);
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    let mut file = dir.open_with(name, &options)?;
    if is_new {
        writeln!(file, "{AUDIT_HEADER}")?;
    }
    writeln!(file, "{row}")?;
    file.flush()
}

fn read_optional(dir: &Dir, name: &str) -> io::Result<Option<Vec<u8>>> {
    match dir.read(name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn stored_periods(dir: &Dir) -> io::Result<Vec<AuditPeriod>> {
    let mut periods = Vec::new();
    for entry in dir.entries()? {
        let name = entry?.file_name();
        if let Some(period) = name.to_str().and_then(AuditPeriod::from_file_name) {
            periods.push(period);
        }
    }
    periods.sort_unstable();
    Ok(periods)
}

fn remove_optional(dir: &Dir, name: &str) -> io::Result<()> {
    match dir.remove_file(name) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[async_trait]
impl AuditLog for CsvAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditLogError> {
        let name = entry.period().file_name();
        let row = entry.csv_row();
        debug!(file = %name, kind = entry.kind.as_str(), "appending audit row");
        self.blocking(move |dir, lock| append_row(dir, lock, &name, &row))
            .await
    }
}

#[async_trait]
impl AuditArchive for CsvAuditLog {
    async fn read_period(&self, period: AuditPeriod) -> Result<Option<AuditFile>, AuditLogError> {
        let name = period.file_name();
        let lookup = name.clone();
        let contents = self
            .blocking(move |dir, _| read_optional(dir, &lookup))
            .await?;
        Ok(contents.map(|contents| AuditFile {
            file_name: name,
            contents,
        }))
    }

    async fn remove_period(&self, period: AuditPeriod) -> Result<(), AuditLogError> {
        let name = period.file_name();
        self.blocking(move |dir, lock| {
            let _guard = lock
                .lock()
                .map_err(|_| io::Error::other("audit write lock poisoned"))?;
            remove_optional(dir, &name)
        })
        .await
    }

    async fn list_periods(&self) -> Result<Vec<AuditPeriod>, AuditLogError> {
        self.blocking(|dir, _| stored_periods(dir)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AuditEventKind;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn entry(month: u32, details: &str) -> AuditEntry {
        AuditEntry {
            occurred_at: Utc
                .with_ymd_and_hms(2026, month, 10, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
            kind: AuditEventKind::Check,
            restroom: "Lobby".to_owned(),
            custodian: "Ana".to_owned(),
            details: details.to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn header_is_written_once_per_file(temp_dir: TempDir) {
        let log = CsvAuditLog::open(temp_dir.path()).expect("open audit dir");
        log.append(&entry(3, "first")).await.expect("append");
        log.append(&entry(3, "second, with comma")).await.expect("append");

        let contents = std::fs::read_to_string(temp_dir.path().join("audit-2026-03.csv"))
            .expect("read audit file");
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                AUDIT_HEADER,
                "2026-03-10T12:00:00Z,CHECK,Lobby,Ana,first",
                "2026-03-10T12:00:00Z,CHECK,Lobby,Ana,\"second, with comma\"",
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn rows_land_in_the_month_they_occurred(temp_dir: TempDir) {
        let log = CsvAuditLog::open(temp_dir.path()).expect("open audit dir");
        log.append(&entry(1, "january")).await.expect("append");
        log.append(&entry(2, "february")).await.expect("append");

        assert!(temp_dir.path().join("audit-2026-01.csv").exists());
        assert!(temp_dir.path().join("audit-2026-02.csv").exists());
    }

    #[rstest]
    #[tokio::test]
    async fn archive_reads_and_removes_periods(temp_dir: TempDir) {
        let log = CsvAuditLog::open(temp_dir.path()).expect("open audit dir");
        let period = AuditPeriod::new(2026, 4).expect("valid");
        assert!(log.read_period(period).await.expect("read").is_none());

        log.append(&entry(4, "april")).await.expect("append");
        let file = log
            .read_period(period)
            .await
            .expect("read")
            .expect("file present");
        assert_eq!(file.file_name, "audit-2026-04.csv");
        assert!(String::from_utf8_lossy(&file.contents).contains("april"));

        log.remove_period(period).await.expect("remove");
        assert!(log.read_period(period).await.expect("read").is_none());
        log.remove_period(period).await.expect("removing twice is fine");
    }

    #[rstest]
    #[tokio::test]
    async fn stored_periods_are_listed_oldest_first(temp_dir: TempDir) {
        let log = CsvAuditLog::open(temp_dir.path()).expect("open audit dir");
        log.append(&entry(4, "april")).await.expect("append");
        log.append(&entry(1, "january")).await.expect("append");
        std::fs::write(temp_dir.path().join("notes.txt"), "unrelated").expect("write stray file");

        let periods = log.list_periods().await.expect("list");

        assert_eq!(
            periods,
            vec![
                AuditPeriod::new(2026, 1).expect("valid"),
                AuditPeriod::new(2026, 4).expect("valid"),
            ]
        );
    }
}
