//! Monthly audit trail rows and file naming.
//!
//! Every committed mutation appends one row to the file of the month it
//! happened in. The monthly report later mails the previous month's file.

use std::fmt;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// First line of every audit file.
pub const AUDIT_HEADER: &str = "Date,Type,Restroom,Custodian,Details";

/// Calendar month an audit file covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuditPeriod {
    year: i32,
    month: u32,
}

impl AuditPeriod {
    /// Build a period, returning `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Period containing `at`.
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// The month before this one.
    ///
    /// # Examples
    /// ```
    /// use facility_backend::domain::AuditPeriod;
    ///
    /// let january = AuditPeriod::new(2026, 1).unwrap();
    /// assert_eq!(january.previous(), AuditPeriod::new(2025, 12).unwrap());
    /// ```
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// File name such as `audit-2026-03.csv`.
    pub fn file_name(self) -> String {
        format!("audit-{self}.csv")
    }

    /// Inverse of [`Self::file_name`]; anything else is `None`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_prefix("audit-")?.strip_suffix(".csv")?;
        let (year, month) = stem.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }
}

impl fmt::Display for AuditPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Event category recorded in the `Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventKind {
    Check,
    Incident,
    Resolve,
}

impl AuditEventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Check => "CHECK",
            Self::Incident => "INCIDENT",
            Self::Resolve => "RESOLVE",
        }
    }
}

/// A single audit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub occurred_at: DateTime<Utc>,
    pub kind: AuditEventKind,
    pub restroom: String,
    pub custodian: String,
    pub details: String,
}

impl AuditEntry {
    pub fn period(&self) -> AuditPeriod {
        AuditPeriod::containing(self.occurred_at)
    }

    /// Render the row, quoting fields where CSV requires it. No trailing
    /// newline.
    pub fn csv_row(&self) -> String {
        let date = self.occurred_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        [
            date.as_str(),
            self.kind.as_str(),
            self.restroom.as_str(),
            self.custodian.as_str(),
            self.details.as_str(),
        ]
        .into_iter()
        .map(csv_field)
        .collect::<Vec<_>>()
        .join(",")
    }
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_owned()
    }
}
