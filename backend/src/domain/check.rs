//! Restroom checks: append-only inspection records.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::{CheckId, CustodianId, RestroomId};

/// Maximum characters accepted in a check note.
pub const CHECK_NOTE_MAX: usize = 500;

/// Validation errors raised for check input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckValidationError {
    NoteTooLong { max: usize },
}

impl fmt::Display for CheckValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoteTooLong { max } => write!(f, "notes must be at most {max} characters"),
        }
    }
}

impl std::error::Error for CheckValidationError {}

/// Optional free-text note attached to a check.
///
/// Blank input collapses to no note at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckNote(String);

impl CheckNote {
    /// Parse an optional raw note.
    ///
    /// # Examples
    /// ```
    /// use facility_backend::domain::CheckNote;
    ///
    /// assert!(CheckNote::parse(Some("   ")).unwrap().is_none());
    /// let note = CheckNote::parse(Some(" restocked ")).unwrap().unwrap();
    /// assert_eq!(note.as_str(), "restocked");
    /// ```
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, CheckValidationError> {
        let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(None);
        };
        if trimmed.chars().count() > CHECK_NOTE_MAX {
            return Err(CheckValidationError::NoteTooLong {
                max: CHECK_NOTE_MAX,
            });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CheckNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check awaiting insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheck {
    pub custodian_id: CustodianId,
    pub restroom_id: RestroomId,
    pub checked_at: DateTime<Utc>,
    pub note: Option<CheckNote>,
}

/// A persisted check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    id: CheckId,
    custodian_id: CustodianId,
    restroom_id: RestroomId,
    checked_at: DateTime<Utc>,
    note: Option<CheckNote>,
}

impl Check {
    /// Attach a store-assigned id to a pending check.
    pub fn from_new(id: CheckId, new: NewCheck) -> Self {
        Self {
            id,
            custodian_id: new.custodian_id,
            restroom_id: new.restroom_id,
            checked_at: new.checked_at,
            note: new.note,
        }
    }

    pub fn id(&self) -> CheckId {
        self.id
    }

    pub fn custodian_id(&self) -> CustodianId {
        self.custodian_id
    }

    pub fn restroom_id(&self) -> RestroomId {
        self.restroom_id
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    pub fn note(&self) -> Option<&CheckNote> {
        self.note.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some(" \n\t "))]
    fn blank_notes_collapse_to_none(#[case] raw: Option<&str>) {
        assert_eq!(CheckNote::parse(raw).expect("blank is valid"), None);
    }

    #[rstest]
    fn overlong_note_is_rejected() {
        let raw = "n".repeat(CHECK_NOTE_MAX + 1);
        let err = CheckNote::parse(Some(&raw)).expect_err("too long");
        assert_eq!(
            err,
            CheckValidationError::NoteTooLong {
                max: CHECK_NOTE_MAX
            }
        );
    }

    #[rstest]
    fn from_new_keeps_every_field() {
        let checked_at = Utc::now();
        let note = CheckNote::parse(Some("paper restocked")).expect("valid");
        let check = Check::from_new(
            CheckId::new(5),
            NewCheck {
                custodian_id: CustodianId::new(2),
                restroom_id: RestroomId::new(3),
                checked_at,
                note: note.clone(),
            },
        );
        assert_eq!(check.id(), CheckId::new(5));
        assert_eq!(check.custodian_id(), CustodianId::new(2));
        assert_eq!(check.restroom_id(), RestroomId::new(3));
        assert_eq!(check.checked_at(), checked_at);
        assert_eq!(check.note(), note.as_ref());
    }
}
