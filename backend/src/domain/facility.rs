//! Restrooms and custodians: the seeded, read-only half of the data model.
//!
//! Both entities are created once at startup from the seed file and never
//! mutated afterwards. Custodian gender is carried for the presentation layer
//! to filter visible restrooms; nothing server-side enforces it.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::{CustodianId, RestroomId};

/// Maximum characters accepted for restroom and custodian labels.
pub const LABEL_MAX: usize = 120;

/// Validation errors raised while constructing facility entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacilityValidationError {
    EmptyLabel { field: &'static str },
    LabelTooLong { field: &'static str, max: usize },
    UnknownGender { value: String },
    DuplicateRestroomId { id: RestroomId },
    DuplicateCustodianId { id: CustodianId },
}

impl fmt::Display for FacilityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLabel { field } => write!(f, "{field} must not be empty"),
            Self::LabelTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::UnknownGender { value } => {
                write!(f, "gender must be one of male, female, other (got '{value}')")
            }
            Self::DuplicateRestroomId { id } => write!(f, "restroom id {id} is seeded twice"),
            Self::DuplicateCustodianId { id } => write!(f, "custodian id {id} is seeded twice"),
        }
    }
}

impl std::error::Error for FacilityValidationError {}

fn label(field: &'static str, raw: &str) -> Result<String, FacilityValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FacilityValidationError::EmptyLabel { field });
    }
    if trimmed.chars().count() > LABEL_MAX {
        return Err(FacilityValidationError::LabelTooLong {
            field,
            max: LABEL_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

/// A restroom that custodians inspect.
///
/// ## Invariants
/// - `name`, `building`, and `floor` are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restroom {
    id: RestroomId,
    name: String,
    building: String,
    floor: String,
}

impl Restroom {
    /// Validate and construct a restroom.
    ///
    /// # Examples
    /// ```
    /// use facility_backend::domain::{Restroom, RestroomId};
    ///
    /// let restroom = Restroom::new(RestroomId::new(1), "East wing", "Main", "2").unwrap();
    /// assert_eq!(restroom.name(), "East wing");
    /// ```
    pub fn new(
        id: RestroomId,
        name: &str,
        building: &str,
        floor: &str,
    ) -> Result<Self, FacilityValidationError> {
        Ok(Self {
            id,
            name: label("name", name)?,
            building: label("building", building)?,
            floor: label("floor", floor)?,
        })
    }

    pub fn id(&self) -> RestroomId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn building(&self) -> &str {
        self.building.as_str()
    }

    pub fn floor(&self) -> &str {
        self.floor.as_str()
    }
}

/// Gender attribute of a custodian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Stable lowercase label used in storage and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = FacilityValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(FacilityValidationError::UnknownGender {
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member of custodial staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Custodian {
    id: CustodianId,
    name: String,
    gender: Gender,
}

impl Custodian {
    /// Validate and construct a custodian.
    pub fn new(id: CustodianId, name: &str, gender: Gender) -> Result<Self, FacilityValidationError> {
        Ok(Self {
            id,
            name: label("name", name)?,
            gender,
        })
    }

    pub fn id(&self) -> CustodianId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }
}

/// Restrooms and custodians loaded at startup.
///
/// ## Invariants
/// - Restroom ids are unique, and custodian ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilitySeed {
    restrooms: Vec<Restroom>,
    custodians: Vec<Custodian>,
}

impl FacilitySeed {
    /// Build a seed, rejecting duplicate identifiers.
    pub fn new(
        restrooms: Vec<Restroom>,
        custodians: Vec<Custodian>,
    ) -> Result<Self, FacilityValidationError> {
        let mut restroom_ids = HashSet::new();
        if let Some(duplicate) = restrooms.iter().find(|r| !restroom_ids.insert(r.id())) {
            return Err(FacilityValidationError::DuplicateRestroomId { id: duplicate.id() });
        }
        let mut custodian_ids = HashSet::new();
        if let Some(duplicate) = custodians.iter().find(|c| !custodian_ids.insert(c.id())) {
            return Err(FacilityValidationError::DuplicateCustodianId { id: duplicate.id() });
        }
        Ok(Self {
            restrooms,
            custodians,
        })
    }

    pub fn restrooms(&self) -> &[Restroom] {
        &self.restrooms
    }

    pub fn custodians(&self) -> &[Custodian] {
        &self.custodians
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "name")]
    #[case("   ", "name")]
    fn restroom_rejects_blank_name(#[case] name: &str, #[case] field: &'static str) {
        let err = Restroom::new(RestroomId::new(1), name, "Main", "1").expect_err("blank name");
        assert_eq!(err, FacilityValidationError::EmptyLabel { field });
    }

    #[rstest]
    fn restroom_trims_labels() {
        let restroom =
            Restroom::new(RestroomId::new(3), "  Lobby  ", " Annex ", " G ").expect("valid");
        assert_eq!(restroom.name(), "Lobby");
        assert_eq!(restroom.building(), "Annex");
        assert_eq!(restroom.floor(), "G");
    }

    #[rstest]
    fn restroom_rejects_overlong_label() {
        let long = "x".repeat(LABEL_MAX + 1);
        let err = Restroom::new(RestroomId::new(1), "Lobby", &long, "1").expect_err("too long");
        assert_eq!(
            err,
            FacilityValidationError::LabelTooLong {
                field: "building",
                max: LABEL_MAX
            }
        );
    }

    #[rstest]
    #[case("male", Gender::Male)]
    #[case("F", Gender::Female)]
    #[case(" Other ", Gender::Other)]
    fn gender_parses_known_labels(#[case] raw: &str, #[case] expected: Gender) {
        assert_eq!(raw.parse::<Gender>().expect("known gender"), expected);
    }

    #[rstest]
    fn gender_rejects_unknown_label() {
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[rstest]
    fn seed_rejects_duplicate_restroom_ids() {
        let first = Restroom::new(RestroomId::new(1), "A", "Main", "1").expect("valid");
        let second = Restroom::new(RestroomId::new(1), "B", "Main", "2").expect("valid");
        let err = FacilitySeed::new(vec![first, second], Vec::new()).expect_err("duplicate");
        assert_eq!(
            err,
            FacilityValidationError::DuplicateRestroomId {
                id: RestroomId::new(1)
            }
        );
    }

    #[rstest]
    fn seed_rejects_duplicate_custodian_ids() {
        let first = Custodian::new(CustodianId::new(9), "Ana", Gender::Female).expect("valid");
        let second = Custodian::new(CustodianId::new(9), "Ben", Gender::Male).expect("valid");
        let err = FacilitySeed::new(Vec::new(), vec![first, second]).expect_err("duplicate");
        assert!(matches!(
            err,
            FacilityValidationError::DuplicateCustodianId { .. }
        ));
    }
}
