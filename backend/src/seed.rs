//! Startup seeding of restrooms and custodians.
//!
//! Seed data is a JSON document with `restrooms` and `custodians` arrays.
//! Without a configured path the bundled `fixtures/facilities.json` is used.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::domain::ports::{FacilityRepository, FacilityRepositoryError};
use crate::domain::{
    Custodian, CustodianId, FacilitySeed, FacilityValidationError, Gender, Restroom, RestroomId,
};

const BUNDLED_SEED: &str = include_str!("../fixtures/facilities.json");

/// Errors returned while loading or applying seed data.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Seed file could not be read.
    #[error("failed to read seed file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Seed file is not valid JSON of the expected shape.
    #[error("seed file is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    /// A seed record failed validation.
    #[error("invalid seed record: {0}")]
    Invalid(#[from] FacilityValidationError),
    /// The repository rejected the seed.
    #[error("failed to apply seed: {0}")]
    Repository(#[from] FacilityRepositoryError),
}

#[derive(Debug, Deserialize)]
struct SeedDocument {
    #[serde(default)]
    restrooms: Vec<RestroomRecord>,
    #[serde(default)]
    custodians: Vec<CustodianRecord>,
}

#[derive(Debug, Deserialize)]
struct RestroomRecord {
    id: i32,
    name: String,
    building: String,
    floor: String,
}

#[derive(Debug, Deserialize)]
struct CustodianRecord {
    id: i32,
    name: String,
    gender: String,
}

/// Parse a seed document.
///
/// # Examples
/// ```
/// use facility_backend::seed::parse_seed;
///
/// let seed = parse_seed(r#"{"restrooms":[{"id":1,"name":"Lobby","building":"Main","floor":"G"}]}"#)
///     .expect("valid seed");
/// assert_eq!(seed.restrooms().len(), 1);
/// assert!(seed.custodians().is_empty());
/// ```
pub fn parse_seed(json: &str) -> Result<FacilitySeed, SeedError> {
    let document: SeedDocument = serde_json::from_str(json)?;
    let restrooms = document
        .restrooms
        .into_iter()
        .map(|r| Restroom::new(RestroomId::new(r.id), &r.name, &r.building, &r.floor))
        .collect::<Result<Vec<_>, _>>()?;
    let custodians = document
        .custodians
        .into_iter()
        .map(|c| {
            let gender: Gender = c.gender.parse()?;
            Custodian::new(CustodianId::new(c.id), &c.name, gender)
        })
        .collect::<Result<Vec<_>, FacilityValidationError>>()?;
    Ok(FacilitySeed::new(restrooms, custodians)?)
}

/// Load the seed from `path`, or the bundled fixture when `None`.
pub fn load_seed(path: Option<&Path>) -> Result<FacilitySeed, SeedError> {
    match path {
        Some(path) => parse_seed(&read_seed_file(path)?),
        None => parse_seed(BUNDLED_SEED),
    }
}

fn read_seed_file(path: &Path) -> Result<String, SeedError> {
    let read_error = |source: std::io::Error| SeedError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "seed path must be a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(Path::new(file_name)).map_err(read_error)
}

/// Load the seed and apply it to `repository`.
pub async fn seed_on_startup<R>(repository: &R, path: Option<&Path>) -> Result<(), SeedError>
where
    R: FacilityRepository + ?Sized,
{
    let seed = load_seed(path)?;
    repository.seed(&seed).await?;
    info!(
        restrooms = seed.restrooms().len(),
        custodians = seed.custodians().len(),
        source = path.map_or_else(|| "bundled".to_owned(), |p| p.display().to_string()),
        "facility seed applied"
    );
    Ok(())
}
