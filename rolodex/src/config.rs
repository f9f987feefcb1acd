//! Seed files.
//!
//! A seed file replaces the default seed set:
//!
//! ```toml
//! [[people]]
//! id = 1
//! name = "John Smith"
//!
//! [[people]]
//! id = "2"
//! name = "Sara Smith"
//! ```
//!
//! Ids may be written as integers or strings, both end up as the same string id.

use crate::directory::{Directory, DirectoryError, PersonId, PersonRecord, SEED};
use std::{fs, io, path::{Path, PathBuf}};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error
    },
    #[error("invalid seed file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Directory(#[from] DirectoryError)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum SeedId {
    Text(String),
    Number(i64)
}

impl From<SeedId> for PersonId {
    fn from(id: SeedId) -> Self {
        match id {
            SeedId::Text(id) => PersonId::from(id),
            SeedId::Number(id) => PersonId::from(id)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedPerson {
    id: SeedId,
    pub name: String
}

impl SeedPerson {
    pub fn id(&self) -> PersonId {
        PersonId::from(self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub people: Vec<SeedPerson>
}

impl Default for SeedConfig {
    fn default() -> Self {
        SeedConfig {
            people: SEED
                .iter()
                .map(|(id, name)| SeedPerson {
                    id: SeedId::Text(id.to_string()),
                    name: name.to_string()
                })
                .collect()
        }
    }
}

impl SeedConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source
        })?;
        let config = Self::from_toml(&source)?;
        info!(path = %path.display(), people = config.people.len() as u64, "loaded seed file");
        Ok(config)
    }

    /// Build the directory. Duplicate ids are rejected.
    pub fn into_directory(self) -> Result<Directory, ConfigError> {
        let records = self
            .people
            .into_iter()
            .map(|person| PersonRecord::new(PersonId::from(person.id), person.name));
        Ok(Directory::from_records(records)?)
    }
}
