//! The authoritative in-memory set of people.
//!
//! The [`Directory`](struct.Directory.html) owns its records exclusively. Callers only ever get
//! copies back, so the only way to change a record is through
//! [`edit_person`](struct.Directory.html#method.edit_person).

use parking_lot::RwLock;
use std::{collections::HashSet, fmt};
use thiserror::Error;

/// The seed set every fresh directory starts with.
pub const SEED: [(&str, &str); 3] = [
    ("1", "John Smith"),
    ("2", "Sara Smith"),
    ("3", "Budd Deey")
];

/// An opaque person identifier.
///
/// Identifiers are always compared as strings, so `"1"` and `"01"` are different people.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        PersonId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(id: &str) -> Self {
        PersonId(id.to_string())
    }
}

impl From<String> for PersonId {
    fn from(id: String) -> Self {
        PersonId(id)
    }
}

impl From<i64> for PersonId {
    fn from(id: i64) -> Self {
        PersonId(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: PersonId,
    pub name: String
}

impl PersonRecord {
    pub fn new<I: Into<PersonId>, N: Into<String>>(id: I, name: N) -> Self {
        PersonRecord {
            id: id.into(),
            name: name.into()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectoryError {
    #[error("No person found with id \"{0}\"")]
    NotFound(PersonId),
    #[error("Duplicate person id \"{0}\"")]
    DuplicateId(PersonId)
}

/// The in-memory person store.
///
/// Reads take a shared lock and copy, edits take the exclusive lock for both the lookup and the
/// rename. Any read that starts after an edit has returned sees that edit.
#[derive(Debug)]
pub struct Directory {
    records: RwLock<Vec<PersonRecord>>
}

impl Directory {
    /// A directory holding the default seed set, in seed order.
    pub fn seeded() -> Self {
        let records = SEED
            .iter()
            .map(|(id, name)| PersonRecord::new(*id, *name))
            .collect();
        Directory {
            records: RwLock::new(records)
        }
    }

    /// Build a directory from arbitrary records, keeping their order.
    pub fn from_records<I>(records: I) -> Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = PersonRecord>
    {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        for record in records {
            if !seen.insert(record.id.clone()) {
                return Err(DirectoryError::DuplicateId(record.id));
            }
            collected.push(record);
        }

        Ok(Directory {
            records: RwLock::new(collected)
        })
    }

    /// A snapshot of every record in insertion order.
    pub fn list_people(&self) -> Vec<PersonRecord> {
        self.records.read().clone()
    }

    pub fn get(&self, id: &PersonId) -> Option<PersonRecord> {
        self.records
            .read()
            .iter()
            .find(|record| &record.id == id)
            .cloned()
    }

    /// Rename the person with the given id and return the updated record.
    ///
    /// Nothing is changed if no record matches.
    pub fn edit_person(&self, id: &PersonId, name: String) -> Result<PersonRecord, DirectoryError> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;

        record.name = name;
        debug!(id = %record.id, name = %record.name, "renamed person");
        Ok(record.clone())
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for Directory {
    fn default() -> Self {
        Directory::seeded()
    }
}
