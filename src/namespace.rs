use std::{fmt, str::FromStr};

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize};

use crate::error::{Error, ErrorKind};

/// The name of the pseudo-collection that database-level commands are dispatched against.
pub(crate) const COMMAND_COLLECTION: &str = "$cmd";

/// The database commands are dispatched against when an operation has neither a parent entity
/// nor an explicit database override.
pub(crate) const DEFAULT_COMMAND_DB: &str = "admin";

/// A struct modeling the canonical name for a collection in MongoDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// The name of the database associated with this namespace.
    pub db: String,

    /// The name of the collection this namespace corresponds to.
    pub coll: String,
}

impl Namespace {
    /// Construct a `Namespace` with the given database and collection.
    pub fn new(db: impl Into<String>, coll: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            coll: coll.into(),
        }
    }

    /// The namespace commands against the given database are dispatched to.
    pub fn command(db: impl Into<String>) -> Self {
        Self::new(db, COMMAND_COLLECTION)
    }

    /// This namespace's database paired with the command pseudo-collection.
    pub fn with_command_collection(&self) -> Self {
        Self::command(self.db.clone())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}.{}", self.db, self.coll)
    }
}

impl FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split('.');

        let db = parts.next();
        let coll = parts.collect::<Vec<_>>().join(".");

        match (db, coll) {
            (Some(db), coll) if !coll.is_empty() => Ok(Self {
                db: db.to_string(),
                coll,
            }),
            _ => Err(ErrorKind::InvalidArgument {
                message: "namespaces must be of the form <db>.<coll>".to_string(),
            }
            .into()),
        }
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            D::Error::custom("Missing one or more fields in namespace")
        })
    }
}

impl Serialize for Namespace {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{}.{}", self.db, self.coll))
    }
}
