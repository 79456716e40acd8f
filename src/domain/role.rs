//! Role / user domain models

use super::feature::FeatureValue;
use super::lookup::Lookup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The name of the distinguished root role.
pub const ROOT: &str = "root";

/// Reserved field names of the synthesized role resource.
pub const NAME: &str = "name";
pub const FEATURES: &str = "features";
pub const LOOKUP: &str = "lookup";

/// Reserved field names of the synthesized user resource.
pub const EMAIL: &str = "email";
pub const ACTIVE: &str = "active";

/// A persisted record id. The persistence collaborator may hand out either
/// textual or numeric ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

/// Names the user and role resources so the access checker can recognize
/// self-service operations and the role relationship trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    /// Slug of the user resource.
    pub user: String,
    /// Slug of the role resource, doubling as the role relationship trait on
    /// the user resource.
    pub role: String,
}

/// A persisted role: the permission matrix plus its compiled lookup.
///
/// `lookup` is derived from `features` on every write and is never edited
/// independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Role {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub features: Vec<FeatureValue>,
    #[serde(default)]
    pub lookup: Lookup,
}

/// The authenticated requester an access check evaluates against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requester {
    pub id: RecordId,
    pub active: bool,
    /// Loaded role records. May be empty.
    #[serde(default)]
    pub roles: Vec<Role>,
}
