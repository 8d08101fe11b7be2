//! Version probe run before any field of a save is read

use serde_json::Value;

use super::PersistError;
use crate::consts::SAVE_VERSION;

/// Known save schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// `"1.0"`: the only format written so far
    V1,
}

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::V1;

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => SAVE_VERSION,
        }
    }

    pub fn parse_tag(s: &str) -> Option<Self> {
        match s {
            "1.0" => Some(SchemaVersion::V1),
            _ => None,
        }
    }
}

/// Read the `version` tag of a parsed save
pub fn probe_version(doc: &Value) -> Result<SchemaVersion, PersistError> {
    match doc.get("version") {
        None | Some(Value::Null) => Err(PersistError::MissingVersion),
        Some(Value::String(tag)) => {
            SchemaVersion::parse_tag(tag).ok_or_else(|| PersistError::Incompatible { found: tag.clone() })
        }
        Some(other) => Err(PersistError::Incompatible {
            found: other.to_string(),
        }),
    }
}
