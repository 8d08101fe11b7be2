//! The persisted unit and its JSON encoding

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::{SchemaVersion, probe_version};
use super::{PersistError, migration};
use crate::game::{ChoiceLog, PlayerProfile, Timestamps};

/// Wholesale snapshot of player progress, as written to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocument {
    pub version: String,
    pub current_level: String,
    pub completed_levels: Vec<String>,
    pub player_profile: PlayerProfile,
    pub choices: ChoiceLog,
    pub timestamps: Timestamps,
}

pub fn encode(doc: &SaveDocument) -> Result<String, PersistError> {
    serde_json::to_string(doc).map_err(PersistError::Encode)
}

/// Parse, validate the version tag, then migrate onto the current schema.
///
/// `now` fills timestamps an older document did not carry.
pub fn decode(json: &str, now: DateTime<Utc>) -> Result<SaveDocument, PersistError> {
    let raw: Value = serde_json::from_str(json).map_err(PersistError::Parse)?;
    match probe_version(&raw)? {
        SchemaVersion::V1 => migration::from_v1(raw, now),
    }
}
