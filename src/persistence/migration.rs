//! Migration of each known save schema onto [`SaveDocument`]
//!
//! Every field of an older schema is optional. Missing fields take the same
//! defaults a fresh game starts with; nothing is guessed beyond that.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::validation::SchemaVersion;
use super::{PersistError, SaveDocument};
use crate::consts::{FIRST_LEVEL, STAT_DEFAULT, STAT_MAX, STAT_MIN};
use crate::game::{ChoiceLog, PlayerProfile, Timestamps};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SaveV1 {
    current_level: Option<String>,
    completed_levels: Option<Vec<String>>,
    player_profile: Option<ProfileV1>,
    choices: Option<ChoiceLog>,
    timestamps: Option<TimestampsV1>,
}

/// Stats may be out of range in hand-edited saves, so read them wide
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileV1 {
    #[serde(rename = "logicIQ")]
    logic: Option<i64>,
    #[serde(rename = "creativityIQ")]
    creativity: Option<i64>,
    #[serde(rename = "empathyIQ")]
    empathy: Option<i64>,
    #[serde(rename = "metacognitionIQ")]
    metacognition: Option<i64>,
    #[serde(rename = "resilienceIQ")]
    resilience: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TimestampsV1 {
    first_play: Option<DateTime<Utc>>,
    last_play: Option<DateTime<Utc>>,
}

fn stat(value: Option<i64>) -> u8 {
    value
        .map(|v| v.clamp(i64::from(STAT_MIN), i64::from(STAT_MAX)) as u8)
        .unwrap_or(STAT_DEFAULT)
}

impl ProfileV1 {
    fn migrate(self) -> PlayerProfile {
        // playStyle is derived, so the stored value is ignored
        let mut profile = PlayerProfile {
            logic: stat(self.logic),
            creativity: stat(self.creativity),
            empathy: stat(self.empathy),
            metacognition: stat(self.metacognition),
            resilience: stat(self.resilience),
            ..Default::default()
        };
        profile.refresh_play_style();
        profile
    }
}

/// Keep first occurrence of each level, preserving order
fn dedup_levels(levels: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(levels.len());
    for level in levels {
        if !seen.contains(&level) {
            seen.push(level);
        }
    }
    seen
}

pub fn from_v1(raw: Value, now: DateTime<Utc>) -> Result<SaveDocument, PersistError> {
    let save: SaveV1 = serde_json::from_value(raw).map_err(PersistError::Parse)?;
    let timestamps = save.timestamps.unwrap_or_default();

    Ok(SaveDocument {
        version: SchemaVersion::CURRENT.as_str().to_string(),
        current_level: save
            .current_level
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| FIRST_LEVEL.to_string()),
        completed_levels: dedup_levels(save.completed_levels.unwrap_or_default()),
        player_profile: save.player_profile.unwrap_or_default().migrate(),
        choices: save.choices.unwrap_or_default(),
        timestamps: Timestamps {
            first_play: timestamps.first_play.unwrap_or(now),
            last_play: timestamps.last_play.unwrap_or(now),
        },
    })
}
