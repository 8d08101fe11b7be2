//! Player progress
//!
//! Everything here is synchronous and target-independent. The store is the
//! single owner of the persisted save key; level controllers reach it
//! through a [`SharedStore`] handle.

pub mod choices;
pub mod levels;
pub mod profile;
pub mod store;

pub use choices::{ChoiceLog, ChoiceMap};
pub use levels::{next_level, progress_percentage};
pub use profile::{PlayStyle, PlayerProfile, StatCategory};
pub use store::{GameStore, ListenerId, Snapshot, StoreEvent};

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Handle shared between the router, level controllers and the entry point
pub type SharedStore = Rc<RefCell<GameStore>>;

/// First and most recent play times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    /// Set once when progress is first created
    pub first_play: DateTime<Utc>,
    /// Refreshed by every successful save
    pub last_play: DateTime<Utc>,
}

impl Timestamps {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            first_play: now,
            last_play: now,
        }
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::starting_at(DateTime::<Utc>::UNIX_EPOCH)
    }
}
