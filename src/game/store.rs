//! The progress store: profile stats, choices, completed levels

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::levels;
use super::{ChoiceLog, PlayerProfile, StatCategory, Timestamps};
use crate::consts::{FIRST_LEVEL, STORAGE_KEY};
use crate::persistence::{self, PersistError, SaveDocument, SchemaVersion};
use crate::platform::{Clock, SaveBackend};

/// Change notifications
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// A document was written to storage
    Saved(SaveDocument),
    /// A stored document replaced in-memory progress
    Loaded(SaveDocument),
    /// Progress was wiped
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u32);

/// Read-only copy of all progress plus the computed percentage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(flatten)]
    pub document: SaveDocument,
    pub progress: u32,
}

#[derive(Debug, Clone)]
struct Progress {
    current_level: String,
    completed_levels: Vec<String>,
    profile: PlayerProfile,
    choices: ChoiceLog,
    timestamps: Timestamps,
}

impl Progress {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            current_level: FIRST_LEVEL.to_string(),
            completed_levels: Vec::new(),
            profile: PlayerProfile::default(),
            choices: ChoiceLog::new(),
            timestamps: Timestamps::starting_at(now),
        }
    }

    fn from_document(doc: &SaveDocument) -> Self {
        Self {
            current_level: doc.current_level.clone(),
            completed_levels: doc.completed_levels.clone(),
            profile: doc.player_profile.clone(),
            choices: doc.choices.clone(),
            timestamps: doc.timestamps,
        }
    }

    fn to_document(&self) -> SaveDocument {
        SaveDocument {
            version: SchemaVersion::CURRENT.as_str().to_string(),
            current_level: self.current_level.clone(),
            completed_levels: self.completed_levels.clone(),
            player_profile: self.profile.clone(),
            choices: self.choices.clone(),
            timestamps: self.timestamps,
        }
    }
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Owns in-memory progress and the persisted save key.
///
/// Every mutator persists the whole document before returning. Listeners run
/// while the store is mutably borrowed, so they must not reach back into a
/// [`SharedStore`](super::SharedStore) holding this store.
pub struct GameStore {
    progress: Progress,
    storage_key: String,
    backend: Box<dyn SaveBackend>,
    clock: Box<dyn Clock>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u32,
}

impl GameStore {
    /// Store with default progress; nothing is read from storage yet
    pub fn new(backend: impl SaveBackend + 'static, clock: impl Clock + 'static) -> Self {
        let now = clock.now();
        Self {
            progress: Progress::fresh(now),
            storage_key: STORAGE_KEY.to_string(),
            backend: Box::new(backend),
            clock: Box::new(clock),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Reset in-memory progress to defaults, leaving storage untouched
    pub fn initialize(&mut self) {
        self.progress = Progress::fresh(self.clock.now());
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: &StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    // === Persistence ===

    /// Write the whole document, refreshing `lastPlay`.
    ///
    /// On failure nothing in memory changes and no event fires.
    pub fn try_save(&mut self) -> Result<SaveDocument, PersistError> {
        let last_play = self.clock.now().max(self.progress.timestamps.last_play);
        let mut doc = self.progress.to_document();
        doc.timestamps.last_play = last_play;

        let json = persistence::encode(&doc)?;
        self.backend.write(&self.storage_key, &json)?;

        self.progress.timestamps.last_play = last_play;
        log::info!("Game progress saved ({})", self.progress.current_level);
        self.emit(&StoreEvent::Saved(doc.clone()));
        Ok(doc)
    }

    pub fn save(&mut self) -> bool {
        match self.try_save() {
            Ok(_) => true,
            Err(e) => {
                log::error!("Error saving game: {}", e);
                false
            }
        }
    }

    /// Replace in-memory progress with the stored document.
    ///
    /// Absent, unparseable or wrongly versioned saves leave memory untouched.
    pub fn try_load(&mut self) -> Result<SaveDocument, PersistError> {
        let json = self
            .backend
            .read(&self.storage_key)?
            .ok_or(PersistError::NotFound)?;
        let doc = persistence::decode(&json, self.clock.now())?;

        self.progress = Progress::from_document(&doc);
        log::info!(
            "Game progress loaded ({} levels completed)",
            self.progress.completed_levels.len()
        );
        self.emit(&StoreEvent::Loaded(doc.clone()));
        Ok(doc)
    }

    pub fn load(&mut self) -> bool {
        match self.try_load() {
            Ok(_) => true,
            Err(PersistError::NotFound) => {
                log::info!("No saved progress found, starting fresh");
                false
            }
            Err(e) => {
                log::warn!("Ignoring saved progress: {}", e);
                false
            }
        }
    }

    /// Back to defaults and delete the stored document
    pub fn reset(&mut self) {
        self.initialize();
        if let Err(e) = self.backend.remove(&self.storage_key) {
            log::warn!("Could not remove saved progress: {}", e);
        }
        log::info!("Game reset to initial state");
        self.emit(&StoreEvent::Reset);
    }

    // === Mutators ===

    /// Apply `delta` to the named stat. False (and no effect) for an unknown name.
    pub fn update_stat(&mut self, category: &str, delta: i32) -> bool {
        match StatCategory::parse_name(category) {
            Some(category) => {
                self.adjust_stat(category, delta);
                true
            }
            None => {
                log::warn!("Unknown stat category: {}", category);
                false
            }
        }
    }

    /// Apply `delta`, clamped to [0, 100]; returns the new value
    pub fn adjust_stat(&mut self, category: StatCategory, delta: i32) -> u8 {
        let value = self.progress.profile.apply_delta(category, delta);
        self.save();
        value
    }

    pub fn record_choice(&mut self, level_id: &str, choice_id: &str, value: Value) {
        self.progress.choices.record(level_id, choice_id, value);
        self.save();
    }

    /// One choice, or with `choice_id` omitted every choice of the level as an
    /// object. The result is a copy.
    pub fn get_choice(&self, level_id: &str, choice_id: Option<&str>) -> Option<Value> {
        let level = self.progress.choices.level(level_id)?;
        match choice_id {
            Some(id) => level.get(id).cloned(),
            None => Some(Value::Object(
                level.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
        }
    }

    /// Mark `level_id` complete and advance the current level.
    ///
    /// Returns false if it was already complete, in which case nothing changes.
    pub fn complete_level(&mut self, level_id: &str) -> bool {
        if self.is_completed(level_id) {
            return false;
        }
        self.progress.completed_levels.push(level_id.to_string());
        self.progress.current_level = levels::next_level(level_id).to_string();
        log::info!("Level {} completed, next: {}", level_id, self.progress.current_level);
        self.save();
        true
    }

    // === Queries ===

    pub fn next_level(&self, level_id: &str) -> &'static str {
        levels::next_level(level_id)
    }

    /// Share of the main levels completed; branch paths and the epilogue
    /// do not count
    pub fn progress_percentage(&self) -> u32 {
        let main = self
            .progress
            .completed_levels
            .iter()
            .filter(|l| levels::is_main_level(l))
            .count();
        levels::progress_percentage(main)
    }

    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.progress.to_document(),
            progress: self.progress_percentage(),
        }
    }

    pub fn current_level(&self) -> &str {
        &self.progress.current_level
    }

    pub fn completed_levels(&self) -> &[String] {
        &self.progress.completed_levels
    }

    pub fn is_completed(&self, level_id: &str) -> bool {
        self.progress.completed_levels.iter().any(|l| l == level_id)
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.progress.profile
    }

    pub fn timestamps(&self) -> Timestamps {
        self.progress.timestamps
    }
}
