//! MIND LAB: Echoes of Thought - a narrative browser puzzle game
//!
//! Core modules:
//! - `game`: Player progress store (profile stats, choices, completed levels)
//! - `persistence`: Versioned save document, validation and migration
//! - `platform`: Browser/native abstraction (fetch, history, storage, time)
//! - `router`: Fragment router with per-level controllers
//! - `levels`: Level controllers built on top of the store and router
//! - `config`: Deployment configuration

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod game;
pub mod levels;
pub mod persistence;
pub mod platform;
pub mod router;

pub use config::AppConfig;
pub use game::{GameStore, PlayStyle, PlayerProfile, SharedStore, StatCategory, StoreEvent};
pub use router::{Router, RouteTable};

/// Game configuration constants
pub mod consts {
    /// LocalStorage key holding the save document
    pub const STORAGE_KEY: &str = "mindLab_saveData";
    /// Version tag written into every save document
    pub const SAVE_VERSION: &str = "1.0";

    /// Level presented to a new player
    pub const FIRST_LEVEL: &str = "level-1";
    /// Sentinel returned once the level order is exhausted
    pub const END_LEVEL: &str = "end";
    /// Main levels in play order
    pub const LEVEL_ORDER: [&str; 7] = [
        "level-1", "level-2", "level-3", "level-4", "level-5", "level-6", "level-7",
    ];
    /// Denominator for progress percentage
    pub const TOTAL_MAIN_LEVELS: usize = LEVEL_ORDER.len();

    /// Stat bounds
    pub const STAT_MIN: u8 = 0;
    pub const STAT_MAX: u8 = 100;
    pub const STAT_DEFAULT: u8 = 50;
}
