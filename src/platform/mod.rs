//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Fragment fetches and history entries
//! - The content region and scroll position
//! - Click/back-forward navigation events
//! - Storage (LocalStorage on web)
//! - Time

pub mod storage;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use storage::{MemoryStorage, SaveBackend};
pub use time::{Clock, FixedClock, SystemClock};

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use thiserror::Error;

/// Future run on the single browser thread
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Why a fragment could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("could not read response body: {0}")]
    Body(String),
}

/// Callbacks the platform invokes on user navigation
#[derive(Clone)]
pub struct NavigationHooks {
    /// A navigation element was clicked; receives its target path
    pub on_link: Rc<dyn Fn(String)>,
    /// Back/forward moved to another history entry
    pub on_history_pop: Rc<dyn Fn()>,
}

/// Everything the router needs from its host
#[allow(async_fn_in_trait)]
pub trait Platform {
    /// GET `url` and return the body text; non-2xx is an error
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Path of the current location, including any base path
    fn current_path(&self) -> String;

    /// Push a new history entry for `url` without reloading
    fn push_history(&self, url: &str);

    /// Replace the whole markup of the content region
    fn set_content(&self, html: &str);

    fn scroll_to_top(&self);

    /// Run `task` to completion on the current thread
    fn spawn(&self, task: LocalTask);

    /// Install the delegated click interceptor and the back/forward listener
    fn install_navigation_hooks(&self, hooks: NavigationHooks);
}
