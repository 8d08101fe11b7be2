//! Deployment configuration
//!
//! Decided once at startup from the page's hostname.

use serde::{Deserialize, Serialize};

use crate::router::BasePath;

/// Base path used when served from GitHub Pages
pub const PAGES_BASE_PATH: &str = "/mind-lab-game";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for history and fetch URLs in subpath deployments
    pub base_path: BasePath,
    /// Id of the element whose markup the router replaces
    pub content_region_id: String,
    /// Class marking elements whose clicks are routed in-page
    pub nav_link_class: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_path: BasePath::root(),
            content_region_id: "main-content".to_string(),
            nav_link_class: "nav-link".to_string(),
        }
    }
}

impl AppConfig {
    /// GitHub Pages hosts serve the game from a subpath
    pub fn for_hostname(hostname: &str) -> Self {
        let mut config = Self::default();
        if hostname.ends_with("github.io") {
            config.base_path = BasePath::new(PAGES_BASE_PATH);
        }
        config
    }

    /// CSS selector matching navigation elements
    pub fn nav_link_selector(&self) -> String {
        format!(".{}", self.nav_link_class)
    }

    /// Configuration for the current page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn detect() -> Self {
        let hostname = web_sys::window()
            .and_then(|w| w.location().hostname().ok())
            .unwrap_or_default();
        let config = Self::for_hostname(&hostname);
        log::info!(
            "Serving from {} (base path {:?})",
            hostname,
            config.base_path.prefix()
        );
        config
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn detect() -> Self {
        Self::default()
    }
}
