//! Deployment base path (e.g. `/mind-lab-game` on GitHub Pages)
//!
//! Logical paths never carry the prefix. It is added when building history
//! and fetch URLs and stripped when reading the browser location.

use serde::{Deserialize, Serialize};

/// Canonical logical path: one leading slash, no empty segments, no trailing
/// slash, query and fragment dropped. The empty path is `/`.
pub fn canonical(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BasePath {
    /// Empty for root deployments, otherwise `/segment[/segment...]`
    prefix: String,
}

impl BasePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(prefix: &str) -> Self {
        let prefix = canonical(prefix);
        if prefix == "/" {
            Self::root()
        } else {
            Self { prefix }
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_root(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Logical path -> location path
    pub fn add(&self, logical: &str) -> String {
        let logical = canonical(logical);
        if self.is_root() {
            logical
        } else if logical == "/" {
            format!("{}/", self.prefix)
        } else {
            format!("{}{}", self.prefix, logical)
        }
    }

    /// Location path -> logical path
    pub fn strip(&self, location: &str) -> String {
        let location = canonical(location);
        if !self.is_root() {
            if let Some(rest) = location.strip_prefix(self.prefix.as_str()) {
                if rest.is_empty() || rest.starts_with('/') {
                    return canonical(rest);
                }
            }
        }
        location
    }

    /// URL for a static resource such as a fragment file
    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}/{}", self.prefix, resource.trim_start_matches('/'))
    }
}

impl From<String> for BasePath {
    fn from(prefix: String) -> Self {
        Self::new(&prefix)
    }
}

impl From<BasePath> for String {
    fn from(base: BasePath) -> Self {
        base.prefix
    }
}
