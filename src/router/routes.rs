//! Static route table: logical path -> fragment and behaviour

use std::collections::BTreeMap;

use thiserror::Error;

use super::base_path::canonical;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route table has no entry for /")]
    MissingRoot,
    #[error("route path {0:?} is not a canonical logical path")]
    InvalidPath(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Canonical logical path
    pub path: String,
    /// Fragment resource, relative to the base path
    pub fragment: String,
    /// Controller registry key; also the level id handed to the controller
    pub behavior: Option<String>,
}

impl Route {
    pub fn new(path: &str, fragment: &str) -> Self {
        Self {
            path: path.to_string(),
            fragment: fragment.to_string(),
            behavior: None,
        }
    }

    pub fn with_behavior(mut self, behavior: &str) -> Self {
        self.behavior = Some(behavior.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: BTreeMap<String, Route>,
    root: Route,
}

impl RouteTable {
    pub const ROOT: &'static str = "/";

    pub fn new(routes: impl IntoIterator<Item = Route>) -> Result<Self, RouteError> {
        let mut table = BTreeMap::new();
        for route in routes {
            if !route.path.starts_with('/') || canonical(&route.path) != route.path {
                return Err(RouteError::InvalidPath(route.path));
            }
            table.insert(route.path.clone(), route);
        }
        let root = table.get(Self::ROOT).cloned().ok_or(RouteError::MissingRoot)?;
        Ok(Self { routes: table, root })
    }

    /// Home, seven levels, three branch paths and the epilogue
    pub fn standard() -> Self {
        let root = Route::new(Self::ROOT, "home.html");
        let mut routes = vec![root.clone()];
        for n in 1..=7 {
            let level = format!("level-{}", n);
            routes.push(
                Route::new(&format!("/{}", level), &format!("levels/{}.html", level))
                    .with_behavior(&level),
            );
        }
        for branch in ["path-a", "path-b", "path-c"] {
            routes.push(
                Route::new(&format!("/paths/{}", branch), &format!("levels/paths/{}.html", branch))
                    .with_behavior(branch),
            );
        }
        routes.push(Route::new("/epilogue", "levels/epilogue.html").with_behavior("epilogue"));

        let routes = routes.into_iter().map(|r| (r.path.clone(), r)).collect();
        Self { routes, root }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&Route> {
        self.routes.get(path)
    }

    /// Route for `path`, or the root route when it is unmapped
    pub fn lookup(&self, path: &str) -> &Route {
        self.routes.get(path).unwrap_or(&self.root)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
