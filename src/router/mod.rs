//! Client-side router
//!
//! Maps logical paths to HTML fragments, swaps them into the content region
//! and activates the level controller registered for the route.
//!
//! Resolution order is fixed: normalise, look up (falling back to `/`),
//! fetch, replace content, deactivate the previous controller, activate the
//! new one, scroll to top. Each resolution carries a token; a fetch that
//! completes after a newer resolution has started is discarded.

pub mod base_path;
pub mod controller;
pub mod routes;

pub use base_path::{BasePath, canonical};
pub use controller::{ControllerRegistry, LevelContext, LevelController, Navigator};
pub use routes::{Route, RouteError, RouteTable};

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::AppConfig;
use crate::game::SharedStore;
use crate::platform::{FetchError, NavigationHooks, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterPhase {
    Idle,
    /// At least one fragment fetch is outstanding
    Resolving,
}

/// How a resolution ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Fragment rendered for this route path
    Rendered { path: String },
    /// Fetch failed; the error fragment is showing
    Failed { path: String, error: FetchError },
    /// A newer resolution started first; nothing was touched
    Stale,
}

/// A resolution between lookup and fetch completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingResolution {
    pub token: u64,
    /// Route path actually served (`/` after fallback)
    pub path: String,
    pub fragment_url: String,
    behavior: Option<String>,
}

/// Markup shown when a fragment cannot be fetched
pub fn error_fragment(nav_link_class: &str) -> String {
    format!(
        r#"<div class="error-container">
    <h2>Neuro-Sync Connection Failed</h2>
    <p>Unable to load the requested mind simulation. Please check your connection and try again.</p>
    <a href="/" class="{} error-return">Return to Main Menu</a>
</div>"#,
        nav_link_class
    )
}

struct ActiveController {
    level_id: String,
    controller: Box<dyn LevelController>,
}

pub struct Router<P: Platform> {
    platform: P,
    routes: RouteTable,
    controllers: ControllerRegistry,
    base: BasePath,
    store: SharedStore,
    error_html: String,
    this: Weak<Self>,
    latest_token: Cell<u64>,
    in_flight: Cell<u32>,
    active: RefCell<Option<ActiveController>>,
    initialized: Cell<bool>,
}

impl<P: Platform + 'static> Router<P> {
    pub fn new(
        platform: P,
        routes: RouteTable,
        controllers: ControllerRegistry,
        store: SharedStore,
        config: &AppConfig,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            platform,
            routes,
            controllers,
            base: config.base_path.clone(),
            store,
            error_html: error_fragment(&config.nav_link_class),
            this: this.clone(),
            latest_token: Cell::new(0),
            in_flight: Cell::new(0),
            active: RefCell::new(None),
            initialized: Cell::new(false),
        })
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn phase(&self) -> RouterPhase {
        if self.in_flight.get() > 0 {
            RouterPhase::Resolving
        } else {
            RouterPhase::Idle
        }
    }

    /// Level id of the active controller
    pub fn active_level(&self) -> Option<String> {
        self.active.borrow().as_ref().map(|a| a.level_id.clone())
    }

    /// Install navigation hooks and resolve the initial location.
    ///
    /// Only the first call does anything; returns whether this was it.
    pub fn initialize(&self) -> bool {
        if self.initialized.replace(true) {
            log::warn!("Router already initialized, ignoring");
            return false;
        }

        let on_link = {
            let this = self.this.clone();
            Rc::new(move |href: String| {
                if let Some(router) = this.upgrade() {
                    // Links may be written with or without the base path
                    router.spawn_navigate(router.base.strip(&href));
                }
            })
        };
        let on_history_pop = {
            let this = self.this.clone();
            Rc::new(move || {
                if let Some(router) = this.upgrade() {
                    router.spawn_resolve(router.platform.current_path());
                }
            })
        };
        self.platform.install_navigation_hooks(NavigationHooks {
            on_link,
            on_history_pop,
        });

        self.spawn_resolve(self.platform.current_path());
        true
    }

    /// Handle for controllers; navigation runs as a spawned task
    pub fn navigator(&self) -> Navigator {
        let this = self.this.clone();
        Navigator::new(move |path| {
            if let Some(router) = this.upgrade() {
                router.spawn_navigate(path.to_string());
            }
        })
    }

    fn spawn_navigate(&self, path: String) {
        let Some(router) = self.this.upgrade() else { return };
        self.platform.spawn(Box::pin(async move {
            router.navigate(&path).await;
        }));
    }

    fn spawn_resolve(&self, location: String) {
        let Some(router) = self.this.upgrade() else { return };
        self.platform.spawn(Box::pin(async move {
            router.resolve(&location).await;
        }));
    }

    /// Push a history entry for `path` and resolve it
    pub async fn navigate(&self, path: &str) -> ResolveOutcome {
        let logical = canonical(path);
        self.platform.push_history(&self.base.add(&logical));
        self.resolve_logical(&logical).await
    }

    /// Resolve a location path (base path included) without touching history
    pub async fn resolve(&self, location: &str) -> ResolveOutcome {
        self.resolve_logical(&self.base.strip(location)).await
    }

    async fn resolve_logical(&self, logical: &str) -> ResolveOutcome {
        let pending = self.begin(logical);
        let result = self.platform.fetch_text(&pending.fragment_url).await;
        self.finish(pending, result)
    }

    /// Look up the route for a logical path and claim a new token
    pub fn begin(&self, logical: &str) -> PendingResolution {
        let token = self.latest_token.get() + 1;
        self.latest_token.set(token);
        self.in_flight.set(self.in_flight.get() + 1);

        let path = canonical(logical);
        if !self.routes.contains(&path) {
            log::warn!("No route for {}, falling back to {}", path, RouteTable::ROOT);
        }
        let route = self.routes.lookup(&path);
        log::debug!("Resolving {} (token {})", route.path, token);

        PendingResolution {
            token,
            path: route.path.clone(),
            fragment_url: self.base.resource_url(&route.fragment),
            behavior: route.behavior.clone(),
        }
    }

    /// Apply a fetch result, unless a newer resolution has begun
    pub fn finish(
        &self,
        pending: PendingResolution,
        result: Result<String, FetchError>,
    ) -> ResolveOutcome {
        self.in_flight.set(self.in_flight.get().saturating_sub(1));

        if pending.token != self.latest_token.get() {
            log::debug!(
                "Discarding stale resolution of {} (token {})",
                pending.path,
                pending.token
            );
            return ResolveOutcome::Stale;
        }

        match result {
            Ok(html) => {
                self.platform.set_content(&html);
                self.swap_controller(pending.behavior.as_deref());
                self.platform.scroll_to_top();
                ResolveOutcome::Rendered { path: pending.path }
            }
            Err(error) => {
                log::error!("Failed to load page {}: {}", pending.fragment_url, error);
                self.platform.set_content(&self.error_html);
                self.swap_controller(None);
                ResolveOutcome::Failed {
                    path: pending.path,
                    error,
                }
            }
        }
    }

    /// Always deactivate the old controller before activating a new one
    fn swap_controller(&self, behavior: Option<&str>) {
        let previous = self.active.borrow_mut().take();
        if let Some(mut previous) = previous {
            log::debug!("Deactivating {}", previous.level_id);
            previous.controller.deactivate();
        }

        let Some(level_id) = behavior else { return };
        let Some(mut controller) = self.controllers.create(level_id) else {
            log::warn!("No controller registered for {}", level_id);
            return;
        };
        controller.activate(LevelContext {
            level_id: level_id.to_string(),
            store: self.store.clone(),
            navigator: self.navigator(),
        });
        *self.active.borrow_mut() = Some(ActiveController {
            level_id: level_id.to_string(),
            controller,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameStore;
    use crate::platform::{FixedClock, LocalTask, MemoryStorage};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockPlatform {
        pages: RefCell<HashMap<String, Result<String, FetchError>>>,
        location: RefCell<String>,
        content: RefCell<String>,
        content_writes: Cell<u32>,
        history: RefCell<Vec<String>>,
        fetched: RefCell<Vec<String>>,
        scrolls: Cell<u32>,
        tasks: RefCell<Vec<LocalTask>>,
        hooks: RefCell<Option<NavigationHooks>>,
        hook_installs: Cell<u32>,
    }

    impl MockPlatform {
        fn with_pages(pages: &[(&str, &str)]) -> Self {
            let platform = Self::default();
            for (url, html) in pages {
                platform
                    .pages
                    .borrow_mut()
                    .insert(url.to_string(), Ok(html.to_string()));
            }
            *platform.location.borrow_mut() = "/".to_string();
            platform
        }

        fn fail(&self, url: &str, error: FetchError) {
            self.pages.borrow_mut().insert(url.to_string(), Err(error));
        }
    }

    impl Platform for MockPlatform {
        async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            self.fetched.borrow_mut().push(url.to_string());
            self.pages
                .borrow()
                .get(url)
                .cloned()
                .unwrap_or(Err(FetchError::Status(404)))
        }

        fn current_path(&self) -> String {
            self.location.borrow().clone()
        }

        fn push_history(&self, url: &str) {
            self.history.borrow_mut().push(url.to_string());
            *self.location.borrow_mut() = url.to_string();
        }

        fn set_content(&self, html: &str) {
            *self.content.borrow_mut() = html.to_string();
            self.content_writes.set(self.content_writes.get() + 1);
        }

        fn scroll_to_top(&self) {
            self.scrolls.set(self.scrolls.get() + 1);
        }

        fn spawn(&self, task: LocalTask) {
            self.tasks.borrow_mut().push(task);
        }

        fn install_navigation_hooks(&self, hooks: NavigationHooks) {
            self.hook_installs.set(self.hook_installs.get() + 1);
            *self.hooks.borrow_mut() = Some(hooks);
        }
    }

    /// Records activations and deactivations
    struct Probe {
        name: String,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl LevelController for Probe {
        fn activate(&mut self, ctx: LevelContext) {
            self.log.borrow_mut().push(format!("activate {}", ctx.level_id));
        }

        fn deactivate(&mut self) {
            self.log.borrow_mut().push(format!("deactivate {}", self.name));
        }
    }

    /// Completes its level and moves on as soon as it is activated
    struct AutoAdvance;

    impl LevelController for AutoAdvance {
        fn activate(&mut self, ctx: LevelContext) {
            let next = {
                let mut store = ctx.store.borrow_mut();
                store.complete_level(&ctx.level_id);
                store.next_level(&ctx.level_id)
            };
            ctx.navigator.navigate(&format!("/{}", next));
        }

        fn deactivate(&mut self) {}
    }

    const PAGES: &[(&str, &str)] = &[
        ("/home.html", "<h1>home</h1>"),
        ("/levels/level-1.html", "<h1>one</h1>"),
        ("/levels/level-2.html", "<h1>two</h1>"),
        ("/credits.html", "<h1>credits</h1>"),
    ];

    fn store() -> SharedStore {
        let clock = FixedClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        Rc::new(RefCell::new(GameStore::new(MemoryStorage::new(), clock)))
    }

    fn table() -> RouteTable {
        RouteTable::new([
            Route::new("/", "home.html"),
            Route::new("/level-1", "levels/level-1.html").with_behavior("level-1"),
            Route::new("/level-2", "levels/level-2.html").with_behavior("level-2"),
            Route::new("/credits", "credits.html"),
        ])
        .unwrap()
    }

    fn probes(log: &Rc<RefCell<Vec<String>>>) -> ControllerRegistry {
        let mut registry = ControllerRegistry::new();
        for name in ["level-1", "level-2"] {
            let log = log.clone();
            registry.register(name, move || {
                Box::new(Probe {
                    name: name.to_string(),
                    log: log.clone(),
                })
            });
        }
        registry
    }

    fn router_with(
        platform: MockPlatform,
        registry: ControllerRegistry,
        config: &AppConfig,
    ) -> Rc<Router<MockPlatform>> {
        Router::new(platform, table(), registry, store(), config)
    }

    /// Drive spawned tasks until none are left
    fn run_tasks(router: &Router<MockPlatform>) {
        loop {
            let tasks = std::mem::take(&mut *router.platform().tasks.borrow_mut());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                pollster::block_on(task);
            }
        }
    }

    #[test]
    fn test_navigate_renders_fragment() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let router = router_with(MockPlatform::with_pages(PAGES), probes(&log), &AppConfig::default());

        let outcome = pollster::block_on(router.navigate("/level-1"));
        assert_eq!(outcome, ResolveOutcome::Rendered { path: "/level-1".to_string() });

        let platform = router.platform();
        assert_eq!(*platform.content.borrow(), "<h1>one</h1>");
        assert_eq!(*platform.history.borrow(), vec!["/level-1"]);
        assert_eq!(*platform.fetched.borrow(), vec!["/levels/level-1.html"]);
        assert_eq!(platform.scrolls.get(), 1);
        assert_eq!(router.active_level().as_deref(), Some("level-1"));
        assert_eq!(*log.borrow(), vec!["activate level-1"]);
        assert_eq!(router.phase(), RouterPhase::Idle);
    }

    #[test]
    fn test_unmapped_path_serves_root() {
        let router = router_with(
            MockPlatform::with_pages(PAGES),
            ControllerRegistry::new(),
            &AppConfig::default(),
        );
        let outcome = pollster::block_on(router.navigate("/not-a-level"));
        assert_eq!(outcome, ResolveOutcome::Rendered { path: "/".to_string() });
        assert_eq!(*router.platform().content.borrow(), "<h1>home</h1>");
        // History still records what was asked for
        assert_eq!(*router.platform().history.borrow(), vec!["/not-a-level"]);
    }

    #[test]
    fn test_route_without_behavior_removes_previous_controller() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let router = router_with(MockPlatform::with_pages(PAGES), probes(&log), &AppConfig::default());

        pollster::block_on(router.navigate("/level-1"));
        pollster::block_on(router.navigate("/level-2"));
        pollster::block_on(router.navigate("/credits"));

        assert_eq!(
            *log.borrow(),
            vec![
                "activate level-1",
                "deactivate level-1",
                "activate level-2",
                "deactivate level-2",
            ]
        );
        assert_eq!(router.active_level(), None);
    }

    #[test]
    fn test_fetch_failure_shows_error_fragment_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let platform = MockPlatform::with_pages(PAGES);
        platform.fail("/levels/level-2.html", FetchError::Network("offline".to_string()));
        let router = router_with(platform, probes(&log), &AppConfig::default());

        pollster::block_on(router.navigate("/level-1"));
        let writes_before = router.platform().content_writes.get();
        let outcome = pollster::block_on(router.navigate("/level-2"));

        assert_eq!(
            outcome,
            ResolveOutcome::Failed {
                path: "/level-2".to_string(),
                error: FetchError::Network("offline".to_string()),
            }
        );
        let content = router.platform().content.borrow().clone();
        assert_eq!(content, error_fragment("nav-link"));
        assert_eq!(content.matches("error-container").count(), 1);
        assert!(!content.contains("<h1>one</h1>"));
        assert_eq!(router.platform().content_writes.get(), writes_before + 1);
        assert_eq!(*log.borrow(), vec!["activate level-1", "deactivate level-1"]);
        assert_eq!(router.active_level(), None);
    }

    #[test]
    fn test_http_status_is_failure() {
        let router = router_with(
            MockPlatform::with_pages(&[("/home.html", "home")]),
            ControllerRegistry::new(),
            &AppConfig::default(),
        );
        let outcome = pollster::block_on(router.navigate("/credits"));
        assert!(matches!(
            outcome,
            ResolveOutcome::Failed { error: FetchError::Status(404), .. }
        ));
        assert!(router.platform().content.borrow().contains("Return to Main Menu"));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let router = router_with(MockPlatform::with_pages(PAGES), probes(&log), &AppConfig::default());

        let first = router.begin("/level-1");
        let second = router.begin("/level-2");
        assert!(second.token > first.token);
        assert_eq!(router.phase(), RouterPhase::Resolving);

        let outcome = router.finish(second, Ok("two".to_string()));
        assert_eq!(outcome, ResolveOutcome::Rendered { path: "/level-2".to_string() });
        assert_eq!(router.phase(), RouterPhase::Resolving);

        assert_eq!(router.finish(first, Ok("one".to_string())), ResolveOutcome::Stale);
        assert_eq!(router.phase(), RouterPhase::Idle);
        assert_eq!(*router.platform().content.borrow(), "two");
        assert_eq!(*log.borrow(), vec!["activate level-2"]);
    }

    #[test]
    fn test_base_path_applied_to_history_and_fetch() {
        let config = AppConfig::for_hostname("player.github.io");
        let pages: Vec<(String, String)> = PAGES
            .iter()
            .map(|(url, html)| (format!("/mind-lab-game{}", url), html.to_string()))
            .collect();
        let pages: Vec<(&str, &str)> = pages.iter().map(|(u, h)| (u.as_str(), h.as_str())).collect();
        let router = router_with(MockPlatform::with_pages(&pages), ControllerRegistry::new(), &config);

        pollster::block_on(router.navigate("/level-1"));
        pollster::block_on(router.navigate("/"));
        assert_eq!(
            *router.platform().history.borrow(),
            vec!["/mind-lab-game/level-1", "/mind-lab-game/"]
        );
        assert_eq!(
            *router.platform().fetched.borrow(),
            vec!["/mind-lab-game/levels/level-1.html", "/mind-lab-game/home.html"]
        );

        let outcome = pollster::block_on(router.resolve("/mind-lab-game/level-2"));
        assert_eq!(outcome, ResolveOutcome::Rendered { path: "/level-2".to_string() });
        assert_eq!(router.platform().history.borrow().len(), 2);
    }

    #[test]
    fn test_initialize_once() {
        let platform = MockPlatform::with_pages(PAGES);
        *platform.location.borrow_mut() = "/level-2".to_string();
        let router = router_with(platform, ControllerRegistry::new(), &AppConfig::default());

        assert!(router.initialize());
        assert!(!router.initialize());
        run_tasks(&router);

        let platform = router.platform();
        assert_eq!(platform.hook_installs.get(), 1);
        assert_eq!(*platform.fetched.borrow(), vec!["/levels/level-2.html"]);
        assert_eq!(*platform.content.borrow(), "<h1>two</h1>");
        assert!(platform.history.borrow().is_empty());
    }

    #[test]
    fn test_hooks_drive_navigation() {
        let router = router_with(
            MockPlatform::with_pages(PAGES),
            ControllerRegistry::new(),
            &AppConfig::default(),
        );
        router.initialize();
        run_tasks(&router);
        let hooks = router.platform().hooks.borrow().clone().unwrap();

        (hooks.on_link)("/level-1".to_string());
        run_tasks(&router);
        assert_eq!(*router.platform().content.borrow(), "<h1>one</h1>");
        assert_eq!(*router.platform().history.borrow(), vec!["/level-1"]);

        // Back button: location changes, no new entry is pushed
        *router.platform().location.borrow_mut() = "/".to_string();
        (hooks.on_history_pop)();
        run_tasks(&router);
        assert_eq!(*router.platform().content.borrow(), "<h1>home</h1>");
        assert_eq!(router.platform().history.borrow().len(), 1);
    }

    #[test]
    fn test_prefixed_link_is_not_doubled() {
        let config = AppConfig::for_hostname("player.github.io");
        let router = router_with(
            MockPlatform::with_pages(&[("/mind-lab-game/levels/level-1.html", "one")]),
            ControllerRegistry::new(),
            &config,
        );
        router.initialize();
        run_tasks(&router);
        let hooks = router.platform().hooks.borrow().clone().unwrap();

        (hooks.on_link)("/mind-lab-game/level-1".to_string());
        (hooks.on_link)("/level-1".to_string());
        run_tasks(&router);
        assert_eq!(
            *router.platform().history.borrow(),
            vec!["/mind-lab-game/level-1", "/mind-lab-game/level-1"]
        );
    }

    #[test]
    fn test_controller_can_complete_and_advance() {
        let mut registry = ControllerRegistry::new();
        registry.register("level-1", || Box::new(AutoAdvance));
        let router = router_with(MockPlatform::with_pages(PAGES), registry, &AppConfig::default());

        pollster::block_on(router.navigate("/level-1"));
        run_tasks(&router);

        assert_eq!(*router.platform().content.borrow(), "<h1>two</h1>");
        assert_eq!(*router.platform().history.borrow(), vec!["/level-1", "/level-2"]);
        let store = router.store.borrow();
        assert_eq!(store.completed_levels(), ["level-1".to_string()]);
        assert_eq!(store.current_level(), "level-2");
    }

    #[test]
    fn test_missing_controller_is_not_fatal() {
        let router = router_with(
            MockPlatform::with_pages(PAGES),
            ControllerRegistry::new(),
            &AppConfig::default(),
        );
        let outcome = pollster::block_on(router.navigate("/level-1"));
        assert!(matches!(outcome, ResolveOutcome::Rendered { .. }));
        assert_eq!(router.active_level(), None);
    }
}
