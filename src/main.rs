//! MIND LAB entry point
//!
//! On the web this wires the store, router and level controllers together.
//! Natively it is a small save-file inspector.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use mind_lab::platform::storage::LocalStorage;
    use mind_lab::platform::web::WebPlatform;
    use mind_lab::platform::{MemoryStorage, SaveBackend, SystemClock};
    use mind_lab::{AppConfig, GameStore, RouteTable, Router, StoreEvent, levels};

    fn open_storage() -> Box<dyn SaveBackend> {
        match LocalStorage::open() {
            Some(storage) => Box::new(storage),
            None => {
                log::warn!("localStorage unavailable - progress will not survive a reload");
                Box::new(MemoryStorage::new())
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("MIND LAB starting...");

        let config = AppConfig::detect();

        let mut store = GameStore::new(open_storage(), SystemClock);
        store.subscribe(|event| match event {
            StoreEvent::Saved(doc) => log::debug!("Saved progress at {}", doc.current_level),
            StoreEvent::Loaded(doc) => log::info!(
                "Welcome back: {} levels completed, at {}",
                doc.completed_levels.len(),
                doc.current_level
            ),
            StoreEvent::Reset => log::info!("Progress reset"),
        });
        if !store.load() {
            log::info!("Starting a new game");
        }
        let store = Rc::new(RefCell::new(store));

        let Some(platform) = WebPlatform::new(&config) else {
            log::error!("No window/document - cannot start router");
            return;
        };

        let routes = RouteTable::standard();
        let controllers = levels::registry(&routes);
        let router = Router::new(platform, routes, controllers, store, &config);
        router.initialize();

        // Handlers only hold weak references; the router lives for the page
        std::mem::forget(router);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let path = std::env::args().nth(1);
    match inspect(path.as_deref()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Load a save file (or start fresh) and print the resulting snapshot
#[cfg(not(target_arch = "wasm32"))]
fn inspect(path: Option<&str>) -> Result<String, Box<dyn std::error::Error>> {
    use mind_lab::GameStore;
    use mind_lab::consts::STORAGE_KEY;
    use mind_lab::platform::{MemoryStorage, SystemClock};

    let storage = MemoryStorage::new();
    if let Some(path) = path {
        log::info!("Reading save from {}", path);
        storage.insert(STORAGE_KEY, &std::fs::read_to_string(path)?);
    }

    let mut store = GameStore::new(storage, SystemClock);
    if path.is_some() {
        store.try_load()?;
    }
    Ok(serde_json::to_string_pretty(&store.export_snapshot())?)
}
