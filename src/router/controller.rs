//! Level controllers and the registry the router creates them from

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::game::SharedStore;

/// Per-level behaviour, activated after its fragment is in the content region
pub trait LevelController {
    /// Look up elements in the freshly inserted fragment and attach listeners.
    /// Prior progress should be read back from the store here.
    fn activate(&mut self, ctx: LevelContext);

    /// Detach everything `activate` attached
    fn deactivate(&mut self);
}

/// Requests navigation without holding the router
#[derive(Clone)]
pub struct Navigator {
    go: Rc<dyn Fn(&str)>,
}

impl Navigator {
    pub fn new(go: impl Fn(&str) + 'static) -> Self {
        Self { go: Rc::new(go) }
    }

    /// Schedule navigation to a logical path
    pub fn navigate(&self, path: &str) {
        (self.go)(path);
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Navigator")
    }
}

/// What a controller gets on activation
#[derive(Clone)]
pub struct LevelContext {
    pub level_id: String,
    pub store: SharedStore,
    pub navigator: Navigator,
}

pub type ControllerFactory = Box<dyn Fn() -> Box<dyn LevelController>>;

/// Behaviour name -> controller factory
#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, ControllerFactory>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        behavior: &str,
        factory: impl Fn() -> Box<dyn LevelController> + 'static,
    ) -> &mut Self {
        self.factories.insert(behavior.to_string(), Box::new(factory));
        self
    }

    pub fn contains(&self, behavior: &str) -> bool {
        self.factories.contains_key(behavior)
    }

    /// Fresh controller for `behavior`
    pub fn create(&self, behavior: &str) -> Option<Box<dyn LevelController>> {
        self.factories.get(behavior).map(|factory| factory())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter(Rc<Cell<u32>>);

    impl LevelController for Counter {
        fn activate(&mut self, _ctx: LevelContext) {
            self.0.set(self.0.get() + 1);
        }

        fn deactivate(&mut self) {}
    }

    #[test]
    fn test_registry_creates_fresh_instances() {
        let created = Rc::new(Cell::new(0));
        let mut registry = ControllerRegistry::new();
        let counter = created.clone();
        registry.register("level-1", move || {
            counter.set(counter.get() + 1);
            Box::new(Counter(Rc::new(Cell::new(0))))
        });

        assert!(registry.contains("level-1"));
        assert!(registry.create("level-1").is_some());
        assert!(registry.create("level-1").is_some());
        assert!(registry.create("level-2").is_none());
        assert_eq!(created.get(), 2);
    }

    #[test]
    fn test_navigator_forwards_path() {
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = seen.clone();
        let navigator = Navigator::new(move |path| sink.borrow_mut().push(path.to_string()));
        navigator.clone().navigate("/level-2");
        assert_eq!(*seen.borrow(), vec!["/level-2"]);
    }
}
