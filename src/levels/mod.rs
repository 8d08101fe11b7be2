//! Level controllers
//!
//! Puzzle rules are plain Rust and tested natively; the DOM wiring that
//! drives them only exists on wasm32.

pub mod narrative;
pub mod sound_sequence;

#[cfg(target_arch = "wasm32")]
use crate::router::{ControllerRegistry, LevelController, RouteTable};

/// Controller for every behaviour in `routes`: the sound puzzle for
/// `level-1`, the narrative controller for the rest
#[cfg(target_arch = "wasm32")]
pub fn registry(routes: &RouteTable) -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();
    for path in routes.paths() {
        let Some(behavior) = routes.lookup(path).behavior.as_deref() else {
            continue;
        };
        if behavior == sound_sequence::LEVEL_ID {
            registry.register(behavior, || {
                Box::new(sound_sequence::SoundSequenceController::new()) as Box<dyn LevelController>
            });
        } else {
            registry.register(behavior, || {
                Box::new(narrative::NarrativeController::new()) as Box<dyn LevelController>
            });
        }
    }
    registry
}

/// Timer handles that may still fire. A handle leaves the set when its
/// timer runs or when everything is cancelled.
#[derive(Debug, Default)]
pub struct PendingTimers {
    handles: Vec<i32>,
}

impl PendingTimers {
    pub fn track(&mut self, handle: i32) {
        self.handles.push(handle);
    }

    pub fn fired(&mut self, handle: i32) {
        self.handles.retain(|h| *h != handle);
    }

    pub fn drain(&mut self) -> Vec<i32> {
        std::mem::take(&mut self.handles)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// DOM helpers shared by the controllers
#[cfg(target_arch = "wasm32")]
pub(crate) mod dom {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, Event, EventTarget, HtmlButtonElement, HtmlElement, Window};

    use super::PendingTimers;

    /// Listeners attached by a controller, removed together on deactivate
    #[derive(Default)]
    pub struct ListenerSet {
        entries: Vec<(EventTarget, &'static str, Closure<dyn FnMut(Event)>)>,
    }

    impl ListenerSet {
        pub fn listen(
            &mut self,
            target: &EventTarget,
            event: &'static str,
            handler: impl FnMut(Event) + 'static,
        ) {
            let closure = Closure::<dyn FnMut(Event)>::new(handler);
            match target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
                Ok(()) => self.entries.push((target.clone(), event, closure)),
                Err(_) => log::warn!("Could not attach {} listener", event),
            }
        }

        pub fn clear(&mut self) {
            for (target, event, closure) in self.entries.drain(..) {
                let _ = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            }
        }
    }

    /// `setTimeout` wrapper; whatever has not fired yet is cancelled together
    #[derive(Default)]
    pub struct Timers {
        pending: Rc<RefCell<PendingTimers>>,
    }

    impl Timers {
        pub fn after(&mut self, window: &Window, ms: i32, f: impl FnOnce() + 'static) {
            let slot = Rc::new(Cell::new(None));
            let callback = {
                let slot = slot.clone();
                let pending = self.pending.clone();
                Closure::once_into_js(move || {
                    if let Some(handle) = slot.get() {
                        pending.borrow_mut().fired(handle);
                    }
                    f();
                })
            };
            match window
                .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), ms)
            {
                Ok(handle) => {
                    slot.set(Some(handle));
                    self.pending.borrow_mut().track(handle);
                }
                Err(_) => log::warn!("Could not schedule timer"),
            }
        }

        pub fn cancel_all(&mut self, window: &Window) {
            let handles = self.pending.borrow_mut().drain();
            for handle in handles {
                window.clear_timeout_with_handle(handle);
            }
        }
    }

    pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
        let Ok(nodes) = document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    pub fn set_disabled(document: &Document, id: &str, disabled: bool) {
        if let Some(button) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        {
            button.set_disabled(disabled);
        }
    }

    pub fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let classes = el.class_list();
            let _ = if hidden {
                classes.add_1("hidden")
            } else {
                classes.remove_1("hidden")
            };
        }
    }

    pub fn set_style(el: &Element, property: &str, value: &str) {
        if let Some(el) = el.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property(property, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fired_timers_are_forgotten() {
        let mut pending = PendingTimers::default();
        for handle in 1..=50 {
            pending.track(handle);
            pending.fired(handle);
        }
        assert!(pending.is_empty());

        pending.track(7);
        pending.track(8);
        pending.fired(7);
        pending.fired(99);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.drain(), vec![8]);
        assert!(pending.is_empty());
    }
}
