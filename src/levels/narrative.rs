//! Generic controller for story levels driven by data attributes
//!
//! - `[data-choice]` records `data-value` under that choice id, and applies
//!   `data-stat`/`data-delta` when both are present
//! - `[data-complete]` completes the level and moves on (`data-next`
//!   overrides the destination)

use serde_json::Value;

use crate::consts::END_LEVEL;
use crate::game::next_level;

/// Attribute values are JSON when they parse as JSON, plain strings otherwise
pub fn parse_choice_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Logical path reached by completing `level_id`
pub fn completion_target(level_id: &str) -> String {
    match next_level(level_id) {
        END_LEVEL => "/".to_string(),
        next => format!("/{}", next),
    }
}

/// Whether a choice element's raw value matches what was stored
pub fn is_selected(stored: Option<&Value>, raw: &str) -> bool {
    stored.is_some_and(|v| *v == parse_choice_value(raw))
}

#[cfg(target_arch = "wasm32")]
pub use web::NarrativeController;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::*;
    use crate::levels::dom::{self, ListenerSet};
    use crate::router::{LevelContext, LevelController};

    #[derive(Default)]
    pub struct NarrativeController {
        listeners: ListenerSet,
    }

    impl NarrativeController {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl LevelController for NarrativeController {
        fn activate(&mut self, ctx: LevelContext) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            for el in dom::query_all(&document, "[data-choice]") {
                let Some(choice_id) = el.get_attribute("data-choice") else {
                    continue;
                };
                let raw = el.get_attribute("data-value").unwrap_or_default();

                let stored = ctx.store.borrow().get_choice(&ctx.level_id, Some(&choice_id));
                if is_selected(stored.as_ref(), &raw) {
                    let _ = el.class_list().add_1("selected");
                }

                let stat = el.get_attribute("data-stat");
                let delta = el
                    .get_attribute("data-delta")
                    .and_then(|d| d.trim().parse::<i32>().ok());
                let ctx = ctx.clone();
                let document = document.clone();
                self.listeners.listen(&el, "click", move |_event| {
                    {
                        let mut store = ctx.store.borrow_mut();
                        store.record_choice(&ctx.level_id, &choice_id, parse_choice_value(&raw));
                        if let (Some(stat), Some(delta)) = (stat.as_deref(), delta) {
                            store.update_stat(stat, delta);
                        }
                    }
                    let selector = format!("[data-choice=\"{}\"]", choice_id);
                    for other in dom::query_all(&document, &selector) {
                        let _ = other.class_list().remove_1("selected");
                    }
                    let _ = mark_selected(&document, &selector, &raw);
                });
            }

            for el in dom::query_all(&document, "[data-complete]") {
                let next = el.get_attribute("data-next");
                let ctx = ctx.clone();
                self.listeners.listen(&el, "click", move |event| {
                    event.prevent_default();
                    ctx.store.borrow_mut().complete_level(&ctx.level_id);
                    let target = next.clone().unwrap_or_else(|| completion_target(&ctx.level_id));
                    log::info!("{} complete, continuing to {}", ctx.level_id, target);
                    ctx.navigator.navigate(&target);
                });
            }
        }

        fn deactivate(&mut self) {
            self.listeners.clear();
        }
    }

    /// Mark the element of a choice group whose value is `raw`
    fn mark_selected(document: &web_sys::Document, selector: &str, raw: &str) -> Option<()> {
        let el = dom::query_all(document, selector)
            .into_iter()
            .find(|el| el.get_attribute("data-value").unwrap_or_default() == raw)?;
        el.class_list().add_1("selected").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_choice_value() {
        assert_eq!(parse_choice_value("42"), json!(42));
        assert_eq!(parse_choice_value("true"), json!(true));
        assert_eq!(parse_choice_value("[1,2]"), json!([1, 2]));
        assert_eq!(parse_choice_value("\"quoted\""), json!("quoted"));
        assert_eq!(parse_choice_value("trust"), json!("trust"));
        assert_eq!(parse_choice_value(""), json!(""));
    }

    #[test]
    fn test_completion_target() {
        assert_eq!(completion_target("level-2"), "/level-3");
        assert_eq!(completion_target("level-6"), "/level-7");
        assert_eq!(completion_target("level-7"), "/");
        assert_eq!(completion_target("path-b"), "/");
        assert_eq!(completion_target("epilogue"), "/");
    }

    #[test]
    fn test_is_selected() {
        assert!(is_selected(Some(&json!("trust")), "trust"));
        assert!(is_selected(Some(&json!(3)), "3"));
        assert!(!is_selected(Some(&json!("3")), "3"));
        assert!(!is_selected(Some(&json!("doubt")), "trust"));
        assert!(!is_selected(None, "trust"));
    }
}
