//! Browser implementation of [`Platform`]

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, MouseEvent, Response, Window};

use super::{FetchError, LocalTask, NavigationHooks, Platform};
use crate::config::AppConfig;

pub struct WebPlatform {
    window: Window,
    document: Document,
    content_region_id: String,
    nav_link_selector: String,
}

impl WebPlatform {
    pub fn new(config: &AppConfig) -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self {
            window,
            document,
            content_region_id: config.content_region_id.clone(),
            nav_link_selector: config.nav_link_selector(),
        })
    }
}

/// Best-effort text for a thrown JS value
pub fn js_message(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", err))
}

impl Platform for WebPlatform {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = JsFuture::from(self.window.fetch_with_str(url))
            .await
            .map_err(|e| FetchError::Network(js_message(&e)))?;
        let response: Response = response
            .dyn_into()
            .map_err(|e| FetchError::Network(js_message(&e)))?;
        if !response.ok() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().map_err(|e| FetchError::Body(js_message(&e)))?;
        let body = JsFuture::from(body)
            .await
            .map_err(|e| FetchError::Body(js_message(&e)))?;
        body.as_string()
            .ok_or_else(|| FetchError::Body("response body is not text".to_string()))
    }

    fn current_path(&self) -> String {
        self.window
            .location()
            .pathname()
            .unwrap_or_else(|_| "/".to_string())
    }

    fn push_history(&self, url: &str) {
        let pushed = self
            .window
            .history()
            .and_then(|h| h.push_state_with_url(&JsValue::NULL, "", Some(url)));
        if let Err(e) = pushed {
            log::warn!("Could not push history entry {}: {}", url, js_message(&e));
        }
    }

    fn set_content(&self, html: &str) {
        match self.document.get_element_by_id(&self.content_region_id) {
            Some(region) => region.set_inner_html(html),
            None => log::error!("Content region #{} not found", self.content_region_id),
        }
    }

    fn scroll_to_top(&self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn spawn(&self, task: LocalTask) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn install_navigation_hooks(&self, hooks: NavigationHooks) {
        // One delegated listener on <body>; matches the closest navigation
        // ancestor so clicks on nested markup inside a link still route.
        if let Some(body) = self.document.body() {
            let selector = self.nav_link_selector.clone();
            let on_link = hooks.on_link.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                    return;
                };
                let Ok(Some(link)) = target.closest(&selector) else {
                    return;
                };
                let Some(path) = link.get_attribute("href") else {
                    return;
                };
                event.prevent_default();
                on_link(path);
            });
            if let Err(e) = body.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref()) {
                log::warn!("Could not intercept navigation links: {}", js_message(&e));
            }
            closure.forget();
        } else {
            log::error!("No <body>, navigation links will not be intercepted");
        }

        // Back/forward
        {
            let on_history_pop = hooks.on_history_pop;
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
                on_history_pop();
            });
            if let Err(e) = self
                .window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
            {
                log::warn!("Back/forward will not re-route: {}", js_message(&e));
            }
            closure.forget();
        }
    }
}
