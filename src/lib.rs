//! Client runtime of the portfolio site: strip gallery, SPA router and the
//! about curtain, compiled to WASM and attached to the statically rendered page.
//!
//! The state machines live in plain modules so they build and test on the
//! host. DOM wiring is under [`wasm`], which only exists on `wasm32`.

pub mod config;
pub mod curtain;
pub mod error;
pub mod filter;
pub mod gallery;
pub mod motion;
pub mod registry;
pub mod route;
pub mod xylophone;

pub use error::{Error, Result};

// Only compile DOM-facing code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;

    use gloo::events::EventListener;
    use wasm_bindgen::prelude::*;

    pub mod audio;
    pub mod curtain;
    pub mod dom;
    pub mod filters;
    pub mod frame;
    pub mod gallery;
    pub mod lazy;
    pub mod page;
    pub mod router;

    thread_local! {
        static PAGE: RefCell<Option<page::Page>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let level = if cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        // A second init (e.g. under the test harness) only fails to replace the logger.
        let _ = console_log::init_with_level(level);

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if document.ready_state() == "loading" {
            EventListener::once(&document, "DOMContentLoaded", |_| boot()).forget();
        } else {
            boot();
        }
        Ok(())
    }

    fn boot() {
        match page::Page::mount() {
            Ok(Some(page)) => PAGE.with(|slot| *slot.borrow_mut() = Some(page)),
            Ok(None) => log::debug!("no strip gallery on this page; runtime idle"),
            Err(err) => log::warn!("page runtime failed to start: {err}"),
        }
    }

    /// Stop the frame loop and drop every listener.
    #[wasm_bindgen]
    pub fn unmount() {
        if let Some(page) = PAGE.with(|slot| slot.borrow_mut().take()) {
            page.unmount();
        }
    }
}
