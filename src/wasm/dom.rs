use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement, Node, Window};

use crate::error::{Error, Result};

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| Error::MissingElement("window".into()))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| Error::MissingElement("document".into()))
}

pub fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
        .ok_or_else(|| Error::MissingElement(format!("#{id}")))
}

pub fn class_selector(class: &str) -> String {
    format!(".{class}")
}

/// Element an event was dispatched at; text nodes resolve to their parent.
pub fn element_of(target: Option<EventTarget>) -> Option<Element> {
    match target?.dyn_into::<Element>() {
        Ok(el) => Some(el),
        Err(other) => other.dyn_into::<Node>().ok()?.parent_element(),
    }
}

pub fn closest(target: Option<EventTarget>, selector: &str) -> Option<Element> {
    element_of(target)?.closest(selector).ok().flatten()
}

pub fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = el.style().set_property(property, value) {
        log::debug!("style {property}={value} rejected: {:?}", err);
    }
}

pub fn set_class(el: &Element, class: &str, on: bool) {
    let _ = el.class_list().toggle_with_force(class, on);
}

pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

pub fn scroll_to_top() {
    if let Some(window) = web_sys::window() {
        window.scroll_to_with_x_and_y(0.0, 0.0);
    }
}
