use std::rc::Weak;

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement};

use super::dom;
use super::gallery::StripGallery;
use crate::config::classes;
use crate::filter::TagFilter;

const BUTTON_CLOSED: &str = "Filter";
const BUTTON_OPEN: &str = "×";

fn checkbox_selector() -> String {
    format!(".{} input[type=\"checkbox\"]", classes::DROPDOWN_CONTENT)
}

/// Filter built from the currently checked boxes.
pub fn selected_filter(document: &Document) -> TagFilter {
    let selector = format!("{}:checked", checkbox_selector());
    let Ok(nodes) = document.query_selector_all(&selector) else {
        return TagFilter::default();
    };
    let values = (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value());
    TagFilter::from_values(values)
}

fn close_all(document: &Document) {
    let Ok(nodes) = document.query_selector_all(&dom::class_selector(classes::DROPDOWN)) else {
        return;
    };
    for dropdown in (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
    {
        dom::set_class(&dropdown, classes::OPEN, false);
        let selector = dom::class_selector(classes::DROPDOWN_BUTTON);
        if let Ok(Some(button)) = dropdown.query_selector(&selector) {
            button.set_text_content(Some(BUTTON_CLOSED));
        }
    }
}

/// Checkbox changes and dropdown open/close, delegated from the document.
pub struct FilterPanel {
    _listeners: Vec<EventListener>,
}

impl FilterPanel {
    pub fn mount(document: &Document, gallery: Weak<StripGallery>) -> Self {
        let mut listeners = Vec::new();

        let doc = document.clone();
        listeners.push(EventListener::new(document, "change", move |event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            if !input.matches(&checkbox_selector()).unwrap_or(false) {
                return;
            }
            if let Some(gallery) = gallery.upgrade() {
                gallery.apply_filter(&selected_filter(&doc));
            }
        }));

        let doc = document.clone();
        listeners.push(EventListener::new(document, "click", move |event| {
            let button_selector = dom::class_selector(classes::DROPDOWN_BUTTON);
            let Some(button) = dom::closest(event.target(), &button_selector) else {
                // Clicks outside every dropdown close them all.
                if dom::closest(event.target(), &dom::class_selector(classes::DROPDOWN)).is_none() {
                    close_all(&doc);
                }
                return;
            };
            let Ok(Some(dropdown)) = button.closest(&dom::class_selector(classes::DROPDOWN)) else {
                return;
            };
            let was_open = dropdown.class_list().contains(classes::OPEN);
            close_all(&doc);
            if !was_open {
                dom::set_class(&dropdown, classes::OPEN, true);
                button.set_text_content(Some(BUTTON_OPEN));
            }
        }));

        Self {
            _listeners: listeners,
        }
    }
}
