use js_sys::{Array, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use super::dom;
use crate::config::{attrs, classes};
use crate::error::Result;

/// Copy `data-bg-image` into the inline background. Returns true when the
/// element now carries an image.
pub fn attach_background(image: &HtmlElement) -> bool {
    if !image.style().get_property_value("background-image").unwrap_or_default().is_empty() {
        return true;
    }
    let Some(src) = image.get_attribute(attrs::BG_IMAGE).filter(|s| !s.is_empty()) else {
        return false;
    };
    dom::set_style(image, "background-image", &format!("url('{src}')"));
    dom::set_class(image, classes::LOADED, true);
    true
}

/// Loads tile backgrounds once they scroll near the gallery viewport.
pub struct LazyImages {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl LazyImages {
    pub fn new(
        root: &Element,
        margin: &str,
        mut on_visible: impl FnMut(&HtmlElement) + 'static,
    ) -> Result<Self> {
        let on_entries = move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                let target = entry.target();
                if let Some(image) = target.dyn_ref::<HtmlElement>() {
                    if attach_background(image) {
                        on_visible(image);
                    }
                }
                observer.unobserve(&target);
            }
        };
        let callback =
            Closure::wrap(Box::new(on_entries) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        Reflect::set(&init, &JsValue::from_str("root"), root)?;
        Reflect::set(&init, &JsValue::from_str("rootMargin"), &JsValue::from_str(margin))?;
        Reflect::set(&init, &JsValue::from_str("threshold"), &JsValue::from_f64(0.0))?;

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    pub fn observe(&self, image: &Element) {
        self.observer.observe(image);
    }
}

impl Drop for LazyImages {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
