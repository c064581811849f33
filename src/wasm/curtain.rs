use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, PointerEvent};

use super::dom;
use super::frame;
use crate::config::{classes, ids, Tuning};
use crate::curtain::{Curtain, Motion, Release};
use crate::error::Result;

struct Parts {
    island: HtmlElement,
    header: HtmlElement,
    panel: HtmlElement,
    strips: Option<Element>,
    filters: Option<Element>,
}

struct Inner {
    parts: Parts,
    curtain: RefCell<Curtain>,
    resize: RefCell<Option<Timeout>>,
    tuning: Tuning,
}

impl Inner {
    fn render(&self, motion: Motion) {
        let header = &self.parts.header;
        let transition = match motion {
            Motion::Immediate => "none".to_string(),
            Motion::Snap { duration_ms } => format!(
                "transform {}s {}",
                duration_ms as f64 / 1000.0,
                self.tuning.curtain_easing
            ),
        };
        dom::set_style(header, "transition", &transition);

        let curtain = self.curtain.borrow();
        dom::set_style(header, "transform", &format!("translateY({}px)", curtain.offset()));

        let dimmed = curtain.is_dimmed();
        if let Some(strips) = &self.parts.strips {
            dom::set_class(strips, classes::DIMMED, dimmed);
        }
        if let Some(filters) = &self.parts.filters {
            dom::set_class(filters, classes::FADE_OUT, dimmed);
        }
    }

    fn measure(&self) {
        let height = self.parts.panel.offset_height() as f64;
        self.curtain.borrow_mut().measure(height);
        log::debug!("about curtain measured at {height}px");
        self.render(Motion::Immediate);
    }
}

/// Draggable about panel. Clicking the island toggles it, dragging leaves it
/// wherever it is released.
pub struct CurtainController {
    inner: Rc<Inner>,
    _listeners: Vec<EventListener>,
}

impl CurtainController {
    pub fn mount(document: &Document, tuning: &Tuning) -> Result<Self> {
        let parts = Parts {
            island: dom::by_id(document, ids::ISLAND_HANDLE)?,
            header: dom::by_id(document, ids::HEADER)?,
            panel: dom::by_id(document, ids::ABOUT_CURTAIN)?,
            strips: document.get_element_by_id(ids::STRIPS),
            filters: document.get_element_by_id(ids::FILTER_CONTAINER),
        };
        dom::set_style(&parts.header, "transition", "none");

        let inner = Rc::new(Inner {
            parts,
            curtain: RefCell::new(Curtain::new(tuning)),
            resize: RefCell::new(None),
            tuning: tuning.clone(),
        });

        // Content height is only reliable once layout has run.
        let weak = Rc::downgrade(&inner);
        frame::after_frames(2, move || {
            if let Some(inner) = weak.upgrade() {
                inner.measure();
            }
        });

        let window = dom::window()?;
        let blocking = || EventListenerOptions::enable_prevent_default();
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(&inner);
        listeners.push(EventListener::new(&window, "resize", move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            dom::set_style(&inner.parts.header, "transition", "none");
            let debounced = Rc::downgrade(&inner);
            let timeout = Timeout::new(inner.tuning.resize_debounce_ms, move || {
                if let Some(inner) = debounced.upgrade() {
                    inner.measure();
                }
            });
            // Replacing the pending timeout cancels it.
            *inner.resize.borrow_mut() = Some(timeout);
        }));

        let weak = Rc::downgrade(&inner);
        listeners.push(EventListener::new_with_options(
            &inner.parts.island,
            "pointerdown",
            blocking(),
            move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else {
                    return;
                };
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                inner.curtain.borrow_mut().begin_drag(event.client_y() as f64);
                dom::set_style(&inner.parts.header, "transition", "none");
                dom::set_style(&inner.parts.island, "cursor", "grabbing");
                let _ = inner.parts.island.set_pointer_capture(event.pointer_id());
                // Keeps iOS from starting pull-to-refresh.
                event.prevent_default();
            },
        ));

        let weak = Rc::downgrade(&inner);
        listeners.push(EventListener::new_with_options(
            &window,
            "pointermove",
            blocking(),
            move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else {
                    return;
                };
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if !inner.curtain.borrow_mut().drag_to(event.client_y() as f64) {
                    return;
                }
                if event.cancelable() {
                    event.prevent_default();
                }
                inner.render(Motion::Immediate);
            },
        ));

        if let Some(body) = document.body() {
            let weak = Rc::downgrade(&inner);
            listeners.push(EventListener::new_with_options(
                &body,
                "touchmove",
                blocking(),
                move |event| {
                    let dragging = weak
                        .upgrade()
                        .is_some_and(|inner| inner.curtain.borrow().is_dragging());
                    if dragging && event.cancelable() {
                        event.prevent_default();
                    }
                },
            ));
        }

        for kind in ["pointerup", "pointercancel"] {
            let weak = Rc::downgrade(&inner);
            listeners.push(EventListener::new(&window, kind, move |_| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let released = inner.curtain.borrow_mut().end_drag();
                let Some((release, motion)) = released else {
                    return;
                };
                dom::set_style(&inner.parts.island, "cursor", "grab");
                if release == Release::Held {
                    log::debug!("curtain held at {:.0}px", inner.curtain.borrow().position());
                }
                inner.render(motion);
            }));
        }

        Ok(Self {
            inner,
            _listeners: listeners,
        })
    }
}
