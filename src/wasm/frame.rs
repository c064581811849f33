use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::{closure::Closure, JsCast};

use super::dom;
use crate::error::Result;

struct Inner {
    running: Cell<bool>,
    request: Cell<Option<i32>>,
    // `callback` holds the animation-frame closure so that we can keep calling
    // `request_animation_frame` recursively. It is created after `Inner` so the
    // closure can reach back to it through a weak reference.
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Inner {
    fn schedule(&self) -> Result<()> {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Ok(());
        };
        let id = dom::window()?.request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.request.set(Some(id));
        Ok(())
    }
}

/// Per-frame task that runs until stopped or dropped.
pub struct FrameLoop {
    inner: Rc<Inner>,
}

impl FrameLoop {
    pub fn start(mut tick: impl FnMut() + 'static) -> Result<Self> {
        let inner = Rc::new(Inner {
            running: Cell::new(true),
            request: Cell::new(None),
            callback: RefCell::new(None),
        });

        let weak: Weak<Inner> = Rc::downgrade(&inner);
        *inner.callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.request.set(None);
            if !inner.running.get() {
                return;
            }
            tick();

            // schedule next
            if let Err(err) = inner.schedule() {
                log::warn!("frame loop halted: {err}");
                inner.running.set(false);
            }
        }) as Box<dyn FnMut()>));

        inner.schedule()?;
        Ok(Self { inner })
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    pub fn stop(&self) {
        self.inner.running.set(false);
        if let (Some(id), Some(window)) = (self.inner.request.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run `f` after `frames` animation frames have passed.
pub fn after_frames(frames: u32, f: impl FnOnce() + 'static) {
    if frames == 0 {
        f();
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let next = Closure::once_into_js(move || after_frames(frames - 1, f));
    if let Err(err) = window.request_animation_frame(next.unchecked_ref()) {
        log::warn!("frame callback refused: {:?}", err);
    }
}
