use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, KeyboardEvent, MouseEvent, PointerEvent, TouchEvent,
};

use super::audio::Chime;
use super::dom;
use super::frame::{self, FrameLoop};
use super::lazy::{attach_background, LazyImages};
use crate::config::{attrs, classes, ids, Tuning, DEFAULT_SUBTITLE, VISIBLE_COUNT_VAR};
use crate::error::Result;
use crate::filter::{parse_tag_list, TagFilter};
use crate::gallery::{
    entrance, FilterPass, FrameThrottle, HoverLabel, TapTracker, Tile, TileSet,
};
use crate::motion::{normalize, MotionState, Orientation};
use crate::registry::ProjectRegistry;
use crate::xylophone::frequency_for;

#[derive(Clone, Debug)]
pub struct TileElements {
    pub strip: HtmlElement,
    pub image: Option<HtmlElement>,
}

struct GalleryState {
    tiles: TileSet<TileElements>,
    motion: MotionState,
    throttle: FrameThrottle,
    taps: TapTracker,
    label: HoverLabel,
    touched: Option<String>,
}

pub struct StripGallery {
    document: Document,
    container: HtmlElement,
    subtitle: Option<Element>,
    registry: Rc<ProjectRegistry>,
    tuning: Tuning,
    state: RefCell<GalleryState>,
    on_open: RefCell<Option<Rc<dyn Fn(&str)>>>,
    listeners: RefCell<Vec<EventListener>>,
    frame: RefCell<Option<FrameLoop>>,
    lazy: RefCell<Option<LazyImages>>,
    chime: Option<Chime>,
}

fn collect_tiles(
    container: &HtmlElement,
    registry: &ProjectRegistry,
) -> Result<Vec<Tile<TileElements>>> {
    let nodes = container.query_selector_all(&dom::class_selector(classes::STRIP))?;
    let mut tiles = Vec::with_capacity(nodes.length() as usize);
    for i in 0..nodes.length() {
        let Some(strip) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        let Some(slug) = strip.get_attribute(attrs::PROJECT).filter(|s| !s.is_empty()) else {
            log::warn!("strip without {} skipped", attrs::PROJECT);
            continue;
        };
        let tags = match strip.get_attribute(attrs::TAGS) {
            Some(raw) => parse_tag_list(&raw),
            None => registry
                .get(&slug)
                .map(|p| p.tags.iter().map(|t| t.to_lowercase()).collect())
                .unwrap_or_default(),
        };
        let image = strip
            .query_selector(&dom::class_selector(classes::STRIP_IMAGE))?
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        tiles.push(Tile::new(slug, tags, TileElements { strip, image }));
    }
    Ok(tiles)
}

impl StripGallery {
    /// Take over `#strips`: shuffle, load, animate in and wire input.
    pub fn mount(
        document: &Document,
        registry: Rc<ProjectRegistry>,
        tuning: Tuning,
    ) -> Result<Rc<Self>> {
        let container: HtmlElement = dom::by_id(document, ids::STRIPS)?;

        let mut tiles = TileSet::new(collect_tiles(&container, &registry)?)?;
        tiles.shuffle(&mut rand::thread_rng());
        for tile in tiles.iter() {
            container.append_child(&tile.handle.strip)?;
        }

        let subtitle = document.query_selector(&dom::class_selector(classes::HEADER_SUBTITLE))?;
        let default_text = subtitle
            .as_ref()
            .and_then(|el| el.text_content())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_SUBTITLE.to_string());

        let motion = MotionState::new(&tuning);
        apply_orientation(&container, motion.orientation());

        let chime = container.has_attribute(attrs::XYLOPHONE).then(Chime::new);

        let gallery = Rc::new(Self {
            document: document.clone(),
            container,
            subtitle,
            registry,
            tuning,
            state: RefCell::new(GalleryState {
                tiles,
                motion,
                throttle: FrameThrottle::default(),
                taps: TapTracker::default(),
                label: HoverLabel::new(default_text),
                touched: None,
            }),
            on_open: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            frame: RefCell::new(None),
            lazy: RefCell::new(None),
            chime,
        });

        gallery.load_images()?;
        gallery.schedule_entrance();
        gallery.wire();
        gallery.publish_visible_count();
        gallery.start()?;

        log::debug!("strip gallery mounted with {} tiles", gallery.len());
        Ok(gallery)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slugs in display order.
    pub fn slugs(&self) -> Vec<String> {
        self.state.borrow().tiles.slugs().map(str::to_string).collect()
    }

    pub fn tile_element(&self, slug: &str) -> Option<HtmlElement> {
        self.state.borrow().tiles.get(slug).map(|t| t.handle.strip.clone())
    }

    pub fn orientation(&self) -> Orientation {
        self.state.borrow().motion.orientation()
    }

    /// Callback invoked when a tile is clicked or tapped.
    pub fn set_on_open(&self, on_open: impl Fn(&str) + 'static) {
        *self.on_open.borrow_mut() = Some(Rc::new(on_open));
    }

    pub fn start(self: &Rc<Self>) -> Result<()> {
        if self.frame.borrow().as_ref().is_some_and(FrameLoop::is_running) {
            return Ok(());
        }
        let weak = Rc::downgrade(self);
        let frame_loop = FrameLoop::start(move || {
            if let Some(gallery) = weak.upgrade() {
                gallery.frame();
            }
        })?;
        *self.frame.borrow_mut() = Some(frame_loop);
        Ok(())
    }

    /// Stop animating and detach every listener.
    pub fn stop(&self) {
        if let Some(frame_loop) = self.frame.borrow_mut().take() {
            frame_loop.stop();
        }
        self.listeners.borrow_mut().clear();
        self.lazy.borrow_mut().take();
    }

    fn frame(&self) {
        let mut state = self.state.borrow_mut();
        let Some(position) = state.motion.tick() else {
            return;
        };
        for tile in state.tiles.iter().filter(|t| t.loaded) {
            if let Some(image) = &tile.handle.image {
                dom::set_style(image, "background-position", &position);
            }
        }
    }

    fn load_images(self: &Rc<Self>) -> Result<()> {
        let mut deferred = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            for tile in state.tiles.iter_mut() {
                let Some(image) = &tile.handle.image else {
                    continue;
                };
                if self.registry.contains(&tile.slug) {
                    if !image.has_attribute(attrs::BG_IMAGE) {
                        if let Some(hero) = self.registry.hero(&tile.slug) {
                            image.set_attribute(attrs::BG_IMAGE, hero.src())?;
                        }
                    }
                    tile.loaded = attach_background(image);
                } else {
                    deferred.push(image.clone());
                }
            }
        }
        if deferred.is_empty() {
            return Ok(());
        }

        let weak = Rc::downgrade(self);
        let margin = self.tuning.image_load_margin;
        let lazy = LazyImages::new(&self.container, margin, move |image| {
            let Some(gallery) = weak.upgrade() else {
                return;
            };
            let slug = image
                .closest(&dom::class_selector(classes::STRIP))
                .ok()
                .flatten()
                .and_then(|strip| strip.get_attribute(attrs::PROJECT));
            if let Some(slug) = slug {
                let mut state = gallery.state.borrow_mut();
                if let Some(tile) = state.tiles.get_mut(&slug) {
                    tile.loaded = true;
                }
                state.motion.invalidate();
            }
        })?;
        for image in &deferred {
            lazy.observe(image);
        }
        *self.lazy.borrow_mut() = Some(lazy);
        Ok(())
    }

    fn schedule_entrance(self: &Rc<Self>) {
        let state = self.state.borrow();
        for (index, tile) in state.tiles.iter().enumerate() {
            let plan = entrance(index, &self.tuning);
            let strip = tile.handle.strip.clone();
            dom::set_style(&strip, "animation-delay", &format!("{}ms", plan.delay_ms));
            dom::set_class(&strip, classes::INITIAL_LOAD, true);

            let weak = Rc::downgrade(self);
            let slug = tile.slug.clone();
            Timeout::new(plan.settle_after_ms, move || {
                let Some(gallery) = weak.upgrade() else {
                    return;
                };
                let mut state = gallery.state.borrow_mut();
                let Some(tile) = state.tiles.get_mut(&slug).filter(|t| !t.settled) else {
                    return;
                };
                tile.settled = true;
                dom::set_class(&strip, classes::INITIAL_LOAD, false);
                dom::set_class(&strip, classes::LOADED, true);
            })
            .forget();
        }
    }

    fn wire(self: &Rc<Self>) {
        let target = self.container.clone();
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "pointermove", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let Some(gallery) = weak.upgrade() else {
                return;
            };
            gallery.sample_pointer(event.client_x() as f64, event.client_y() as f64);
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "mouseover", move |event| {
            let Some(gallery) = weak.upgrade() else {
                return;
            };
            let selector = dom::class_selector(classes::STRIP);
            if let Some(strip) = dom::closest(event.target(), &selector) {
                gallery.hover_enter(&strip);
            }
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "mouseout", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let Some(gallery) = weak.upgrade() else {
                return;
            };
            let selector = dom::class_selector(classes::STRIP);
            let Some(from) = dom::closest(event.target(), &selector) else {
                return;
            };
            if dom::closest(event.related_target(), &selector).as_ref() == Some(&from) {
                return;
            }
            gallery.hover_leave(&from);
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &target,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(gallery) = weak.upgrade() else {
                    return;
                };
                let Some(slug) = dom::closest(event.target(), &dom::class_selector(classes::STRIP))
                    .and_then(|strip| strip.get_attribute(attrs::PROJECT))
                else {
                    return;
                };
                event.prevent_default();
                // The click a browser synthesizes after a handled tap.
                let echo = gallery
                    .state
                    .borrow_mut()
                    .taps
                    .absorb_click(&slug, dom::now_ms());
                if !echo {
                    gallery.open(&slug);
                }
            },
        ));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "touchstart", move |event| {
            if let Some(gallery) = weak.upgrade() {
                gallery.touch_start(event);
            }
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "touchmove", move |event| {
            let Some(event) = event.dyn_ref::<TouchEvent>() else {
                return;
            };
            if let Some(gallery) = weak.upgrade() {
                gallery.touch_move(event);
            }
        }));

        // Not passive: a recognised tap cancels the synthetic click.
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &target,
            "touchend",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(gallery) = weak.upgrade() else {
                    return;
                };
                if gallery.touch_end() {
                    event.prevent_default();
                }
            },
        ));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "touchcancel", move |_| {
            if let Some(gallery) = weak.upgrade() {
                gallery.state.borrow_mut().taps.moved();
                gallery.touch_end();
            }
        }));

        if let Some(window) = web_sys::window() {
            let weak = Rc::downgrade(self);
            listeners.push(EventListener::new(&window, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let Some(gallery) = weak.upgrade() else {
                    return;
                };
                if event.repeat() || event.ctrl_key() || event.meta_key() || event.alt_key() {
                    return;
                }
                let typing = dom::closest(
                    event.target(),
                    "input, textarea, select, [contenteditable]",
                )
                .is_some();
                if !typing && event.key().eq_ignore_ascii_case("o") {
                    gallery.toggle_orientation();
                }
            }));
        }

        self.listeners.borrow_mut().extend(listeners);
    }

    fn sample_pointer(self: &Rc<Self>, x: f64, y: f64) {
        if !self.state.borrow_mut().throttle.offer(x, y) {
            return;
        }
        let weak = Rc::downgrade(self);
        frame::after_frames(1, move || {
            let Some(gallery) = weak.upgrade() else {
                return;
            };
            let sample = gallery.state.borrow_mut().throttle.take();
            if let Some((x, y)) = sample {
                gallery.point_at(x, y);
            }
        });
    }

    fn point_at(&self, client_x: f64, client_y: f64) {
        let rect = self.container.get_bounding_client_rect();
        let x = normalize(client_x, rect.left(), rect.width());
        let y = normalize(client_y, rect.top(), rect.height());
        self.state.borrow_mut().motion.set_target(x, y);
    }

    fn set_subtitle(&self, text: &str) {
        if let Some(subtitle) = &self.subtitle {
            subtitle.set_text_content(Some(text));
        }
    }

    fn title_of(&self, slug: &str) -> Option<String> {
        self.registry.get(slug).map(|p| p.title.clone())
    }

    fn hover_enter(&self, strip: &Element) {
        let Some(slug) = strip.get_attribute(attrs::PROJECT) else {
            return;
        };
        if self.state.borrow().label.hovered() == Some(slug.as_str()) {
            return;
        }
        let Some(title) = self.title_of(&slug) else {
            return;
        };
        let text = self.state.borrow_mut().label.enter(&slug, &title);
        self.set_subtitle(&text);
        self.play_note(&slug);
    }

    fn hover_leave(&self, strip: &Element) {
        let Some(slug) = strip.get_attribute(attrs::PROJECT) else {
            return;
        };
        let text = self.state.borrow_mut().label.leave(&slug);
        if let Some(text) = text {
            self.set_subtitle(&text);
        }
    }

    fn play_note(&self, slug: &str) {
        let Some(chime) = &self.chime else {
            return;
        };
        let (index, total) = {
            let state = self.state.borrow();
            (state.tiles.position(slug).unwrap_or(0), state.tiles.len())
        };
        if let Err(err) = chime.play(frequency_for(index, total)) {
            log::debug!("chime unavailable: {err}");
        }
    }

    fn strip_at(&self, client_x: f64, client_y: f64) -> Option<Element> {
        self.document
            .element_from_point(client_x as f32, client_y as f32)?
            .closest(&dom::class_selector(classes::STRIP))
            .ok()
            .flatten()
    }

    fn touch_start(&self, event: &web_sys::Event) {
        // A touch keeps targeting the element it began on.
        let slug = dom::closest(event.target(), &dom::class_selector(classes::STRIP))
            .and_then(|strip| strip.get_attribute(attrs::PROJECT));
        self.state.borrow_mut().taps.start(slug);
    }

    fn touch_move(&self, event: &TouchEvent) {
        self.state.borrow_mut().taps.moved();
        let Some(touch) = event.touches().get(0) else {
            return;
        };
        let (x, y) = (touch.client_x() as f64, touch.client_y() as f64);
        self.point_at(x, y);

        let slug = self
            .strip_at(x, y)
            .and_then(|strip| strip.get_attribute(attrs::PROJECT));
        let previous = self.state.borrow().touched.clone();
        if previous == slug {
            return;
        }
        if let Some(prev) = previous.as_deref().and_then(|s| self.tile_element(s)) {
            dom::set_class(&prev, classes::TOUCH_HOVER, false);
        }
        if let Some(strip) = slug.as_deref().and_then(|s| self.tile_element(s)) {
            dom::set_class(&strip, classes::TOUCH_HOVER, true);
        }
        let title = slug.as_deref().and_then(|s| self.title_of(s));
        let text = self
            .state
            .borrow_mut()
            .label
            .slide_to(slug.as_deref(), title.as_deref());
        if let Some(text) = text {
            self.set_subtitle(&text);
        }
        self.state.borrow_mut().touched = slug;
    }

    /// Returns true when the gesture was a tap that opened a project.
    fn touch_end(&self) -> bool {
        let (tapped, touched) = {
            let mut state = self.state.borrow_mut();
            (state.taps.end(dom::now_ms()), state.touched.take())
        };
        if let Some(strip) = touched.as_deref().and_then(|s| self.tile_element(s)) {
            dom::set_class(&strip, classes::TOUCH_HOVER, false);
        }
        self.reset_subtitle();

        match tapped {
            Some(slug) if self.registry.contains(&slug) => {
                self.open(&slug);
                true
            }
            _ => false,
        }
    }

    fn open(&self, slug: &str) {
        let on_open = self.on_open.borrow().clone();
        match on_open {
            Some(on_open) => on_open(slug),
            None => log::debug!("tile {slug} selected with no router attached"),
        }
    }

    /// Back to the page's own subtitle, forgetting any hovered tile.
    pub fn reset_subtitle(&self) {
        let text = self.state.borrow_mut().label.reset();
        self.set_subtitle(&text);
    }

    pub fn toggle_orientation(&self) -> Orientation {
        let next = self.state.borrow_mut().motion.toggle_orientation();
        apply_orientation(&self.container, next);
        next
    }

    /// Mark tiles per `filter`; an empty filter clears all markers.
    pub fn apply_filter(&self, filter: &TagFilter) -> FilterPass {
        let pass = {
            let mut state = self.state.borrow_mut();
            // Tiles shown again by a filter change must not replay their entrance.
            for tile in state.tiles.settle_pending() {
                dom::set_class(&tile.handle.strip, classes::INITIAL_LOAD, false);
                dom::set_class(&tile.handle.strip, classes::LOADED, true);
            }
            let pass = state.tiles.apply_filter(filter);
            for tile in state.tiles.iter() {
                let matched = tile.marker.is_match();
                dom::set_class(&tile.handle.strip, classes::FILTER_MATCH, matched);
            }
            state.motion.invalidate();
            pass
        };

        if let Some(body) = self.document.body() {
            dom::set_class(&body, classes::FILTER_ACTIVE, pass.active);
        }
        dom::set_class(&self.container, classes::FILTERED, pass.active);

        if pass.active {
            log::debug!(
                "filter [{}] matched {} tiles",
                filter.selected().collect::<Vec<_>>().join(", "),
                pass.matched
            );
        } else {
            log::debug!("filters cleared");
        }
        self.publish_visible_count();
        pass
    }

    /// Tiles actually rendered, by computed style.
    pub fn visible_count(&self) -> usize {
        let Some(window) = web_sys::window() else {
            return self.state.borrow().tiles.nominal_visible();
        };
        self.state
            .borrow()
            .tiles
            .iter()
            .filter(|tile| {
                let strip = &tile.handle.strip;
                let displayed = window
                    .get_computed_style(strip)
                    .ok()
                    .flatten()
                    .and_then(|style| style.get_property_value("display").ok())
                    .is_some_and(|display| display != "none");
                displayed && !strip.class_list().contains(classes::HIDDEN)
            })
            .count()
    }

    pub fn publish_visible_count(&self) -> usize {
        let count = self.visible_count();
        let value = count.to_string();
        let _ = self.container.set_attribute(attrs::VISIBLE_COUNT, &value);
        if let Some(root) = self
            .document
            .document_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            dom::set_style(&root, VISIBLE_COUNT_VAR, &value);
        }
        count
    }

    /// Lift a tile above the grid while its project loads.
    pub fn expand(&self, slug: &str) {
        if let Some(strip) = self.tile_element(slug) {
            dom::set_class(&strip, classes::EXPANDING, true);
        }
    }

    pub fn collapse(&self, slug: &str) {
        if let Some(strip) = self.tile_element(slug) {
            dom::set_class(&strip, classes::EXPANDING, false);
        }
    }

    /// Hide the tile of the open project; any previously hidden tile returns.
    pub fn hide_for_project(&self, slug: &str) {
        {
            let mut state = self.state.borrow_mut();
            for tile in state.tiles.hide_only(slug) {
                dom::set_class(&tile.handle.strip, classes::HIDDEN, tile.hidden);
            }
            for tile in state.tiles.iter() {
                dom::set_class(&tile.handle.strip, classes::EXPANDING, false);
            }
            state.motion.invalidate();
        }
        self.publish_visible_count();
    }

    pub fn reveal_all(&self) {
        {
            let mut state = self.state.borrow_mut();
            for tile in state.tiles.reveal_all() {
                dom::set_class(&tile.handle.strip, classes::HIDDEN, false);
            }
            state.motion.invalidate();
        }
        self.publish_visible_count();
    }
}

fn apply_orientation(container: &HtmlElement, orientation: Orientation) {
    for candidate in [Orientation::Vertical, Orientation::Horizontal] {
        dom::set_class(container, candidate.class_name(), candidate == orientation);
    }
}
