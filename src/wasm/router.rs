use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, DomParser, Element, HtmlAnchorElement, HtmlButtonElement, MouseEvent, Response,
    SupportedType,
};

use super::dom;
use super::gallery::StripGallery;
use crate::config::{attrs, classes, ids, Tuning, DEFAULT_SUBTITLE};
use crate::error::{Error, Result};
use crate::registry::ProjectRegistry;
use crate::route::{BasePath, Dispatch, History, HistoryState, NavTicket, Route, Router};

/// `History` backed by `window.history`.
pub struct BrowserHistory {
    history: web_sys::History,
}

impl BrowserHistory {
    pub fn new() -> Result<Self> {
        Ok(Self {
            history: dom::window()?.history()?,
        })
    }
}

impl History for BrowserHistory {
    fn push(&mut self, state: &HistoryState, url: &str) -> Result<()> {
        let state = serde_wasm_bindgen::to_value(state)?;
        self.history.push_state_with_url(&state, "", Some(url))?;
        Ok(())
    }
}

/// Detail markup pulled out of a fetched project page.
pub struct Fragment {
    pub projects: Element,
    pub title: String,
}

/// Extract the `#projects` container from a full project page.
pub fn parse_fragment(html: &str) -> Result<Fragment> {
    let parsed = DomParser::new()?.parse_from_string(html, SupportedType::TextHtml)?;
    let projects = parsed
        .get_element_by_id(ids::PROJECTS)
        .ok_or_else(|| Error::MissingFragment(ids::PROJECTS.to_string()))?;
    Ok(Fragment {
        projects,
        title: parsed.title(),
    })
}

/// Fetch a project page and extract its `#projects` container.
pub async fn fetch_fragment(url: &str) -> Result<Fragment> {
    let window = dom::window()?;
    let response: Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(Error::FetchStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }
    let text = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();
    parse_fragment(&text)
}

pub type FragmentFuture = Pin<Box<dyn Future<Output = Result<Fragment>>>>;

/// Where project detail markup comes from.
pub trait FragmentSource {
    fn load(&self, url: &str) -> FragmentFuture;
}

/// Loads the statically rendered detail pages over HTTP.
pub struct HttpSource;

impl FragmentSource for HttpSource {
    fn load(&self, url: &str) -> FragmentFuture {
        let url = url.to_string();
        Box::pin(async move { fetch_fragment(&url).await })
    }
}

/// What started a navigation. Only tile opens play the expand choreography.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin {
    Tile,
    Direct,
}

pub struct SpaRouter {
    core: RefCell<Router<BrowserHistory>>,
    registry: Rc<ProjectRegistry>,
    document: Document,
    gallery: Option<Rc<StripGallery>>,
    source: Rc<dyn FragmentSource>,
    tuning: Tuning,
    pending: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl SpaRouter {
    pub fn mount(
        document: &Document,
        registry: Rc<ProjectRegistry>,
        gallery: Option<Rc<StripGallery>>,
        base: BasePath,
        tuning: Tuning,
    ) -> Result<Rc<Self>> {
        Self::mount_with_source(document, registry, gallery, base, tuning, Rc::new(HttpSource))
    }

    pub fn mount_with_source(
        document: &Document,
        registry: Rc<ProjectRegistry>,
        gallery: Option<Rc<StripGallery>>,
        base: BasePath,
        tuning: Tuning,
        source: Rc<dyn FragmentSource>,
    ) -> Result<Rc<Self>> {
        let location = dom::window()?.location().pathname()?;
        let core = Router::new(base, BrowserHistory::new()?, &location);
        log::debug!("router starts at {} ({location})", core.current());

        let router = Rc::new(Self {
            core: RefCell::new(core),
            registry,
            document: document.clone(),
            gallery,
            source,
            tuning,
            pending: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });

        // A server-rendered detail page already shows its content.
        let initial = router.core.borrow().current().clone();
        match initial {
            Route::Project(slug) if router.registry.contains(&slug) => {
                if let Some(gallery) = &router.gallery {
                    gallery.hide_for_project(&slug);
                }
                router.show_project_chrome(&slug);
            }
            Route::Project(slug) => log::warn!("loaded at unknown project `{slug}`"),
            Route::Home => {}
        }

        if let Some(gallery) = &router.gallery {
            let weak = Rc::downgrade(&router);
            gallery.set_on_open(move |slug| {
                if let Some(router) = weak.upgrade() {
                    let href = router.core.borrow().href(&Route::Project(slug.to_string()));
                    router.go(&href, Origin::Tile);
                }
            });
        }
        router.wire()?;
        Ok(router)
    }

    pub fn current(&self) -> Route {
        self.core.borrow().current().clone()
    }

    /// Navigate to a full path (mount prefix included or not).
    pub fn navigate(self: &Rc<Self>, path: &str) {
        self.go(path, Origin::Direct);
    }

    fn go(self: &Rc<Self>, path: &str, origin: Origin) {
        let dispatch = self.core.borrow_mut().navigate(path, &self.registry);
        self.run(dispatch, origin);
    }

    pub fn open(self: &Rc<Self>, slug: &str) {
        let href = self.core.borrow().href(&Route::Project(slug.to_string()));
        self.navigate(&href);
    }

    pub fn home(self: &Rc<Self>) {
        let href = self.core.borrow().href(&Route::Home);
        self.navigate(&href);
    }

    fn run(self: &Rc<Self>, dispatch: Result<Dispatch>, origin: Origin) {
        match dispatch {
            Ok(dispatch) => self.apply(dispatch, origin),
            Err(err) => log::warn!("navigation rejected: {err}"),
        }
    }

    fn wire(self: &Rc<Self>) -> Result<()> {
        let window = dom::window()?;
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        let win = window.clone();
        listeners.push(EventListener::new(&window, "popstate", move |_| {
            let Some(router) = weak.upgrade() else {
                return;
            };
            let Ok(location) = win.location().pathname() else {
                return;
            };
            let dispatch = router.core.borrow_mut().pop(&location, &router.registry);
            router.run(dispatch, Origin::Direct);
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &self.document,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(router) = weak.upgrade() else {
                    return;
                };
                // Tile clicks are handled by the gallery before they bubble here.
                if event.default_prevented() {
                    return;
                }
                if dom::closest(event.target(), &format!("#{}", ids::BACK_BUTTON)).is_some() {
                    event.prevent_default();
                    router.home();
                    return;
                }
                let nav_selector = format!("#{}, #{}", ids::NAV_PREV, ids::NAV_NEXT);
                if let Some(button) = dom::closest(event.target(), &nav_selector) {
                    event.prevent_default();
                    let target = button.get_attribute(attrs::NAV_TARGET);
                    if let Some(slug) = target.filter(|s| !s.is_empty()) {
                        router.open(&slug);
                    }
                    return;
                }
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                if let Some(path) = router.intercepted_path(mouse) {
                    event.prevent_default();
                    router.navigate(&path);
                }
            },
        ));

        self.listeners.borrow_mut().extend(listeners);
        Ok(())
    }

    /// Path of a same-origin link that maps onto a known route, if the click
    /// should be handled here instead of by the browser.
    fn intercepted_path(&self, event: &MouseEvent) -> Option<String> {
        let modified = event.ctrl_key() || event.meta_key() || event.shift_key() || event.alt_key();
        if event.button() != 0 || modified {
            return None;
        }
        let anchor = dom::closest(event.target(), "a[href]")?
            .dyn_into::<HtmlAnchorElement>()
            .ok()?;
        let target = anchor.target();
        if (!target.is_empty() && target != "_self") || anchor.has_attribute("download") {
            return None;
        }
        let own_origin = dom::window().ok()?.location().origin().ok()?;
        if anchor.origin() != own_origin {
            return None;
        }

        let path = anchor.pathname();
        let core = self.core.borrow();
        match Route::parse(&core.base().strip(&path))? {
            Route::Project(slug) if !self.registry.contains(&slug) => None,
            _ => Some(path),
        }
    }

    fn apply(self: &Rc<Self>, dispatch: Dispatch, origin: Origin) {
        // Any splice still waiting out its dwell belongs to an older request.
        self.pending.borrow_mut().take();
        log::debug!("route -> {} ({:?})", self.current(), dispatch.ticket());

        match dispatch {
            Dispatch::Home { .. } => self.show_home(),
            Dispatch::Project {
                slug,
                fetch_url,
                ticket,
            } => {
                let dwell_from = match (origin, &self.gallery) {
                    (Origin::Tile, Some(gallery)) => {
                        gallery.expand(&slug);
                        Some(dom::now_ms())
                    }
                    _ => None,
                };
                let load = self.source.load(&fetch_url);
                let router = Rc::clone(self);
                spawn_local(async move {
                    match load.await {
                        Ok(fragment) => router.settle(ticket, slug, fragment, dwell_from),
                        Err(err) => {
                            log::warn!("loading {fetch_url} failed: {err}");
                            if let Some(gallery) = &router.gallery {
                                gallery.collapse(&slug);
                            }
                        }
                    }
                });
            }
        }
    }

    /// Swap the content in, after the expanding tile's dwell when there is one.
    fn settle(
        self: &Rc<Self>,
        ticket: NavTicket,
        slug: String,
        fragment: Fragment,
        dwell_from: Option<f64>,
    ) {
        if !self.core.borrow().is_current(ticket) {
            self.report(&slug, Err(Error::Superseded));
            return;
        }
        let dwell = self.tuning.expand_dwell_ms as f64;
        let remaining = dwell_from.map_or(0.0, |started| dwell - (dom::now_ms() - started));
        if remaining <= 0.0 {
            let result = self.splice(ticket, &slug, &fragment);
            self.report(&slug, result);
            return;
        }

        let weak = Rc::downgrade(self);
        let timeout = Timeout::new(remaining.ceil() as u32, move || {
            if let Some(router) = weak.upgrade() {
                let result = router.splice(ticket, &slug, &fragment);
                router.report(&slug, result);
            }
        });
        *self.pending.borrow_mut() = Some(timeout);
    }

    fn report(&self, slug: &str, result: Result<()>) {
        let collapse = match result {
            Ok(()) => {
                log::debug!("project {slug} shown");
                false
            }
            Err(Error::Superseded) => {
                log::debug!("dropping stale content for {slug}");
                self.current().slug() != Some(slug)
            }
            Err(err) => {
                log::warn!("showing project {slug} failed: {err}");
                true
            }
        };
        if let Some(gallery) = self.gallery.as_ref().filter(|_| collapse) {
            gallery.collapse(slug);
        }
    }

    fn splice(&self, ticket: NavTicket, slug: &str, fragment: &Fragment) -> Result<()> {
        if !self.core.borrow().is_current(ticket) {
            return Err(Error::Superseded);
        }

        // Elements are looked up again; the page may have changed during the fetch.
        let projects = match self.document.get_element_by_id(ids::PROJECTS) {
            Some(projects) => {
                projects.set_inner_html(&fragment.projects.inner_html());
                projects
            }
            None => {
                let imported = self
                    .document
                    .import_node_with_deep(&fragment.projects, true)?
                    .dyn_into::<Element>()
                    .map_err(|_| Error::MissingFragment(ids::PROJECTS.to_string()))?;
                match self.document.get_element_by_id(ids::STRIPS) {
                    Some(strips) => {
                        let parent = strips.parent_node().ok_or_else(|| {
                            Error::MissingElement(format!("#{} parent", ids::STRIPS))
                        })?;
                        parent.insert_before(&imported, Some(&strips))?;
                    }
                    None => {
                        let body = self
                            .document
                            .body()
                            .ok_or_else(|| Error::MissingElement("body".into()))?;
                        body.append_child(&imported)?;
                    }
                }
                imported
            }
        };
        dom::set_class(&projects, classes::VISIBLE, true);
        if !fragment.title.is_empty() {
            self.document.set_title(&fragment.title);
        }

        if let Some(gallery) = &self.gallery {
            gallery.hide_for_project(slug);
        }
        self.show_project_chrome(slug);
        dom::scroll_to_top();
        Ok(())
    }

    fn show_home(&self) {
        if let Some(projects) = self.document.get_element_by_id(ids::PROJECTS) {
            dom::set_class(&projects, classes::VISIBLE, false);
            projects.set_inner_html("");
        }
        self.set_page_scroll(false);
        for id in [ids::NAV_PREV, ids::NAV_NEXT] {
            if let Some(button) = self.document.get_element_by_id(id) {
                dom::set_class(&button, classes::VISIBLE, false);
            }
        }
        match &self.gallery {
            Some(gallery) => {
                gallery.reset_subtitle();
                gallery.reveal_all();
            }
            None => self.set_subtitle(DEFAULT_SUBTITLE),
        }
        dom::scroll_to_top();
    }

    /// Header subtitle, page scroll and the prev/next buttons for an open project.
    fn show_project_chrome(&self, slug: &str) {
        self.set_page_scroll(true);
        if let Some(project) = self.registry.get(slug) {
            self.set_subtitle(&project.display_title());
        }

        let (prev, next) = self.registry.neighbors(slug);
        for (id, neighbor) in [(ids::NAV_PREV, prev), (ids::NAV_NEXT, next)] {
            let Some(button) = self.document.get_element_by_id(id) else {
                continue;
            };
            dom::set_class(&button, classes::VISIBLE, true);
            let target = neighbor.map(|p| p.slug.as_str()).unwrap_or_default();
            let _ = button.set_attribute(attrs::NAV_TARGET, target);
            if let Some(button) = button.dyn_ref::<HtmlButtonElement>() {
                button.set_disabled(neighbor.is_none());
            }
        }
    }

    fn set_page_scroll(&self, on: bool) {
        let roots = [
            self.document.document_element(),
            self.document.body().map(Element::from),
        ];
        for root in roots.into_iter().flatten() {
            dom::set_class(&root, classes::PROJECT_VISIBLE, on);
        }
    }

    fn set_subtitle(&self, text: &str) {
        let selector = dom::class_selector(classes::HEADER_SUBTITLE);
        if let Ok(Some(subtitle)) = self.document.query_selector(&selector) {
            subtitle.set_text_content(Some(text));
        }
    }

    pub fn stop(&self) {
        self.pending.borrow_mut().take();
        self.listeners.borrow_mut().clear();
    }
}
