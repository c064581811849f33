use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::JsValue;
use web_sys::Window;

use super::curtain::CurtainController;
use super::dom;
use super::filters::FilterPanel;
use super::gallery::StripGallery;
use super::router::SpaRouter;
use crate::config::{ids, Tuning, PATH_PREFIX_GLOBAL, PROJECTS_GLOBAL};
use crate::error::Result;
use crate::registry::{Project, ProjectRegistry};
use crate::route::BasePath;

fn global(window: &Window, name: &str) -> Option<JsValue> {
    Reflect::get(window, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

/// Registry from the injected snapshot. A missing or malformed snapshot
/// yields an empty registry so the gallery still animates.
fn load_registry(window: &Window) -> ProjectRegistry {
    let Some(raw) = global(window, PROJECTS_GLOBAL) else {
        log::info!("{PROJECTS_GLOBAL} not set; starting with no projects");
        return ProjectRegistry::default();
    };
    let projects: Vec<Project> = match serde_wasm_bindgen::from_value(raw) {
        Ok(projects) => projects,
        Err(err) => {
            log::warn!("ignoring {PROJECTS_GLOBAL}: {err}");
            return ProjectRegistry::default();
        }
    };
    match ProjectRegistry::new(projects) {
        Ok(registry) => registry,
        Err(err) => {
            log::warn!("ignoring {PROJECTS_GLOBAL}: {err}");
            ProjectRegistry::default()
        }
    }
}

fn load_base(window: &Window) -> BasePath {
    global(window, PATH_PREFIX_GLOBAL)
        .and_then(|value| value.as_string())
        .map(|raw| BasePath::new(&raw))
        .unwrap_or_default()
}

/// Every controller attached to the current document.
pub struct Page {
    gallery: Rc<StripGallery>,
    router: Rc<SpaRouter>,
    _filters: FilterPanel,
    _curtain: Option<CurtainController>,
}

impl Page {
    /// Returns `None` on pages without a strip gallery.
    pub fn mount() -> Result<Option<Page>> {
        let window = dom::window()?;
        let document = dom::document()?;
        if document.get_element_by_id(ids::STRIPS).is_none() {
            return Ok(None);
        }

        let tuning = Tuning::default();
        let registry = Rc::new(load_registry(&window));
        let base = load_base(&window);
        log::info!(
            "{} projects registered, base path `{}`",
            registry.len(),
            base.as_str()
        );

        let gallery = StripGallery::mount(&document, Rc::clone(&registry), tuning.clone())?;
        let filters = FilterPanel::mount(&document, Rc::downgrade(&gallery));
        let router = SpaRouter::mount(
            &document,
            registry,
            Some(Rc::clone(&gallery)),
            base,
            tuning.clone(),
        )?;

        let curtain = match CurtainController::mount(&document, &tuning) {
            Ok(curtain) => Some(curtain),
            Err(err) => {
                log::debug!("about curtain disabled: {err}");
                None
            }
        };

        Ok(Some(Page {
            gallery,
            router,
            _filters: filters,
            _curtain: curtain,
        }))
    }

    pub fn unmount(self) {
        self.router.stop();
        self.gallery.stop();
        log::debug!("page runtime unmounted");
    }
}
