//! Tunable constants and the DOM contract shared by every controller.

/// Tag values the filter checkboxes may carry. Anything else is ignored.
pub const FILTER_CATEGORIES: [&str; 6] = [
    "light",
    "installation",
    "education",
    "av",
    "mixed reality",
    "stage",
];

/// Header subtitle shown when no tile is hovered and the page supplied none.
pub const DEFAULT_SUBTITLE: &str = "PROGRESS NOT PERFECTION";

/// Route prefix for project detail pages.
pub const WORK_SEGMENT: &str = "work";

#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    /// Fraction of the remaining distance the eased cursor covers per frame.
    pub ease_factor: f64,
    /// Consecutive still frames before the loop stops writing to the DOM.
    pub idle_threshold_frames: u32,
    /// Per-frame delta under which the cursor counts as still.
    pub idle_epsilon: f64,
    pub entrance_step_ms: u32,
    pub entrance_duration_ms: u32,
    /// Pointer travel (px) that turns a curtain press into a drag.
    pub drag_threshold_px: f64,
    pub curtain_snap_ms: u32,
    pub curtain_easing: &'static str,
    /// Openness ratio above which the gallery dims.
    pub curtain_dim_ratio: f64,
    /// How long an expanding tile stays on top before the detail view replaces it.
    pub expand_dwell_ms: u32,
    pub resize_debounce_ms: u32,
    pub image_load_margin: &'static str,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ease_factor: 0.18,
            idle_threshold_frames: 60,
            idle_epsilon: 0.0001,
            entrance_step_ms: 30,
            entrance_duration_ms: 150,
            drag_threshold_px: 5.0,
            curtain_snap_ms: 300,
            curtain_easing: "cubic-bezier(0.4, 0, 0.2, 1)",
            curtain_dim_ratio: 0.5,
            expand_dwell_ms: 500,
            resize_debounce_ms: 100,
            image_load_margin: "200px",
        }
    }
}

/// Element ids the server-rendered markup provides.
pub mod ids {
    pub const STRIPS: &str = "strips";
    pub const PROJECTS: &str = "projects";
    pub const HEADER: &str = "header";
    pub const ISLAND_HANDLE: &str = "island-handle";
    pub const ABOUT_CURTAIN: &str = "about-curtain";
    pub const FILTER_CONTAINER: &str = "filter-dropdown-container";
    pub const BACK_BUTTON: &str = "back-button";
    pub const NAV_PREV: &str = "project-nav-prev";
    pub const NAV_NEXT: &str = "project-nav-next";
}

pub mod classes {
    pub const STRIP: &str = "strip";
    pub const STRIP_IMAGE: &str = "strip-image";
    pub const HEADER_SUBTITLE: &str = "header-subtitle";
    pub const FILTER_MATCH: &str = "filter-match";
    pub const FILTER_ACTIVE: &str = "filter-active";
    pub const FILTERED: &str = "filtered";
    pub const INITIAL_LOAD: &str = "initial-load";
    pub const LOADED: &str = "loaded";
    pub const HIDDEN: &str = "hidden";
    pub const EXPANDING: &str = "expanding";
    pub const TOUCH_HOVER: &str = "touch-hover";
    pub const VISIBLE: &str = "visible";
    /// On `<html>` and `<body>` while a project is open; enables page scroll.
    pub const PROJECT_VISIBLE: &str = "project-visible";
    pub const DIMMED: &str = "dimmed";
    pub const FADE_OUT: &str = "fade-out";
    pub const DROPDOWN: &str = "filter-dropdown";
    pub const DROPDOWN_BUTTON: &str = "filter-dropdown-button";
    pub const DROPDOWN_CONTENT: &str = "filter-dropdown-content";
    pub const OPEN: &str = "open";
}

pub mod attrs {
    pub const PROJECT: &str = "data-project";
    pub const TAGS: &str = "data-tags";
    pub const BG_IMAGE: &str = "data-bg-image";
    pub const VISIBLE_COUNT: &str = "data-visible-count";
    pub const XYLOPHONE: &str = "data-xylophone";
    pub const NAV_TARGET: &str = "data-target-slug";
}

/// CSS custom property carrying the visible tile count.
pub const VISIBLE_COUNT_VAR: &str = "--visible-strip-count";

/// Globals injected by the static build before any script runs.
pub const PROJECTS_GLOBAL: &str = "__PROJECTS_DATA__";
pub const PATH_PREFIX_GLOBAL: &str = "__PATH_PREFIX__";
