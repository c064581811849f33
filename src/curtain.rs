//! Drag-to-reveal panel above the header.
//!
//! Position runs from 0 (closed) to the measured content height (open). The
//! header is translated by `position - max_extent`, so a closed curtain sits
//! fully above the viewport.

use crate::config::Tuning;

/// How the header should move to its new offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    /// Follow immediately, transitions off.
    Immediate,
    /// Eased snap over `duration_ms`.
    Snap { duration_ms: u32 },
}

/// What released the pointer turned out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// No real drag happened; the curtain toggled.
    Snapped,
    /// Left exactly where the pointer let go.
    Held,
}

#[derive(Clone, Copy, Debug)]
struct Drag {
    origin_y: f64,
    start: f64,
    moved: bool,
}

#[derive(Clone, Debug)]
pub struct Curtain {
    position: f64,
    max_extent: f64,
    drag: Option<Drag>,
    threshold: f64,
    snap_ms: u32,
    dim_ratio: f64,
}

impl Curtain {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            position: 0.0,
            max_extent: 0.0,
            drag: None,
            threshold: tuning.drag_threshold_px,
            snap_ms: tuning.curtain_snap_ms,
            dim_ratio: tuning.curtain_dim_ratio,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn max_extent(&self) -> f64 {
        self.max_extent
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Header translation in px.
    pub fn offset(&self) -> f64 {
        self.position - self.max_extent
    }

    pub fn openness(&self) -> f64 {
        if self.max_extent > 0.0 {
            self.position / self.max_extent
        } else {
            0.0
        }
    }

    pub fn is_dimmed(&self) -> bool {
        self.openness() > self.dim_ratio
    }

    /// New content height. Keeps the relative openness.
    pub fn measure(&mut self, height: f64) {
        let height = height.max(0.0);
        let ratio = self.openness();
        self.max_extent = height;
        self.position = (ratio * height).clamp(0.0, height);
    }

    pub fn begin_drag(&mut self, pointer_y: f64) {
        self.drag = Some(Drag {
            origin_y: pointer_y - self.position,
            start: self.position,
            moved: false,
        });
    }

    /// Returns false when no drag is in progress.
    pub fn drag_to(&mut self, pointer_y: f64) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let proposed = pointer_y - drag.origin_y;
        if (proposed - self.position).abs() > self.threshold {
            drag.moved = true;
        }
        self.position = proposed.clamp(0.0, self.max_extent);
        true
    }

    /// Finish a press. `None` when no drag was in progress.
    pub fn end_drag(&mut self) -> Option<(Release, Motion)> {
        let drag = self.drag.take()?;
        if drag.moved {
            Some((Release::Held, Motion::Immediate))
        } else {
            // Direction depends on where the press started.
            self.position = drag.start;
            Some((Release::Snapped, self.toggle()))
        }
    }

    /// Snap fully open or fully closed.
    fn toggle(&mut self) -> Motion {
        self.position = if self.position > 0.0 {
            0.0
        } else {
            self.max_extent
        };
        Motion::Snap {
            duration_ms: self.snap_ms,
        }
    }
}
