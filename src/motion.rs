//! Cursor easing and the per-frame background-position computation.

use crate::config::Tuning;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Orientation::Vertical => "vertical",
            Orientation::Horizontal => "horizontal",
        }
    }
}

/// Point in normalised `[0,1] x [0,1]` container space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const CENTER: Point = Point { x: 0.5, y: 0.5 };

    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.5
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Map a client coordinate into `[0,1]` relative to a container edge.
/// A collapsed container (extent < 1) is treated as 1px wide.
pub fn normalize(client: f64, origin: f64, extent: f64) -> f64 {
    clamp_unit((client - origin) / extent.max(1.0))
}

fn percent(v: f64) -> String {
    format!("{:.1}", v * 100.0)
}

#[derive(Clone, Debug)]
pub struct MotionState {
    target: Point,
    current: Point,
    orientation: Orientation,
    ease: f64,
    epsilon: f64,
    idle_threshold: u32,
    idle_frames: u32,
    animating: bool,
    last_x: Option<String>,
    last_y: Option<String>,
}

impl MotionState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            target: Point::CENTER,
            current: Point::CENTER,
            orientation: Orientation::default(),
            ease: tuning.ease_factor,
            epsilon: tuning.idle_epsilon,
            idle_threshold: tuning.idle_threshold_frames,
            idle_frames: 0,
            animating: true,
            last_x: None,
            last_y: None,
        }
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn current(&self) -> Point {
        self.current
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// True once the loop has stopped writing because the cursor is still.
    pub fn is_idle(&self) -> bool {
        !self.animating
    }

    /// New pointer sample. Wakes the loop.
    pub fn set_target(&mut self, x: f64, y: f64) {
        self.target = Point::clamped(x, y);
        self.wake();
    }

    /// Returns false when `next` is already active.
    pub fn set_orientation(&mut self, next: Orientation) -> bool {
        if next == self.orientation {
            return false;
        }
        self.orientation = next;
        self.target = Point::CENTER;
        self.current = Point::CENTER;
        self.invalidate();
        true
    }

    pub fn toggle_orientation(&mut self) -> Orientation {
        self.set_orientation(self.orientation.toggled());
        self.orientation
    }

    /// Forget what was last written so the next frame re-applies it.
    pub fn invalidate(&mut self) {
        self.last_x = None;
        self.last_y = None;
        self.wake();
    }

    fn wake(&mut self) {
        self.animating = true;
        self.idle_frames = 0;
    }

    /// Advance one frame. Returns the `background-position` every loaded tile
    /// should receive, or `None` when nothing needs writing.
    pub fn tick(&mut self) -> Option<String> {
        let prev = self.current;
        self.current = Point::clamped(
            prev.x + (self.target.x - prev.x) * self.ease,
            prev.y + (self.target.y - prev.y) * self.ease,
        );

        let moved = (self.current.x - prev.x).abs() > self.epsilon
            || (self.current.y - prev.y).abs() > self.epsilon;

        if moved {
            self.idle_frames = 0;
            self.animating = true;
        } else {
            self.idle_frames = self.idle_frames.saturating_add(1);
            if self.idle_frames > self.idle_threshold {
                self.animating = false;
            }
        }

        if !self.animating {
            return None;
        }

        match self.orientation {
            Orientation::Vertical => {
                let x = percent(self.current.x);
                if self.last_x.as_deref() == Some(x.as_str()) {
                    return None;
                }
                let value = format!("{x}% 50%");
                self.last_x = Some(x);
                Some(value)
            }
            Orientation::Horizontal => {
                let y = percent(self.current.y);
                if self.last_y.as_deref() == Some(y.as_str()) {
                    return None;
                }
                let value = format!("50% {y}%");
                self.last_y = Some(y);
                Some(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> MotionState {
        MotionState::new(&Tuning::default())
    }

    #[test]
    fn first_frame_writes_center() {
        let mut motion = state();
        assert_eq!(motion.tick().as_deref(), Some("50.0% 50%"));
        assert_eq!(motion.tick(), None);
    }

    #[test]
    fn eases_toward_target() {
        let mut motion = state();
        motion.set_target(1.0, 0.0);
        motion.tick();
        let p = motion.current();
        assert!((p.x - (0.5 + 0.5 * 0.18)).abs() < 1e-12);
        assert!((p.y - (0.5 - 0.5 * 0.18)).abs() < 1e-12);
    }

    #[test]
    fn targets_are_clamped() {
        let mut motion = state();
        motion.set_target(4.0, -3.0);
        assert_eq!(motion.target(), Point { x: 1.0, y: 0.0 });
    }

    #[test]
    fn horizontal_writes_y_axis() {
        let mut motion = state();
        assert_eq!(motion.toggle_orientation(), Orientation::Horizontal);
        motion.set_target(0.0, 1.0);
        let value = motion.tick().unwrap();
        assert!(value.starts_with("50% "));
        assert!(value.ends_with('%'));
    }

    #[test]
    fn orientation_switch_recentres() {
        let mut motion = state();
        motion.set_target(0.9, 0.1);
        for _ in 0..10 {
            motion.tick();
        }
        motion.set_orientation(Orientation::Horizontal);
        assert_eq!(motion.current(), Point::CENTER);
        assert_eq!(motion.target(), Point::CENTER);
        assert!(!motion.set_orientation(Orientation::Horizontal));
    }

    #[test]
    fn invalidate_forces_rewrite() {
        let mut motion = state();
        motion.tick();
        assert_eq!(motion.tick(), None);
        motion.invalidate();
        assert_eq!(motion.tick().as_deref(), Some("50.0% 50%"));
    }

    #[test]
    fn normalize_floors_collapsed_extent() {
        assert_eq!(normalize(10.0, 0.0, 0.0), 1.0);
        assert_eq!(normalize(-5.0, 0.0, 100.0), 0.0);
        assert!((normalize(25.0, 0.0, 100.0) - 0.25).abs() < 1e-12);
    }
}
