//! Tile collection and the small gesture state machines of the strip gallery.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{Tuning, WORK_SEGMENT};
use crate::error::{Error, Result};
use crate::filter::{Marker, TagFilter};

/// One project tile. `H` is whatever handle the caller uses to reach the
/// rendered element; correlation is always by `slug`.
#[derive(Clone, Debug)]
pub struct Tile<H> {
    pub slug: String,
    pub tags: Vec<String>,
    pub handle: H,
    pub marker: Marker,
    /// Entrance animation finished.
    pub settled: bool,
    /// Hidden while its project view is open.
    pub hidden: bool,
    /// Background image attached.
    pub loaded: bool,
}

impl<H> Tile<H> {
    pub fn new(slug: impl Into<String>, tags: Vec<String>, handle: H) -> Self {
        Self {
            slug: slug.into(),
            tags,
            handle,
            marker: Marker::Neutral,
            settled: false,
            hidden: false,
            loaded: false,
        }
    }
}

/// Result of one filter recomputation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterPass {
    pub active: bool,
    pub matched: usize,
}

#[derive(Clone, Debug)]
pub struct TileSet<H> {
    tiles: Vec<Tile<H>>,
    index: HashMap<String, usize>,
}

impl<H> TileSet<H> {
    pub fn new(tiles: Vec<Tile<H>>) -> Result<Self> {
        let mut set = Self {
            tiles,
            index: HashMap::new(),
        };
        set.reindex()?;
        Ok(set)
    }

    fn reindex(&mut self) -> Result<()> {
        self.index.clear();
        for (i, tile) in self.tiles.iter().enumerate() {
            if self.index.insert(tile.slug.clone(), i).is_some() {
                return Err(Error::DuplicateSlug(tile.slug.clone()));
            }
        }
        Ok(())
    }

    /// Fisher-Yates shuffle of the display order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tiles.shuffle(rng);
        for (i, tile) in self.tiles.iter().enumerate() {
            self.index.insert(tile.slug.clone(), i);
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile<H>> {
        self.tiles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile<H>> {
        self.tiles.iter_mut()
    }

    pub fn get(&self, slug: &str) -> Option<&Tile<H>> {
        self.index.get(slug).map(|&i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, slug: &str) -> Option<&mut Tile<H>> {
        self.index.get(slug).map(|&i| &mut self.tiles[i])
    }

    /// Display position after shuffling.
    pub fn position(&self, slug: &str) -> Option<usize> {
        self.index.get(slug).copied()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.tiles.iter().map(|t| t.slug.as_str())
    }

    pub fn apply_filter(&mut self, filter: &TagFilter) -> FilterPass {
        let mut matched = 0;
        for tile in &mut self.tiles {
            tile.marker = filter.marker_for(&tile.tags);
            if tile.marker.is_match() {
                matched += 1;
            }
        }
        FilterPass {
            active: !filter.is_empty(),
            matched,
        }
    }

    /// Hide exactly `slug`, revealing any other tile hidden earlier.
    /// Returns the tiles whose `hidden` flag changed.
    pub fn hide_only(&mut self, slug: &str) -> Vec<&Tile<H>> {
        self.set_hidden_where(|tile| tile.slug == slug)
    }

    pub fn reveal_all(&mut self) -> Vec<&Tile<H>> {
        self.set_hidden_where(|_| false)
    }

    fn set_hidden_where(&mut self, hide: impl Fn(&Tile<H>) -> bool) -> Vec<&Tile<H>> {
        let mut changed = Vec::new();
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            let next = hide(&*tile);
            if tile.hidden != next {
                tile.hidden = next;
                changed.push(i);
            }
        }
        changed.into_iter().map(|i| &self.tiles[i]).collect()
    }

    /// Mark every tile whose entrance is still running as settled. Returns
    /// the tiles that changed.
    pub fn settle_pending(&mut self) -> Vec<&Tile<H>> {
        let mut changed = Vec::new();
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            if !tile.settled {
                tile.settled = true;
                changed.push(i);
            }
        }
        changed.into_iter().map(|i| &self.tiles[i]).collect()
    }

    /// Tiles neither hidden for an open project nor filtered out.
    pub fn nominal_visible(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| !t.hidden && t.marker != Marker::Unmatched)
            .count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entrance {
    pub delay_ms: u32,
    /// When to mark the tile settled, measured from scheduling.
    pub settle_after_ms: u32,
}

pub fn entrance(index: usize, tuning: &Tuning) -> Entrance {
    let delay_ms = tuning.entrance_step_ms.saturating_mul(index as u32);
    Entrance {
        delay_ms,
        settle_after_ms: tuning.entrance_duration_ms.saturating_add(delay_ms),
    }
}

/// Route path (without mount prefix) of a project detail view.
pub fn project_route(slug: &str) -> String {
    format!("/{WORK_SEGMENT}/{slug}/")
}

/// Keeps only the latest pointer sample until the next frame drains it.
#[derive(Clone, Debug, Default)]
pub struct FrameThrottle {
    pending: Option<(f64, f64)>,
}

impl FrameThrottle {
    /// Store a sample. Returns true when a frame callback must be scheduled.
    pub fn offer(&mut self, x: f64, y: f64) -> bool {
        self.pending.replace((x, y)).is_none()
    }

    pub fn take(&mut self) -> Option<(f64, f64)> {
        self.pending.take()
    }
}

/// How long after a tap the browser's compatibility click is swallowed.
pub const GHOST_CLICK_MS: f64 = 700.0;

/// Distinguishes a tap on a tile from a slide across the gallery, and
/// remembers the last tap so the click synthesized after it opens nothing.
#[derive(Clone, Debug, Default)]
pub struct TapTracker {
    start: Option<String>,
    moved: bool,
    last_tap: Option<(String, f64)>,
}

impl TapTracker {
    pub fn start(&mut self, slug: Option<String>) {
        self.start = slug;
        self.moved = false;
    }

    pub fn moved(&mut self) {
        self.moved = true;
    }

    /// Slug to open, if the gesture was a tap on a tile.
    pub fn end(&mut self, now_ms: f64) -> Option<String> {
        let slug = self.start.take();
        let moved = std::mem::take(&mut self.moved);
        if moved {
            return None;
        }
        if let Some(slug) = &slug {
            self.last_tap = Some((slug.clone(), now_ms));
        }
        slug
    }

    /// True when a click on `slug` is the echo of the tap just handled.
    pub fn absorb_click(&mut self, slug: &str, now_ms: f64) -> bool {
        match self.last_tap.take() {
            Some((tapped, at)) => tapped == slug && now_ms - at < GHOST_CLICK_MS,
            None => false,
        }
    }
}

/// Header subtitle text driven by tile hover.
#[derive(Clone, Debug)]
pub struct HoverLabel {
    default: String,
    hovered: Option<String>,
}

impl HoverLabel {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            hovered: None,
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn enter(&mut self, slug: &str, title: &str) -> String {
        self.hovered = Some(slug.to_string());
        title.to_uppercase()
    }

    /// Text to show after leaving `slug`, or `None` when another tile has
    /// already been entered since.
    pub fn leave(&mut self, slug: &str) -> Option<String> {
        match self.hovered.as_deref() {
            Some(current) if current != slug => None,
            _ => {
                self.hovered = None;
                Some(self.default.clone())
            }
        }
    }

    pub fn reset(&mut self) -> String {
        self.hovered = None;
        self.default.clone()
    }

    /// A finger sliding onto `slug` (titled `title`) or off every tile.
    /// Tiles without a known title leave the label alone.
    pub fn slide_to(&mut self, slug: Option<&str>, title: Option<&str>) -> Option<String> {
        match (slug, title) {
            (Some(slug), Some(title)) => Some(self.enter(slug, title)),
            (Some(_), None) => None,
            (None, _) => Some(self.reset()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_tag_list;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiles() -> TileSet<()> {
        TileSet::new(vec![
            Tile::new("a", parse_tag_list("installation,light"), ()),
            Tile::new("b", parse_tag_list("stage"), ()),
            Tile::new("c", parse_tag_list("Installation"), ()),
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_tiles_rejected() {
        let result = TileSet::new(vec![
            Tile::new("a", vec![], ()),
            Tile::new("a", vec![], ()),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn shuffle_keeps_index_consistent() {
        let mut set = tiles();
        set.shuffle(&mut StdRng::seed_from_u64(7));
        for (i, slug) in set.slugs().enumerate() {
            assert_eq!(set.position(slug), Some(i));
            assert_eq!(set.get(slug).map(|t| t.slug.as_str()), Some(slug));
        }
    }

    #[test]
    fn hide_only_swaps_hidden_tile() {
        let mut set = tiles();
        assert_eq!(set.hide_only("a").len(), 1);
        let changed: Vec<_> = set.hide_only("b").iter().map(|t| t.slug.clone()).collect();
        assert_eq!(changed, vec!["a", "b"]);
        assert_eq!(set.reveal_all().len(), 1);
        assert!(set.iter().all(|t| !t.hidden));
    }

    #[test]
    fn entrance_staggers_by_index() {
        let tuning = Tuning::default();
        assert_eq!(
            entrance(0, &tuning),
            Entrance {
                delay_ms: 0,
                settle_after_ms: 150
            }
        );
        assert_eq!(
            entrance(4, &tuning),
            Entrance {
                delay_ms: 120,
                settle_after_ms: 270
            }
        );
    }

    #[test]
    fn throttle_keeps_latest_sample() {
        let mut throttle = FrameThrottle::default();
        assert!(throttle.offer(1.0, 1.0));
        assert!(!throttle.offer(2.0, 2.0));
        assert!(!throttle.offer(3.0, 4.0));
        assert_eq!(throttle.take(), Some((3.0, 4.0)));
        assert_eq!(throttle.take(), None);
        assert!(throttle.offer(5.0, 5.0));
    }

    #[test]
    fn stale_leave_is_ignored() {
        let mut label = HoverLabel::new("DEFAULT");
        assert_eq!(label.enter("a", "Alpha"), "ALPHA");
        assert_eq!(label.enter("b", "Beta"), "BETA");
        assert_eq!(label.leave("a"), None);
        assert_eq!(label.leave("b").as_deref(), Some("DEFAULT"));
    }

    #[test]
    fn sliding_over_unknown_tile_keeps_label() {
        let mut label = HoverLabel::new("DEFAULT");
        assert_eq!(label.slide_to(Some("a"), Some("Alpha")).as_deref(), Some("ALPHA"));
        assert_eq!(label.slide_to(Some("stray"), None), None);
        assert_eq!(label.hovered(), Some("a"));
        assert_eq!(label.slide_to(None, None).as_deref(), Some("DEFAULT"));
        assert_eq!(label.hovered(), None);
    }

    #[test]
    fn click_after_tap_is_absorbed_once() {
        let mut taps = TapTracker::default();
        taps.start(Some("a".into()));
        assert_eq!(taps.end(1_000.0).as_deref(), Some("a"));
        assert!(taps.absorb_click("a", 1_050.0));
        // Only the first click after the tap is an echo.
        assert!(!taps.absorb_click("a", 1_060.0));

        taps.start(Some("b".into()));
        assert_eq!(taps.end(2_000.0).as_deref(), Some("b"));
        assert!(!taps.absorb_click("b", 2_000.0 + GHOST_CLICK_MS));

        taps.start(Some("c".into()));
        taps.end(3_000.0);
        assert!(!taps.absorb_click("a", 3_010.0));
    }

    #[test]
    fn slide_leaves_no_tap_to_absorb() {
        let mut taps = TapTracker::default();
        taps.start(Some("a".into()));
        taps.moved();
        assert_eq!(taps.end(0.0), None);
        assert!(!taps.absorb_click("a", 10.0));
    }

    #[test]
    fn settle_pending_marks_each_tile_once() {
        let mut set = tiles();
        if let Some(tile) = set.get_mut("b") {
            tile.settled = true;
        }
        let settled: Vec<_> = set.settle_pending().iter().map(|t| t.slug.clone()).collect();
        assert_eq!(settled, vec!["a", "c"]);
        assert!(set.settle_pending().is_empty());
    }

    #[test]
    fn project_route_shape() {
        assert_eq!(project_route("crack"), "/work/crack/");
    }
}
