use ratatui::layout::Rect;

use crate::config::LayoutConfig;

/// Mouse presses within this many columns of a divider grab it
const BORDER_HIT_TOLERANCE: u16 = 1;

/// Pane widths in percent of the container. Always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneWidths {
    pub left: f64,
    pub center: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitBounds {
    pub min_left: f64,
    pub max_left: f64,
    pub min_center: f64,
    pub max_center: f64,
}

/// The two draggable dividers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Between the file tree and the viewer
    Left,
    /// Between the viewer and the chat panel
    Right,
}

/// Three-pane horizontal split with at most one divider being dragged.
///
/// Dragging the left divider clamps to its bounds; dragging the right one
/// discards any frame that would push the center pane out of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitLayout {
    widths: PaneWidths,
    bounds: SplitBounds,
    active: Option<Boundary>,
}

impl Default for SplitBounds {
    fn default() -> Self {
        Self {
            min_left: 15.0,
            max_left: 35.0,
            min_center: 30.0,
            max_center: 60.0,
        }
    }
}

impl Default for SplitLayout {
    fn default() -> Self {
        Self::new(15.0, 50.0, SplitBounds::default())
    }
}

impl SplitBounds {
    /// Every bound inside [0, 100], each min <= its max. Non-finite values
    /// fall back to the defaults.
    pub fn normalized(self) -> Self {
        let d = SplitBounds::default();
        let (min_left, max_left) =
            ordered(pct_or(self.min_left, d.min_left), pct_or(self.max_left, d.max_left));
        let (min_center, max_center) = ordered(
            pct_or(self.min_center, d.min_center),
            pct_or(self.max_center, d.max_center),
        );
        Self {
            min_left,
            max_left,
            min_center,
            max_center,
        }
    }
}

fn pct_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        fallback
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl SplitLayout {
    /// Right pane takes the remainder
    pub fn new(left: f64, center: f64, bounds: SplitBounds) -> Self {
        Self {
            widths: PaneWidths {
                left,
                center,
                right: 100.0 - left - center,
            },
            bounds: bounds.normalized(),
            active: None,
        }
    }

    pub fn from_config(cfg: &LayoutConfig) -> Self {
        let bounds = SplitBounds {
            min_left: cfg.min_left,
            max_left: cfg.max_left,
            min_center: cfg.min_center,
            max_center: cfg.max_center,
        }
        .normalized();
        let left = pct_or(cfg.left, 15.0).clamp(bounds.min_left, bounds.max_left);
        let center = pct_or(cfg.center, 50.0).clamp(0.0, 100.0 - left);
        Self::new(left, center, bounds)
    }

    pub fn widths(&self) -> PaneWidths {
        self.widths
    }

    pub fn active(&self) -> Option<Boundary> {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    // ── Drag session ──

    /// No-op while another drag is in progress
    pub fn begin_drag(&mut self, boundary: Boundary) {
        if self.active.is_none() {
            self.active = Some(boundary);
        }
    }

    /// Ends any drag, wherever the button was released
    pub fn end_drag(&mut self) {
        self.active = None;
    }

    /// Pointer at column `x` inside `area`
    pub fn pointer_move(&mut self, area: Rect, x: u16) {
        if area.width == 0 {
            return;
        }
        let offset = f64::from(x.saturating_sub(area.x));
        self.pointer_move_pct(offset / f64::from(area.width) * 100.0);
    }

    /// Pointer at `pct` percent of the container width
    pub fn pointer_move_pct(&mut self, pct: f64) {
        let b = self.bounds;
        match self.active {
            Some(Boundary::Left) => {
                let left = pct.clamp(b.min_left, b.max_left);
                let right = self.widths.right;
                self.widths = PaneWidths {
                    left,
                    center: 100.0 - left - right,
                    right,
                };
            }
            Some(Boundary::Right) => {
                let right = 100.0 - pct;
                let center = 100.0 - self.widths.left - right;
                if (b.min_center..=b.max_center).contains(&center) {
                    self.widths.center = center;
                    self.widths.right = right;
                }
            }
            None => {}
        }
    }

    // ── Geometry ──

    /// Divider columns relative to `area.x`, rounded cumulatively
    fn divider_offsets(&self, width: u16) -> (u16, u16) {
        let w = f64::from(width);
        let to_col = |pct: f64| (w * pct / 100.0).round().clamp(0.0, w) as u16;
        let first = to_col(self.widths.left);
        let second = to_col(self.widths.left + self.widths.center).max(first);
        (first, second)
    }

    /// Left, center and right rects tiling `area` exactly
    pub fn split(&self, area: Rect) -> [Rect; 3] {
        let (first, second) = self.divider_offsets(area.width);
        [
            Rect::new(area.x, area.y, first, area.height),
            Rect::new(area.x + first, area.y, second - first, area.height),
            Rect::new(area.x + second, area.y, area.width - second, area.height),
        ]
    }

    /// The divider under a mouse press, if any
    pub fn hit_test(&self, area: Rect, x: u16, y: u16) -> Option<Boundary> {
        if y < area.y || y >= area.y + area.height {
            return None;
        }
        let (first, second) = self.divider_offsets(area.width);
        let left_border = area.x + first;
        let right_border = area.x + second;
        let left_dist = x.abs_diff(left_border);
        let right_dist = x.abs_diff(right_border);
        match (left_dist <= BORDER_HIT_TOLERANCE, right_dist <= BORDER_HIT_TOLERANCE) {
            (true, true) if right_dist < left_dist => Some(Boundary::Right),
            (true, _) => Some(Boundary::Left),
            (false, true) => Some(Boundary::Right),
            (false, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn sum(w: PaneWidths) -> f64 {
        w.left + w.center + w.right
    }

    #[test]
    fn defaults() {
        let s = SplitLayout::default();
        assert_eq!(
            s.widths(),
            PaneWidths {
                left: 15.0,
                center: 50.0,
                right: 35.0
            }
        );
        assert!(!s.is_dragging());
    }

    #[test]
    fn left_drag_clamps() {
        let mut s = SplitLayout::default();
        s.begin_drag(Boundary::Left);
        s.pointer_move_pct(50.0);
        assert_eq!(s.widths().left, 35.0);
        assert_eq!(s.widths().right, 35.0);
        assert!((s.widths().center - 30.0).abs() < EPS);

        s.pointer_move_pct(2.0);
        assert_eq!(s.widths().left, 15.0);
        assert!((s.widths().center - 50.0).abs() < EPS);
    }

    #[test]
    fn right_drag_commits_in_bounds() {
        let mut s = SplitLayout::default();
        s.begin_drag(Boundary::Right);
        s.pointer_move_pct(70.0);
        let w = s.widths();
        assert!((w.right - 30.0).abs() < EPS);
        assert!((w.center - 55.0).abs() < EPS);
    }

    #[test]
    fn right_drag_rejects_out_of_bounds_frame() {
        let mut s = SplitLayout::default();
        s.begin_drag(Boundary::Right);
        // center would be 80
        s.pointer_move_pct(95.0);
        assert_eq!(s.widths(), SplitLayout::default().widths());
        // center would be 10
        s.pointer_move_pct(25.0);
        assert_eq!(s.widths(), SplitLayout::default().widths());
    }

    #[test]
    fn moves_without_drag_are_ignored() {
        let mut s = SplitLayout::default();
        s.pointer_move_pct(30.0);
        assert_eq!(s, SplitLayout::default());
    }

    #[test]
    fn second_begin_is_ignored_and_end_clears() {
        let mut s = SplitLayout::default();
        s.begin_drag(Boundary::Left);
        s.begin_drag(Boundary::Right);
        assert_eq!(s.active(), Some(Boundary::Left));
        s.end_drag();
        assert_eq!(s.active(), None);
        s.end_drag();
        assert_eq!(s.active(), None);
    }

    #[test]
    fn pointer_move_uses_area_offset() {
        let mut s = SplitLayout::default();
        s.begin_drag(Boundary::Left);
        s.pointer_move(Rect::new(10, 0, 100, 20), 35);
        assert!((s.widths().left - 25.0).abs() < EPS);
    }

    #[test]
    fn zero_width_area_is_ignored() {
        let mut s = SplitLayout::default();
        s.begin_drag(Boundary::Left);
        s.pointer_move(Rect::new(0, 0, 0, 0), 5);
        assert_eq!(s.widths(), SplitLayout::default().widths());
    }

    #[test]
    fn split_tiles_area() {
        let s = SplitLayout::default();
        let area = Rect::new(3, 1, 101, 30);
        let [l, c, r] = s.split(area);
        assert_eq!(l.x, 3);
        assert_eq!(l.width + c.width + r.width, 101);
        assert_eq!(c.x, l.x + l.width);
        assert_eq!(r.x, c.x + c.width);
        assert_eq!(r.x + r.width, area.x + area.width);
        assert_eq!(l.width, 15);
    }

    #[test]
    fn hit_test_finds_dividers() {
        let s = SplitLayout::default();
        let area = Rect::new(0, 1, 100, 20);
        assert_eq!(s.hit_test(area, 15, 5), Some(Boundary::Left));
        assert_eq!(s.hit_test(area, 14, 5), Some(Boundary::Left));
        assert_eq!(s.hit_test(area, 65, 5), Some(Boundary::Right));
        assert_eq!(s.hit_test(area, 66, 5), Some(Boundary::Right));
        assert_eq!(s.hit_test(area, 40, 5), None);
        // outside the rows
        assert_eq!(s.hit_test(area, 15, 0), None);
    }

    #[test]
    fn from_config_clamps_initial_left() {
        let cfg = LayoutConfig {
            left: 80.0,
            ..LayoutConfig::default()
        };
        let s = SplitLayout::from_config(&cfg);
        assert_eq!(s.widths().left, 35.0);
        assert!((sum(s.widths()) - 100.0).abs() < EPS);
    }

    #[test]
    fn inverted_config_bounds_are_swapped() {
        let cfg = LayoutConfig {
            max_left: 10.0,
            ..LayoutConfig::default()
        };
        let mut s = SplitLayout::from_config(&cfg);
        s.begin_drag(Boundary::Left);
        s.pointer_move_pct(20.0);
        assert_eq!(s.widths().left, 15.0);
        s.pointer_move_pct(2.0);
        assert_eq!(s.widths().left, 10.0);
        assert!((sum(s.widths()) - 100.0).abs() < EPS);
    }

    #[test]
    fn out_of_range_config_bounds_are_clamped() {
        let cfg = LayoutConfig {
            min_left: 120.0,
            max_left: 130.0,
            min_center: f64::NAN,
            ..LayoutConfig::default()
        };
        let s = SplitLayout::from_config(&cfg);
        let w = s.widths();
        assert_eq!(w.left, 100.0);
        assert_eq!(w.center, 0.0);
        assert!((sum(w) - 100.0).abs() < EPS);
        assert_eq!(s.bounds.min_center, SplitBounds::default().min_center);
    }

    proptest! {
        #[test]
        fn left_drags_stay_in_bounds(moves in prop::collection::vec(0.0f64..100.0, 1..50)) {
            let mut s = SplitLayout::default();
            let right = s.widths().right;
            s.begin_drag(Boundary::Left);
            for pct in moves {
                s.pointer_move_pct(pct);
                let w = s.widths();
                prop_assert!(w.left >= 15.0 && w.left <= 35.0);
                prop_assert!((sum(w) - 100.0).abs() < EPS);
                prop_assert_eq!(w.right, right);
            }
        }

        #[test]
        fn right_drags_commit_or_leave_unchanged(moves in prop::collection::vec(0.0f64..100.0, 1..50)) {
            let mut s = SplitLayout::default();
            s.begin_drag(Boundary::Right);
            for pct in moves {
                let before = s.widths();
                s.pointer_move_pct(pct);
                let after = s.widths();
                prop_assert!(
                    after == before || (after.center >= 30.0 && after.center <= 60.0)
                );
                prop_assert_eq!(after.left, before.left);
                prop_assert!((sum(after) - 100.0).abs() < EPS);
            }
        }

        #[test]
        fn release_always_clears(left_first in any::<bool>(), pct in 0.0f64..100.0) {
            let mut s = SplitLayout::default();
            s.begin_drag(if left_first { Boundary::Left } else { Boundary::Right });
            s.pointer_move_pct(pct);
            s.end_drag();
            prop_assert_eq!(s.active(), None);
        }

        #[test]
        fn split_always_tiles(width in 0u16..400, x in 0u16..50) {
            let s = SplitLayout::default();
            let area = Rect::new(x, 0, width, 10);
            let [l, c, r] = s.split(area);
            prop_assert_eq!(l.width + c.width + r.width, width);
            prop_assert_eq!(r.x + r.width, x + width);
        }
    }
}
