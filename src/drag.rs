//! The drag/resize state machine: hit-testing, motion arithmetic and
//! edge-snap, expressed as plain functions over [`Rect`] so they can be
//! unit tested without an X display.
//!
//! Title drag and frame drag have deliberately different anchor semantics
//! and are kept as separate functions rather than unified.

use crate::geometry::{corner_extent, Rect};

/// Which of the nine interactive operations a button-1 press started.
/// A tagged union, not a flag+kind pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    TitleDrag,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Left,
    Right,
    Top,
    Bottom,
}

/// State for an in-progress drag or resize. Created on a left-button press
/// on a decoration, cleared unconditionally on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub kind: DragKind,
    /// Pointer root position at press time; mutated on each motion for
    /// `FrameDrag` kinds, left untouched for `TitleDrag`.
    pub anchor_x: i32,
    pub anchor_y: i32,
    /// The frame's top-left at press time. Immutable within a drag.
    pub origin_x: i32,
    pub origin_y: i32,
}

impl DragState {
    pub fn new(kind: DragKind, anchor_x: i32, anchor_y: i32, origin_x: i32, origin_y: i32) -> Self {
        DragState {
            kind,
            anchor_x,
            anchor_y,
            origin_x,
            origin_y,
        }
    }
}

/// 3x3 hit-test over a frame's interior.
///
/// Note: `ch` is bounded by `width / 2` rather than `height / 2`. This is
/// preserved verbatim as observable behavior rather than "corrected" to
/// `height / 2`.
pub fn hit_test(ev_x: i32, ev_y: i32, width: i32, height: i32) -> DragKind {
    let cw = corner_extent(width / 2);
    let ch = corner_extent(width / 2); // sic: width/2, not height/2 (see doc comment above).

    if ev_x >= width - cw {
        if ev_y >= height - ch {
            DragKind::BottomRight
        } else if ev_y <= ch {
            DragKind::TopRight
        } else {
            DragKind::Right
        }
    } else if ev_x <= cw {
        if ev_y >= height - ch {
            DragKind::BottomLeft
        } else if ev_y <= ch {
            DragKind::TopLeft
        } else {
            DragKind::Left
        }
    } else if ev_y >= height / 2 {
        DragKind::Bottom
    } else {
        DragKind::Top
    }
}

/// Title-drag motion: absolute-from-origin. The frame moves to
/// `origin + (root - anchor)`; neither anchor nor origin changes.
pub fn apply_title_motion(state: &DragState, root_x: i32, root_y: i32) -> (i32, i32) {
    let dx = root_x - state.anchor_x;
    let dy = root_y - state.anchor_y;
    (state.origin_x + dx, state.origin_y + dy)
}

/// Deltas to apply to the frame's geometry for one frame-resize motion
/// event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeDelta {
    pub dw: i32,
    pub dh: i32,
    pub dx: i32,
    pub dy: i32,
}

/// Computes the resize delta for one motion event and the new frame rect.
/// Frame-drag is incremental: the caller must update the anchor to the
/// current root position afterwards (unlike title-drag).
pub fn apply_frame_motion(
    kind: DragKind,
    frame: Rect,
    anchor_x: i32,
    anchor_y: i32,
    root_x: i32,
    root_y: i32,
) -> (ResizeDelta, Rect) {
    use DragKind::*;
    let mut delta = ResizeDelta::default();

    match kind {
        Right | TopRight | BottomRight => {
            delta.dw = root_x - anchor_x;
        }
        Left | TopLeft | BottomLeft => {
            delta.dw = anchor_x - root_x;
            delta.dx = -delta.dw;
        }
        _ => {}
    }

    match kind {
        Bottom | BottomLeft | BottomRight => {
            delta.dh = root_y - anchor_y;
        }
        Top | TopLeft | TopRight => {
            delta.dh = anchor_y - root_y;
            delta.dy = -delta.dh;
        }
        _ => {}
    }

    let resized = Rect::new(
        frame.x + delta.dx,
        frame.y + delta.dy,
        frame.w + delta.dw,
        frame.h + delta.dh,
    );

    (delta, resized)
}

/// Result of an edge-snap: the new geometry for the frame, title and client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapLayout {
    pub frame: Rect,
    pub title: Rect,
    pub client: Rect,
}

/// Edge-snap policy: moving the drag pointer to a screen edge resizes the
/// dragged window to one half of the screen.
/// Returns `None` if `(x, y)` is not on an edge.
pub fn edge_snap(
    x: i32,
    y: i32,
    screen_w: i32,
    screen_h: i32,
    title_height: i32,
    border_width: i32,
) -> Option<SnapLayout> {
    let bw2 = 2 * border_width;
    if x == 0 {
        let half_w = screen_w / 2;
        Some(SnapLayout {
            frame: Rect::new(0, 0, half_w, screen_h - bw2),
            title: Rect::new(0, 0, half_w, title_height),
            client: Rect::new(0, title_height, half_w, screen_h - title_height - bw2),
        })
    } else if x == screen_w - 1 {
        let half_w = screen_w / 2;
        Some(SnapLayout {
            frame: Rect::new(half_w, 0, half_w, screen_h - bw2),
            title: Rect::new(0, 0, half_w, title_height),
            client: Rect::new(0, title_height, half_w, screen_h - title_height - bw2),
        })
    } else if y == 0 {
        let half_h = screen_h / 2;
        Some(SnapLayout {
            frame: Rect::new(0, 0, screen_w, half_h - bw2),
            title: Rect::new(0, 0, screen_w, title_height),
            client: Rect::new(0, title_height, screen_w, half_h - title_height - bw2),
        })
    } else if y == screen_h - 1 {
        let half_h = screen_h / 2;
        Some(SnapLayout {
            frame: Rect::new(0, half_h, screen_w, half_h - bw2),
            title: Rect::new(0, 0, screen_w, title_height),
            client: Rect::new(0, title_height, screen_w, half_h - title_height - bw2),
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_hit_test_examples() {
        // width=800, height=600: corner extent is min(400, 40) = 40.
        assert_eq!(hit_test(799, 599, 800, 600), DragKind::BottomRight);
        assert_eq!(hit_test(0, 0, 800, 600), DragKind::TopLeft);
        assert_eq!(hit_test(400, 150, 800, 600), DragKind::Top);
    }

    #[test]
    fn title_drag_is_absolute_from_origin() {
        let state = DragState::new(DragKind::TitleDrag, 150, 110, 97, 77);
        let (x, y) = apply_title_motion(&state, 160, 115);
        assert_eq!((x, y), (107, 82));
    }

    #[test]
    fn title_drag_monotonic_over_sequence() {
        // After motions at p_0..p_n starting from origin o, frame position
        // equals o + (p_n - p_0), regardless of intermediate positions.
        let state = DragState::new(DragKind::TitleDrag, 10, 10, 0, 0);
        let mut last = (0, 0);
        for &(rx, ry) in &[(15, 12), (9, 40), (100, 100)] {
            last = apply_title_motion(&state, rx, ry);
        }
        assert_eq!(last, (100 - 10, 100 - 10));
    }

    #[test]
    fn bottom_right_resize_grows_without_moving_origin() {
        let frame = Rect::new(500, 400, 400, 300);
        let (delta, resized) = apply_frame_motion(DragKind::BottomRight, frame, 895, 695, 925, 735);
        assert_eq!(delta, ResizeDelta { dw: 30, dh: 40, dx: 0, dy: 0 });
        assert_eq!(resized, Rect::new(500, 400, 430, 340));
    }

    #[test]
    fn top_left_resize_moves_origin_by_negative_delta() {
        let frame = Rect::new(100, 100, 200, 200);
        let (delta, resized) = apply_frame_motion(DragKind::TopLeft, frame, 100, 100, 90, 80);
        assert_eq!(delta.dw, 10);
        assert_eq!(delta.dh, 20);
        assert_eq!(resized, Rect::new(90, 80, 210, 220));
    }

    #[test]
    fn frame_drag_accumulates_over_sequence() {
        let mut frame = Rect::new(0, 0, 100, 100);
        let mut anchor = (0, 0);
        let motions = [(10, 0), (25, 5), (40, 20)];
        let mut total_dw = 0;
        for &(rx, ry) in &motions {
            let (delta, resized) = apply_frame_motion(DragKind::Right, frame, anchor.0, anchor.1, rx, ry);
            total_dw += delta.dw;
            frame = resized;
            anchor = (rx, ry);
        }
        assert_eq!(frame.w, 100 + total_dw);
        assert_eq!(anchor, (40, 20));
    }

    #[test]
    fn edge_snap_left_half() {
        let snap = edge_snap(0, 400, 1920, 1080, 18, 3).unwrap();
        assert_eq!(snap.frame, Rect::new(0, 0, 960, 1080 - 6));
        assert_eq!(snap.title, Rect::new(0, 0, 960, 18));
        assert_eq!(snap.client, Rect::new(0, 18, 960, 1080 - 18 - 6));
    }

    #[test]
    fn edge_snap_none_away_from_edges() {
        assert!(edge_snap(960, 540, 1920, 1080, 18, 3).is_none());
    }
}
