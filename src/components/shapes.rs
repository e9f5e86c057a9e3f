// ============================================================================
// RUBBER-BAND SHAPE TOOLS: line, square, circle
// ============================================================================
//
// Each gesture snapshots the live surface on press. Every move restores that
// snapshot and draws one fresh preview from the press anchor to the pointer,
// so previews never pile up. Release flattens the last preview.

use crate::components::tools::{
    restore_snapshot, start_drawing, stop_drawing, Gesture, Key, Tool, ToolContext, ToolKind,
};
use crate::geometry::Position;
use crate::ops::raster;
use crate::surface::Surface;

/// θ increment used when sampling ellipse outlines.
pub const ELLIPSE_STEP: f32 = 0.01;

/// Straight segment from the press point to the pointer.
pub fn draw_line(live: &mut Surface, from: Position, to: Position) {
    live.stroke_segment(from.to_f32(), to.to_f32());
}

/// Axis-aligned rectangle spanned by two corners; filled first when the
/// fill is visible, then stroked.
pub fn draw_square(live: &mut Surface, from: Position, to: Position, filled: bool) {
    let (x, y) = from.to_f32();
    let w = (to.x - from.x) as f32;
    let h = (to.y - from.y) as f32;
    if filled {
        live.fill_rect(x, y, w, h);
    }
    live.stroke_rect(x, y, w, h);
}

/// Ellipse inscribed in the box spanned by two corners.
pub fn draw_ellipse(live: &mut Surface, from: Position, to: Position, filled: bool) {
    let (x, y) = from.to_f32();
    let points = raster::ellipse_points(
        x,
        y,
        (to.x - from.x) as f32,
        (to.y - from.y) as f32,
        ELLIPSE_STEP,
    );
    if filled {
        live.fill_polygon(&points);
    }
    live.stroke_polyline(&points, true);
}

/// Shared press/move/release flow for the three shape tools. `draw` renders
/// one preview from the anchor to the pointer.
fn rubber_band_move(
    gesture: &Gesture,
    position: Position,
    cx: &mut ToolContext<'_>,
    draw: impl FnOnce(&mut Surface, Position, Position, bool),
) {
    let Some(anchor) = gesture.anchor() else {
        return;
    };
    if !restore_snapshot(gesture, cx.live) {
        return;
    }
    let filled = !cx.style.fill.is_transparent();
    draw(&mut *cx.live, anchor, position, filled);
}

fn rubber_band_up(gesture: &mut Gesture, cx: &mut ToolContext<'_>) {
    if gesture.is_drawing {
        stop_drawing(gesture, cx.live, cx.persisted);
    }
}

macro_rules! shape_tool {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $draw:expr) => {
        $(#[$meta])*
        #[derive(Default)]
        pub struct $name {
            gesture: Gesture,
        }

        impl Tool for $name {
            fn kind(&self) -> ToolKind {
                $kind
            }

            fn gesture(&self) -> &Gesture {
                &self.gesture
            }

            fn gesture_mut(&mut self) -> &mut Gesture {
                &mut self.gesture
            }

            fn on_pointer_down(&mut self, position: Position, cx: &mut ToolContext<'_>) {
                start_drawing(&mut self.gesture, position, Some(&*cx.live));
            }

            fn on_pointer_move(&mut self, position: Position, cx: &mut ToolContext<'_>) {
                rubber_band_move(&self.gesture, position, cx, $draw);
            }

            fn on_pointer_up(&mut self, _position: Position, cx: &mut ToolContext<'_>) {
                rubber_band_up(&mut self.gesture, cx);
            }

            fn on_key_press(&mut self, _key: &Key, _cx: &mut ToolContext<'_>) {}
        }
    };
}

shape_tool!(
    /// Straight line from the press point to the release point.
    Line,
    ToolKind::Line,
    |live, from, to, _filled| draw_line(live, from, to)
);

shape_tool!(
    /// Rectangle between the press and release corners.
    Square,
    ToolKind::Square,
    draw_square
);

shape_tool!(
    /// Ellipse inscribed in the press/release box.
    Circle,
    ToolKind::Circle,
    draw_ellipse
);
