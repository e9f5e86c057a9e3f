// ============================================================================
// CURSOR TOOL: marquee selection, drag-move of the selected pixels, delete
// ============================================================================

use image::RgbaImage;

use crate::components::tools::{restore_snapshot, start_drawing, Gesture, Key, Tool, ToolContext, ToolKind};
use crate::geometry::{Position, ZRect};
use crate::style::Color;
use crate::surface::Surface;

/// Dash pattern of the marquee outline.
pub const MARQUEE_DASH: [f32; 2] = [5.0, 5.0];

/// Pixels lifted out of the persisted surface while a selection is dragged.
#[derive(Clone, Debug)]
struct DragState {
    pixels: RgbaImage,
    /// Where the pixels were lifted from, for putting them back on abandon.
    origin: Position,
}

#[derive(Default)]
pub struct Cursor {
    gesture: Gesture,
    /// Normalised selection, kept after the marquee gesture ends.
    selected: Option<ZRect>,
    drag: Option<DragState>,
}

/// Dashed 1px black outline of `rect`, drawn inside a save/restore pair so the
/// context's own dash and width are untouched.
pub fn draw_marquee(live: &mut Surface, rect: ZRect) {
    live.save();
    live.set_line_dash(&MARQUEE_DASH);
    live.state.line_width = 1.0;
    live.state.stroke_color = Color::BLACK;
    let (x, y) = rect.pos.to_f32();
    live.stroke_rect(x, y, rect.width as f32, rect.height as f32);
    live.restore();
}

impl Cursor {
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn begin_drag(&mut self, sel: ZRect, position: Position, cx: &mut ToolContext<'_>) {
        let pixels = cx.persisted.get_region(sel);
        cx.persisted.clear_rect(sel);
        // The snapshot is the persisted surface with the hole punched in it;
        // each move redraws the lifted pixels over it.
        let base = cx.persisted.get_image_data();
        cx.live.put_image_data(&base, 0, 0);
        cx.live.put_image_data(&pixels, sel.pos.x, sel.pos.y);

        self.gesture.snapshot = Some(base);
        self.gesture.last_position = Some(position);
        self.gesture.is_drawing = true;
        self.gesture.is_dirty = true;
        self.drag = Some(DragState {
            pixels,
            origin: sel.pos,
        });
    }

    fn begin_marquee(&mut self, position: Position, cx: &mut ToolContext<'_>) {
        self.selected = None;
        start_drawing(&mut self.gesture, position, Some(&*cx.live));
    }

    /// Move the selection by the pointer delta since the last sample.
    fn follow_pointer(&mut self, position: Position) -> Option<ZRect> {
        let last = self.gesture.last_position?;
        let sel = self.selected.as_mut()?;
        sel.pos = sel.pos.offset(position.x - last.x, position.y - last.y);
        self.gesture.last_position = Some(position);
        Some(*sel)
    }

    fn finish_gesture(&mut self) {
        self.gesture = Gesture::default();
        self.drag = None;
    }
}

impl Tool for Cursor {
    fn kind(&self) -> ToolKind {
        ToolKind::Cursor
    }

    fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    fn gesture_mut(&mut self) -> &mut Gesture {
        &mut self.gesture
    }

    fn on_pointer_down(&mut self, position: Position, cx: &mut ToolContext<'_>) {
        if self.gesture.is_drawing {
            return;
        }
        match self.selected {
            Some(sel) if !sel.is_empty() && sel.normalize().contains(position) => {
                self.begin_drag(sel, position, cx)
            }
            _ => self.begin_marquee(position, cx),
        }
    }

    fn on_pointer_move(&mut self, position: Position, cx: &mut ToolContext<'_>) {
        if !self.gesture.is_drawing {
            return;
        }
        if self.drag.is_some() {
            let Some(sel) = self.follow_pointer(position) else {
                return;
            };
            restore_snapshot(&self.gesture, cx.live);
            if let Some(drag) = &self.drag {
                cx.live.put_image_data(&drag.pixels, sel.pos.x, sel.pos.y);
            }
            draw_marquee(cx.live, sel);
            return;
        }
        let Some(anchor) = self.gesture.anchor() else {
            return;
        };
        if !restore_snapshot(&self.gesture, cx.live) {
            return;
        }
        let rect = ZRect::from_corners(anchor, position);
        draw_marquee(cx.live, rect);
        self.selected = Some(ZRect::from_bounds(rect.normalize()));
    }

    fn on_pointer_up(&mut self, position: Position, cx: &mut ToolContext<'_>) {
        if !self.gesture.is_drawing {
            return;
        }
        if self.drag.is_some() {
            let sel = self.follow_pointer(position);
            if let (Some(sel), Some(drag)) = (sel, &self.drag) {
                cx.persisted.put_image_data(&drag.pixels, sel.pos.x, sel.pos.y);
            }
            cx.live.copy_from(cx.persisted);
            self.selected = None;
            self.finish_gesture();
            return;
        }
        // A selection is not a canvas edit: the marquee outline is taken off
        // the live surface and nothing is flattened.
        restore_snapshot(&self.gesture, cx.live);
        if self.selected.is_some_and(|s| s.is_empty()) {
            self.selected = None;
        }
        self.finish_gesture();
    }

    fn on_key_press(&mut self, key: &Key, cx: &mut ToolContext<'_>) {
        if *key != Key::Delete {
            return;
        }
        let Some(sel) = self.selected else {
            return;
        };
        cx.live.clear_rect(sel);
        cx.persisted.clear_rect(sel);
        if let Some(snapshot) = self.gesture.snapshot.as_mut() {
            *snapshot = cx.persisted.get_image_data();
        }
    }

    fn tool_selected(&mut self) {
        self.gesture.is_drawing = false;
        self.selected = None;
        self.drag = None;
    }

    fn has_pending_work(&self) -> bool {
        self.gesture.is_drawing || self.gesture.is_dirty || self.drag.is_some()
    }

    fn selection(&self) -> Option<ZRect> {
        self.selected
    }

    /// An interrupted drag puts the lifted pixels back where they came from.
    fn abandon(&mut self, cx: &mut ToolContext<'_>) {
        if let Some(drag) = self.drag.take() {
            cx.persisted.put_image_data(&drag.pixels, drag.origin.x, drag.origin.y);
        }
        cx.live.copy_from(cx.persisted);
        self.selected = None;
        self.finish_gesture();
    }
}
