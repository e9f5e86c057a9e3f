// ============================================================================
// FREEHAND TOOLS: pencil stamps, scribble polyline, eraser
// ============================================================================
//
// None of these take a snapshot: every sample is drawn straight onto the
// live surface and the whole surface is flattened on release.

use crate::components::tools::{start_drawing, stop_drawing, Gesture, Key, Tool, ToolContext, ToolKind};
use crate::geometry::{Position, ZRect};

/// Stamps a filled disc of radius `pixel_weight` in the stroke color at every
/// sample. Fast drags leave gaps between stamps.
#[derive(Default)]
pub struct Pencil {
    gesture: Gesture,
}

impl Pencil {
    fn stamp(&self, position: Position, cx: &mut ToolContext<'_>) {
        let (x, y) = position.to_f32();
        let radius = cx.style.pixel_weight as f32;
        cx.live.fill_circle(x, y, radius, cx.style.stroke_rgba());
    }
}

impl Tool for Pencil {
    fn kind(&self) -> ToolKind {
        ToolKind::Pencil
    }

    fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    fn gesture_mut(&mut self) -> &mut Gesture {
        &mut self.gesture
    }

    fn on_pointer_down(&mut self, position: Position, cx: &mut ToolContext<'_>) {
        start_drawing(&mut self.gesture, position, None);
        self.stamp(position, cx);
    }

    fn on_pointer_move(&mut self, position: Position, cx: &mut ToolContext<'_>) {
        if !self.gesture.is_drawing {
            return;
        }
        self.stamp(position, cx);
        self.gesture.last_position = Some(position);
    }

    fn on_pointer_up(&mut self, _position: Position, cx: &mut ToolContext<'_>) {
        if self.gesture.is_drawing {
            stop_drawing(&mut self.gesture, cx.live, cx.persisted);
        }
    }

    fn on_key_press(&mut self, _key: &Key, _cx: &mut ToolContext<'_>) {}
}

/// Continuous stroke: one segment from the previous sample to the current
/// one, with the stroke weight and color.
#[derive(Default)]
pub struct Scribble {
    gesture: Gesture,
}

impl Tool for Scribble {
    fn kind(&self) -> ToolKind {
        ToolKind::Scribble
    }

    fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    fn gesture_mut(&mut self) -> &mut Gesture {
        &mut self.gesture
    }

    fn on_pointer_down(&mut self, position: Position, _cx: &mut ToolContext<'_>) {
        start_drawing(&mut self.gesture, position, None);
    }

    fn on_pointer_move(&mut self, position: Position, cx: &mut ToolContext<'_>) {
        if !self.gesture.is_drawing {
            return;
        }
        if let Some(last) = self.gesture.last_position {
            cx.live.stroke_segment(last.to_f32(), position.to_f32());
        }
        self.gesture.last_position = Some(position);
    }

    fn on_pointer_up(&mut self, _position: Position, cx: &mut ToolContext<'_>) {
        if self.gesture.is_drawing {
            stop_drawing(&mut self.gesture, cx.live, cx.persisted);
        }
    }

    fn on_key_press(&mut self, _key: &Key, _cx: &mut ToolContext<'_>) {}
}

/// Clears a square of side `2 * pixel_weight` centred on each move sample.
#[derive(Default)]
pub struct Eraser {
    gesture: Gesture,
}

/// Square erased around `position` for a given pixel weight.
pub fn eraser_rect(position: Position, pixel_weight: u32) -> ZRect {
    let half = pixel_weight as i32;
    ZRect::new(position.x - half, position.y - half, half * 2, half * 2)
}

impl Tool for Eraser {
    fn kind(&self) -> ToolKind {
        ToolKind::Eraser
    }

    fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    fn gesture_mut(&mut self) -> &mut Gesture {
        &mut self.gesture
    }

    fn on_pointer_down(&mut self, position: Position, _cx: &mut ToolContext<'_>) {
        start_drawing(&mut self.gesture, position, None);
    }

    fn on_pointer_move(&mut self, position: Position, cx: &mut ToolContext<'_>) {
        if !self.gesture.is_drawing {
            return;
        }
        cx.live.clear_rect(eraser_rect(position, cx.style.pixel_weight));
        self.gesture.last_position = Some(position);
    }

    fn on_pointer_up(&mut self, _position: Position, cx: &mut ToolContext<'_>) {
        if self.gesture.is_drawing {
            stop_drawing(&mut self.gesture, cx.live, cx.persisted);
        }
    }

    fn on_key_press(&mut self, _key: &Key, _cx: &mut ToolContext<'_>) {}
}
