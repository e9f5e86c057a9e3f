use crate::components::tools::{discard_gesture, start_drawing, stop_drawing, Gesture, Key, Tool, ToolContext, ToolKind};
use crate::geometry::Position;
use crate::style::Color;

/// Horizontal nudge from the click point to the text origin.
pub const TEXT_OFFSET_X: i32 = -3;
/// The baseline sits `font size - TEXT_BASELINE_LIFT` below the click point,
/// lining rendered text up with the overlay box.
pub const TEXT_BASELINE_LIFT: i32 = 5;

/// Two-click text placement: the first press opens the overlay at the
/// pointer, the second press anywhere renders the typed text at the first
/// press point and closes the overlay.
#[derive(Default)]
pub struct TextTool {
    gesture: Gesture,
}

/// Canvas point where text placed at `anchor` starts its first baseline.
pub fn text_origin(anchor: Position, font_size: u32) -> Position {
    anchor.offset(TEXT_OFFSET_X, font_size as i32 - TEXT_BASELINE_LIFT)
}

impl TextTool {
    fn commit(&mut self, cx: &mut ToolContext<'_>) {
        let Some(anchor) = self.gesture.anchor() else {
            return;
        };
        let text = cx.overlay.text().to_string();
        let (x, y) = text_origin(anchor, cx.style.font.size).to_f32();

        cx.live.save();
        cx.live.fill_text(&text, x, y, Color::BLACK);
        cx.overlay.close();
        cx.live.restore();
        stop_drawing(&mut self.gesture, cx.live, cx.persisted);
        crate::log_info!("text placed at {},{} ({} chars)", anchor.x, anchor.y, text.chars().count());
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    fn gesture_mut(&mut self) -> &mut Gesture {
        &mut self.gesture
    }

    fn on_pointer_down(&mut self, position: Position, cx: &mut ToolContext<'_>) {
        if self.gesture.is_drawing {
            self.commit(cx);
        } else {
            start_drawing(&mut self.gesture, position, Some(&*cx.live));
            cx.overlay.open(position, cx.style.font.clone());
        }
    }

    fn on_pointer_move(&mut self, _position: Position, _cx: &mut ToolContext<'_>) {}

    // The overlay stays up across releases and pointer exits.
    fn on_pointer_up(&mut self, _position: Position, _cx: &mut ToolContext<'_>) {}

    fn on_key_press(&mut self, key: &Key, cx: &mut ToolContext<'_>) {
        if !cx.overlay.is_open() {
            return;
        }
        match key {
            Key::Char(c) => cx.overlay.push_char(*c),
            Key::Enter => cx.overlay.push_char('\n'),
            Key::Backspace => cx.overlay.pop_char(),
            Key::Escape => self.abandon(cx),
            Key::Delete | Key::Other(_) => {}
        }
    }

    fn abandon(&mut self, cx: &mut ToolContext<'_>) {
        cx.overlay.close();
        discard_gesture(&mut self.gesture, cx.live, cx.persisted);
    }
}
