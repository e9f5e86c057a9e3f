use crate::geometry::Position;
use crate::style::FontSpec;

/// Editable text box shown over the canvas while the text tool is placing
/// text. The GUI renders it as a floating text field; headless replay writes
/// to it directly.
#[derive(Clone, Debug, Default)]
pub struct TextOverlay {
    open: bool,
    anchor: Position,
    font: FontSpec,
    text: String,
    focus_requested: bool,
}

impl TextOverlay {
    /// Show an empty box at `anchor` (canvas pixels) styled with `font`.
    /// Focus is requested for the next frame so the box is on screen first.
    pub fn open(&mut self, anchor: Position, font: FontSpec) {
        self.open = true;
        self.anchor = anchor;
        self.font = font;
        self.text.clear();
        self.focus_requested = true;
    }

    /// Hide the box and drop whatever was typed.
    pub fn close(&mut self) {
        self.open = false;
        self.text.clear();
        self.focus_requested = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn anchor(&self) -> Position {
        self.anchor
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Mutable text for the GUI's text field; `None` while closed.
    pub fn text_mut(&mut self) -> Option<&mut String> {
        if self.open { Some(&mut self.text) } else { None }
    }

    pub fn set_text(&mut self, text: &str) {
        if self.open {
            self.text = text.to_string();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.open {
            self.text.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.open {
            self.text.pop();
        }
    }

    /// One-shot: true the first time it is asked after `open`.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_resets_text_and_requests_focus_once() {
        let mut o = TextOverlay::default();
        o.open(Position::new(3, 4), FontSpec::default());
        o.set_text("hello");
        o.open(Position::new(5, 6), FontSpec::default());
        assert!(o.is_open());
        assert_eq!(o.text(), "");
        assert_eq!(o.anchor(), Position::new(5, 6));
        assert!(o.take_focus_request());
        assert!(!o.take_focus_request());
    }

    #[test]
    fn closed_overlay_ignores_edits() {
        let mut o = TextOverlay::default();
        o.set_text("x");
        o.push_char('y');
        assert_eq!(o.text(), "");
        assert!(o.text_mut().is_none());

        o.open(Position::default(), FontSpec::default());
        o.push_char('a');
        o.push_char('b');
        o.pop_char();
        assert_eq!(o.text(), "a");
        o.close();
        assert!(!o.is_open());
        assert_eq!(o.text(), "");
    }
}
