use image::RgbaImage;

use crate::components::overlay::TextOverlay;
use crate::components::{cursor, freehand, shapes, text};
use crate::geometry::{Position, ZRect};
use crate::style::StyleSettings;
use crate::surface::Surface;

/// The eight tools of the toolbox, in toolbar order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Cursor,
    Pencil,
    Line,
    Scribble,
    Square,
    Circle,
    Text,
    Eraser,
}

impl ToolKind {
    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Cursor,
            ToolKind::Pencil,
            ToolKind::Line,
            ToolKind::Scribble,
            ToolKind::Square,
            ToolKind::Circle,
            ToolKind::Text,
            ToolKind::Eraser,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Cursor => "cursor",
            ToolKind::Pencil => "pencil",
            ToolKind::Line => "line",
            ToolKind::Scribble => "scribble",
            ToolKind::Square => "square",
            ToolKind::Circle => "circle",
            ToolKind::Text => "text",
            ToolKind::Eraser => "eraser",
        }
    }

    /// Button label used when the tool has no icon.
    pub fn alt_text(&self) -> &'static str {
        match self {
            ToolKind::Cursor => "Mouse",
            ToolKind::Pencil => ".",
            ToolKind::Line => "/",
            ToolKind::Scribble => "~",
            ToolKind::Square => "[]",
            ToolKind::Circle => "o",
            ToolKind::Text => "T",
            ToolKind::Eraser => "E",
        }
    }

    /// 20×20 SVG icon markup; the text tool has none.
    pub fn icon_svg(&self) -> Option<&'static str> {
        let svg = match self {
            ToolKind::Cursor => {
                r#"<svg width="20" height="20"><path d="M5 2 V 16 L 8 12 L 11 19 L 13 18 L 10 11 L 15.5 11.5 L 5 2" fill="transparent" stroke="black"/></svg>"#
            }
            ToolKind::Pencil => {
                r#"<svg width="20" height="20"><path d="M3 5 L 8 2 L 15 13 L 15 19 L 10 16 L 3 5 M 4 7.5 L 10 4" fill="transparent" stroke="black"/></svg>"#
            }
            ToolKind::Line => {
                r#"<svg height="20" width="20"><line x1="0" y1="0" x2="20" y2="20" style="stroke:black;stroke-width:1" /></svg>"#
            }
            ToolKind::Scribble => {
                r#"<svg width="20" height="20"><path d="M0 10 Q 5 1, 10 10 T 20 10" stroke="black" fill="transparent"/></svg>"#
            }
            ToolKind::Square => {
                r#"<svg width="20" height="20"><rect x="0" y="0" width="20" height="20" stroke="black" stroke-width="1" fill="none" /></svg>"#
            }
            ToolKind::Circle => {
                r#"<svg width="20" height="20"><circle cx="10" cy="10" r="9" stroke="black" stroke-width="1" fill="none" /></svg>"#
            }
            ToolKind::Text => return None,
            ToolKind::Eraser => {
                r#"<svg width="20" height="20"><path d="M0 0 H10 L 20 20 H 10 L 0 0" fill="pink" stroke="black"/></svg>"#
            }
        };
        Some(svg)
    }

    /// Match a tool by name (case-insensitive) or by toolbar index.
    pub fn parse(s: &str) -> Option<ToolKind> {
        let s = s.trim();
        if let Ok(idx) = s.parse::<usize>() {
            return Self::all().get(idx).copied();
        }
        Self::all()
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
    }
}

/// Keyboard input forwarded to the active tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Enter,
    Char(char),
    Other(String),
}

impl Key {
    pub fn parse(name: &str) -> Key {
        match name.trim() {
            "Delete" | "delete" | "Del" => Key::Delete,
            "Backspace" | "backspace" => Key::Backspace,
            "Escape" | "escape" | "Esc" => Key::Escape,
            "Enter" | "enter" | "Return" => Key::Enter,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(other.to_string()),
                }
            }
        }
    }
}

/// Everything a tool handler may touch for one event.
pub struct ToolContext<'a> {
    /// Visible surface; receives previews and in-progress strokes.
    pub live: &'a mut Surface,
    /// 1:1 committed content; the export source.
    pub persisted: &'a mut Surface,
    /// The toolbox's shared style, read on every draw.
    pub style: &'a StyleSettings,
    pub overlay: &'a mut TextOverlay,
}

/// Per-gesture state every tool carries.
#[derive(Clone, Debug, Default)]
pub struct Gesture {
    pub is_drawing: bool,
    /// Gesture anchor for shape tools, previous sample for freehand tools.
    pub last_position: Option<Position>,
    /// Live-surface pixels captured when the gesture started.
    pub snapshot: Option<RgbaImage>,
    /// The live surface may differ from the persisted one.
    pub is_dirty: bool,
}

impl Gesture {
    pub fn anchor(&self) -> Option<Position> {
        if self.is_drawing { self.last_position } else { None }
    }
}

/// Idle → Drawing. Captures the live surface when one is supplied.
pub fn start_drawing(gesture: &mut Gesture, position: Position, live: Option<&Surface>) {
    gesture.is_drawing = true;
    gesture.is_dirty = true;
    gesture.last_position = Some(position);
    if let Some(live) = live {
        gesture.snapshot = Some(live.get_image_data());
    }
}

/// Drawing → Idle. Flattens the whole live surface onto the persisted one
/// and drops the snapshot. Calling it again without a new gesture rewrites
/// identical pixels.
pub fn stop_drawing(gesture: &mut Gesture, live: &Surface, persisted: &mut Surface) {
    persisted.copy_from(live);
    gesture.snapshot = None;
    gesture.is_dirty = false;
    gesture.is_drawing = false;
    gesture.last_position = None;
}

/// Put the gesture-start pixels back on the live surface before a new
/// preview is drawn. Returns `false` when no snapshot was taken.
pub fn restore_snapshot(gesture: &Gesture, live: &mut Surface) -> bool {
    match &gesture.snapshot {
        Some(snapshot) => {
            live.put_image_data(snapshot, 0, 0);
            true
        }
        None => false,
    }
}

/// Throw an unfinished gesture away: the persisted surface is left alone and
/// the live surface is resynchronised from it.
pub fn discard_gesture(gesture: &mut Gesture, live: &mut Surface, persisted: &Surface) {
    live.copy_from(persisted);
    *gesture = Gesture::default();
}

/// A toolbox tool. The four `on_*` handlers are its whole behaviour; the
/// remaining methods are accessors and the shared gesture bookkeeping.
pub trait Tool {
    fn kind(&self) -> ToolKind;
    fn gesture(&self) -> &Gesture;
    fn gesture_mut(&mut self) -> &mut Gesture;

    fn on_pointer_down(&mut self, position: Position, cx: &mut ToolContext<'_>);
    fn on_pointer_move(&mut self, position: Position, cx: &mut ToolContext<'_>);
    fn on_pointer_up(&mut self, position: Position, cx: &mut ToolContext<'_>);
    fn on_key_press(&mut self, key: &Key, cx: &mut ToolContext<'_>);

    /// Force Idle. Called on the outgoing and incoming tool at every switch.
    fn tool_selected(&mut self) {
        self.gesture_mut().is_drawing = false;
    }

    /// True while a gesture is running or its pixels are not flattened yet.
    fn has_pending_work(&self) -> bool {
        let g = self.gesture();
        g.is_drawing || g.is_dirty
    }

    /// Selected canvas region, for tools that keep one.
    fn selection(&self) -> Option<ZRect> {
        None
    }

    /// Discard the current gesture without committing it.
    fn abandon(&mut self, cx: &mut ToolContext<'_>) {
        discard_gesture(self.gesture_mut(), cx.live, cx.persisted);
    }
}

/// Build one instance of every tool, in toolbar order.
pub fn create_tools() -> Vec<Box<dyn Tool>> {
    ToolKind::all().iter().map(|&k| create_tool(k)).collect()
}

pub fn create_tool(kind: ToolKind) -> Box<dyn Tool> {
    match kind {
        ToolKind::Cursor => Box::new(cursor::Cursor::default()),
        ToolKind::Pencil => Box::new(freehand::Pencil::default()),
        ToolKind::Line => Box::new(shapes::Line::default()),
        ToolKind::Scribble => Box::new(freehand::Scribble::default()),
        ToolKind::Square => Box::new(shapes::Square::default()),
        ToolKind::Circle => Box::new(shapes::Circle::default()),
        ToolKind::Text => Box::new(text::TextTool::default()),
        ToolKind::Eraser => Box::new(freehand::Eraser::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn toolbar_order_starts_with_cursor() {
        let tools = create_tools();
        let kinds: Vec<ToolKind> = tools.iter().map(|t| t.kind()).collect();
        assert_eq!(kinds, ToolKind::all());
        assert_eq!(kinds[0], ToolKind::Cursor);
    }

    #[test]
    fn parse_by_name_or_index() {
        assert_eq!(ToolKind::parse("Line"), Some(ToolKind::Line));
        assert_eq!(ToolKind::parse("7"), Some(ToolKind::Eraser));
        assert_eq!(ToolKind::parse("8"), None);
        assert_eq!(ToolKind::parse("brush"), None);
    }

    #[test]
    fn only_text_lacks_an_icon() {
        for k in ToolKind::all() {
            assert_eq!(k.icon_svg().is_none(), *k == ToolKind::Text);
        }
    }

    #[test]
    fn key_names() {
        assert_eq!(Key::parse("Delete"), Key::Delete);
        assert_eq!(Key::parse("a"), Key::Char('a'));
        assert_eq!(Key::parse("F5"), Key::Other("F5".into()));
    }

    #[test]
    fn start_with_surface_takes_snapshot() {
        let mut live = Surface::new(8, 8);
        live.fill_circle(4.0, 4.0, 2.0, Color::BLACK);
        let mut g = Gesture::default();
        start_drawing(&mut g, Position::new(1, 2), Some(&live));
        assert!(g.is_drawing && g.is_dirty);
        assert_eq!(g.last_position, Some(Position::new(1, 2)));
        assert_eq!(g.snapshot.as_ref(), Some(live.image()));

        let mut g2 = Gesture::default();
        start_drawing(&mut g2, Position::new(0, 0), None);
        assert!(g2.snapshot.is_none());
    }

    #[test]
    fn stop_flattens_and_resets() {
        let mut live = Surface::new(8, 8);
        let mut persisted = Surface::new(8, 8);
        let mut g = Gesture::default();
        start_drawing(&mut g, Position::new(4, 4), Some(&live));
        live.fill_circle(4.0, 4.0, 2.0, Color::BLACK);
        stop_drawing(&mut g, &live, &mut persisted);
        assert_eq!(persisted.image(), live.image());
        assert!(!g.is_drawing && !g.is_dirty);
        assert!(g.snapshot.is_none() && g.last_position.is_none());

        let before = persisted.get_image_data();
        stop_drawing(&mut g, &live, &mut persisted);
        assert_eq!(persisted.image(), &before);
    }

    #[test]
    fn discard_resyncs_live_from_persisted() {
        let mut live = Surface::new(8, 8);
        let persisted = Surface::new(8, 8);
        let mut g = Gesture::default();
        start_drawing(&mut g, Position::new(0, 0), Some(&live));
        live.fill_circle(4.0, 4.0, 3.0, Color::BLACK);
        discard_gesture(&mut g, &mut live, &persisted);
        assert_eq!(live.image(), persisted.image());
        assert!(!g.is_drawing && g.snapshot.is_none());
    }
}
