// ============================================================================
// TOOLBOX: owns the canvas pair, the shared style and the eight tools, and
// routes every pointer/key event to the active tool
// ============================================================================

use image::RgbaImage;

use crate::components::overlay::TextOverlay;
use crate::components::tools::{create_tools, Key, Tool, ToolContext, ToolKind};
use crate::geometry::{to_canvas_position, Position, ZRect};
use crate::style::{Color, StyleSettings};
use crate::surface::Surface;

/// Space the surrounding chrome takes out of the container, `(horizontal,
/// vertical)`, when the canvas is sized to fill it.
pub const DEFAULT_MARGINS: (u32, u32) = (10, 12);

pub const DEFAULT_ZOOM: f32 = 100.0;

/// Largest accepted canvas side, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 16384;

pub struct Toolbox {
    live: Surface,
    persisted: Surface,
    style: StyleSettings,
    tools: Vec<Box<dyn Tool>>,
    active: usize,
    overlay: TextOverlay,
    /// Display scale in percent; never changes the backing buffers.
    zoom: f32,
    /// Screen position of the live surface's top-left corner.
    origin: (f32, f32),
    pointer: Option<Position>,
}

impl Toolbox {
    /// Fresh toolbox with a transparent `width × height` canvas pair, default
    /// style and the cursor tool active. Each side is clamped to
    /// `1..=MAX_CANVAS_SIDE`.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.clamp(1, MAX_CANVAS_SIDE), height.clamp(1, MAX_CANVAS_SIDE));
        let style = StyleSettings::default();
        let mut live = Surface::new(width, height);
        let mut persisted = Surface::new(width, height);
        live.apply_style(&style);
        persisted.apply_style(&style);
        let mut tools = create_tools();
        if let Some(first) = tools.first_mut() {
            first.tool_selected();
        }
        crate::log_info!("toolbox created: {}x{}", live.width(), live.height());
        Self {
            live,
            persisted,
            style,
            tools,
            active: 0,
            overlay: TextOverlay::default(),
            zoom: DEFAULT_ZOOM,
            origin: (0.0, 0.0),
            pointer: None,
        }
    }

    /// Like [`Toolbox::new`], but an out-of-range size is an error instead of
    /// being clamped.
    pub fn try_new(width: u32, height: u32) -> Result<Self, String> {
        check_canvas_size(width, height)?;
        Ok(Self::new(width, height))
    }

    /// Canvas sized to fill a container, minus the chrome margins.
    pub fn for_container(container_w: u32, container_h: u32, margins: (u32, u32)) -> Self {
        let w = container_w.saturating_sub(margins.0).max(1);
        let h = container_h.saturating_sub(margins.1).max(1);
        Self::new(w, h)
    }

    pub fn width(&self) -> u32 {
        self.persisted.width()
    }

    pub fn height(&self) -> u32 {
        self.persisted.height()
    }

    pub fn set_canvas_origin(&mut self, x: f32, y: f32) {
        self.origin = (x, y);
    }

    pub fn canvas_origin(&self) -> (f32, f32) {
        self.origin
    }

    // ---- event dispatch -----------------------------------------------------

    /// Run one handler of the active tool with the current style pushed into
    /// the live context first.
    fn dispatch(&mut self, f: impl FnOnce(&mut dyn Tool, &mut ToolContext<'_>)) {
        self.live.apply_style(&self.style);
        let Some(tool) = self.tools.get_mut(self.active) else {
            return;
        };
        let mut cx = ToolContext {
            live: &mut self.live,
            persisted: &mut self.persisted,
            style: &self.style,
            overlay: &mut self.overlay,
        };
        f(tool.as_mut(), &mut cx);
    }

    fn translate(&self, client_x: f32, client_y: f32) -> Position {
        to_canvas_position(self.origin, client_x, client_y, self.zoom)
    }

    /// Pointer press at client coordinates.
    pub fn pointer_down(&mut self, client_x: f32, client_y: f32) {
        let pos = self.translate(client_x, client_y);
        self.pointer_down_at(pos);
    }

    pub fn pointer_move(&mut self, client_x: f32, client_y: f32) {
        let pos = self.translate(client_x, client_y);
        self.pointer_move_at(pos);
    }

    pub fn pointer_up(&mut self, client_x: f32, client_y: f32) {
        let pos = self.translate(client_x, client_y);
        self.pointer_up_at(pos);
    }

    pub fn pointer_down_at(&mut self, pos: Position) {
        self.pointer = Some(pos);
        self.dispatch(|tool, cx| tool.on_pointer_down(pos, cx));
    }

    pub fn pointer_move_at(&mut self, pos: Position) {
        self.pointer = Some(pos);
        self.dispatch(|tool, cx| tool.on_pointer_move(pos, cx));
    }

    pub fn pointer_up_at(&mut self, pos: Position) {
        self.pointer = Some(pos);
        self.dispatch(|tool, cx| tool.on_pointer_up(pos, cx));
    }

    /// The pointer left the canvas: treated as a release at the last known
    /// position, and the coordinate readout is cleared.
    pub fn pointer_left(&mut self) {
        let pos = self.pointer.take().unwrap_or_default();
        self.dispatch(|tool, cx| tool.on_pointer_up(pos, cx));
    }

    /// Last pointer position over the canvas, for the status readout.
    pub fn pointer_position(&self) -> Option<Position> {
        self.pointer
    }

    pub fn key_down(&mut self, key: &Key) {
        self.dispatch(|tool, cx| tool.on_key_press(key, cx));
    }

    // ---- tools --------------------------------------------------------------

    /// Make tool `index` active. An unfinished gesture of the outgoing tool is
    /// thrown away, never committed. Returns `false` for an unknown index.
    pub fn select_tool(&mut self, index: usize) -> bool {
        if index >= self.tools.len() {
            crate::log_warn!("ignoring unknown tool index {}", index);
            return false;
        }
        let outgoing_busy = self
            .tools
            .get(self.active)
            .is_some_and(|t| t.has_pending_work());
        if outgoing_busy {
            crate::log_info!("abandoning unfinished {} gesture", self.active_tool().name());
            self.dispatch(|tool, cx| tool.abandon(cx));
        }
        if let Some(outgoing) = self.tools.get_mut(self.active) {
            outgoing.tool_selected();
        }
        self.tools[index].tool_selected();
        if index != self.active {
            crate::log_info!("tool: {} -> {}", self.active_tool().name(), ToolKind::all()[index].name());
        }
        self.active = index;
        true
    }

    pub fn select_kind(&mut self, kind: ToolKind) -> bool {
        match self.tools.iter().position(|t| t.kind() == kind) {
            Some(idx) => self.select_tool(idx),
            None => false,
        }
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tools
            .get(self.active)
            .map(|t| t.kind())
            .unwrap_or(ToolKind::Cursor)
    }

    pub fn tools(&self) -> impl Iterator<Item = ToolKind> + '_ {
        self.tools.iter().map(|t| t.kind())
    }

    /// True while the active tool has a gesture running or unflattened pixels.
    pub fn is_busy(&self) -> bool {
        self.tools
            .get(self.active)
            .is_some_and(|t| t.has_pending_work())
    }

    /// The active tool's selection, if it keeps one.
    pub fn selection(&self) -> Option<ZRect> {
        self.tools.get(self.active).and_then(|t| t.selection())
    }

    // ---- style --------------------------------------------------------------

    pub fn style(&self) -> &StyleSettings {
        &self.style
    }

    /// Push the current style into both contexts.
    pub fn apply_styles(&mut self) {
        self.live.apply_style(&self.style);
        self.persisted.apply_style(&self.style);
    }

    pub fn set_stroke_color(&mut self, color: &str) -> bool {
        if Color::parse(color).is_none() {
            crate::log_warn!("rejected stroke color '{}'", color);
            return false;
        }
        self.style.stroke.color = color.trim().to_string();
        crate::log_info!("stroke color: {}", self.style.stroke.color);
        self.apply_styles();
        true
    }

    /// `"transparent"` turns filling off.
    pub fn set_fill_color(&mut self, color: &str) -> bool {
        if Color::parse(color).is_none() {
            crate::log_warn!("rejected fill color '{}'", color);
            return false;
        }
        self.style.fill.color = color.trim().to_string();
        crate::log_info!("fill color: {}", self.style.fill.color);
        self.apply_styles();
        true
    }

    pub fn set_stroke_weight(&mut self, weight: f32) -> bool {
        if !(weight.is_finite() && weight > 0.0) {
            crate::log_warn!("rejected stroke weight {}", weight);
            return false;
        }
        self.style.stroke.weight = weight;
        self.apply_styles();
        true
    }

    pub fn set_pixel_weight(&mut self, weight: u32) -> bool {
        if weight == 0 {
            crate::log_warn!("rejected pixel weight 0");
            return false;
        }
        self.style.pixel_weight = weight;
        self.apply_styles();
        true
    }

    pub fn set_font_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            crate::log_warn!("rejected blank font name");
            return false;
        }
        self.style.font.name = name.to_string();
        self.apply_styles();
        true
    }

    pub fn set_font_size(&mut self, size: u32) -> bool {
        if size == 0 {
            crate::log_warn!("rejected font size 0");
            return false;
        }
        self.style.font.size = size;
        self.apply_styles();
        true
    }

    // ---- zoom ---------------------------------------------------------------

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Change the display scale. Non-positive or non-finite values are ignored.
    pub fn set_zoom(&mut self, percent: f32) -> bool {
        if !(percent.is_finite() && percent > 0.0) {
            crate::log_warn!("rejected zoom {}", percent);
            return false;
        }
        if percent != self.zoom {
            crate::log_info!("zoom: {}% -> {}%", self.zoom, percent);
        }
        self.zoom = percent;
        true
    }

    /// On-screen size of the canvas at the current zoom.
    pub fn display_size(&self) -> (f32, f32) {
        let scale = self.zoom / 100.0;
        (self.width() as f32 * scale, self.height() as f32 * scale)
    }

    // ---- surfaces -----------------------------------------------------------

    pub fn live_image(&self) -> &RgbaImage {
        self.live.image()
    }

    /// The committed 1:1 content; what gets exported.
    pub fn persisted_image(&self) -> &RgbaImage {
        self.persisted.image()
    }

    pub fn overlay(&self) -> &TextOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut TextOverlay {
        &mut self.overlay
    }

    /// Blank both surfaces, dropping whatever gesture was in progress.
    pub fn clear_all(&mut self) {
        self.dispatch(|tool, cx| tool.abandon(cx));
        if let Some(tool) = self.tools.get_mut(self.active) {
            tool.tool_selected();
        }
        self.live.clear();
        self.persisted.clear();
        crate::log_info!("canvas cleared");
    }
}

/// `Ok` when both sides lie in `1..=MAX_CANVAS_SIDE`.
pub fn check_canvas_size(width: u32, height: u32) -> Result<(), String> {
    if width == 0 || height == 0 {
        return Err(format!("canvas size must be positive, got {}x{}", width, height));
    }
    if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
        return Err(format!(
            "canvas size {}x{} exceeds the {}px limit",
            width, height, MAX_CANVAS_SIDE
        ));
    }
    Ok(())
}

impl std::fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolbox")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("active", &self.active_tool())
            .field("zoom", &self.zoom)
            .field("style", &self.style)
            .field("pointer", &self.pointer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_cursor_and_defaults() {
        let tb = Toolbox::new(100, 50);
        assert_eq!(tb.active_index(), 0);
        assert_eq!(tb.active_tool(), ToolKind::Cursor);
        assert_eq!(tb.zoom(), 100.0);
        assert_eq!(tb.style(), &StyleSettings::default());
        assert_eq!(tb.tools().count(), 8);
        assert_eq!(tb.persisted_image().dimensions(), (100, 50));
    }

    #[test]
    fn container_size_minus_margins() {
        let tb = Toolbox::for_container(810, 612, DEFAULT_MARGINS);
        assert_eq!((tb.width(), tb.height()), (800, 600));
        let tiny = Toolbox::for_container(4, 4, DEFAULT_MARGINS);
        assert_eq!((tiny.width(), tiny.height()), (1, 1));
    }

    #[test]
    fn oversized_canvas_is_clamped_or_rejected() {
        let tb = Toolbox::new(u32::MAX, 0);
        assert_eq!((tb.width(), tb.height()), (MAX_CANVAS_SIDE, 1));
        assert!(Toolbox::try_new(MAX_CANVAS_SIDE + 1, 10).is_err());
        assert!(Toolbox::try_new(10, 0).is_err());
        assert_eq!(Toolbox::try_new(30, 20).map(|t| (t.width(), t.height())), Ok((30, 20)));
    }

    #[test]
    fn debug_output_names_the_active_tool() {
        let mut tb = Toolbox::new(12, 8);
        tb.select_kind(ToolKind::Circle);
        let dbg = format!("{:?}", tb);
        assert!(dbg.starts_with("Toolbox {"), "{dbg}");
        assert!(dbg.contains("width: 12"), "{dbg}");
        assert!(dbg.contains("Circle"), "{dbg}");
    }

    #[test]
    fn zoom_scales_display_not_buffers() {
        let mut tb = Toolbox::new(200, 100);
        assert!(tb.set_zoom(200.0));
        assert_eq!(tb.display_size(), (400.0, 200.0));
        assert_eq!(tb.live_image().dimensions(), (200, 100));
        assert!(!tb.set_zoom(0.0));
        assert!(!tb.set_zoom(f32::NAN));
        assert_eq!(tb.zoom(), 200.0);
    }

    #[test]
    fn client_coordinates_are_translated_through_zoom() {
        let mut tb = Toolbox::new(100, 100);
        tb.set_canvas_origin(10.0, 20.0);
        tb.set_zoom(200.0);
        tb.pointer_move(110.0, 120.0);
        assert_eq!(tb.pointer_position(), Some(Position::new(50, 50)));
        tb.pointer_left();
        assert_eq!(tb.pointer_position(), None);
    }

    #[test]
    fn setters_reject_bad_input_and_keep_prior_values() {
        let mut tb = Toolbox::new(10, 10);
        assert!(!tb.set_stroke_color(""));
        assert!(!tb.set_stroke_color("nonsense"));
        assert!(!tb.set_fill_color("#12"));
        assert!(!tb.set_stroke_weight(0.0));
        assert!(!tb.set_stroke_weight(-3.0));
        assert!(!tb.set_pixel_weight(0));
        assert!(!tb.set_font_name("   "));
        assert!(!tb.set_font_size(0));
        assert_eq!(tb.style(), &StyleSettings::default());

        assert!(tb.set_stroke_color("#ff0000"));
        assert!(tb.set_fill_color("transparent"));
        assert!(tb.set_stroke_weight(8.0));
        assert!(tb.set_font_name("Tahoma"));
        assert!(tb.set_font_size(32));
        assert_eq!(tb.style().stroke.color, "#ff0000");
        assert_eq!(tb.style().font.descriptor(), "32px Tahoma");
    }

    #[test]
    fn out_of_range_tool_index_is_ignored() {
        let mut tb = Toolbox::new(10, 10);
        assert!(!tb.select_tool(8));
        assert_eq!(tb.active_index(), 0);
        assert!(tb.select_kind(ToolKind::Eraser));
        assert_eq!(tb.active_index(), 7);
    }

    #[test]
    fn style_change_mid_gesture_applies_to_next_preview_only() {
        let mut tb = Toolbox::new(40, 40);
        tb.select_kind(ToolKind::Line);
        tb.pointer_down_at(Position::new(5, 5));
        tb.pointer_move_at(Position::new(35, 5));
        assert_eq!(tb.live_image().get_pixel(20, 5).0, [0, 0, 0, 255]);
        tb.set_stroke_color("blue");
        tb.pointer_move_at(Position::new(35, 5));
        assert_eq!(tb.live_image().get_pixel(20, 5).0, [0, 0, 255, 255]);
        tb.pointer_up_at(Position::new(35, 5));
        assert_eq!(tb.persisted_image().get_pixel(20, 5).0, [0, 0, 255, 255]);
    }

    #[test]
    fn clear_all_wipes_both_surfaces() {
        let mut tb = Toolbox::new(20, 20);
        tb.select_kind(ToolKind::Pencil);
        tb.pointer_down_at(Position::new(10, 10));
        tb.pointer_up_at(Position::new(10, 10));
        assert_eq!(tb.persisted_image().get_pixel(10, 10).0[3], 255);
        tb.pointer_down_at(Position::new(3, 3));
        tb.clear_all();
        assert!(tb.persisted_image().pixels().all(|p| p.0[3] == 0));
        assert!(tb.live_image().pixels().all(|p| p.0[3] == 0));
        assert!(!tb.is_busy());
    }

    #[test]
    fn selection_is_reported_for_the_cursor_only() {
        let mut tb = Toolbox::new(50, 50);
        tb.pointer_down_at(Position::new(10, 10));
        tb.pointer_move_at(Position::new(20, 30));
        tb.pointer_up_at(Position::new(20, 30));
        assert_eq!(tb.selection(), Some(ZRect::new(10, 10, 10, 20)));
        tb.select_kind(ToolKind::Pencil);
        assert_eq!(tb.selection(), None);
        tb.select_kind(ToolKind::Cursor);
        assert_eq!(tb.selection(), None);
    }
}
