// ============================================================================
// EDITOR WINDOW: tool column, style bar, status bar and the canvas view
// ============================================================================

use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, Stroke, TextureHandle, TextureOptions, Vec2};

use zpaint::chrome::{PopupSlot, StyleAction, StyleMenu, ZoomControl};
use zpaint::export::{self, SaveFormat};
use zpaint::settings::AppSettings;
use zpaint::style::{Color, NO_FILL};
use zpaint::{Key, Toolbox, ToolKind};

const TOOL_COLUMN_WIDTH: f32 = 96.0;
const MARQUEE_COLOR: Color32 = Color32::from_rgb(30, 30, 30);

pub struct ZPaintApp {
    toolbox: Toolbox,
    settings: AppSettings,
    popup: PopupSlot,
    zoom: ZoomControl,
    zoom_text: String,
    /// Texture of the live surface, re-uploaded when its pixels change.
    canvas_texture: Option<TextureHandle>,
    uploaded_generation: u64,
    generation: u64,
    stroke_picker: Color32,
    fill_picker: Color32,
    last_save_error: Option<String>,
    /// Canvas still has to be sized to the first real window frame.
    sized_to_window: bool,
    settings_saved: bool,
}

impl ZPaintApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let fixed_size = settings.canvas_width > 0 && settings.canvas_height > 0;
        let mut toolbox = if fixed_size {
            Toolbox::new(settings.canvas_width, settings.canvas_height)
        } else {
            // Placeholder until the first frame reports the window size.
            Toolbox::new(1, 1)
        };
        settings.apply_to(&mut toolbox);

        let zoom = ZoomControl::new(toolbox.zoom(), settings.zoom_min, settings.zoom_max);
        let zoom_text = format!("{}", zoom.value);
        let stroke_picker = to_color32(&toolbox.style().stroke.color);
        let fill_picker = to_color32(&toolbox.style().fill.color);

        Self {
            toolbox,
            settings,
            popup: PopupSlot::default(),
            zoom,
            zoom_text,
            canvas_texture: None,
            uploaded_generation: 0,
            generation: 1,
            stroke_picker,
            fill_picker,
            last_save_error: None,
            sized_to_window: fixed_size,
            settings_saved: false,
        }
    }

    fn mark_dirty(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Rebuild the toolbox for the container once its size is known.
    fn size_to_window(&mut self, available: Vec2) {
        if self.sized_to_window || available.x < 1.0 || available.y < 1.0 {
            return;
        }
        let mut toolbox = Toolbox::for_container(
            available.x as u32,
            available.y as u32,
            self.settings.margins,
        );
        self.settings.apply_to(&mut toolbox);
        toolbox.set_zoom(self.zoom.value);
        self.toolbox = toolbox;
        self.sized_to_window = true;
        self.mark_dirty();
    }

    fn save_settings(&mut self) {
        if self.settings_saved {
            return;
        }
        self.settings.capture(&self.toolbox);
        self.settings.save();
        self.settings_saved = true;
    }

    fn save_dialog(&mut self) {
        let mut dialog = rfd::FileDialog::new().set_file_name("drawing.png");
        for format in SaveFormat::all() {
            dialog = dialog.add_filter(format.label(), &[format.extension()]);
        }
        let Some(path) = dialog.save_file() else { return };
        let format = SaveFormat::from_path(&path).unwrap_or_default();
        let path = if SaveFormat::from_path(&path).is_none() {
            path.with_extension(format.extension())
        } else {
            path
        };
        self.last_save_error = export::save_image(self.toolbox.persisted_image(), &path, format).err();
    }

    // ---- panels ---------------------------------------------------------------

    fn tool_column(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("tool_column")
            .resizable(false)
            .exact_width(TOOL_COLUMN_WIDTH)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                let active = self.toolbox.active_tool();
                let kinds: Vec<ToolKind> = self.toolbox.tools().collect();
                for kind in kinds {
                    let button = egui::SelectableLabel::new(kind == active, kind.alt_text());
                    let resp = ui.add_sized([TOOL_COLUMN_WIDTH - 12.0, 24.0], button);
                    if resp.on_hover_text(kind.name()).clicked() && self.toolbox.select_kind(kind) {
                        self.mark_dirty();
                    }
                }
            });
    }

    fn style_bar(&mut self, ctx: &egui::Context) {
        let mut opened_now = false;
        egui::TopBottomPanel::top("style_bar")
            .exact_height(32.0)
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::left_to_right(egui::Align::Center), |ui| {
                    for menu in StyleMenu::all() {
                        let text = format!("{}: {}", menu.title(), menu.current_label(&self.toolbox));
                        let resp = ui.button(text);
                        if resp.clicked() {
                            let anchor = resp.rect.left_bottom();
                            self.popup.toggle(*menu, (anchor.x, anchor.y));
                            opened_now = true;
                        }
                    }
                    ui.separator();

                    ui.label("Stroke");
                    if ui.color_edit_button_srgba(&mut self.stroke_picker).changed() {
                        let hex = from_color32(self.stroke_picker).to_hex();
                        StyleAction::StrokeColor(hex).apply(&mut self.toolbox);
                    }

                    ui.label("Fill");
                    if ui.color_edit_button_srgba(&mut self.fill_picker).changed() {
                        let hex = from_color32(self.fill_picker).to_hex();
                        StyleAction::FillColor(hex).apply(&mut self.toolbox);
                    }
                    let no_fill = self.toolbox.style().fill.is_transparent();
                    if ui.selectable_label(no_fill, "No fill").clicked() && !no_fill {
                        StyleAction::FillColor(NO_FILL.to_string()).apply(&mut self.toolbox);
                        self.fill_picker = Color32::TRANSPARENT;
                    }
                });
            });

        self.style_popup(ctx, opened_now);
    }

    fn style_popup(&mut self, ctx: &egui::Context, opened_now: bool) {
        let (Some(menu), Some((x, y))) = (self.popup.current(), self.popup.anchor()) else {
            return;
        };
        let mut picked = None;
        let area = egui::Area::new("style_popup")
            .order(egui::Order::Foreground)
            .fixed_pos(Pos2::new(x, y))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    let current = menu.current_label(&self.toolbox);
                    for item in menu.items() {
                        if ui.selectable_label(item.label == current, item.label.as_str()).clicked() {
                            picked = Some(item);
                        }
                    }
                });
            });
        if let Some(item) = picked {
            self.popup.choose(&item, &mut self.toolbox);
        } else if !opened_now && area.response.clicked_elsewhere() {
            self.popup.close();
        }
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(28.0)
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::left_to_right(egui::Align::Center), |ui| {
                    let coords = match self.toolbox.pointer_position() {
                        Some(p) => format!("x: {}  y: {}", p.x, p.y),
                        None => "x: -  y: -".to_string(),
                    };
                    ui.monospace(coords);
                    ui.separator();

                    ui.label("Zoom");
                    let mut slider_value = self.zoom.value;
                    let slider = egui::Slider::new(&mut slider_value, self.zoom.min..=self.zoom.max)
                        .show_value(false);
                    if ui.add(slider).changed() {
                        self.zoom.set_from_slider(slider_value, &mut self.toolbox);
                        self.zoom_text = format!("{}", self.zoom.value);
                    }
                    let field = ui.add(egui::TextEdit::singleline(&mut self.zoom_text).desired_width(44.0));
                    if field.lost_focus() {
                        let value = match self.zoom.set_from_text(&self.zoom_text, &mut self.toolbox) {
                            Ok(v) | Err(v) => v,
                        };
                        self.zoom_text = format!("{}", value);
                    }
                    ui.label("%");
                    ui.separator();

                    if ui.button("New").clicked() {
                        self.toolbox.clear_all();
                        self.mark_dirty();
                    }
                    if ui.button("Save…").clicked() {
                        self.save_dialog();
                    }
                    if let Some(err) = &self.last_save_error {
                        ui.colored_label(Color32::DARK_RED, err.as_str());
                    }
                });
            });
    }

    fn canvas_view(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame {
                fill: Color32::from_gray(200),
                inner_margin: egui::Margin::same(4.0),
                ..Default::default()
            })
            .show(ctx, |ui| {
                self.size_to_window(ui.available_size());

                let (w, h) = self.toolbox.display_size();
                let sense = egui::Sense::click_and_drag().union(egui::Sense::hover());
                let (rect, response) = ui.allocate_exact_size(Vec2::new(w, h), sense);
                self.toolbox.set_canvas_origin(rect.min.x, rect.min.y);

                self.canvas_input(ctx, &response);
                self.upload_canvas(ui.ctx());

                let painter = ui.painter_at(rect);
                painter.rect_filled(rect, 0.0, Color32::WHITE);
                if let Some(tex) = &self.canvas_texture {
                    painter.image(
                        tex.id(),
                        rect,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
                self.paint_selection(&painter, rect);
            });

        self.text_overlay(ctx);
    }

    fn canvas_input(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let (pressed, released, pos) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
            )
        });
        let inside = pos.is_some_and(|p| response.rect.contains(p));

        if let Some(pos) = pos
            && inside
        {
            let moving = ctx.input(|i| i.pointer.is_moving());
            let phases = pointer_phases(pressed && response.hovered(), released, moving);
            if !phases.is_empty() {
                feed_pointer(&mut self.toolbox, &phases, pos);
                self.mark_dirty();
            }
        } else if self.toolbox.pointer_position().is_some() {
            self.toolbox.pointer_left();
            self.mark_dirty();
        }

        // Keys typed into a focused widget belong to that widget.
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.toolbox.key_down(&Key::Escape);
            self.mark_dirty();
        }
        if !ctx.wants_keyboard_input() {
            for (egui_key, key) in [
                (egui::Key::Delete, Key::Delete),
                (egui::Key::Backspace, Key::Backspace),
            ] {
                if ctx.input(|i| i.key_pressed(egui_key)) {
                    self.toolbox.key_down(&key);
                    self.mark_dirty();
                }
            }
        }
    }

    fn upload_canvas(&mut self, ctx: &egui::Context) {
        if self.canvas_texture.is_some() && self.uploaded_generation == self.generation {
            return;
        }
        let img = self.toolbox.live_image();
        let size = [img.width() as usize, img.height() as usize];
        let color_image = ColorImage::from_rgba_unmultiplied(size, img.as_raw());
        if let Some(tex) = &mut self.canvas_texture {
            tex.set(color_image, TextureOptions::NEAREST);
        } else {
            self.canvas_texture = Some(ctx.load_texture("canvas_live", color_image, TextureOptions::NEAREST));
        }
        self.uploaded_generation = self.generation;
    }

    /// Dashed outline of the cursor tool's selection, drawn over the canvas
    /// rather than into it.
    fn paint_selection(&self, painter: &egui::Painter, canvas: Rect) {
        let Some(sel) = self.toolbox.selection() else { return };
        let b = sel.normalize();
        let scale = self.toolbox.zoom() / 100.0;
        let to_screen = |x: i32, y: i32| {
            Pos2::new(
                canvas.min.x + x as f32 * scale + 0.5,
                canvas.min.y + y as f32 * scale + 0.5,
            )
        };
        let corners = [
            to_screen(b.left, b.top),
            to_screen(b.right, b.top),
            to_screen(b.right, b.bottom),
            to_screen(b.left, b.bottom),
            to_screen(b.left, b.top),
        ];
        let stroke = Stroke::new(1.0, MARQUEE_COLOR);
        painter.extend(egui::Shape::dashed_line(&corners, stroke, 5.0, 5.0));
    }

    fn text_overlay(&mut self, ctx: &egui::Context) {
        if !self.toolbox.overlay().is_open() {
            return;
        }
        let anchor = self.toolbox.overlay().anchor();
        let font_size = self.toolbox.overlay().font().size as f32;
        let (ox, oy) = self.toolbox.canvas_origin();
        let scale = self.toolbox.zoom() / 100.0;
        let screen = Pos2::new(ox + anchor.x as f32 * scale, oy + anchor.y as f32 * scale);
        let wants_focus = self.toolbox.overlay_mut().take_focus_request();

        egui::Area::new("text_overlay")
            .order(egui::Order::Foreground)
            .fixed_pos(screen)
            .show(ctx, |ui| {
                let Some(text) = self.toolbox.overlay_mut().text_mut() else { return };
                let edit = egui::TextEdit::multiline(text)
                    .font(egui::FontId::proportional(font_size * scale))
                    .text_color(Color32::BLACK)
                    .frame(true)
                    .desired_rows(1)
                    .desired_width(200.0);
                let resp = ui.add(edit);
                if wants_focus {
                    resp.request_focus();
                }
            });
    }
}

impl eframe::App for ZPaintApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.save_settings();
        }

        self.tool_column(ctx);
        self.style_bar(ctx);
        self.status_bar(ctx);
        self.canvas_view(ctx);

        if self.toolbox.is_busy() {
            ctx.request_repaint();
        }
    }
}

/// One pointer event derived from a frame's input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Events for one frame, in dispatch order. A quick click can press and
/// release within a single frame; both are delivered so the gesture closes.
fn pointer_phases(pressed: bool, released: bool, moving: bool) -> Vec<PointerPhase> {
    let mut phases = Vec::with_capacity(2);
    if pressed {
        phases.push(PointerPhase::Down);
    }
    if moving && !pressed && !released {
        phases.push(PointerPhase::Move);
    }
    if released {
        phases.push(PointerPhase::Up);
    }
    phases
}

fn feed_pointer(toolbox: &mut Toolbox, phases: &[PointerPhase], pos: Pos2) {
    for phase in phases {
        match phase {
            PointerPhase::Down => toolbox.pointer_down(pos.x, pos.y),
            PointerPhase::Move => toolbox.pointer_move(pos.x, pos.y),
            PointerPhase::Up => toolbox.pointer_up(pos.x, pos.y),
        }
    }
}

fn to_color32(css: &str) -> Color32 {
    let [r, g, b, a] = Color::parse(css).unwrap_or(Color::TRANSPARENT).0;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

fn from_color32(c: Color32) -> Color {
    let [r, g, b, a] = c.to_srgba_unmultiplied();
    Color([r, g, b, a])
}
