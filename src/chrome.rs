// ============================================================================
// STYLE CHROME: preset menus, the single open popup, the zoom control
// ============================================================================

use crate::toolbox::Toolbox;

pub const STROKE_WEIGHTS: [f32; 5] = [2.0, 4.0, 6.0, 8.0, 10.0];
pub const PIXEL_WEIGHTS: [u32; 6] = [1, 2, 4, 6, 8, 10];
pub const FONT_NAMES: [&str; 6] = [
    "Arial",
    "Arial Black",
    "Comic Sans MS",
    "Tahoma",
    "Courier New",
    "Lucida Console",
];
pub const FONT_SIZES: [u32; 8] = [12, 16, 20, 24, 28, 32, 36, 40];

/// One style change the chrome can request.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleAction {
    Font(String),
    FontSize(u32),
    StrokeWeight(f32),
    PixelWeight(u32),
    StrokeColor(String),
    FillColor(String),
}

impl StyleAction {
    /// Route to the matching toolbox setter. Returns `false` when the toolbox
    /// rejected the value.
    pub fn apply(&self, toolbox: &mut Toolbox) -> bool {
        match self {
            StyleAction::Font(name) => toolbox.set_font_name(name),
            StyleAction::FontSize(size) => toolbox.set_font_size(*size),
            StyleAction::StrokeWeight(w) => toolbox.set_stroke_weight(*w),
            StyleAction::PixelWeight(w) => toolbox.set_pixel_weight(*w),
            StyleAction::StrokeColor(c) => toolbox.set_stroke_color(c),
            StyleAction::FillColor(c) => toolbox.set_fill_color(c),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MenuItem {
    pub label: String,
    pub action: StyleAction,
}

/// The dropdown menus of the style bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleMenu {
    Font,
    FontSize,
    StrokeWeight,
    PixelWeight,
}

impl StyleMenu {
    pub fn all() -> &'static [StyleMenu] {
        &[
            StyleMenu::Font,
            StyleMenu::FontSize,
            StyleMenu::StrokeWeight,
            StyleMenu::PixelWeight,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            StyleMenu::Font => "Font",
            StyleMenu::FontSize => "Size",
            StyleMenu::StrokeWeight => "Stroke",
            StyleMenu::PixelWeight => "Pixel",
        }
    }

    pub fn items(&self) -> Vec<MenuItem> {
        match self {
            StyleMenu::Font => FONT_NAMES
                .iter()
                .map(|name| MenuItem {
                    label: name.to_string(),
                    action: StyleAction::Font(name.to_string()),
                })
                .collect(),
            StyleMenu::FontSize => FONT_SIZES
                .iter()
                .map(|&size| MenuItem {
                    label: format!("{}px", size),
                    action: StyleAction::FontSize(size),
                })
                .collect(),
            StyleMenu::StrokeWeight => STROKE_WEIGHTS
                .iter()
                .map(|&w| MenuItem {
                    label: format!("{}", w),
                    action: StyleAction::StrokeWeight(w),
                })
                .collect(),
            StyleMenu::PixelWeight => PIXEL_WEIGHTS
                .iter()
                .map(|&w| MenuItem {
                    label: format!("{}", w),
                    action: StyleAction::PixelWeight(w),
                })
                .collect(),
        }
    }

    /// Label of the item matching the toolbox's current style, if any.
    pub fn current_label(&self, toolbox: &Toolbox) -> String {
        let style = toolbox.style();
        match self {
            StyleMenu::Font => style.font.name.clone(),
            StyleMenu::FontSize => format!("{}px", style.font.size),
            StyleMenu::StrokeWeight => format!("{}", style.stroke.weight),
            StyleMenu::PixelWeight => format!("{}", style.pixel_weight),
        }
    }
}

/// Owner of the one popup that may be open at a time. Opening a menu
/// replaces whatever was open; a click anywhere outside closes it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PopupSlot {
    current: Option<(StyleMenu, (f32, f32))>,
}

impl PopupSlot {
    /// Open `menu` with its top-left corner at `anchor` (screen pixels).
    pub fn open(&mut self, menu: StyleMenu, anchor: (f32, f32)) {
        self.current = Some((menu, anchor));
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    /// Open `menu`, or close it if it is the one already open.
    pub fn toggle(&mut self, menu: StyleMenu, anchor: (f32, f32)) {
        if self.current.is_some_and(|(m, _)| m == menu) {
            self.close();
        } else {
            self.open(menu, anchor);
        }
    }

    pub fn current(&self) -> Option<StyleMenu> {
        self.current.map(|(m, _)| m)
    }

    pub fn anchor(&self) -> Option<(f32, f32)> {
        self.current.map(|(_, a)| a)
    }

    /// Apply the picked item and close the popup.
    pub fn choose(&mut self, item: &MenuItem, toolbox: &mut Toolbox) -> bool {
        self.close();
        item.action.apply(toolbox)
    }
}

pub const ZOOM_DEFAULT: f32 = 100.0;
pub const ZOOM_MIN: f32 = 25.0;
pub const ZOOM_MAX: f32 = 400.0;

/// Slider plus free-text field for the zoom percentage.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomControl {
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomControl {
    fn default() -> Self {
        Self {
            value: ZOOM_DEFAULT,
            min: ZOOM_MIN,
            max: ZOOM_MAX,
        }
    }
}

impl ZoomControl {
    pub fn new(value: f32, min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: value.clamp(min, max),
            min,
            max,
        }
    }

    /// The slider always applies.
    pub fn set_from_slider(&mut self, value: f32, toolbox: &mut Toolbox) {
        self.value = value.clamp(self.min, self.max);
        toolbox.set_zoom(self.value);
    }

    /// The text field applies only an in-range number. On rejection the
    /// slider's value is returned so the field can be reset to it.
    pub fn set_from_text(&mut self, text: &str, toolbox: &mut Toolbox) -> Result<f32, f32> {
        match text.trim().parse::<f32>() {
            Ok(v) if v >= self.min && v <= self.max => {
                self.value = v;
                toolbox.set_zoom(v);
                Ok(v)
            }
            _ => Err(self.value),
        }
    }
}
