// ============================================================================
// APPLICATION SETTINGS: key=value file in the user's config directory
// ============================================================================

use std::path::{Path, PathBuf};

use crate::chrome::{ZOOM_DEFAULT, ZOOM_MAX, ZOOM_MIN};
use crate::style::StyleSettings;
use crate::toolbox::{Toolbox, DEFAULT_MARGINS};

const SETTINGS_FILE: &str = "zpaint_settings.cfg";

/// Settings that persist across sessions
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    pub stroke_color: String,
    pub stroke_weight: f32,
    /// `"transparent"` = no fill
    pub fill_color: String,
    pub font_name: String,
    pub font_size: u32,
    pub pixel_weight: u32,
    /// Zoom percent shown at startup
    pub zoom: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Space taken by the chrome around the canvas, `(horizontal, vertical)`
    pub margins: (u32, u32),
    /// Fixed canvas size; 0 means "fill the window"
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        let style = StyleSettings::default();
        Self {
            stroke_color: style.stroke.color,
            stroke_weight: style.stroke.weight,
            fill_color: style.fill.color,
            font_name: style.font.name,
            font_size: style.font.size,
            pixel_weight: style.pixel_weight,
            zoom: ZOOM_DEFAULT,
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,
            margins: DEFAULT_MARGINS,
            canvas_width: 0,
            canvas_height: 0,
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/zpaint/zpaint_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\ZPaint\zpaint_settings.cfg
    /// On macOS:   ~/Library/Application Support/ZPaint/zpaint_settings.cfg
    /// Fallback:   same directory as the executable.
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("zpaint");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join(SETTINGS_FILE));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .unwrap_or_default();
            let config_dir = PathBuf::from(appdata).join("ZPaint");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join(SETTINGS_FILE));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("ZPaint");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join(SETTINGS_FILE));
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join(SETTINGS_FILE)))
        }
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "stroke_color={}\n\
             stroke_weight={}\n\
             fill_color={}\n\
             font_name={}\n\
             font_size={}\n\
             pixel_weight={}\n\
             zoom={}\n\
             zoom_min={}\n\
             zoom_max={}\n\
             margin_x={}\n\
             margin_y={}\n\
             canvas_width={}\n\
             canvas_height={}\n",
            self.stroke_color,
            self.stroke_weight,
            self.fill_color,
            self.font_name,
            self.font_size,
            self.pixel_weight,
            self.zoom,
            self.zoom_min,
            self.zoom_max,
            self.margins.0,
            self.margins.1,
            self.canvas_width,
            self.canvas_height,
        )
    }

    /// Parse settings text. Missing, unknown or malformed lines keep their
    /// defaults.
    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "stroke_color" if !val.is_empty() => s.stroke_color = val.to_string(),
                "fill_color" if !val.is_empty() => s.fill_color = val.to_string(),
                "font_name" if !val.is_empty() => s.font_name = val.to_string(),
                "stroke_weight" => {
                    if let Ok(v) = val.parse::<f32>()
                        && v.is_finite()
                        && v > 0.0
                    {
                        s.stroke_weight = v;
                    }
                }
                "font_size" => s.font_size = positive(val).unwrap_or(s.font_size),
                "pixel_weight" => s.pixel_weight = positive(val).unwrap_or(s.pixel_weight),
                "zoom" => s.zoom = val.parse().unwrap_or(s.zoom),
                "zoom_min" => s.zoom_min = val.parse().unwrap_or(s.zoom_min),
                "zoom_max" => s.zoom_max = val.parse().unwrap_or(s.zoom_max),
                "margin_x" => s.margins.0 = val.parse().unwrap_or(s.margins.0),
                "margin_y" => s.margins.1 = val.parse().unwrap_or(s.margins.1),
                "canvas_width" => s.canvas_width = val.parse().unwrap_or(0),
                "canvas_height" => s.canvas_height = val.parse().unwrap_or(0),
                _ => {}
            }
        }
        if !(s.zoom_min > 0.0 && s.zoom_min <= s.zoom_max) {
            s.zoom_min = ZOOM_MIN;
            s.zoom_max = ZOOM_MAX;
        }
        if !s.zoom.is_finite() {
            s.zoom = ZOOM_DEFAULT;
        }
        s.zoom = s.zoom.clamp(s.zoom_min, s.zoom_max);
        s
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        std::fs::write(path, self.to_config_string())
            .map_err(|e| format!("Cannot write settings to '{}': {}", path.display(), e))
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read settings from '{}': {}", path.display(), e))?;
        Ok(Self::from_config_str(&content))
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = self.save_to(&path) {
            crate::log_warn!("{}", e);
        }
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        Self::load_from(&path).unwrap_or_default()
    }

    /// Push the stored style and zoom into a toolbox. Values the toolbox
    /// rejects are skipped.
    pub fn apply_to(&self, toolbox: &mut Toolbox) {
        toolbox.set_stroke_color(&self.stroke_color);
        toolbox.set_stroke_weight(self.stroke_weight);
        toolbox.set_fill_color(&self.fill_color);
        toolbox.set_font_name(&self.font_name);
        toolbox.set_font_size(self.font_size);
        toolbox.set_pixel_weight(self.pixel_weight);
        toolbox.set_zoom(self.zoom);
    }

    /// Take the current style and zoom back from a toolbox.
    pub fn capture(&mut self, toolbox: &Toolbox) {
        let style = toolbox.style();
        self.stroke_color = style.stroke.color.clone();
        self.stroke_weight = style.stroke.weight;
        self.fill_color = style.fill.color.clone();
        self.font_name = style.font.name.clone();
        self.font_size = style.font.size;
        self.pixel_weight = style.pixel_weight;
        self.zoom = toolbox.zoom();
    }
}

fn positive(val: &str) -> Option<u32> {
    val.parse::<u32>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_text_round_trips() {
        let mut s = AppSettings::default();
        s.stroke_color = "#112233".into();
        s.fill_color = "red".into();
        s.font_name = "Comic Sans MS".into();
        s.font_size = 36;
        s.zoom = 150.0;
        s.margins = (4, 8);
        assert_eq!(AppSettings::from_config_str(&s.to_config_string()), s);
    }

    #[test]
    fn bad_lines_keep_defaults() {
        let s = AppSettings::from_config_str(
            "garbage\nfont_size=0\nstroke_weight=-1\npixel_weight=abc\nunknown=1\nstroke_color=\nzoom=9000\n",
        );
        let d = AppSettings::default();
        assert_eq!(s.font_size, d.font_size);
        assert_eq!(s.stroke_weight, d.stroke_weight);
        assert_eq!(s.pixel_weight, d.pixel_weight);
        assert_eq!(s.stroke_color, d.stroke_color);
        assert_eq!(s.zoom, ZOOM_MAX);
    }

    #[test]
    fn inverted_zoom_range_falls_back() {
        let s = AppSettings::from_config_str("zoom_min=300\nzoom_max=50\n");
        assert_eq!((s.zoom_min, s.zoom_max), (ZOOM_MIN, ZOOM_MAX));
    }

    #[test]
    fn apply_and_capture_through_toolbox() {
        let mut s = AppSettings::default();
        s.stroke_color = "blue".into();
        s.pixel_weight = 6;
        s.zoom = 200.0;
        s.font_name = "   ".into();
        let mut tb = Toolbox::new(10, 10);
        s.apply_to(&mut tb);
        assert_eq!(tb.style().stroke.color, "blue");
        assert_eq!(tb.style().pixel_weight, 6);
        assert_eq!(tb.zoom(), 200.0);
        assert_eq!(tb.style().font.name, "Arial");

        let mut back = AppSettings::default();
        back.capture(&tb);
        assert_eq!(back.stroke_color, "blue");
        assert_eq!(back.zoom, 200.0);
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("zpaint_settings_{}.cfg", std::process::id()));
        let mut s = AppSettings::default();
        s.pixel_weight = 10;
        s.save_to(&path).unwrap();
        let back = AppSettings::load_from(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, s);
        assert!(AppSettings::load_from(&path).is_err());
    }
}
