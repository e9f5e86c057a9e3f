//! Style settings shared by every tool, and the CSS-like color strings they
//! are expressed in.

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255, 255]);
    pub const TRANSPARENT: Color = Color([0, 0, 0, 0]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b, 255])
    }

    pub fn alpha(&self) -> u8 {
        self.0[3]
    }

    pub fn is_transparent(&self) -> bool {
        self.0[3] == 0
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.0;
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }

    /// Parse a CSS color: hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`),
    /// `rgb()` / `rgba()` functional notation, or a named color.
    /// Returns `None` for empty or malformed input.
    pub fn parse(input: &str) -> Option<Color> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_functional(args);
        }
        named(&lower)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        4 => Some(Color([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?])),
        6 => Some(Color([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Color([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

fn parse_functional(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v: f32 = s.parse().ok()?;
        Some(v.round().clamp(0.0, 255.0) as u8)
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(a) => {
            let v: f32 = a.parse().ok()?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Color([r, g, b, a]))
}

/// Named colors the style chrome and gesture scripts may use.
fn named(name: &str) -> Option<Color> {
    let c = match name {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "lime" => Color::rgb(0, 255, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "maroon" => Color::rgb(128, 0, 0),
        "olive" => Color::rgb(128, 128, 0),
        "navy" => Color::rgb(0, 0, 128),
        "purple" => Color::rgb(128, 0, 128),
        "teal" => Color::rgb(0, 128, 128),
        "orange" => Color::rgb(255, 165, 0),
        "pink" => Color::rgb(255, 192, 203),
        "brown" => Color::rgb(165, 42, 42),
        _ => return None,
    };
    Some(c)
}

/// Sentinel fill color meaning "do not fill".
pub const NO_FILL: &str = "transparent";

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub weight: f32,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: "black".to_string(),
            weight: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fill {
    pub color: String,
}

impl Default for Fill {
    fn default() -> Self {
        Self {
            color: NO_FILL.to_string(),
        }
    }
}

impl Fill {
    pub fn is_transparent(&self) -> bool {
        self.color.trim().eq_ignore_ascii_case(NO_FILL)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub name: String,
    /// Pixel size.
    pub size: u32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            name: "Arial".to_string(),
            size: 24,
        }
    }
}

impl FontSpec {
    /// Context font descriptor, e.g. `"24px Arial"`.
    pub fn descriptor(&self) -> String {
        format!("{}px {}", self.size, self.name)
    }
}

/// Current drawing style. One instance lives for the whole session inside the
/// [`Toolbox`](crate::toolbox::Toolbox); tools read it on every draw call, so an
/// edit applies to the next stroke and never to pixels already committed.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSettings {
    pub stroke: Stroke,
    pub fill: Fill,
    pub font: FontSpec,
    /// Radius used by the pencil stamp and half-side of the eraser square.
    pub pixel_weight: u32,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            stroke: Stroke::default(),
            fill: Fill::default(),
            font: FontSpec::default(),
            pixel_weight: 2,
        }
    }
}

impl StyleSettings {
    pub fn stroke_rgba(&self) -> Color {
        Color::parse(&self.stroke.color).unwrap_or(Color::BLACK)
    }

    pub fn fill_rgba(&self) -> Color {
        Color::parse(&self.fill.color).unwrap_or(Color::TRANSPARENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Color::parse("#000000"), Some(Color::BLACK));
        assert_eq!(Color::parse("#ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#f00"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#ff000080"), Some(Color([255, 0, 0, 128])));
        assert_eq!(Color::parse(" #FFF "), Some(Color::WHITE));
    }

    #[test]
    fn parses_functional_and_named() {
        assert_eq!(Color::parse("rgb(10, 20, 30)"), Some(Color::rgb(10, 20, 30)));
        assert_eq!(Color::parse("RGBA(0,0,0,0)"), Some(Color::TRANSPARENT));
        assert_eq!(Color::parse("Black"), Some(Color::BLACK));
        assert_eq!(Color::parse("transparent"), Some(Color::TRANSPARENT));
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "   ", "#", "#12", "#gggggg", "rgb(1,2)", "rgb(a,b,c)", "notacolor"] {
            assert_eq!(Color::parse(bad), None, "{bad:?} should not parse");
        }
    }

    #[test]
    fn hex_round_trips_through_parse() {
        let c = Color([18, 52, 86, 255]);
        assert_eq!(c.to_hex(), "#123456");
        assert_eq!(Color::parse(&c.to_hex()), Some(c));
    }

    #[test]
    fn defaults_match_toolbox_startup() {
        let s = StyleSettings::default();
        assert_eq!(s.stroke.color, "black");
        assert_eq!(s.stroke.weight, 2.0);
        assert!(s.fill.is_transparent());
        assert_eq!(s.font.descriptor(), "24px Arial");
        assert_eq!(s.pixel_weight, 2);
        assert_eq!(s.stroke_rgba(), Color::BLACK);
        assert!(s.fill_rgba().is_transparent());
    }
}
