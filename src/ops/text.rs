use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::ops::raster::CoverageMask;

/// Resolved fonts keyed by lower-cased family name. `None` records a family
/// that could not be loaded so the system is not queried again on every stroke.
static FONT_CACHE: OnceLock<Mutex<HashMap<String, Option<FontArc>>>> = OnceLock::new();

/// Split a context font descriptor such as `"24px Arial Black"` into
/// `(size, family)`. Returns `None` for anything without a positive `px` size.
pub fn parse_font_descriptor(descriptor: &str) -> Option<(f32, String)> {
    let descriptor = descriptor.trim();
    let (size, family) = descriptor.split_once(char::is_whitespace)?;
    let size: f32 = size.strip_suffix("px")?.parse().ok()?;
    let family = family.trim();
    if size <= 0.0 || !size.is_finite() || family.is_empty() {
        return None;
    }
    Some((size, family.to_string()))
}

/// Look up a font family, falling back to the system sans-serif face.
/// Results (including failures) are cached for the session.
pub fn resolve_font(family: &str) -> Option<FontArc> {
    let key = family.to_lowercase();
    let cache = FONT_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    if let Ok(map) = cache.lock()
        && let Some(hit) = map.get(&key)
    {
        return hit.clone();
    }

    let loaded = load_system_font(family);
    if loaded.is_none() {
        crate::log_warn!("no usable system font for family '{}'", family);
    }
    if let Ok(mut map) = cache.lock() {
        map.insert(key, loaded.clone());
    }
    loaded
}

/// Load a font by family name from the system, trying the generic
/// sans-serif family when the named one is missing.
pub fn load_system_font(family: &str) -> Option<FontArc> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    let source = SystemSource::new();
    let handle = source
        .select_best_match(
            &[FamilyName::Title(family.to_string()), FamilyName::SansSerif],
            &Properties::new(),
        )
        .ok()?;

    let font_data = handle.load().ok()?;
    let font_data_copy = font_data.copy_font_data()?;
    let bytes: Vec<u8> = (*font_data_copy).clone();
    FontArc::try_from_vec(bytes).ok()
}

/// Lay out one line left-aligned at x = 0 on a baseline at y = 0.
/// Returns the positioned glyphs and the line's advance width.
pub fn layout_line(font: &FontArc, text: &str, font_size: f32) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(font_size);
    let mut glyphs = Vec::with_capacity(text.len());
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }
    (glyphs, cursor_x)
}

/// Rasterize `text` into a coverage mask. `(origin_x, baseline_y)` is the
/// start of the first line's baseline; `'\n'` starts a new line one line
/// height lower. Returns `None` when nothing lands on the canvas.
pub fn rasterize_text(
    font: &FontArc,
    text: &str,
    font_size: f32,
    origin_x: f32,
    baseline_y: f32,
    canvas_w: u32,
    canvas_h: u32,
    anti_alias: bool,
) -> Option<CoverageMask> {
    let line_height = font.as_scaled(font_size).height();

    let mut placed: Vec<(GlyphId, f32, f32)> = Vec::new();
    for (line_idx, line) in text.split('\n').enumerate() {
        let y = baseline_y + line_idx as f32 * line_height;
        let (glyphs, _) = layout_line(font, line, font_size);
        placed.extend(glyphs.into_iter().map(|(id, x)| (id, origin_x + x, y)));
    }

    let outlined: Vec<_> = placed
        .into_iter()
        .filter_map(|(id, x, y)| font.outline_glyph(id.with_scale_and_position(font_size, point(x, y))))
        .collect();
    if outlined.is_empty() {
        return None;
    }

    let mut min = (f32::MAX, f32::MAX);
    let mut max = (f32::MIN, f32::MIN);
    for g in &outlined {
        let b = g.px_bounds();
        min = (min.0.min(b.min.x), min.1.min(b.min.y));
        max = (max.0.max(b.max.x), max.1.max(b.max.y));
    }

    let mut mask = CoverageMask::new(min, max, canvas_w, canvas_h)?;
    for g in &outlined {
        let b = g.px_bounds();
        let bx = b.min.x as i32;
        let by = b.min.y as i32;
        g.draw(|px, py, cov| {
            let v = if anti_alias {
                cov
            } else if cov > 0.5 {
                1.0
            } else {
                0.0
            };
            mask.cover(bx + px as i32, by + py as i32, v);
        });
    }
    Some(mask)
}
