// ============================================================================
// SURFACE: RGBA RASTER PLUS 2D CONTEXT STATE
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

use crate::geometry::ZRect;
use crate::ops::raster::{self, CoverageMask};
use crate::ops::text;
use crate::style::{Color, StyleSettings};

/// Context properties that `save()` / `restore()` push and pop.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextState {
    pub line_width: f32,
    pub stroke_color: Color,
    pub fill_color: Color,
    /// Font descriptor, e.g. `"24px Arial"`.
    pub font: String,
    /// Alternating on/off lengths; empty means solid.
    pub line_dash: Vec<f32>,
    pub anti_alias: bool,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            stroke_color: Color::BLACK,
            fill_color: Color::BLACK,
            font: "10px sans-serif".to_string(),
            line_dash: Vec::new(),
            anti_alias: true,
        }
    }
}

/// A fixed-size drawing surface. Both the live and the persisted canvas are
/// one of these; pixels are straight-alpha RGBA and start fully transparent.
#[derive(Clone)]
pub struct Surface {
    pixels: RgbaImage,
    pub state: ContextState,
    saved: Vec<ContextState>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width.max(1), height.max(1)),
            state: ContextState::default(),
            saved: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    // ---- context state ------------------------------------------------------

    pub fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    /// Pop the last saved state; a restore without a matching save is ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    pub fn set_line_dash(&mut self, dash: &[f32]) {
        self.state.line_dash = dash.to_vec();
    }

    /// Push the style settings into the context: line width, colors, font.
    pub fn apply_style(&mut self, style: &StyleSettings) {
        self.state.line_width = style.stroke.weight;
        self.state.stroke_color = style.stroke_rgba();
        self.state.fill_color = style.fill_rgba();
        self.state.font = style.font.descriptor();
    }

    // ---- pixel I/O ----------------------------------------------------------

    /// Full copy of the pixel buffer.
    pub fn get_image_data(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Copy of a rectangular region; the parts outside the surface read as
    /// transparent. Negative extents are normalised first.
    pub fn get_region(&self, rect: ZRect) -> RgbaImage {
        let b = rect.normalize();
        let w = b.width().max(0) as u32;
        let h = b.height().max(0) as u32;
        let mut out = RgbaImage::new(w, h);
        for y in 0..h {
            let sy = b.top + y as i32;
            if sy < 0 || sy >= self.height() as i32 {
                continue;
            }
            for x in 0..w {
                let sx = b.left + x as i32;
                if sx < 0 || sx >= self.width() as i32 {
                    continue;
                }
                out.put_pixel(x, y, *self.pixels.get_pixel(sx as u32, sy as u32));
            }
        }
        out
    }

    /// Replace pixels at `(dx, dy)` with `src`, without blending. Clipped to
    /// the surface.
    pub fn put_image_data(&mut self, src: &RgbaImage, dx: i32, dy: i32) {
        let (sw, sh) = src.dimensions();
        let x_start = dx.max(0);
        let x_end = (dx + sw as i32).min(self.width() as i32);
        if x_end <= x_start {
            return;
        }
        let y_start = dy.max(0);
        let y_end = (dy + sh as i32).min(self.height() as i32);
        let row_bytes = self.width() as usize * 4;
        let src_row_bytes = sw as usize * 4;
        let src_raw = src.as_raw();
        let span = (x_end - x_start) as usize * 4;
        let src_x = (x_start - dx) as usize * 4;
        let dst_x = x_start as usize * 4;
        let dst: &mut [u8] = &mut self.pixels;

        for y in y_start..y_end {
            let src_off = (y - dy) as usize * src_row_bytes + src_x;
            let dst_off = y as usize * row_bytes + dst_x;
            dst[dst_off..dst_off + span].copy_from_slice(&src_raw[src_off..src_off + span]);
        }
    }

    /// Replace the whole buffer with another surface's pixels. Sizes are
    /// expected to match; a mismatched source is clipped.
    pub fn copy_from(&mut self, other: &Surface) {
        if other.pixels.dimensions() == self.pixels.dimensions() {
            let src = other.pixels.as_raw();
            let row_bytes = self.width() as usize * 4;
            self.pixels
                .par_chunks_mut(row_bytes)
                .zip(src.par_chunks(row_bytes))
                .for_each(|(dst, src)| dst.copy_from_slice(src));
        } else {
            self.clear();
            self.put_image_data(&other.pixels, 0, 0);
        }
    }

    // ---- clearing -----------------------------------------------------------

    pub fn clear(&mut self) {
        self.pixels.par_chunks_mut(4).for_each(|p| p.fill(0));
    }

    /// Set every pixel of the rectangle to transparent. Negative extents are
    /// normalised; the rectangle is clipped to the surface.
    pub fn clear_rect(&mut self, rect: ZRect) {
        let b = rect.normalize();
        let x0 = b.left.max(0);
        let x1 = b.right.min(self.width() as i32);
        let y0 = b.top.max(0);
        let y1 = b.bottom.min(self.height() as i32);
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        let row_bytes = self.width() as usize * 4;
        let span = x0 as usize * 4..x1 as usize * 4;
        self.pixels
            .par_chunks_mut(row_bytes)
            .enumerate()
            .filter(|(y, _)| (y0 as usize..y1 as usize).contains(y))
            .for_each(|(_, row)| row[span.clone()].fill(0));
    }

    // ---- drawing ------------------------------------------------------------

    /// Filled circle in an explicit color (the pencil stamps with the stroke
    /// color without touching the context's fill color).
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        let Some(mut mask) = CoverageMask::new(
            (cx - radius, cy - radius),
            (cx + radius, cy + radius),
            self.width(),
            self.height(),
        ) else {
            return;
        };
        mask.stamp_disc(cx, cy, radius, self.state.anti_alias);
        self.composite(&mask, color);
    }

    /// Stroke an open or closed polyline with the current line width, dash
    /// pattern and stroke color.
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], closed: bool) {
        let half_w = (self.state.line_width * 0.5).max(0.5);
        let Some(mut mask) = CoverageMask::around(points, half_w, self.width(), self.height()) else {
            return;
        };
        mask.stroke_polyline(points, closed, half_w, &self.state.line_dash, self.state.anti_alias);
        self.composite(&mask, self.state.stroke_color);
    }

    pub fn stroke_segment(&mut self, a: (f32, f32), b: (f32, f32)) {
        self.stroke_polyline(&[a, b], false);
    }

    /// Fill a closed polygon with the context's fill color.
    pub fn fill_polygon(&mut self, points: &[(f32, f32)]) {
        let Some(mut mask) = CoverageMask::around(points, 0.0, self.width(), self.height()) else {
            return;
        };
        mask.fill_polygon(points);
        self.composite(&mask, self.state.fill_color);
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.stroke_polyline(&raster::rect_points(x, y, w, h), true);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.fill_polygon(&raster::rect_points(x, y, w, h));
    }

    /// Draw text with the context font; `(x, y)` is the first baseline's start.
    /// Silently draws nothing when the descriptor or font cannot be resolved.
    pub fn fill_text(&mut self, content: &str, x: f32, y: f32, color: Color) {
        if content.trim().is_empty() {
            return;
        }
        let Some((size, family)) = text::parse_font_descriptor(&self.state.font) else {
            crate::log_warn!("unusable font descriptor '{}'", self.state.font);
            return;
        };
        let Some(font) = text::resolve_font(&family) else {
            return;
        };
        if let Some(mask) = text::rasterize_text(
            &font,
            content,
            size,
            x,
            y,
            self.width(),
            self.height(),
            self.state.anti_alias,
        ) {
            self.composite(&mask, color);
        }
    }

    fn composite(&mut self, mask: &CoverageMask, color: Color) {
        let w = self.width();
        raster::composite_mask(&mut self.pixels, w, mask, color.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, c: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba(c))
    }

    #[test]
    fn new_surface_is_transparent() {
        let s = Surface::new(8, 4);
        assert!(s.image().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn put_image_data_replaces_without_blending_and_clips() {
        let mut s = Surface::new(10, 10);
        s.put_image_data(&solid(4, 4, [0, 0, 255, 255]), 8, -2);
        assert_eq!(s.pixel(8, 0), [0, 0, 255, 255]);
        assert_eq!(s.pixel(9, 1), [0, 0, 255, 255]);
        assert_eq!(s.pixel(9, 2), [0, 0, 0, 0]);
        assert_eq!(s.pixel(7, 0), [0, 0, 0, 0]);

        s.put_image_data(&solid(1, 1, [0, 0, 0, 0]), 8, 0);
        assert_eq!(s.pixel(8, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn clear_rect_accepts_negative_extent() {
        let mut s = Surface::new(10, 10);
        s.put_image_data(&solid(10, 10, [9, 9, 9, 255]), 0, 0);
        s.clear_rect(ZRect::new(6, 6, -4, -4));
        assert_eq!(s.pixel(2, 2), [0, 0, 0, 0]);
        assert_eq!(s.pixel(5, 5), [0, 0, 0, 0]);
        assert_eq!(s.pixel(6, 6), [9, 9, 9, 255]);
        assert_eq!(s.pixel(1, 1), [9, 9, 9, 255]);
    }

    #[test]
    fn get_region_reads_outside_as_transparent() {
        let mut s = Surface::new(4, 4);
        s.put_image_data(&solid(4, 4, [1, 2, 3, 255]), 0, 0);
        let r = s.get_region(ZRect::new(2, 2, 4, 4));
        assert_eq!(r.dimensions(), (4, 4));
        assert_eq!(r.get_pixel(0, 0).0, [1, 2, 3, 255]);
        assert_eq!(r.get_pixel(3, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn save_restore_round_trips_dash_and_width() {
        let mut s = Surface::new(4, 4);
        s.state.line_width = 6.0;
        s.save();
        s.set_line_dash(&[5.0, 5.0]);
        s.state.line_width = 1.0;
        s.restore();
        assert_eq!(s.state.line_width, 6.0);
        assert!(s.state.line_dash.is_empty());
        // Unbalanced restore leaves state alone.
        s.restore();
        assert_eq!(s.state.line_width, 6.0);
    }

    #[test]
    fn apply_style_sets_context_properties() {
        let mut style = StyleSettings::default();
        style.stroke.color = "#00ff00".into();
        style.stroke.weight = 6.0;
        style.fill.color = "red".into();
        style.font.size = 32;
        let mut s = Surface::new(4, 4);
        s.apply_style(&style);
        assert_eq!(s.state.stroke_color, Color::rgb(0, 255, 0));
        assert_eq!(s.state.fill_color, Color::rgb(255, 0, 0));
        assert_eq!(s.state.line_width, 6.0);
        assert_eq!(s.state.font, "32px Arial");
    }

    #[test]
    fn fill_rect_then_stroke_rect() {
        let mut s = Surface::new(40, 40);
        s.state.fill_color = Color::rgb(255, 0, 0);
        s.state.line_width = 2.0;
        s.fill_rect(0.0, 0.0, 20.0, 10.0);
        s.stroke_rect(0.0, 0.0, 20.0, 10.0);
        assert_eq!(s.pixel(10, 5), [255, 0, 0, 255]);
        assert_eq!(s.pixel(0, 5), [0, 0, 0, 255]);
        assert_eq!(s.pixel(30, 30), [0, 0, 0, 0]);
    }

    #[test]
    fn copy_from_replaces_everything() {
        let mut a = Surface::new(6, 6);
        let mut b = Surface::new(6, 6);
        a.fill_circle(3.0, 3.0, 2.0, Color::BLACK);
        b.put_image_data(&solid(6, 6, [7, 7, 7, 255]), 0, 0);
        b.copy_from(&a);
        assert_eq!(b.image(), a.image());
    }
}
