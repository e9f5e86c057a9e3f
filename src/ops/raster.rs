// ============================================================================
// Coverage-mask rasterizer
// ============================================================================
//
// Every primitive (pencil stamp, stroked segment, outline, filled polygon,
// glyph) first accumulates a single-channel coverage mask over its clamped
// bounding box, then the surface composites the mask with one color. Using
// max() when accumulating keeps overlapping pieces of one primitive (polyline
// joints, dashes) from double-blending.

use rayon::prelude::*;

/// Single-channel coverage in `[0, 1]` over a canvas-clamped box.
#[derive(Clone, Debug)]
pub struct CoverageMask {
    pub x0: i32,
    pub y0: i32,
    pub w: u32,
    pub h: u32,
    data: Vec<f32>,
}

impl CoverageMask {
    /// Allocate a mask covering `[min, max]` (canvas coords, padded by one
    /// pixel for anti-aliasing), clamped to the canvas.
    /// Returns `None` when nothing of the box lies on the canvas.
    pub fn new(min: (f32, f32), max: (f32, f32), canvas_w: u32, canvas_h: u32) -> Option<Self> {
        if !(min.0.is_finite() && min.1.is_finite() && max.0.is_finite() && max.1.is_finite()) {
            return None;
        }
        let x0 = ((min.0 - 1.0).floor() as i32).max(0);
        let y0 = ((min.1 - 1.0).floor() as i32).max(0);
        let x1 = ((max.0 + 1.0).ceil() as i32).min(canvas_w as i32);
        let y1 = ((max.1 + 1.0).ceil() as i32).min(canvas_h as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let w = (x1 - x0) as u32;
        let h = (y1 - y0) as u32;
        Some(Self {
            x0,
            y0,
            w,
            h,
            data: vec![0.0; w as usize * h as usize],
        })
    }

    /// Mask covering the bounding box of `points`, grown by `pad`.
    pub fn around(points: &[(f32, f32)], pad: f32, canvas_w: u32, canvas_h: u32) -> Option<Self> {
        let (min, max) = bounds_of(points)?;
        Self::new(
            (min.0 - pad, min.1 - pad),
            (max.0 + pad, max.1 + pad),
            canvas_w,
            canvas_h,
        )
    }

    /// Coverage at canvas pixel `(x, y)`; zero outside the mask.
    pub fn get(&self, x: i32, y: i32) -> f32 {
        let lx = x - self.x0;
        let ly = y - self.y0;
        if lx < 0 || ly < 0 || lx >= self.w as i32 || ly >= self.h as i32 {
            return 0.0;
        }
        self.data[ly as usize * self.w as usize + lx as usize]
    }

    /// Raise the coverage of canvas pixel `(x, y)` to at least `cov`.
    pub fn cover(&mut self, x: i32, y: i32, cov: f32) {
        let lx = x - self.x0;
        let ly = y - self.y0;
        if lx < 0 || ly < 0 || lx >= self.w as i32 || ly >= self.h as i32 {
            return;
        }
        let idx = ly as usize * self.w as usize + lx as usize;
        if cov > self.data[idx] {
            self.data[idx] = cov.min(1.0);
        }
    }

    /// Row-major coverage rows, for compositing.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.w as usize)
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&c| c <= 0.001)
    }

    /// Filled disc; pixel centres sit at `+0.5`.
    pub fn stamp_disc(&mut self, cx: f32, cy: f32, radius: f32, anti_alias: bool) {
        let (x0, y0, x1, y1) = self.local_span(cx - radius, cy - radius, cx + radius, cy + radius);
        for y in y0..y1 {
            let py = y as f32 + 0.5;
            for x in x0..x1 {
                let px = x as f32 + 0.5;
                let d = ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt() - radius;
                self.cover(x, y, edge_coverage(d, anti_alias));
            }
        }
    }

    /// Thick segment with round caps (a capsule of half-width `half_w`).
    pub fn stamp_segment(&mut self, a: (f32, f32), b: (f32, f32), half_w: f32, anti_alias: bool) {
        let (x0, y0, x1, y1) = self.local_span(
            a.0.min(b.0) - half_w,
            a.1.min(b.1) - half_w,
            a.0.max(b.0) + half_w,
            a.1.max(b.1) + half_w,
        );
        for y in y0..y1 {
            let py = y as f32 + 0.5;
            for x in x0..x1 {
                let px = x as f32 + 0.5;
                let d = distance_to_segment(px, py, a, b) - half_w;
                self.cover(x, y, edge_coverage(d, anti_alias));
            }
        }
    }

    /// Stroke every consecutive pair of `points`, plus the closing edge when
    /// `closed`. With a non-empty `dash` pattern only the "on" runs are drawn.
    pub fn stroke_polyline(
        &mut self,
        points: &[(f32, f32)],
        closed: bool,
        half_w: f32,
        dash: &[f32],
        anti_alias: bool,
    ) {
        for (a, b) in dash_segments(points, closed, dash) {
            self.stamp_segment(a, b, half_w, anti_alias);
        }
    }

    /// Even-odd scanline fill sampled at pixel centres. Edges are left hard;
    /// the stroke drawn on top supplies the soft border.
    pub fn fill_polygon(&mut self, points: &[(f32, f32)]) {
        if points.len() < 3 {
            return;
        }
        let mut crossings: Vec<f32> = Vec::with_capacity(8);
        for ly in 0..self.h as i32 {
            let y = self.y0 + ly;
            let yc = y as f32 + 0.5;
            crossings.clear();
            let n = points.len();
            let mut j = n - 1;
            for i in 0..n {
                let (xi, yi) = points[i];
                let (xj, yj) = points[j];
                if (yi <= yc && yc < yj) || (yj <= yc && yc < yi) {
                    crossings.push(xi + (yc - yi) / (yj - yi) * (xj - xi));
                }
                j = i;
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                let start = (pair[0] - 0.5).ceil() as i32;
                let end = (pair[1] - 0.5).ceil() as i32;
                for x in start.max(self.x0)..end.min(self.x0 + self.w as i32) {
                    self.cover(x, y, 1.0);
                }
            }
        }
    }

    /// Clamp a canvas-space box to this mask, returning canvas pixel ranges.
    fn local_span(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (i32, i32, i32, i32) {
        let x0 = ((min_x - 1.0).floor() as i32).max(self.x0);
        let y0 = ((min_y - 1.0).floor() as i32).max(self.y0);
        let x1 = ((max_x + 1.0).ceil() as i32).min(self.x0 + self.w as i32);
        let y1 = ((max_y + 1.0).ceil() as i32).min(self.y0 + self.h as i32);
        (x0, y0, x1, y1)
    }
}

/// Source-over blend of `color` through `mask` into a straight-alpha RGBA buffer.
pub fn composite_mask(buf: &mut [u8], buf_w: u32, mask: &CoverageMask, color: [u8; 4]) {
    if color[3] == 0 {
        return;
    }
    let row_bytes = buf_w as usize * 4;
    let start = mask.y0 as usize * row_bytes;
    let end = start + mask.h as usize * row_bytes;
    let src_a_base = color[3] as f32 / 255.0;
    let x0 = mask.x0 as usize;

    buf[start..end]
        .par_chunks_mut(row_bytes)
        .zip(mask.data.par_chunks(mask.w as usize))
        .for_each(|(row, cov_row)| {
            for (i, &cov) in cov_row.iter().enumerate() {
                if cov <= 0.001 {
                    continue;
                }
                let idx = (x0 + i) * 4;
                blend_over(&mut row[idx..idx + 4], color, src_a_base * cov);
            }
        });
}

/// Straight-alpha source-over of one pixel.
#[inline]
fn blend_over(dst: &mut [u8], color: [u8; 4], sa: f32) {
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let v = (color[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Sample an ellipse inscribed in the box spanned by `(x, y)` and
/// `(x + w, y + h)`. θ advances by `step` from 0 and stops short of 2π; the
/// caller closes the path explicitly.
pub fn ellipse_points(x: f32, y: f32, w: f32, h: f32, step: f32) -> Vec<(f32, f32)> {
    let rx = w / 2.0;
    let ry = h / 2.0;
    let cx = x + rx;
    let cy = y + ry;
    let step = if step > 0.0 { step } else { 0.01 };
    let count = (std::f32::consts::TAU / step).ceil() as usize;
    (0..count)
        .map(|i| i as f32 * step)
        .take_while(|&t| t < std::f32::consts::TAU)
        .map(|t| (cx + rx * t.cos(), cy + ry * t.sin()))
        .collect()
}

/// Corner points of the rectangle spanned by `(x, y)` and `(x + w, y + h)`.
pub fn rect_points(x: f32, y: f32, w: f32, h: f32) -> [(f32, f32); 4] {
    [(x, y), (x + w, y), (x + w, y + h), (x, y + h)]
}

/// Split a polyline into drawable segments honouring a dash pattern.
/// An empty pattern (or one that sums to zero) yields every edge whole.
pub fn dash_segments(
    points: &[(f32, f32)],
    closed: bool,
    dash: &[f32],
) -> Vec<((f32, f32), (f32, f32))> {
    let mut edges: Vec<((f32, f32), (f32, f32))> = points.windows(2).map(|w| (w[0], w[1])).collect();
    if closed && points.len() > 2 {
        edges.push((points[points.len() - 1], points[0]));
    }
    if points.len() == 1 {
        edges.push((points[0], points[0]));
    }

    let pattern: Vec<f32> = dash.iter().copied().filter(|d| *d >= 0.0).collect();
    let period: f32 = pattern.iter().sum();
    if pattern.is_empty() || period <= 0.0 {
        return edges;
    }
    // An odd-length dash list repeats itself, as on an HTML canvas.
    let pattern = if pattern.len() % 2 == 1 {
        [pattern.clone(), pattern].concat()
    } else {
        pattern
    };

    let mut out = Vec::new();
    let mut dash_idx = 0usize;
    let mut remaining = pattern[0];
    for (a, b) in edges {
        let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        if len <= f32::EPSILON {
            continue;
        }
        let mut t = 0.0f32;
        while t < len {
            let run = remaining.min(len - t);
            if dash_idx % 2 == 0 && run > 0.0 {
                let p = |d: f32| (a.0 + (b.0 - a.0) * d / len, a.1 + (b.1 - a.1) * d / len);
                out.push((p(t), p(t + run)));
            }
            t += run;
            remaining -= run;
            if remaining <= f32::EPSILON {
                dash_idx = (dash_idx + 1) % pattern.len();
                remaining = pattern[dash_idx];
            }
        }
    }
    out
}

fn bounds_of(points: &[(f32, f32)]) -> Option<((f32, f32), (f32, f32))> {
    let first = *points.first()?;
    let mut min = first;
    let mut max = first;
    for &(x, y) in &points[1..] {
        min.0 = min.0.min(x);
        min.1 = min.1.min(y);
        max.0 = max.0.max(x);
        max.1 = max.1.max(y);
    }
    Some((min, max))
}

#[inline]
fn distance_to_segment(px: f32, py: f32, a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((px - a.0) * dx + (py - a.1) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let cx = a.0 + t * dx;
    let cy = a.1 + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

/// Coverage from a signed distance (negative = inside).
#[inline]
fn edge_coverage(d: f32, anti_alias: bool) -> f32 {
    if anti_alias {
        smoothstep(0.5, -0.5, d)
    } else if d <= 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Smoothstep between edge0 and edge1.
#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_is_clamped_to_canvas() {
        let m = CoverageMask::new((-20.0, -20.0), (5.0, 5.0), 10, 10).unwrap();
        assert_eq!((m.x0, m.y0), (0, 0));
        assert_eq!((m.w, m.h), (6, 6));
        assert!(CoverageMask::new((50.0, 50.0), (60.0, 60.0), 10, 10).is_none());
    }

    #[test]
    fn disc_covers_centre_not_far_pixels() {
        let mut m = CoverageMask::new((0.0, 0.0), (20.0, 20.0), 32, 32).unwrap();
        m.stamp_disc(10.0, 10.0, 2.0, false);
        assert_eq!(m.get(9, 9), 1.0);
        assert_eq!(m.get(10, 10), 1.0);
        assert_eq!(m.get(13, 10), 0.0);
        assert_eq!(m.get(10, 14), 0.0);
    }

    #[test]
    fn polygon_fill_is_half_open_on_pixel_centres() {
        let mut m = CoverageMask::new((0.0, 0.0), (20.0, 10.0), 32, 32).unwrap();
        m.fill_polygon(&rect_points(0.0, 0.0, 20.0, 10.0));
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(19, 9), 1.0);
        assert_eq!(m.get(20, 5), 0.0);
        assert_eq!(m.get(5, 10), 0.0);
    }

    #[test]
    fn dashes_alternate_on_and_off() {
        let segs = dash_segments(&[(0.0, 0.0), (20.0, 0.0)], false, &[5.0, 5.0]);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], ((0.0, 0.0), (5.0, 0.0)));
        assert_eq!(segs[1], ((10.0, 0.0), (15.0, 0.0)));
    }

    #[test]
    fn empty_dash_pattern_keeps_edges() {
        let pts = rect_points(0.0, 0.0, 4.0, 4.0);
        assert_eq!(dash_segments(&pts, true, &[]).len(), 4);
        assert_eq!(dash_segments(&pts, false, &[]).len(), 3);
    }

    #[test]
    fn ellipse_sampling_stays_below_full_turn() {
        let pts = ellipse_points(0.0, 0.0, 20.0, 10.0, 0.01);
        assert_eq!(pts.len(), 629);
        let (x, y) = pts[0];
        assert!((x - 20.0).abs() < 1e-4 && (y - 5.0).abs() < 1e-4);
        for &(x, y) in &pts {
            assert!((-0.01..=20.01).contains(&x));
            assert!((-0.01..=10.01).contains(&y));
        }
    }

    #[test]
    fn composite_blends_opaque_color() {
        let mut buf = vec![0u8; 4 * 4 * 4];
        let mut m = CoverageMask::new((0.0, 0.0), (4.0, 4.0), 4, 4).unwrap();
        m.cover(1, 2, 1.0);
        composite_mask(&mut buf, 4, &m, [255, 0, 0, 255]);
        let idx = (2 * 4 + 1) * 4;
        assert_eq!(&buf[idx..idx + 4], &[255, 0, 0, 255]);
        assert_eq!(&buf[0..4], &[0, 0, 0, 0]);
    }
}
