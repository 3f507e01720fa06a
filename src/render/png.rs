use std::path::Path;

use line_drawing::Bresenham;
use log::{debug, info};
use rgb::{RGB8, RGBA8};

use super::{Paint, Scene, Shape};
use crate::error::Result;
use crate::geom::Rect;

/// Rasterizes the visible groups of `scene` onto a white RGBA canvas.
///
/// Axis labels are vector-only and are left out of the raster; their hover
/// boxes are still drawn.
pub fn rasterize(scene: &Scene) -> Vec<RGBA8> {
    let w = scene.width as usize;
    let h = scene.height as usize;
    let mut px = vec![RGBA8::new(0xff, 0xff, 0xff, 0xff); w * h];
    let mut labels = 0;
    for group in scene.visible_groups() {
        for shape in &group.shapes {
            match shape {
                Shape::Rect {
                    rect,
                    fill,
                    stroke,
                    ..
                } => {
                    let r = scene.transform.apply_rect(*rect);
                    if let Some(paint) = fill {
                        fill_rect(&mut px, w, h, r, *paint);
                    }
                    if let Some(color) = stroke {
                        stroke_rect(&mut px, w, h, r, *color);
                    }
                }
                Shape::Label { .. } => labels += 1,
            }
        }
    }
    if labels > 0 {
        debug!("Skipped {} text labels in raster output", labels);
    }
    px
}

pub fn write_png(scene: &Scene, path: &Path) -> Result<()> {
    let px = rasterize(scene);
    lodepng::encode32_file(path, &px, scene.width as usize, scene.height as usize)?;
    info!(
        "Wrote {}x{} PNG to {}",
        scene.width,
        scene.height,
        path.display()
    );
    Ok(())
}

// pixel span [lo, hi) covered by [start, end), at least one pixel wide,
// clipped to [0, limit)
fn span(start: f64, end: f64, limit: usize) -> Option<(usize, usize)> {
    let lo = start.floor();
    let hi = end.ceil().max(lo + 1.0);
    let lo = lo.max(0.0);
    let hi = hi.min(limit as f64);
    if hi <= lo {
        None
    } else {
        Some((lo as usize, hi as usize))
    }
}

fn blend_pixel(dst: &mut RGBA8, src: RGB8, alpha: f64) {
    let mix = |s: u8, d: u8| (f64::from(s) * alpha + f64::from(d) * (1.0 - alpha)).round() as u8;
    dst.r = mix(src.r, dst.r);
    dst.g = mix(src.g, dst.g);
    dst.b = mix(src.b, dst.b);
}

fn fill_rect(px: &mut [RGBA8], w: usize, h: usize, r: Rect, paint: Paint) {
    let alpha = paint.opacity.clamp(0.0, 1.0);
    if alpha == 0.0 {
        return;
    }
    let (x0, x1) = match span(r.x, r.max_x(), w) {
        Some(s) => s,
        None => return,
    };
    let (y0, y1) = match span(r.y, r.max_y(), h) {
        Some(s) => s,
        None => return,
    };
    for y in y0..y1 {
        for p in &mut px[y * w + x0..y * w + x1] {
            blend_pixel(p, paint.color, alpha);
        }
    }
}

fn stroke_rect(px: &mut [RGBA8], w: usize, h: usize, r: Rect, color: RGB8) {
    // edges beyond the canvas are pinned just outside it so they never plot
    let clamp_x = |x: f64| x.round().clamp(-1.0, w as f64) as i64;
    let clamp_y = |y: f64| y.round().clamp(-1.0, h as f64) as i64;
    let (x0, x1) = (clamp_x(r.x), clamp_x(r.max_x()));
    let (y0, y1) = (clamp_y(r.y), clamp_y(r.max_y()));
    let edges = [
        ((x0, y0), (x1, y0)),
        ((x1, y0), (x1, y1)),
        ((x1, y1), (x0, y1)),
        ((x0, y1), (x0, y0)),
    ];
    for &(from, to) in edges.iter() {
        for (x, y) in Bresenham::new(from, to) {
            if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
                continue;
            }
            let p = &mut px[y as usize * w + x as usize];
            *p = RGBA8::new(color.r, color.g, color.b, 0xff);
        }
    }
}
