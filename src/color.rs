//! Colour decoding and the logistic blend used for grid cells.

use rgb::RGB8;

use crate::partition::PairBucket;

pub const WHITE: RGB8 = RGB8 {
    r: 0xff,
    g: 0xff,
    b: 0xff,
};

// fallback colours for data sources without an explicit colour
const SOURCE_PALETTE: [u32; 8] = [
    0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2, 0x17becf,
];

/// Unpacks a 24-bit `0xRRGGBB` category code.
pub fn category_rgb(code: u32) -> RGB8 {
    RGB8::new(
        ((code >> 16) & 0xff) as u8,
        ((code >> 8) & 0xff) as u8,
        (code & 0xff) as u8,
    )
}

pub fn palette_color(idx: usize) -> u32 {
    SOURCE_PALETTE[idx % SOURCE_PALETTE.len()]
}

/// Logistic saturation of the covered fraction of a cell.
///
/// `2 / (1 + exp(-k * total / pair_area)) - 1` is 0 for an empty cell and
/// approaches 1 as coverage grows; `k` is the user's colour-scale setting.
pub fn intensity(color_scale: f64, total_area: f64, pair_area: f64) -> f64 {
    if pair_area <= 0.0 {
        return 0.0;
    }
    2.0 / (1.0 + (-color_scale * total_area / pair_area).exp()) - 1.0
}

/// Fades `base` toward white by `1 - intensity`.
pub fn blend(base: RGB8, intensity: f64) -> RGB8 {
    let intensity = intensity.clamp(0.0, 1.0);
    let whiteness = ((1.0 - intensity) * 255.0).round();
    let channel = |c: u8| ((f64::from(c) * intensity).round() + whiteness).clamp(0.0, 255.0) as u8;
    RGB8::new(channel(base.r), channel(base.g), channel(base.b))
}

/// Fill colour of a grid cell: its dominant category faded by coverage.
pub fn cell_color(bucket: &PairBucket, pair_area: f64, color_scale: f64) -> RGB8 {
    match bucket.dominant_category() {
        None => WHITE,
        Some(category) => {
            let alpha = intensity(color_scale, bucket.total_area() as f64, pair_area);
            blend(category_rgb(category), alpha)
        }
    }
}

pub fn hex_color_string(code: u32) -> String {
    format!("#{:06x}", code & 0x00ff_ffff)
}

pub fn rgb_color_string(c: RGB8) -> String {
    format!("rgb({},{},{})", c.r, c.g, c.b)
}
