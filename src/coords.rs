use crate::geom::Rect;
use crate::record::IntervalRecord;

/// Linear map from genome coordinates (bp) to chart pixels.
///
/// `[0, genome_length]` maps onto `[margin, extent]`, leaving the margin free
/// for axis labels. Grid cells, detail rectangles and zoom transforms all go
/// through the same mapper so their edges line up at every zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    genome_length: u64,
    extent: f64,
    margin: f64,
}

impl CoordinateMapper {
    pub fn new(genome_length: u64, extent: f64, margin: f64) -> Self {
        CoordinateMapper {
            genome_length,
            extent,
            margin,
        }
    }

    pub fn genome_length(&self) -> u64 {
        self.genome_length
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Pixels per base pair.
    fn factor(&self) -> f64 {
        if self.genome_length == 0 {
            0.0
        } else {
            (self.extent - self.margin) / self.genome_length as f64
        }
    }

    /// Pixel length of `length` base pairs.
    pub fn scale(&self, length: f64) -> f64 {
        length * self.factor()
    }

    /// Pixel position of genome position `pos`.
    pub fn translate(&self, pos: f64) -> f64 {
        self.scale(pos) + self.margin
    }

    /// Genome position under pixel `px`, the inverse of [`translate`](Self::translate).
    pub fn position_at(&self, px: f64) -> Option<f64> {
        let factor = self.factor();
        if factor <= 0.0 {
            return None;
        }
        Some((px - self.margin) / factor)
    }

    pub fn record_rect(&self, record: &IntervalRecord) -> Rect {
        Rect::new(
            self.translate(record.prox_start as f64),
            self.translate(record.dist_start as f64),
            self.scale(record.prox_len() as f64),
            self.scale(record.dist_len() as f64),
        )
    }
}
