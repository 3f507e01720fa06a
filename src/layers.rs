//! The three drawable layers of the matrix view: chromosome-pair grid,
//! axis labels, and per-record detail rectangles ("uniquities").

use std::fmt;
use std::str::FromStr;

use rgb::RGB8;
use serde::Deserialize;

use crate::color::{category_rgb, cell_color};
use crate::coords::CoordinateMapper;
use crate::geom::{Point, Rect};
use crate::genome::Genome;
use crate::partition::Partition;
use crate::reconcile::KeyedLayer;
use crate::record::IntervalRecord;

/// Which chromosome pairs get a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridLayout {
    /// Every `(i, j)` pair.
    Full,
    /// Only pairs with `i <= j`, the proximal chromosome never after the distal one.
    Triangular,
}

impl Default for GridLayout {
    fn default() -> Self {
        GridLayout::Full
    }
}

impl GridLayout {
    pub fn includes(&self, i: usize, j: usize) -> bool {
        match self {
            GridLayout::Full => true,
            GridLayout::Triangular => i <= j,
        }
    }
}

impl FromStr for GridLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(GridLayout::Full),
            "triangular" => Ok(GridLayout::Triangular),
            _ => Err(format!("unknown grid layout: {}", s)),
        }
    }
}

impl fmt::Display for GridLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridLayout::Full => write!(f, "full"),
            GridLayout::Triangular => write!(f, "triangular"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub prox: usize,
    pub dist: usize,
    pub rect: Rect,
    pub fill: RGB8,
}

/// Lays out one cell per chromosome pair admitted by `layout`. Fills are
/// white until [`color_grid`] runs.
pub fn draw_grid(genome: &Genome, mapper: &CoordinateMapper, layout: GridLayout) -> Vec<GridCell> {
    let chroms = genome.chromosomes();
    let mut cells = Vec::new();
    for prox in chroms {
        for dist in chroms {
            if !layout.includes(prox.rank, dist.rank) {
                continue;
            }
            cells.push(GridCell {
                prox: prox.rank,
                dist: dist.rank,
                rect: Rect::new(
                    mapper.translate(prox.offset as f64),
                    mapper.translate(dist.offset as f64),
                    mapper.scale(prox.length as f64),
                    mapper.scale(dist.length as f64),
                ),
                fill: crate::color::WHITE,
            });
        }
    }
    cells
}

/// Recolours every cell from its bucket's dominant category and coverage.
pub fn color_grid(cells: &mut [GridCell], partition: &Partition, genome: &Genome, color_scale: f64) {
    for cell in cells.iter_mut() {
        cell.fill = match partition.bucket(cell.prox, cell.dist) {
            Some(bucket) => cell_color(bucket, genome.pair_area(cell.prox, cell.dist), color_scale),
            None => crate::color::WHITE,
        };
    }
}

/// Finds the cell under a point given in untransformed chart pixels.
pub fn cell_at<'a>(cells: &'a [GridCell], p: Point) -> Option<&'a GridCell> {
    cells.iter().find(|c| c.rect.contains(p))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub axis: Axis,
    pub chrom: usize,
    pub text: String,
    // the label's hover box, `margin` thick along the axis
    pub rect: Rect,
    pub anchor: Point,
}

pub fn draw_axes(genome: &Genome, mapper: &CoordinateMapper) -> Vec<AxisLabel> {
    let margin = mapper.margin();
    let mut labels = Vec::with_capacity(genome.len() * 2);
    for chrom in genome.chromosomes() {
        let start = mapper.translate(chrom.offset as f64);
        let len = mapper.scale(chrom.length as f64);
        labels.push(AxisLabel {
            axis: Axis::X,
            chrom: chrom.rank,
            text: chrom.name.clone(),
            rect: Rect::new(start, 0.0, len, margin),
            anchor: Point::new(start + len / 2.0, 0.0),
        });
    }
    for chrom in genome.chromosomes() {
        let start = mapper.translate(chrom.offset as f64);
        let len = mapper.scale(chrom.length as f64);
        labels.push(AxisLabel {
            axis: Axis::Y,
            chrom: chrom.rank,
            text: chrom.name.clone(),
            rect: Rect::new(0.0, start, margin, len),
            anchor: Point::new(0.0, start + len / 2.0),
        });
    }
    labels
}

/// How detail rectangles are painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailStyle {
    /// Each record in its own category colour, opaque.
    ByCategory,
    /// All records in one source colour; translucent so that overlapping
    /// records from several samples build up.
    SingleSource { color: u32, opacity: f64 },
}

impl DetailStyle {
    pub fn single_source(color: u32, num_samples: usize) -> Self {
        DetailStyle::SingleSource {
            color,
            opacity: 1.0 / num_samples.max(1) as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Uniquity {
    pub rect: Rect,
    pub fill: RGB8,
    pub opacity: f64,
    pub record: IntervalRecord,
    pub sample: Option<String>,
}

impl Uniquity {
    pub fn new(
        record: &IntervalRecord,
        sample: Option<&str>,
        mapper: &CoordinateMapper,
        style: DetailStyle,
    ) -> Self {
        let (fill, opacity) = match style {
            DetailStyle::ByCategory => (category_rgb(record.category), 1.0),
            DetailStyle::SingleSource { color, opacity } => (category_rgb(color), opacity),
        };
        Uniquity {
            rect: mapper.record_rect(record),
            fill,
            opacity,
            record: *record,
            sample: sample.map(String::from),
        }
    }

    /// Tooltip text: sample, then start and size of both ranges in bp.
    pub fn describe(&self) -> String {
        let r = &self.record;
        let mut text = String::new();
        if let Some(sample) = &self.sample {
            text.push_str(&format!("Sample: {}\n", sample));
        }
        text.push_str(&format!(
            "Proximal start: {}\nProximal size: {}\nDistal start: {}\nDistal size: {}",
            r.prox_start,
            r.prox_len(),
            r.dist_start,
            r.dist_len()
        ));
        text
    }
}

/// The topmost detail rectangle under a point given in untransformed chart
/// pixels.
pub fn uniquity_at(layer: &KeyedLayer<Uniquity>, p: Point) -> Option<(&str, &Uniquity)> {
    layer.iter().filter(|(_, u)| u.rect.contains(p)).last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Strategy;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn genome() -> Genome {
        Genome::new(vec![("1", 60), ("2", 40)]).unwrap()
    }

    #[fixture]
    fn mapper(genome: Genome) -> CoordinateMapper {
        CoordinateMapper::new(genome.genome_length(), 110.0, 10.0)
    }

    #[rstest]
    #[case(GridLayout::Full, 4)]
    #[case(GridLayout::Triangular, 3)]
    fn test_grid_layouts(
        genome: Genome,
        mapper: CoordinateMapper,
        #[case] layout: GridLayout,
        #[case] cells: usize,
    ) {
        let grid = draw_grid(&genome, &mapper, layout);
        assert_eq!(grid.len(), cells);
        assert!(grid.iter().all(|c| layout.includes(c.prox, c.dist)));
    }

    #[rstest]
    fn test_grid_geometry(genome: Genome, mapper: CoordinateMapper) {
        let grid = draw_grid(&genome, &mapper, GridLayout::Full);
        let cell = grid.iter().find(|c| c.prox == 1 && c.dist == 0).unwrap();
        assert_eq!(cell.rect, Rect::new(70.0, 10.0, 40.0, 60.0));
        assert_eq!(cell_at(&grid, Point::new(75.0, 20.0)).map(|c| (c.prox, c.dist)), Some((1, 0)));
        assert!(cell_at(&grid, Point::new(5.0, 5.0)).is_none());
    }

    #[rstest]
    fn test_color_grid(genome: Genome, mapper: CoordinateMapper) {
        let records = vec![IntervalRecord::from([0x00ff00, 0, 60, 0, 60])];
        let partition = Partition::build(&records, &genome, Strategy::Sweep);
        let mut grid = draw_grid(&genome, &mapper, GridLayout::Full);
        color_grid(&mut grid, &partition, &genome, 10_000.0);
        let full = grid.iter().find(|c| c.prox == 0 && c.dist == 0).unwrap();
        assert_eq!(full.fill, RGB8::new(0, 255, 0));
        let empty = grid.iter().find(|c| c.prox == 1 && c.dist == 1).unwrap();
        assert_eq!(empty.fill, crate::color::WHITE);
    }

    #[rstest]
    fn test_axes(genome: Genome, mapper: CoordinateMapper) {
        let axes = draw_axes(&genome, &mapper);
        assert_eq!(axes.len(), 4);
        let y2 = axes.iter().find(|l| l.axis == Axis::Y && l.chrom == 1).unwrap();
        assert_eq!(y2.text, "2");
        assert_eq!(y2.rect, Rect::new(0.0, 70.0, 10.0, 40.0));
        assert_eq!(y2.anchor, Point::new(0.0, 90.0));
    }

    #[rstest]
    fn test_uniquity_styles(mapper: CoordinateMapper) {
        let record = IntervalRecord::from([0xff0000, 10, 20, 30, 35]);
        let u = Uniquity::new(&record, None, &mapper, DetailStyle::ByCategory);
        assert_eq!(u.fill, RGB8::new(255, 0, 0));
        assert_eq!(u.opacity, 1.0);
        assert_eq!(u.rect, Rect::new(20.0, 40.0, 10.0, 5.0));

        let u = Uniquity::new(&record, None, &mapper, DetailStyle::single_source(0x0000ff, 4));
        assert_eq!(u.fill, RGB8::new(0, 0, 255));
        assert_eq!(u.opacity, 0.25);
    }

    #[rstest]
    fn test_describe(mapper: CoordinateMapper) {
        let record = IntervalRecord::from([0xff0000, 10, 20, 30, 35]);
        let u = Uniquity::new(&record, Some("PWK_PhJ"), &mapper, DetailStyle::ByCategory);
        assert_eq!(
            u.describe(),
            "Sample: PWK_PhJ\nProximal start: 10\nProximal size: 10\nDistal start: 30\nDistal size: 5"
        );
        let u = Uniquity::new(&record, None, &mapper, DetailStyle::ByCategory);
        assert!(u.describe().starts_with("Proximal start: 10\n"));
    }

    #[rstest]
    fn test_uniquity_at_picks_topmost(mapper: CoordinateMapper) {
        let records = vec![
            IntervalRecord::from([0xff0000, 0, 40, 0, 40]),
            IntervalRecord::from([0x00ff00, 10, 20, 10, 20]),
        ];
        let mut layer = KeyedLayer::default();
        layer.update_from(&records, IntervalRecord::key, |r| {
            Uniquity::new(r, None, &mapper, DetailStyle::ByCategory)
        });
        // record 2 spans pixels [20, 30) and is drawn last
        assert_eq!(uniquity_at(&layer, Point::new(25.0, 25.0)).map(|(k, _)| k), Some("10:10"));
        assert_eq!(uniquity_at(&layer, Point::new(12.0, 12.0)).map(|(k, _)| k), Some("0:0"));
        assert!(uniquity_at(&layer, Point::new(55.0, 55.0)).is_none());
    }
}
