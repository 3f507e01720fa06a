//! Application state and the interaction controller.
//!
//! The view is either an overview of every chromosome pair or zoomed into a
//! single pair. Clicking a grid cell zooms in, the zoom-out control returns
//! to the overview; the colour-scale slider and the source selector work in
//! either state and only redraw what is currently visible.

use log::{debug, info, warn};

use crate::config::Config;
use crate::coords::CoordinateMapper;
use crate::error::{PairGenomeError, Result};
use crate::genome::Genome;
use crate::geom::{Point, Transform};
use crate::gesture::{Gesture, PointerEvent, ZoomBehavior};
use crate::layers::{
    cell_at, color_grid, draw_axes, draw_grid, uniquity_at, Axis, AxisLabel, DetailStyle, GridCell,
    Uniquity,
};
use crate::partition::Partition;
use crate::reconcile::{KeyDiff, KeyedLayer};
use crate::record::{DataSource, IntervalRecord};
use crate::render::{Group, Paint, Scene, Shape, BLACK, LIGHT_GREY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Overview,
    Zoomed { prox: usize, dist: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Hover(Option<(usize, usize)>),
    /// Pointer over the detail layer at a canvas position; `None` when it leaves.
    HoverRecord(Option<Point>),
    Click { prox: usize, dist: usize },
    /// A click at a canvas position, hit-tested against the grid.
    ClickAt(Point),
    ZoomOut,
    SetColorScale(f64),
    SelectSource(usize),
    Pointer(PointerEvent),
    Wheel { at: Point, delta_y: f64 },
}

/// Visibility of the page controls around the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub slider_visible: bool,
    pub zoom_out_visible: bool,
}

/// What an event redrew.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Redraw {
    pub grid: bool,
    pub detail: Option<KeyDiff>,
    pub transform: bool,
    pub hover: bool,
}

impl Redraw {
    pub fn is_empty(&self) -> bool {
        *self == Redraw::default()
    }
}

/// How records of the active source are coloured in the detail layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceMode {
    /// Records carry their own category colour.
    Multi,
    /// Every source is drawn in one colour, translucent per sample.
    Single { num_samples: usize, colors: Vec<u32> },
}

pub struct App {
    config: Config,
    genome: Genome,
    mapper: CoordinateMapper,
    sources: Vec<DataSource>,
    source_mode: SourceMode,
    active_source: usize,
    partition: Partition,
    coarse: Vec<IntervalRecord>,
    color_scale: f64,
    mode: ViewMode,
    zoom: Option<ZoomBehavior>,
    hover: Option<(usize, usize)>,
    // key of the detail rectangle under the pointer
    hover_record: Option<String>,
    grid: Vec<GridCell>,
    // grid colours are out of date because it was hidden when they changed
    grid_stale: bool,
    axes: Vec<AxisLabel>,
    detail: KeyedLayer<Uniquity>,
}

impl App {
    /// Builds the overview of the first source. An empty `sources` list
    /// yields an empty but fully functional view.
    pub fn new(config: Config, genome: Genome, mut sources: Vec<DataSource>) -> Result<Self> {
        config.validate()?;
        if sources.is_empty() {
            warn!("No data sources given, rendering an empty matrix");
            sources.push(DataSource::new("empty", Vec::new()));
        }
        let mapper = CoordinateMapper::new(genome.genome_length(), f64::from(config.height), config.margin);
        let grid = draw_grid(&genome, &mapper, config.layout);
        let axes = draw_axes(&genome, &mapper);
        let partition = Partition::build(&sources[0].records, &genome, config.strategy);
        let coarse = sources[0].coarse(config.coarse_cutoff);
        let mut app = App {
            color_scale: config.color_scale,
            config,
            genome,
            mapper,
            sources,
            source_mode: SourceMode::Multi,
            active_source: 0,
            partition,
            coarse,
            mode: ViewMode::Overview,
            zoom: None,
            hover: None,
            hover_record: None,
            grid,
            grid_stale: false,
            axes,
            detail: KeyedLayer::default(),
        };
        app.recolor_grid();
        let coarse = app.coarse.clone();
        app.draw_uniquities(&coarse);
        info!(
            "Initialized {} sources over {} chromosomes, {} coarse records shown",
            app.sources.len(),
            app.genome.len(),
            app.coarse.len()
        );
        Ok(app)
    }

    /// Switches to single-source colouring. Sources without a colour in
    /// `colors` fall back to a palette colour.
    pub fn with_source_mode(mut self, source_mode: SourceMode) -> Self {
        self.source_mode = source_mode;
        let data = self.visible_data();
        self.draw_uniquities(&data);
        self
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn controls(&self) -> Controls {
        let zoomed = self.mode != ViewMode::Overview;
        Controls {
            slider_visible: !zoomed,
            zoom_out_visible: zoomed,
        }
    }

    pub fn transform(&self) -> Transform {
        self.zoom
            .as_ref()
            .map(|z| z.transform())
            .unwrap_or(Transform::IDENTITY)
    }

    pub fn color_scale(&self) -> f64 {
        self.color_scale
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn coarse_data(&self) -> &[IntervalRecord] {
        &self.coarse
    }

    pub fn grid(&self) -> &[GridCell] {
        &self.grid
    }

    pub fn detail(&self) -> &KeyedLayer<Uniquity> {
        &self.detail
    }

    pub fn hovered(&self) -> Option<(usize, usize)> {
        self.hover
    }

    /// The detail rectangle under the pointer, with its key.
    pub fn hovered_record(&self) -> Option<(&str, &Uniquity)> {
        let key = self.hover_record.as_deref()?;
        self.detail.get(key).map(|u| (key, u))
    }

    pub fn num_sources(&self) -> usize {
        self.sources.len()
    }

    pub fn active_source(&self) -> &DataSource {
        &self.sources[self.active_source]
    }

    pub fn handle(&mut self, event: Event) -> Redraw {
        debug!("Handling {:?} in {:?}", event, self.mode);
        match event {
            Event::Hover(pair) => self.hover(pair),
            Event::HoverRecord(at) => self.hover_record(at),
            Event::Click { prox, dist } => self.zoom_to_chrom_pair(prox, dist),
            Event::ClickAt(p) => self.click_at(p),
            Event::ZoomOut => self.zoom_out(),
            Event::SetColorScale(k) => self.set_color_scale(k),
            Event::SelectSource(idx) => match self.select_source(idx) {
                Ok(redraw) => redraw,
                Err(e) => {
                    warn!("{}", e);
                    Redraw::default()
                }
            },
            Event::Pointer(p) => self.pointer(p),
            Event::Wheel { at, delta_y } => self.wheel(at, delta_y),
        }
    }

    pub fn hover(&mut self, pair: Option<(usize, usize)>) -> Redraw {
        if self.mode != ViewMode::Overview {
            return Redraw::default();
        }
        let pair = pair.filter(|&(i, j)| self.has_cell(i, j));
        if pair == self.hover {
            return Redraw::default();
        }
        self.hover = pair;
        Redraw {
            hover: true,
            ..Redraw::default()
        }
    }

    /// Hit-tests the detail layer through the current view transform, in
    /// either view mode.
    pub fn hover_record(&mut self, at: Option<Point>) -> Redraw {
        let content = at.map(|p| self.transform().invert(p));
        let key = content
            .and_then(|p| uniquity_at(&self.detail, p))
            .map(|(k, _)| k.to_string());
        if key == self.hover_record {
            return Redraw::default();
        }
        self.hover_record = key;
        Redraw {
            hover: true,
            ..Redraw::default()
        }
    }

    pub fn click_at(&mut self, p: Point) -> Redraw {
        if self.mode != ViewMode::Overview {
            return Redraw::default();
        }
        let content = self.transform().invert(p);
        match cell_at(&self.grid, content).map(|c| (c.prox, c.dist)) {
            Some((prox, dist)) => self.zoom_to_chrom_pair(prox, dist),
            None => Redraw::default(),
        }
    }

    pub fn zoom_to_chrom_pair(&mut self, prox: usize, dist: usize) -> Redraw {
        if !self.has_cell(prox, dist) {
            warn!("No grid cell for chromosome pair ({}, {})", prox, dist);
            return Redraw::default();
        }
        if self.mode != ViewMode::Overview {
            warn!("Ignoring zoom to ({}, {}) while already zoomed", prox, dist);
            return Redraw::default();
        }
        self.mode = ViewMode::Zoomed { prox, dist };
        self.hover = None;
        self.hover_record = None;
        let data = self.partition.data_for_chrom_pair(prox, dist).to_vec();
        let diff = self.draw_uniquities(&data);
        let transform = self.zoom_transform(prox, dist);
        self.zoom = Some(ZoomBehavior::new(transform));
        info!(
            "Zoomed into {} x {} ({} records)",
            self.genome.chromosomes()[prox].name,
            self.genome.chromosomes()[dist].name,
            data.len()
        );
        Redraw {
            grid: true,
            detail: Some(diff),
            transform: true,
            hover: true,
        }
    }

    pub fn zoom_out(&mut self) -> Redraw {
        if self.mode == ViewMode::Overview {
            warn!("Ignoring zoom out while showing the overview");
            return Redraw::default();
        }
        self.mode = ViewMode::Overview;
        self.zoom = None;
        let had_record = self.hover_record.take().is_some();
        if self.grid_stale {
            self.recolor_grid();
        }
        let coarse = self.coarse.clone();
        let diff = self.draw_uniquities(&coarse);
        debug!("Zoomed out to the overview");
        Redraw {
            grid: true,
            detail: Some(diff),
            transform: true,
            hover: had_record,
        }
    }

    pub fn set_color_scale(&mut self, value: f64) -> Redraw {
        let value = self.config.slider.snap(value);
        if (value - self.color_scale).abs() < f64::EPSILON {
            return Redraw::default();
        }
        self.color_scale = value;
        debug!("Colour scale set to {}", value);
        if self.mode == ViewMode::Overview {
            self.recolor_grid();
            Redraw {
                grid: true,
                ..Redraw::default()
            }
        } else {
            self.grid_stale = true;
            Redraw::default()
        }
    }

    /// Makes source `idx` the active data set, recomputing the pair buckets
    /// and the coarse subset, and redraws the visible layers.
    pub fn select_source(&mut self, idx: usize) -> Result<Redraw> {
        if idx >= self.sources.len() {
            return Err(PairGenomeError::UnknownSource {
                index: idx,
                available: self.sources.len(),
            });
        }
        if idx == self.active_source {
            return Ok(Redraw::default());
        }
        self.active_source = idx;
        let source = &self.sources[idx];
        self.partition = Partition::build(&source.records, &self.genome, self.config.strategy);
        self.coarse = source.coarse(self.config.coarse_cutoff);
        info!("Selected source {} ({} records)", source.name, source.records.len());

        let mut redraw = Redraw::default();
        if self.mode == ViewMode::Overview {
            self.recolor_grid();
            redraw.grid = true;
        } else {
            self.grid_stale = true;
        }
        let data = self.visible_data();
        redraw.detail = Some(self.draw_uniquities(&data));
        Ok(redraw)
    }

    pub fn pointer(&mut self, event: PointerEvent) -> Redraw {
        match self.zoom.as_mut().and_then(|z| z.pointer(event)) {
            Some(_) => Redraw {
                transform: true,
                ..Redraw::default()
            },
            None => Redraw::default(),
        }
    }

    pub fn wheel(&mut self, at: Point, delta_y: f64) -> Redraw {
        match self.zoom.as_mut().and_then(|z| z.wheel(at, delta_y)) {
            Some(_) => Redraw {
                transform: true,
                ..Redraw::default()
            },
            None => Redraw::default(),
        }
    }

    /// The transform that fits chromosome pair `(prox, dist)` to the chart.
    pub fn zoom_transform(&self, prox: usize, dist: usize) -> Transform {
        let chroms = self.genome.chromosomes();
        let genome_length = self.genome.genome_length() as f64;
        let fit = |len: u64| {
            if len == 0 {
                f64::INFINITY
            } else {
                genome_length / len as f64
            }
        };
        let mut scale = fit(chroms[prox].length).min(fit(chroms[dist].length));
        if !scale.is_finite() {
            scale = 1.0;
        }
        Transform::new(
            -self.mapper.translate(chroms[prox].offset as f64) * scale,
            -self.mapper.translate(chroms[dist].offset as f64) * scale,
            scale,
        )
    }

    pub fn scene(&self) -> Scene {
        let overview = self.mode == ViewMode::Overview;
        let hover = if overview { self.hover } else { None };

        let cells = self
            .grid
            .iter()
            .map(|c| Shape::Rect {
                rect: c.rect,
                fill: Some(Paint::solid(c.fill)),
                stroke: if hover == Some((c.prox, c.dist)) {
                    Some(BLACK)
                } else {
                    None
                },
                title: None,
            })
            .collect();
        let hover_record = self.hover_record.as_deref();
        let uniquities = self
            .detail
            .iter()
            .map(|(key, u)| Shape::Rect {
                rect: u.rect,
                fill: Some(Paint {
                    color: u.fill,
                    opacity: u.opacity,
                }),
                stroke: if hover_record == Some(key) {
                    Some(BLACK)
                } else {
                    None
                },
                title: Some(u.describe()),
            })
            .collect();

        let axis_group = |axis: Axis| {
            let highlighted = hover.map(|(i, j)| if axis == Axis::X { i } else { j });
            let mut shapes = Vec::new();
            for label in self.axes.iter().filter(|l| l.axis == axis) {
                shapes.push(Shape::Rect {
                    rect: label.rect,
                    fill: if highlighted == Some(label.chrom) {
                        Some(Paint::solid(LIGHT_GREY))
                    } else {
                        None
                    },
                    stroke: None,
                    title: None,
                });
                shapes.push(Shape::Label {
                    at: label.anchor,
                    text: label.text.clone(),
                    axis,
                });
            }
            shapes
        };

        Scene {
            width: self.config.width,
            height: self.config.height,
            transform: self.transform(),
            groups: vec![
                Group {
                    id: "chrom_group",
                    visible: overview,
                    shapes: cells,
                },
                Group {
                    id: "unique_group",
                    visible: true,
                    shapes: uniquities,
                },
                Group {
                    id: "x-axis",
                    visible: true,
                    shapes: axis_group(Axis::X),
                },
                Group {
                    id: "y-axis",
                    visible: true,
                    shapes: axis_group(Axis::Y),
                },
            ],
        }
    }

    fn has_cell(&self, prox: usize, dist: usize) -> bool {
        prox < self.genome.len() && dist < self.genome.len() && self.config.layout.includes(prox, dist)
    }

    fn visible_data(&self) -> Vec<IntervalRecord> {
        match self.mode {
            ViewMode::Overview => self.coarse.clone(),
            ViewMode::Zoomed { prox, dist } => self.partition.data_for_chrom_pair(prox, dist).to_vec(),
        }
    }

    fn detail_style(&self) -> DetailStyle {
        match &self.source_mode {
            SourceMode::Multi => DetailStyle::ByCategory,
            SourceMode::Single {
                num_samples,
                colors,
            } => {
                let color = colors
                    .get(self.active_source)
                    .copied()
                    .unwrap_or_else(|| crate::color::palette_color(self.active_source));
                DetailStyle::single_source(color, *num_samples)
            }
        }
    }

    fn recolor_grid(&mut self) {
        color_grid(&mut self.grid, &self.partition, &self.genome, self.color_scale);
        self.grid_stale = false;
    }

    fn draw_uniquities(&mut self, data: &[IntervalRecord]) -> KeyDiff {
        let mapper = self.mapper;
        let style = self.detail_style();
        let source = &self.sources[self.active_source];
        let diff = self.detail.update_from(data, IntervalRecord::key, |r| {
            Uniquity::new(r, source.sample_name(r), &mapper, style)
        });
        if let Some(key) = &self.hover_record {
            if self.detail.get(key).is_none() {
                self.hover_record = None;
            }
        }
        diff
    }
}
