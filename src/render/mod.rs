//! Backend-neutral scene description, produced on every redraw and written
//! out by the PNG and SVG backends.

mod png;
mod svg;

pub use self::png::{rasterize, write_png};
pub use self::svg::{to_svg, write_svg};

use rgb::RGB8;

use crate::geom::{Point, Rect, Transform};
use crate::layers::Axis;

pub const LIGHT_GREY: RGB8 = RGB8 {
    r: 0xd3,
    g: 0xd3,
    b: 0xd3,
};

pub const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: RGB8,
    pub opacity: f64,
}

impl Paint {
    pub fn solid(color: RGB8) -> Self {
        Paint {
            color,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        rect: Rect,
        fill: Option<Paint>,
        stroke: Option<RGB8>,
        // hover text, vector output only
        title: Option<String>,
    },
    Label {
        at: Point,
        text: String,
        axis: Axis,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: &'static str,
    pub visible: bool,
    pub shapes: Vec<Shape>,
}

/// Everything drawn in one frame. All shapes are in chart pixels and pass
/// through `transform` on their way to the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub transform: Transform,
    pub groups: Vec<Group>,
}

impl Scene {
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn visible_groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.groups.iter().filter(|g| g.visible)
    }
}
