//! Pixel-space geometry shared by the layers, the zoom behaviour and the
//! output backends.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Half-open containment: the left and top edges are inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.max_x() && p.y >= self.y && p.y < self.max_y()
    }
}

/// A uniform scale followed by a translation: `p' = p * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate: Point,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate: Point { x: 0.0, y: 0.0 },
        scale: 1.0,
    };

    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Transform {
            translate: Point::new(x, y),
            scale,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Transform::IDENTITY
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate.x,
            p.y * self.scale + self.translate.y,
        )
    }

    pub fn apply_rect(&self, r: Rect) -> Rect {
        let origin = self.apply(Point::new(r.x, r.y));
        Rect::new(origin.x, origin.y, r.width * self.scale, r.height * self.scale)
    }

    /// Maps a transformed point back to untransformed space.
    pub fn invert(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate.x) / self.scale,
            (p.y - self.translate.y) / self.scale,
        )
    }

    /// Renders as an SVG `transform` attribute value.
    pub fn to_svg(&self) -> String {
        format!(
            "translate({},{})scale({})",
            self.translate.x, self.translate.y, self.scale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_apply_and_invert() {
        let t = Transform::new(-10.0, 5.0, 2.0);
        let p = Point::new(3.0, 4.0);
        assert_eq!(t.apply(p), Point::new(-4.0, 13.0));
        assert_eq!(t.invert(t.apply(p)), p);
        assert_eq!(
            t.apply_rect(Rect::new(0.0, 0.0, 1.0, 2.0)),
            Rect::new(-10.0, 5.0, 2.0, 4.0)
        );
    }

    #[rstest]
    fn test_rect_contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
    }
}
