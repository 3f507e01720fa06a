//! Pan/zoom gesture handling, independent of any rendering backend.

use log::debug;

use crate::geom::{Point, Transform};

/// Wheel delta (in pixels) that doubles or halves the zoom.
const WHEEL_PIXELS_PER_OCTAVE: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
}

/// Turns pointer drags and wheel turns into a view transform.
pub trait Gesture {
    /// Returns the new transform when the event changed it.
    fn pointer(&mut self, event: PointerEvent) -> Option<Transform>;

    /// `delta_y` follows the DOM convention: positive values zoom out.
    fn wheel(&mut self, at: Point, delta_y: f64) -> Option<Transform>;

    fn transform(&self) -> Transform;
}

/// Drag to pan, wheel to zoom about the pointer.
#[derive(Debug, Clone)]
pub struct ZoomBehavior {
    transform: Transform,
    // pointer position of the previous drag event
    drag_from: Option<Point>,
    min_scale: f64,
    max_scale: f64,
}

impl ZoomBehavior {
    pub fn new(initial: Transform) -> Self {
        ZoomBehavior {
            transform: initial,
            drag_from: None,
            min_scale: 1e-3,
            max_scale: 1e9,
        }
    }

    pub fn with_scale_extent(mut self, min_scale: f64, max_scale: f64) -> Self {
        let (min_scale, max_scale) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    /// Rescales by `factor` keeping the content under `anchor` in place.
    pub fn zoom_about(&mut self, anchor: Point, factor: f64) -> Option<Transform> {
        if factor.is_nan() || factor <= 0.0 || factor.is_infinite() {
            return None;
        }
        let old = self.transform;
        let scale = (old.scale * factor).clamp(self.min_scale, self.max_scale);
        if (scale - old.scale).abs() < f64::EPSILON {
            return None;
        }
        let content = old.invert(anchor);
        self.transform = Transform::new(
            anchor.x - content.x * scale,
            anchor.y - content.y * scale,
            scale,
        );
        debug!("Zoomed to scale {} about ({}, {})", scale, anchor.x, anchor.y);
        Some(self.transform)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Option<Transform> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        self.transform.translate.x += dx;
        self.transform.translate.y += dy;
        Some(self.transform)
    }
}

impl Gesture for ZoomBehavior {
    fn pointer(&mut self, event: PointerEvent) -> Option<Transform> {
        match event {
            PointerEvent::Down(p) => {
                self.drag_from = Some(p);
                None
            }
            PointerEvent::Move(p) => {
                let from = self.drag_from?;
                self.drag_from = Some(p);
                self.pan_by(p.x - from.x, p.y - from.y)
            }
            PointerEvent::Up(p) => {
                let from = self.drag_from.take()?;
                self.pan_by(p.x - from.x, p.y - from.y)
            }
        }
    }

    fn wheel(&mut self, at: Point, delta_y: f64) -> Option<Transform> {
        self.zoom_about(at, (-delta_y / WHEEL_PIXELS_PER_OCTAVE).exp2())
    }

    fn transform(&self) -> Transform {
        self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_drag_pans() {
        let mut zoom = ZoomBehavior::new(Transform::new(-100.0, -50.0, 4.0));
        assert_eq!(zoom.pointer(PointerEvent::Move(Point::new(5.0, 5.0))), None);
        zoom.pointer(PointerEvent::Down(Point::new(10.0, 10.0)));
        assert!(zoom.is_dragging());
        zoom.pointer(PointerEvent::Move(Point::new(15.0, 12.0)));
        let t = zoom.pointer(PointerEvent::Up(Point::new(20.0, 20.0))).unwrap();
        assert_eq!(t, Transform::new(-90.0, -40.0, 4.0));
        assert!(!zoom.is_dragging());
    }

    #[rstest]
    fn test_wheel_keeps_anchor_fixed() {
        let mut zoom = ZoomBehavior::new(Transform::new(-30.0, 10.0, 2.0));
        let anchor = Point::new(100.0, 80.0);
        let before = zoom.transform().invert(anchor);
        let t = zoom.wheel(anchor, -WHEEL_PIXELS_PER_OCTAVE).unwrap();
        assert_eq!(t.scale, 4.0);
        let after = t.invert(anchor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[rstest]
    fn test_scale_extent_is_respected() {
        let mut zoom = ZoomBehavior::new(Transform::IDENTITY).with_scale_extent(2.0, 0.5);
        zoom.wheel(Point::default(), -10.0 * WHEEL_PIXELS_PER_OCTAVE);
        assert_eq!(zoom.transform().scale, 2.0);
        assert_eq!(zoom.wheel(Point::default(), -WHEEL_PIXELS_PER_OCTAVE), None);
        assert_eq!(zoom.zoom_about(Point::default(), 0.0), None);
    }
}
