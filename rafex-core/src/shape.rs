use crate::color::Color;
use crate::geometry::Point;

/// Stable reference to a shape, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(pub usize);

/// Primitives a render surface must draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Color,
        width: f64,
    },
    /// Rectangle centered on `center`, turned by `angle_deg` in screen space
    /// (positive is clockwise on screen).
    Rect {
        center: Point,
        width: f64,
        height: f64,
        angle_deg: f64,
        fill: Color,
        stroke: Color,
        stroke_width: f64,
    },
}

/// Partial update applied to an existing shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapePatch {
    /// Moves a circle or rectangle.
    Center(Point),
    /// Moves both ends of a line.
    Endpoints(Point, Point),
}

impl Shape {
    /// Applies `patch`, returning `false` if it does not fit this kind of shape.
    pub fn apply(&mut self, patch: ShapePatch) -> bool {
        match (self, patch) {
            (Shape::Circle { center, .. } | Shape::Rect { center, .. }, ShapePatch::Center(p)) => {
                *center = p;
                true
            }
            (Shape::Line { from, to, .. }, ShapePatch::Endpoints(a, b)) => {
                *from = a;
                *to = b;
                true
            }
            _ => false,
        }
    }

    pub fn is_circle(&self) -> bool {
        matches!(self, Shape::Circle { .. })
    }
}
