use crate::color::Color;
use crate::error::SurfaceError;
use crate::shape::{Shape, ShapeHandle, ShapePatch};

/// A retained-mode drawing target. Shapes stack in creation order and are
/// addressed by the handle `add_shape` returned.
pub trait Surface {
    fn create_canvas(&mut self, width: f64, height: f64, background: Color) -> Result<(), SurfaceError>;
    fn add_shape(&mut self, shape: Shape) -> Result<ShapeHandle, SurfaceError>;
    fn update_shape(&mut self, handle: ShapeHandle, patch: ShapePatch) -> Result<(), SurfaceError>;
    fn render_all(&mut self) -> Result<(), SurfaceError>;
    /// Drops the canvas and every shape on it.
    fn clear(&mut self);

    /// Text shown alongside the canvas, if the surface can display any.
    fn set_caption(&mut self, _text: Option<&str>) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// Shape list backing a [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct Scene {
    canvas: Option<Canvas>,
    shapes: Vec<Shape>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub background: Color,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh canvas, discarding previous shapes.
    pub fn create_canvas(&mut self, width: f64, height: f64, background: Color) {
        self.shapes.clear();
        self.canvas = Some(Canvas {
            width,
            height,
            background,
        });
    }

    pub fn add(&mut self, shape: Shape) -> Result<ShapeHandle, SurfaceError> {
        if self.canvas.is_none() {
            return Err(SurfaceError::NoCanvas);
        }
        self.shapes.push(shape);
        Ok(ShapeHandle(self.shapes.len() - 1))
    }

    pub fn update(&mut self, handle: ShapeHandle, patch: ShapePatch) -> Result<(), SurfaceError> {
        let shape = self
            .shapes
            .get_mut(handle.0)
            .ok_or(SurfaceError::UnknownShape(handle))?;
        if shape.apply(patch) {
            Ok(())
        } else {
            Err(SurfaceError::PatchMismatch(handle))
        }
    }

    pub fn clear(&mut self) {
        self.canvas = None;
        self.shapes.clear();
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn get(&self, handle: ShapeHandle) -> Option<&Shape> {
        self.shapes.get(handle.0)
    }

    /// Shapes bottom to top.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn dot(x: f64) -> Shape {
        Shape::Circle {
            center: Point::new(x, 0.0),
            radius: 1.0,
            fill: Color::WHITE,
        }
    }

    #[test]
    fn handles_follow_creation_order() {
        let mut scene = Scene::new();
        scene.create_canvas(10.0, 10.0, Color::BLACK);
        let a = scene.add(dot(1.0)).unwrap();
        let b = scene.add(dot(2.0)).unwrap();
        assert_eq!((a, b), (ShapeHandle(0), ShapeHandle(1)));
        assert_eq!(scene.shapes()[1], dot(2.0));
    }

    #[test]
    fn shapes_need_a_canvas() {
        let mut scene = Scene::new();
        assert_eq!(scene.add(dot(0.0)), Err(SurfaceError::NoCanvas));
    }

    #[test]
    fn update_checks_handle_and_kind() {
        let mut scene = Scene::new();
        scene.create_canvas(10.0, 10.0, Color::BLACK);
        let h = scene.add(dot(1.0)).unwrap();

        scene.update(h, ShapePatch::Center(Point::new(5.0, 5.0))).unwrap();
        assert_eq!(
            scene.get(h),
            Some(&Shape::Circle {
                center: Point::new(5.0, 5.0),
                radius: 1.0,
                fill: Color::WHITE
            })
        );

        let endpoints = ShapePatch::Endpoints(Point::default(), Point::default());
        assert_eq!(scene.update(h, endpoints), Err(SurfaceError::PatchMismatch(h)));
        assert_eq!(
            scene.update(ShapeHandle(7), endpoints),
            Err(SurfaceError::UnknownShape(ShapeHandle(7)))
        );
    }

    #[test]
    fn new_canvas_and_clear_drop_shapes() {
        let mut scene = Scene::new();
        scene.create_canvas(10.0, 10.0, Color::BLACK);
        scene.add(dot(1.0)).unwrap();
        scene.create_canvas(20.0, 20.0, Color::WHITE);
        assert!(scene.is_empty());
        scene.add(dot(1.0)).unwrap();
        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.canvas().is_none());
    }
}
