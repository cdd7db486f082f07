use rafex_core::{Color, Shape};
use tiny_skia::{FillRule, LineCap, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

pub fn skia_color(c: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn paint(c: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(c));
    paint.anti_alias = true;
    paint
}

/// Rasterizes one shape onto `pixmap`. Transparent fills and strokes are
/// skipped entirely.
pub fn draw_shape(pixmap: &mut Pixmap, shape: &Shape) {
    match shape {
        Shape::Circle { center, radius, fill } => {
            if fill.is_transparent() || *radius <= 0.0 {
                return;
            }
            if let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, *radius as f32) {
                pixmap.fill_path(&path, &paint(*fill), FillRule::Winding, Transform::identity(), None);
            }
        }
        Shape::Line { from, to, stroke, width } => {
            if stroke.is_transparent() || *width <= 0.0 {
                return;
            }
            let mut pb = PathBuilder::new();
            pb.move_to(from.x as f32, from.y as f32);
            pb.line_to(to.x as f32, to.y as f32);
            if let Some(path) = pb.finish() {
                let stroke_style = Stroke {
                    width: *width as f32,
                    line_cap: LineCap::Round,
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &paint(*stroke), &stroke_style, Transform::identity(), None);
            }
        }
        Shape::Rect {
            center,
            width,
            height,
            angle_deg,
            fill,
            stroke,
            stroke_width,
        } => {
            let Some(rect) = Rect::from_xywh(
                -(*width as f32) / 2.0,
                -(*height as f32) / 2.0,
                *width as f32,
                *height as f32,
            ) else {
                return;
            };
            let path = PathBuilder::from_rect(rect);
            // y points down, so a positive rotation turns clockwise on screen
            let transform =
                Transform::from_rotate(*angle_deg as f32).post_translate(center.x as f32, center.y as f32);

            if !fill.is_transparent() {
                pixmap.fill_path(&path, &paint(*fill), FillRule::Winding, transform, None);
            }
            if !stroke.is_transparent() && *stroke_width > 0.0 {
                let stroke_style = Stroke {
                    width: *stroke_width as f32,
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &paint(*stroke), &stroke_style, transform, None);
            }
        }
    }
}
