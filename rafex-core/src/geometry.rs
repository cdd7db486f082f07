use crate::config::TrialConfig;

/// Canvas margin over the frame diagonal, so a 45° frame with a thick stroke never clips.
const CANVAS_SCALE: f64 = 1.101;
/// Background circle radius as a fraction of the frame diagonal.
const CIRCLE_SCALE: f64 = 0.55;

/// Radius fractions of the dot fan. Each entry yields a symmetric pair; the
/// center dot is appended separately.
pub const DOT_FAN: [f64; 4] = [1.0, 0.5, 0.25, 0.75];

/// Number of dots drawn in dot mode.
pub const DOT_COUNT: usize = DOT_FAN.len() * 2 + 1;

/// A point in canvas pixels, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

pub fn frame_diagonal(frame_size_px: f64) -> f64 {
    std::f64::consts::SQRT_2 * frame_size_px
}

/// Square canvas extent for a frame of the given side length.
pub fn canvas_extent(frame_size_px: f64) -> (f64, f64) {
    let side = CANVAS_SCALE * frame_diagonal(frame_size_px);
    (side, side)
}

pub fn background_circle_radius(frame_size_px: f64) -> f64 {
    CIRCLE_SCALE * frame_diagonal(frame_size_px)
}

/// One end of a rod of `radius` around `center`. Angles follow the unit
/// circle (0° right, 90° up), so y is negated for screen space. `sign`
/// selects the end: `1.0` or `-1.0`.
pub fn rod_endpoint(center: Point, radius: f64, angle_deg: f64, sign: f64) -> Point {
    let rad = angle_deg.to_radians();
    Point {
        x: center.x + sign * radius * rad.cos(),
        y: center.y - sign * radius * rad.sin(),
    }
}

/// Both ends of the rod line, negative end first.
pub fn rod_line(center: Point, rod_radius: f64, angle_deg: f64) -> (Point, Point) {
    (
        rod_endpoint(center, rod_radius, angle_deg, -1.0),
        rod_endpoint(center, rod_radius, angle_deg, 1.0),
    )
}

/// Positions of the dots approximating a rod: pairs along the rotated
/// diameter at each [`DOT_FAN`] fraction, then the center.
pub fn dot_fan_positions(center: Point, rod_radius: f64, angle_deg: f64) -> [Point; DOT_COUNT] {
    let mut dots = [center; DOT_COUNT];
    for (i, fraction) in DOT_FAN.iter().enumerate() {
        let r = rod_radius * fraction;
        dots[2 * i] = rod_endpoint(center, r, angle_deg, 1.0);
        dots[2 * i + 1] = rod_endpoint(center, r, angle_deg, -1.0);
    }
    dots
}

/// Derived canvas measurements for one trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub center: Point,
    pub circle_radius: f64,
    pub rod_radius: f64,
}

impl Layout {
    pub fn new(config: &TrialConfig) -> Self {
        let (width, height) = canvas_extent(config.frame_size_px);
        Self {
            width,
            height,
            center: Point::new(width / 2.0, height / 2.0),
            circle_radius: background_circle_radius(config.frame_size_px),
            rod_radius: config.rod_length_px / 2.0,
        }
    }

    pub fn rod_line(&self, angle_deg: f64) -> (Point, Point) {
        rod_line(self.center, self.rod_radius, angle_deg)
    }

    pub fn dots(&self, angle_deg: f64) -> [Point; DOT_COUNT] {
        dot_fan_positions(self.center, self.rod_radius, angle_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < EPS
    }

    #[test]
    fn canvas_is_square_and_wraps_rotated_frame() {
        let (w, h) = canvas_extent(300.0);
        assert_eq!(w, h);
        assert!((w - 1.101 * 300.0 * 2f64.sqrt()).abs() < EPS);
        // the frame diagonal plus margin fits
        assert!(w > frame_diagonal(300.0));
    }

    #[test]
    fn circle_radius_fits_inside_canvas() {
        let (w, _) = canvas_extent(250.0);
        let r = background_circle_radius(250.0);
        assert!(2.0 * r < w);
        assert!((r - 0.55 * 250.0 * 2f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn endpoint_uses_screen_y() {
        let c = Point::new(100.0, 100.0);
        assert!(close(rod_endpoint(c, 50.0, 0.0, 1.0), Point::new(150.0, 100.0)));
        assert!(close(rod_endpoint(c, 50.0, 90.0, 1.0), Point::new(100.0, 50.0)));
        assert!(close(rod_endpoint(c, 50.0, 90.0, -1.0), Point::new(100.0, 150.0)));
    }

    #[test]
    fn dot_fan_is_symmetric_about_center() {
        let c = Point::new(10.0, -4.0);
        let dots = dot_fan_positions(c, 80.0, 33.0);
        assert_eq!(dots.len(), 9);
        for pair in dots[..8].chunks(2) {
            let mid = Point::new((pair[0].x + pair[1].x) / 2.0, (pair[0].y + pair[1].y) / 2.0);
            assert!(close(mid, c));
        }
        assert!(close(dots[8], c));
    }

    #[test]
    fn dot_fan_radii_follow_fractions() {
        let c = Point::default();
        let dots = dot_fan_positions(c, 100.0, 12.5);
        let radii: Vec<f64> = dots.iter().map(|d| d.distance(c)).collect();
        let expected = [100.0, 100.0, 50.0, 50.0, 25.0, 25.0, 75.0, 75.0, 0.0];
        for (r, e) in radii.iter().zip(expected) {
            assert!((r - e).abs() < 1e-9, "{r} != {e}");
        }
    }

    #[test]
    fn rod_line_spans_rod_length() {
        let c = Point::new(50.0, 50.0);
        let (a, b) = rod_line(c, 40.0, 71.0);
        assert!((a.distance(b) - 80.0).abs() < EPS);
    }

    #[test]
    fn huge_angles_stay_finite() {
        let p = rod_endpoint(Point::default(), 10.0, 1.0e12, 1.0);
        assert!(p.x.is_finite() && p.y.is_finite());
    }
}
