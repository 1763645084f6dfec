//! Small 2D helpers shared by placement, collision and leader-line code.
//! Angles are in degrees, measured clockwise with 0 at 12 o'clock, matching
//! the segment angle calculator.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box with a top-left anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

pub fn distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Rotate `p` around `center` by `deg` degrees, clockwise in screen
/// coordinates (y grows downward).
pub fn rotate_point(p: Point, center: Point, deg: f32) -> Point {
    let rad = deg.to_radians();
    let (sin, cos) = rad.sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point {
        x: center.x + dx * cos - dy * sin,
        y: center.y + dx * sin + dy * cos,
    }
}

/// Point on a circle of `radius` around `center`, at `deg` clockwise from
/// 12 o'clock.
pub fn point_at_angle(center: Point, radius: f32, deg: f32) -> Point {
    rotate_point(Point::new(center.x, center.y - radius), center, deg)
}

pub fn point_in_circle(p: Point, center: Point, radius: f32) -> bool {
    distance(p, center) <= radius
}

/// Whether `p` falls inside the annular wedge between `start_deg` and
/// `end_deg` (clockwise from the top) bounded by the outer radius.
pub fn point_in_arc(p: Point, center: Point, radius: f32, start_deg: f32, end_deg: f32) -> bool {
    if !point_in_circle(p, center, radius) {
        return false;
    }
    let deg = angle_of(p, center);
    if start_deg <= end_deg {
        deg >= start_deg && deg <= end_deg
    } else {
        // Wedge wraps past 12 o'clock.
        deg >= start_deg || deg <= end_deg
    }
}

/// Clockwise angle from 12 o'clock of the ray center -> p, in [0, 360).
pub fn angle_of(p: Point, center: Point) -> f32 {
    let deg = (p.x - center.x).atan2(center.y - p.y).to_degrees();
    if deg < 0.0 { deg + 360.0 } else { deg }
}
