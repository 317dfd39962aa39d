use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point at `distance` from `self` along `angle` (degrees, y grows downward).
    pub fn polar_offset(&self, angle: f64, distance: f64) -> Point {
        let rad = angle.to_radians();
        Point::new(
            self.x + distance * rad.cos(),
            self.y + distance * rad.sin(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn shrink(&self, fraction: f64) -> Size {
        Size::new(self.width * (1.0 - fraction), self.height * (1.0 - fraction))
    }
}

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn around(center: Point, half_extent: f64) -> Self {
        Self {
            min: Point::new(center.x - half_extent, center.y - half_extent),
            max: Point::new(center.x + half_extent, center.y + half_extent),
        }
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Bounding box of squares of `half_extent` around each point.
    pub fn bounding(points: impl IntoIterator<Item = Point>, half_extent: f64) -> Option<Rect> {
        points
            .into_iter()
            .map(|p| Rect::around(p, half_extent))
            .reduce(|acc, r| acc.union(&r))
    }

    pub fn size(&self) -> Size {
        Size::new(self.max.x - self.min.x, self.max.y - self.min.y)
    }
}
