use crate::geometry::{Point, segments_intersect};

use super::vertex::VertexId;

/// Ordered pair of routing vertices. Geometry is evaluated on a [`Line`] once the
/// endpoints are resolved to coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Segment {
    pub(crate) start: VertexId,
    pub(crate) end: VertexId,
}

impl Segment {
    pub(crate) fn new(start: VertexId, end: VertexId) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line {
    pub(crate) start: Point,
    pub(crate) end: Point,
}

impl Line {
    pub(crate) fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub(crate) fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Sign-carrying rise; the run only decides the sign.
    pub(crate) fn slope(&self) -> i64 {
        let rise = i64::from(self.end.y) - i64::from(self.start.y);
        if self.end.x - self.start.x >= 0 {
            rise
        } else {
            -rise
        }
    }

    pub(crate) fn cross_product(&self, other: &Line) -> i64 {
        let (sx, sy) = (i64::from(self.start.x), i64::from(self.start.y));
        let (ex, ey) = (i64::from(self.end.x), i64::from(self.end.y));
        let (ox, oy) = (i64::from(other.end.x), i64::from(other.end.y));
        (sx - ex) * (oy - ey) - (sy - ey) * (ox - ex)
    }

    /// Signed turn measure towards `other`: `1 + cos` for one turning direction,
    /// `-(1 + cos)` for the other.
    pub(crate) fn cosine(&self, other: &Line) -> f64 {
        let ax = f64::from(self.start.x - self.end.x);
        let ay = f64::from(self.start.y - self.end.y);
        let bx = f64::from(other.end.x - other.start.x);
        let by = f64::from(other.end.y - other.start.y);
        let denom = self.length() * other.length();
        let cos = if denom == 0.0 {
            0.0
        } else {
            (ax * bx + ay * by) / denom
        };
        let sin = ax * by - ay * bx;
        if sin < 0.0 { 1.0 + cos } else { -(1.0 + cos) }
    }

    pub(crate) fn intersects(&self, a: Point, b: Point) -> bool {
        segments_intersect(self.start, self.end, a, b)
    }
}
