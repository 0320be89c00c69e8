use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, segments_intersect};

use super::vertex::{Vertex, VertexId};

/// Stable handle of a registered obstacle. Never reused within a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub(crate) const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub(crate) fn is_north(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    pub(crate) fn is_east(self) -> bool {
        matches!(self, Corner::TopRight | Corner::BottomRight)
    }

    fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }
}

/// A rectangle paths must route around. Its corner vertices sit on the last
/// pixel row and column of the bounds.
#[derive(Debug, Clone)]
pub struct Obstacle {
    id: ObstacleId,
    bounds: Rect,
    center: Point,
    corners: [Vertex; 4],
}

impl Obstacle {
    pub(crate) fn new(id: ObstacleId, bounds: Rect, spacing: i32) -> Self {
        let corners = Corner::ALL.map(|corner| {
            Vertex::at_corner(corner_point(&bounds, corner), corner, spacing)
        });
        Self {
            id,
            bounds,
            center: bounds.center(),
            corners,
        }
    }

    pub fn id(&self) -> ObstacleId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub(crate) fn corner_id(&self, corner: Corner) -> VertexId {
        VertexId::Corner {
            obstacle: self.id,
            corner,
        }
    }

    pub(crate) fn vertex(&self, corner: Corner) -> &Vertex {
        &self.corners[corner.index()]
    }

    pub(crate) fn vertex_mut(&mut self, corner: Corner) -> &mut Vertex {
        &mut self.corners[corner.index()]
    }

    pub(crate) fn point(&self, corner: Corner) -> Point {
        self.vertex(corner).origin
    }

    pub(crate) fn reset_vertices(&mut self, spacing: i32) {
        for vertex in &mut self.corners {
            vertex.full_reset(spacing);
        }
    }

    /// Whether the segment crosses either diagonal of the corner box or ends
    /// strictly inside it.
    pub(crate) fn blocks(&self, a: Point, b: Point) -> bool {
        let tl = self.point(Corner::TopLeft);
        let tr = self.point(Corner::TopRight);
        let bl = self.point(Corner::BottomLeft);
        let br = self.point(Corner::BottomRight);
        segments_intersect(a, b, tl, br)
            || segments_intersect(a, b, bl, tr)
            || self.bounds.contains_proper(a)
            || self.bounds.contains_proper(b)
    }

    /// Whether a routed polyline touches this obstacle.
    pub(crate) fn touches_polyline(&self, points: &[Point]) -> bool {
        let tl = self.point(Corner::TopLeft);
        let tr = self.point(Corner::TopRight);
        let bl = self.point(Corner::BottomLeft);
        let br = self.point(Corner::BottomRight);
        points.windows(2).any(|pair| {
            let (a, b) = (pair[0], pair[1]);
            segments_intersect(a, b, tl, br)
                || segments_intersect(a, b, tr, bl)
                || self.bounds.contains(a)
                || self.bounds.contains(b)
        })
    }
}

fn corner_point(bounds: &Rect, corner: Corner) -> Point {
    match corner {
        Corner::TopLeft => Point::new(bounds.x, bounds.y),
        Corner::TopRight => Point::new(bounds.right() - 1, bounds.y),
        Corner::BottomLeft => Point::new(bounds.x, bounds.bottom() - 1),
        Corner::BottomRight => Point::new(bounds.right() - 1, bounds.bottom() - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle() -> Obstacle {
        Obstacle::new(ObstacleId(0), Rect::new(45, 45, 10, 10), 4)
    }

    #[test]
    fn corners_sit_on_last_pixel() {
        let o = obstacle();
        assert_eq!(o.point(Corner::TopLeft), Point::new(45, 45));
        assert_eq!(o.point(Corner::TopRight), Point::new(54, 45));
        assert_eq!(o.point(Corner::BottomLeft), Point::new(45, 54));
        assert_eq!(o.point(Corner::BottomRight), Point::new(54, 54));
        assert_eq!(o.center(), Point::new(50, 50));
    }

    #[test]
    fn diagonal_crossing_blocks() {
        let o = obstacle();
        assert!(o.blocks(Point::new(0, 0), Point::new(100, 100)));
        assert!(!o.blocks(Point::new(0, 0), Point::new(100, 0)));
        assert!(!o.blocks(Point::new(0, 44), Point::new(100, 44)));
    }

    #[test]
    fn polyline_touch_detection() {
        let o = obstacle();
        assert!(o.touches_polyline(&[Point::new(0, 50), Point::new(100, 50)]));
        assert!(!o.touches_polyline(&[Point::new(0, 0), Point::new(0, 100)]));
    }
}
