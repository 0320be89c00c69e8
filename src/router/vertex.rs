use crate::geometry::{Point, Rect};

use super::obstacle::{Corner, ObstacleId};
use super::route::RouteId;

/// Address of a routing vertex: either one of an obstacle's four corners or a free
/// endpoint owned by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum VertexId {
    Corner { obstacle: ObstacleId, corner: Corner },
    Free(u32),
}

impl VertexId {
    pub(crate) fn obstacle(self) -> Option<ObstacleId> {
        match self {
            VertexId::Corner { obstacle, .. } => Some(obstacle),
            VertexId::Free(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum TurnKind {
    #[default]
    Unset,
    Innie,
    Outie,
}

impl TurnKind {
    pub(crate) fn flipped(self) -> Self {
        match self {
            TurnKind::Innie => TurnKind::Outie,
            _ => TurnKind::Innie,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub(crate) origin: Point,
    pub(crate) corner: Option<Corner>,
    pub(crate) kind: TurnKind,
    pub(crate) count: i32,
    pub(crate) total_count: i32,
    pub(crate) offset: f64,
    pub(crate) nearest_obstacle: i32,
    pub(crate) nearest_obstacle_checked: bool,
    /// Routes bending here, with the cached cosine of their turn.
    pub(crate) paths: Vec<(RouteId, f64)>,
}

impl Vertex {
    pub(crate) fn free(origin: Point) -> Self {
        Self {
            origin,
            corner: None,
            kind: TurnKind::Unset,
            count: 0,
            total_count: 0,
            offset: 0.0,
            nearest_obstacle: 0,
            nearest_obstacle_checked: false,
            paths: Vec::new(),
        }
    }

    pub(crate) fn at_corner(origin: Point, corner: Corner, spacing: i32) -> Self {
        let mut vertex = Self::free(origin);
        vertex.corner = Some(corner);
        vertex.offset = f64::from(spacing);
        vertex
    }

    pub(crate) fn full_reset(&mut self, spacing: i32) {
        self.total_count = 0;
        self.kind = TurnKind::Unset;
        self.count = 0;
        self.offset = if self.corner.is_some() {
            f64::from(spacing)
        } else {
            0.0
        };
        self.nearest_obstacle = 0;
        self.nearest_obstacle_checked = false;
        self.paths.clear();
    }

    pub(crate) fn update_offset(&mut self) {
        if self.nearest_obstacle != 0 && self.total_count > 0 {
            self.offset = f64::from(((self.nearest_obstacle / 2) - 1) / self.total_count);
        }
    }

    /// Position after pushing the vertex away from its obstacle to make room for
    /// every chain bending here.
    pub(crate) fn grown(&self, spacing: i32) -> Point {
        let Some(corner) = self.corner else {
            return self.origin;
        };
        if self.total_count == 0 {
            return self.origin;
        }
        let modifier = if self.nearest_obstacle == 0 {
            self.total_count * spacing
        } else {
            self.nearest_obstacle / 2 - 1
        };
        let y = if corner.is_north() {
            self.origin.y - modifier
        } else {
            self.origin.y + modifier
        };
        let x = if corner.is_east() {
            self.origin.x + modifier
        } else {
            self.origin.x - modifier
        };
        Point::new(x, y)
    }

    /// Box spanning the original and grown positions, padded by `extra`.
    pub(crate) fn deformed_rect(&self, spacing: i32, extra: i32) -> Rect {
        let grown = self.grown(spacing);
        let north = self.corner.is_none_or(|c| c.is_north());
        let east = self.corner.is_none_or(|c| c.is_east());
        let (y, height) = if north {
            (grown.y - extra, self.origin.y - grown.y + extra)
        } else {
            (self.origin.y, grown.y - self.origin.y + extra)
        };
        let (x, width) = if east {
            (self.origin.x, grown.x - self.origin.x + extra)
        } else {
            (grown.x - extra, self.origin.x - grown.x + extra)
        };
        Rect::new(x, y, width, height)
    }

    /// Bend point for the `modifier`-th chain around this corner.
    pub(crate) fn bend(&self, modifier: i32) -> Point {
        let Some(corner) = self.corner else {
            return self.origin;
        };
        let shift = f64::from(modifier) * self.offset;
        let (x, y) = (f64::from(self.origin.x), f64::from(self.origin.y));
        let y = if corner.is_north() { y - shift } else { y + shift };
        let x = if corner.is_east() { x + shift } else { x - shift };
        Point::new(x as i32, y as i32)
    }

    /// Records a route bending here; a route seen again keeps one entry with the
    /// latest cosine.
    pub(crate) fn add_path(&mut self, route: RouteId, cosine: f64) {
        match self.paths.iter_mut().find(|(id, _)| *id == route) {
            Some(entry) => entry.1 = cosine,
            None => self.paths.push((route, cosine)),
        }
    }

    pub(crate) fn cosine_for(&self, route: RouteId) -> Option<f64> {
        self.paths
            .iter()
            .find(|(id, _)| *id == route)
            .map(|(_, cosine)| *cosine)
    }

    /// Hands the subpath's bend records over to its parent.
    pub(crate) fn reassign_path(&mut self, from: RouteId, to: RouteId) {
        let parent_present = self.paths.iter().any(|(id, _)| *id == to);
        if parent_present {
            self.paths.retain(|(id, _)| *id != from);
        } else {
            for (id, _) in &mut self.paths {
                if *id == from {
                    *id = to;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ungrown_vertex_stays_at_origin() {
        let v = Vertex::at_corner(Point::new(10, 10), Corner::TopLeft, 4);
        assert_eq!(v.grown(4), Point::new(10, 10));
    }

    #[test]
    fn grown_moves_outward_from_corner() {
        let mut v = Vertex::at_corner(Point::new(10, 10), Corner::BottomRight, 4);
        v.total_count = 2;
        assert_eq!(v.grown(4), Point::new(18, 18));
        let mut v = Vertex::at_corner(Point::new(10, 10), Corner::TopLeft, 4);
        v.total_count = 1;
        assert_eq!(v.grown(4), Point::new(6, 6));
    }

    #[test]
    fn nearest_obstacle_caps_growth_and_offset() {
        let mut v = Vertex::at_corner(Point::new(10, 10), Corner::TopRight, 4);
        v.total_count = 2;
        v.nearest_obstacle = 8;
        v.update_offset();
        assert_eq!(v.offset, 1.0);
        assert_eq!(v.grown(4), Point::new(13, 7));
    }

    #[test]
    fn bend_uses_offset_per_chain() {
        let v = Vertex::at_corner(Point::new(45, 54), Corner::BottomLeft, 4);
        assert_eq!(v.bend(1), Point::new(41, 58));
        assert_eq!(v.bend(2), Point::new(37, 62));
    }

    #[test]
    fn deformed_rect_spans_origin_and_grown() {
        let mut v = Vertex::at_corner(Point::new(10, 10), Corner::TopLeft, 4);
        v.total_count = 1;
        assert_eq!(v.deformed_rect(4, 4), Rect::new(2, 2, 8, 8));
        let mut v = Vertex::at_corner(Point::new(10, 10), Corner::BottomRight, 4);
        v.total_count = 1;
        assert_eq!(v.deformed_rect(4, 4), Rect::new(10, 10, 8, 8));
    }

    #[test]
    fn full_reset_restores_spacing_offset() {
        let mut v = Vertex::at_corner(Point::new(0, 0), Corner::TopLeft, 4);
        v.total_count = 3;
        v.kind = TurnKind::Outie;
        v.offset = 1.0;
        v.add_path(RouteId(1), 0.5);
        v.full_reset(6);
        assert_eq!(v.offset, 6.0);
        assert_eq!(v.total_count, 0);
        assert_eq!(v.kind, TurnKind::Unset);
        assert!(v.paths.is_empty());
    }

    #[test]
    fn repeated_bend_updates_cached_cosine() {
        let mut v = Vertex::free(Point::new(0, 0));
        v.add_path(RouteId(1), 0.1);
        v.add_path(RouteId(2), 0.2);
        v.add_path(RouteId(1), -0.4);
        assert_eq!(v.paths.len(), 2);
        assert_eq!(v.cosine_for(RouteId(1)), Some(-0.4));
    }

    #[test]
    fn reassign_path_merges_into_parent() {
        let mut v = Vertex::free(Point::new(0, 0));
        v.add_path(RouteId(1), 0.1);
        v.add_path(RouteId(2), 0.2);
        v.reassign_path(RouteId(2), RouteId(3));
        assert_eq!(v.cosine_for(RouteId(3)), Some(0.2));
        v.reassign_path(RouteId(3), RouteId(1));
        assert_eq!(v.paths.len(), 1);
    }
}
