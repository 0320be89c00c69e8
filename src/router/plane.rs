use std::collections::HashMap;

use crate::geometry::{Point, Rect};

use super::obstacle::{Obstacle, ObstacleId};
use super::segment::{Line, Segment};
use super::vertex::{Vertex, VertexId};

/// Which coordinates a vertex is resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Original,
    Grown,
}

/// Everything that lives on the routing plane: obstacles in registration order and
/// the free endpoint vertices of routes.
#[derive(Debug, Default)]
pub(crate) struct Plane {
    obstacles: HashMap<ObstacleId, Obstacle>,
    order: Vec<ObstacleId>,
    free: HashMap<u32, Vertex>,
    next_obstacle: u32,
    next_vertex: u32,
    pub(crate) spacing: i32,
}

impl Plane {
    pub(crate) fn new(spacing: i32) -> Self {
        Self {
            spacing,
            ..Self::default()
        }
    }

    pub(crate) fn add_obstacle(&mut self, bounds: Rect) -> ObstacleId {
        let id = ObstacleId(self.next_obstacle);
        self.next_obstacle += 1;
        self.obstacles
            .insert(id, Obstacle::new(id, bounds, self.spacing));
        self.order.push(id);
        id
    }

    /// Removes the first registered obstacle with exactly these bounds.
    pub(crate) fn remove_obstacle(&mut self, bounds: Rect) -> Option<Obstacle> {
        let index = self
            .order
            .iter()
            .position(|id| self.obstacles.get(id).is_some_and(|o| o.bounds() == bounds))?;
        let id = self.order.remove(index);
        self.obstacles.remove(&id)
    }

    pub(crate) fn obstacles(&self) -> impl Iterator<Item = &Obstacle> + '_ {
        self.order.iter().filter_map(|id| self.obstacles.get(id))
    }

    pub(crate) fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(&id)
    }

    pub(crate) fn add_free_vertex(&mut self, origin: Point) -> VertexId {
        let key = self.next_vertex;
        self.next_vertex += 1;
        self.free.insert(key, Vertex::free(origin));
        VertexId::Free(key)
    }

    pub(crate) fn remove_free_vertex(&mut self, id: VertexId) {
        if let VertexId::Free(key) = id {
            self.free.remove(&key);
        }
    }

    pub(crate) fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        match id {
            VertexId::Corner { obstacle, corner } => {
                self.obstacles.get(&obstacle).map(|o| o.vertex(corner))
            }
            VertexId::Free(key) => self.free.get(&key),
        }
    }

    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        match id {
            VertexId::Corner { obstacle, corner } => self
                .obstacles
                .get_mut(&obstacle)
                .map(|o| o.vertex_mut(corner)),
            VertexId::Free(key) => self.free.get_mut(&key),
        }
    }

    pub(crate) fn origin(&self, id: VertexId) -> Point {
        self.vertex(id).map(|v| v.origin).unwrap_or_default()
    }

    pub(crate) fn point(&self, id: VertexId, placement: Placement) -> Point {
        match (self.vertex(id), placement) {
            (Some(v), Placement::Original) => v.origin,
            (Some(v), Placement::Grown) => v.grown(self.spacing),
            (None, _) => Point::default(),
        }
    }

    pub(crate) fn line(&self, segment: Segment, placement: Placement) -> Line {
        Line::new(
            self.point(segment.start, placement),
            self.point(segment.end, placement),
        )
    }

    pub(crate) fn reset_vertices(&mut self) {
        let spacing = self.spacing;
        for obstacle in self.obstacles.values_mut() {
            obstacle.reset_vertices(spacing);
        }
        for vertex in self.free.values_mut() {
            vertex.full_reset(spacing);
        }
    }

    /// Finds the closest foreign obstacle on the outward side of a bending corner and
    /// shrinks the vertex offset to fit. Probed once per solve unless re-armed.
    pub(crate) fn probe_nearest_obstacle(&mut self, id: VertexId) {
        let spacing = self.spacing;
        let Some(vertex) = self.vertex(id) else {
            return;
        };
        if vertex.nearest_obstacle != 0 || vertex.nearest_obstacle_checked {
            return;
        }
        let origin = vertex.origin;
        let mut nearest = vertex.nearest_obstacle;
        if let Some(corner) = vertex.corner {
            let side = 2 * (vertex.total_count * spacing) + 1;
            let y = if corner.is_north() { origin.y - side } else { origin.y };
            let x = if corner.is_east() { origin.x } else { origin.x - side };
            let probe = Rect::new(x, y, side, side);
            let owner = id.obstacle();

            for obstacle in self.obstacles() {
                if Some(obstacle.id()) == owner {
                    continue;
                }
                let bounds = obstacle.bounds();
                if !probe.intersects(&bounds) {
                    continue;
                }
                let position = bounds.position(origin);
                if position == crate::geometry::Position::None {
                    continue;
                }
                let y_dist = if position.is_north() {
                    bounds.y - origin.y
                } else {
                    origin.y - bounds.bottom() + 1
                };
                let x_dist = if position.is_east() {
                    origin.x - bounds.right() + 1
                } else {
                    bounds.x - origin.x
                };
                let dist = x_dist.max(y_dist);
                if dist < nearest || nearest == 0 {
                    nearest = dist;
                }
            }
        }

        if let Some(vertex) = self.vertex_mut(id) {
            vertex.nearest_obstacle = nearest;
            vertex.update_offset();
            vertex.nearest_obstacle_checked = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::obstacle::Corner;

    #[test]
    fn remove_by_bounds_takes_first_match() {
        let mut plane = Plane::new(4);
        let a = plane.add_obstacle(Rect::new(0, 0, 10, 10));
        let b = plane.add_obstacle(Rect::new(0, 0, 10, 10));
        let removed = plane.remove_obstacle(Rect::new(0, 0, 10, 10));
        assert_eq!(removed.map(|o| o.id()), Some(a));
        assert_eq!(plane.obstacles().map(|o| o.id()).collect::<Vec<_>>(), vec![b]);
        assert!(plane.remove_obstacle(Rect::new(1, 1, 1, 1)).is_none());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut plane = Plane::new(4);
        let a = plane.add_obstacle(Rect::new(0, 0, 10, 10));
        plane.remove_obstacle(Rect::new(0, 0, 10, 10));
        let b = plane.add_obstacle(Rect::new(0, 0, 10, 10));
        assert_ne!(a, b);
    }

    #[test]
    fn probe_finds_neighbouring_obstacle() {
        let mut plane = Plane::new(4);
        let owner = plane.add_obstacle(Rect::new(45, 45, 10, 10));
        plane.add_obstacle(Rect::new(30, 62, 10, 10));
        let corner = VertexId::Corner {
            obstacle: owner,
            corner: Corner::BottomLeft,
        };
        if let Some(v) = plane.vertex_mut(corner) {
            v.total_count = 2;
        }
        plane.probe_nearest_obstacle(corner);
        let v = plane.vertex(corner).expect("corner vertex");
        assert_eq!(v.nearest_obstacle, 8);
        assert_eq!(v.offset, 1.0);
        assert!(v.nearest_obstacle_checked);
    }

    #[test]
    fn probe_ignores_far_obstacles() {
        let mut plane = Plane::new(4);
        let owner = plane.add_obstacle(Rect::new(45, 45, 10, 10));
        plane.add_obstacle(Rect::new(200, 200, 10, 10));
        let corner = VertexId::Corner {
            obstacle: owner,
            corner: Corner::TopRight,
        };
        if let Some(v) = plane.vertex_mut(corner) {
            v.total_count = 1;
        }
        plane.probe_nearest_obstacle(corner);
        let v = plane.vertex(corner).expect("corner vertex");
        assert_eq!(v.nearest_obstacle, 0);
        assert_eq!(v.offset, 4.0);
    }
}
