use std::collections::HashMap;

use crate::error::RouterError;
use crate::geometry::{Point, Position, Rect};

use super::obstacle::{Corner, Obstacle, ObstacleId};
use super::plane::Plane;
use super::segment::Segment;
use super::vertex::VertexId;

/// Restricted visibility graph of one route: symmetric adjacency, vertices in
/// insertion order, and the obstacles discovered while building it.
#[derive(Debug, Default, Clone)]
pub(crate) struct VisibilityGraph {
    neighbors: HashMap<VertexId, Vec<VertexId>>,
    index: HashMap<VertexId, usize>,
    vertices: Vec<VertexId>,
    obstacles: Vec<ObstacleId>,
}

impl VisibilityGraph {
    /// Builds the graph between `start` and `end`, pruning candidates outside the
    /// oval `threshold` (0 disables pruning).
    pub(crate) fn build(
        plane: &Plane,
        start: VertexId,
        end: VertexId,
        excluded: &[ObstacleId],
        threshold: f64,
    ) -> Result<Self, RouterError> {
        let mut builder = GraphBuilder {
            plane,
            start,
            end,
            start_point: plane.origin(start),
            end_point: plane.origin(end),
            excluded,
            threshold,
            stack: vec![PendingSegment {
                segment: Segment::new(start, end),
                transparent: [None, None],
            }],
            graph: VisibilityGraph::default(),
        };
        while let Some(pending) = builder.stack.pop() {
            builder.add_segment(pending)?;
        }
        Ok(builder.graph)
    }

    pub(crate) fn neighbors(&self, vertex: VertexId) -> Option<&[VertexId]> {
        self.neighbors.get(&vertex).map(Vec::as_slice)
    }

    pub(crate) fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub(crate) fn index_of(&self, vertex: VertexId) -> Option<usize> {
        self.index.get(&vertex).copied()
    }

    pub(crate) fn obstacles(&self) -> &[ObstacleId] {
        &self.obstacles
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn link(&mut self, segment: Segment) {
        for (a, b) in [(segment.start, segment.end), (segment.end, segment.start)] {
            let list = self.neighbors.entry(a).or_default();
            if !list.contains(&b) {
                list.push(b);
            }
            if !self.index.contains_key(&a) {
                self.index.insert(a, self.vertices.len());
                self.vertices.push(a);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingSegment {
    segment: Segment,
    transparent: [Option<ObstacleId>; 2],
}

struct GraphBuilder<'a> {
    plane: &'a Plane,
    start: VertexId,
    end: VertexId,
    start_point: Point,
    end_point: Point,
    excluded: &'a [ObstacleId],
    threshold: f64,
    stack: Vec<PendingSegment>,
    graph: VisibilityGraph,
}

impl GraphBuilder<'_> {
    fn point(&self, vertex: VertexId) -> Point {
        self.plane.origin(vertex)
    }

    fn outside_threshold(&self, a: Point, b: Point) -> bool {
        if self.threshold == 0.0 {
            return false;
        }
        let oval = |p: Point| p.distance(self.end_point) + p.distance(self.start_point);
        oval(b) > self.threshold || oval(a) > self.threshold
    }

    fn push(&mut self, segment: Segment, first: ObstacleId, second: Option<ObstacleId>) {
        self.stack.push(PendingSegment {
            segment,
            transparent: [Some(first), second],
        });
    }

    fn add_segment(&mut self, pending: PendingSegment) -> Result<(), RouterError> {
        let PendingSegment {
            segment,
            transparent,
        } = pending;
        let a = self.point(segment.start);
        let b = self.point(segment.end);
        if self.outside_threshold(a, b) {
            return Ok(());
        }

        let plane = self.plane;
        for obstacle in plane.obstacles() {
            let id = obstacle.id();
            if transparent.contains(&Some(id)) || self.excluded.contains(&id) {
                continue;
            }
            if obstacle.blocks(a, b) {
                if !self.graph.obstacles.contains(&id) {
                    self.add_obstacle(obstacle)?;
                }
                return Ok(());
            }
        }

        self.graph.link(segment);
        Ok(())
    }

    fn add_obstacle(&mut self, obstacle: &Obstacle) -> Result<(), RouterError> {
        self.graph.obstacles.push(obstacle.id());
        let plane = self.plane;
        let visible = self.graph.obstacles.clone();
        for other in visible.iter().filter_map(|id| plane.obstacle(*id)) {
            if other.id() != obstacle.id() {
                self.add_segments_between(obstacle, other);
            }
        }
        self.add_perimeter_segments(obstacle);
        self.add_tangents(self.start, obstacle)?;
        self.add_tangents(self.end, obstacle)?;
        Ok(())
    }

    fn add_perimeter_segments(&mut self, obs: &Obstacle) {
        let ring = [
            (Corner::TopLeft, Corner::TopRight),
            (Corner::TopRight, Corner::BottomRight),
            (Corner::BottomRight, Corner::BottomLeft),
            (Corner::BottomLeft, Corner::TopLeft),
        ];
        for (from, to) in ring {
            let segment = Segment::new(obs.corner_id(from), obs.corner_id(to));
            self.push(segment, obs.id(), None);
        }
    }

    /// The two candidate tangents from a route endpoint to an obstacle.
    fn add_tangents(&mut self, vertex: VertexId, obs: &Obstacle) -> Result<(), RouterError> {
        use Corner::*;
        let p = self.point(vertex);
        let bounds = obs.bounds();
        let (first, second) = match bounds.position(p) {
            Position::SouthWest | Position::NorthEast => (TopLeft, BottomRight),
            Position::SouthEast | Position::NorthWest => (TopRight, BottomLeft),
            Position::North => (TopLeft, TopRight),
            Position::East => (BottomRight, TopRight),
            Position::South => (BottomRight, BottomLeft),
            Position::West => (TopLeft, BottomLeft),
            Position::None => boundary_tangents(p, &bounds).ok_or(
                RouterError::UnexpectedVertexPosition {
                    vertex: p,
                    obstacle: bounds,
                },
            )?,
        };
        self.push(Segment::new(vertex, obs.corner_id(first)), obs.id(), None);
        self.push(Segment::new(vertex, obs.corner_id(second)), obs.id(), None);
        Ok(())
    }

    fn add_segments_between(&mut self, source: &Obstacle, target: &Obstacle) {
        let s = source.bounds();
        let t = target.bounds();
        if s.intersects(&t) {
            self.add_all_segments_between(source, target);
        } else if t.bottom() - 1 < s.y {
            self.add_segments_target_above_source(source, target);
        } else if s.bottom() - 1 < t.y {
            self.add_segments_target_above_source(target, source);
        } else if t.right() - 1 < s.x {
            self.add_segments_target_beside_source(source, target);
        } else {
            self.add_segments_target_beside_source(target, source);
        }
    }

    fn add_all_segments_between(&mut self, source: &Obstacle, target: &Obstacle) {
        use Corner::*;
        let s = source.bounds();
        let t = target.bounds();
        let mut links = vec![
            (BottomLeft, BottomLeft, false, false),
            (BottomRight, BottomRight, true, true),
            (TopLeft, TopLeft, true, true),
            (TopRight, TopRight, false, false),
        ];
        if s.bottom() == t.bottom() {
            links.push((BottomLeft, BottomRight, false, true));
            links.push((BottomRight, BottomLeft, true, false));
        }
        if s.y == t.y {
            links.push((TopLeft, TopRight, true, false));
            links.push((TopRight, TopLeft, false, true));
        }
        if s.x == t.x {
            links.push((BottomLeft, TopLeft, false, true));
            links.push((TopLeft, BottomLeft, true, false));
        }
        if s.right() == t.right() {
            links.push((BottomRight, TopRight, true, false));
            links.push((TopRight, BottomRight, false, true));
        }
        for (from, to, anti_source, anti_target) in links {
            let segment = Segment::new(source.corner_id(from), target.corner_id(to));
            self.add_connecting_segment(segment, source, target, anti_source, anti_target);
        }
    }

    /// Link between two overlapping obstacles; each flag picks which of that
    /// obstacle's diagonals may occlude it.
    fn add_connecting_segment(
        &mut self,
        segment: Segment,
        o1: &Obstacle,
        o2: &Obstacle,
        anti_diagonal_1: bool,
        anti_diagonal_2: bool,
    ) {
        let a = self.point(segment.start);
        let b = self.point(segment.end);
        if self.outside_threshold(a, b) {
            return;
        }
        if o2.bounds().contains_proper(a) || o1.bounds().contains_proper(b) {
            return;
        }
        let line = super::segment::Line::new(a, b);
        let crosses = |obs: &Obstacle, anti: bool| {
            let r = obs.bounds();
            if anti {
                line.intersects(
                    Point::new(r.x, r.bottom() - 1),
                    Point::new(r.right() - 1, r.y),
                )
            } else {
                line.intersects(
                    Point::new(r.x, r.y),
                    Point::new(r.right() - 1, r.bottom() - 1),
                )
            }
        };
        if crosses(o1, anti_diagonal_1) || crosses(o2, anti_diagonal_2) {
            return;
        }
        self.push(segment, o1.id(), Some(o2.id()));
    }

    fn push_pair(&mut self, source: &Obstacle, target: &Obstacle, pair: [(Corner, Corner); 2]) {
        for (from, to) in pair {
            let segment = Segment::new(source.corner_id(from), target.corner_id(to));
            self.push(segment, source.id(), Some(target.id()));
        }
    }

    fn add_segments_target_above_source(&mut self, source: &Obstacle, target: &Obstacle) {
        use Corner::*;
        let s = source.bounds();
        let t = target.bounds();

        let left = if t.x > s.x {
            if t.x < s.right() - 1 {
                [(TopLeft, TopLeft), (TopRight, BottomLeft)]
            } else {
                [(TopLeft, TopLeft), (BottomRight, TopLeft)]
            }
        } else if s.x == t.x {
            [(TopLeft, BottomLeft), (TopRight, BottomLeft)]
        } else {
            [(BottomLeft, BottomLeft), (TopRight, BottomLeft)]
        };
        self.push_pair(source, target, left);

        let right = if t.right() < s.right() {
            if t.right() - 1 > s.x {
                [(TopRight, TopRight), (TopLeft, BottomRight)]
            } else {
                [(TopRight, TopRight), (BottomLeft, TopRight)]
            }
        } else if s.right() == t.right() {
            [(TopRight, BottomRight), (TopLeft, BottomRight)]
        } else {
            [(BottomRight, BottomRight), (TopLeft, BottomRight)]
        };
        self.push_pair(source, target, right);
    }

    fn add_segments_target_beside_source(&mut self, source: &Obstacle, target: &Obstacle) {
        use Corner::*;
        let s = source.bounds();
        let t = target.bounds();

        let top = if t.y > s.y {
            if t.y < s.bottom() - 1 {
                [(TopLeft, TopLeft), (BottomLeft, TopRight)]
            } else {
                [(TopLeft, TopLeft), (BottomRight, TopLeft)]
            }
        } else if s.y == t.y {
            [(TopLeft, TopRight), (BottomLeft, TopRight)]
        } else {
            [(TopRight, TopRight), (BottomLeft, TopRight)]
        };
        self.push_pair(source, target, top);

        let bottom = if t.bottom() < s.bottom() {
            if t.bottom() - 1 > s.y {
                [(BottomLeft, BottomLeft), (TopLeft, BottomRight)]
            } else {
                [(BottomLeft, BottomLeft), (TopRight, BottomLeft)]
            }
        } else if s.bottom() == t.bottom() {
            [(BottomLeft, BottomRight), (TopLeft, BottomRight)]
        } else {
            [(BottomRight, BottomRight), (TopLeft, BottomRight)]
        };
        self.push_pair(source, target, bottom);
    }
}

/// Tangent corners for an endpoint lying on the obstacle's boundary.
fn boundary_tangents(p: Point, bounds: &Rect) -> Option<(Corner, Corner)> {
    use Corner::*;
    if p.x == bounds.x {
        Some((TopLeft, BottomLeft))
    } else if p.y == bounds.y {
        Some((TopLeft, TopRight))
    } else if p.y == bounds.bottom() - 1 {
        Some((BottomLeft, BottomRight))
    } else if p.x == bounds.right() - 1 {
        Some((TopRight, BottomRight))
    } else {
        None
    }
}
