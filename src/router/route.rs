use log::trace;

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::geometry::Point;

use super::labeling::Labeling;
use super::obstacle::{Obstacle, ObstacleId};
use super::plane::Plane;
use super::segment::Segment;
use super::vertex::VertexId;
use super::visibility::VisibilityGraph;

/// Internal handle of a solving unit: a simple user path, one bend-point child, or
/// a temporary subpath created by a topology split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct RouteId(pub(crate) u32);

/// Per-route solve state. `points` reflects `grown_segments`, which reflect
/// `segments`, once the route is clean and solved.
#[derive(Debug, Clone)]
pub(crate) struct Route {
    pub(crate) start: VertexId,
    pub(crate) end: VertexId,
    /// Whether `start`/`end` are free vertices this route created and must release.
    pub(crate) owns_endpoints: bool,
    pub(crate) dirty: bool,
    pub(crate) solved: bool,
    pub(crate) marked: bool,
    pub(crate) inverted: bool,
    pub(crate) threshold: f64,
    pub(crate) prev_cost_ratio: f64,
    pub(crate) segments: Vec<Segment>,
    pub(crate) grown_segments: Vec<Segment>,
    pub(crate) points: Vec<Point>,
    /// Polyline from the last successful solve, kept while the route is unsolved.
    pub(crate) last_points: Vec<Point>,
    pub(crate) visible_obstacles: Vec<ObstacleId>,
    pub(crate) excluded_obstacles: Vec<ObstacleId>,
    pub(crate) graph: Option<VisibilityGraph>,
    pub(crate) sub_path: Option<RouteId>,
}

impl Route {
    pub(crate) fn new(start: VertexId, end: VertexId) -> Self {
        Self {
            start,
            end,
            owns_endpoints: true,
            dirty: true,
            solved: false,
            marked: false,
            inverted: false,
            threshold: 0.0,
            prev_cost_ratio: 0.0,
            segments: Vec::new(),
            grown_segments: Vec::new(),
            points: Vec::new(),
            last_points: Vec::new(),
            visible_obstacles: Vec::new(),
            excluded_obstacles: Vec::new(),
            graph: None,
            sub_path: None,
        }
    }

    /// Clears everything derived from the visibility graph and recomputes the
    /// pruning threshold.
    pub(crate) fn full_reset(&mut self, plane: &Plane, config: &RouterConfig) {
        self.graph = None;
        self.segments.clear();
        let distance = plane.origin(self.start).distance(plane.origin(self.end));
        self.threshold = if self.prev_cost_ratio == 0.0 {
            distance * config.oval_constant
        } else {
            self.prev_cost_ratio * config.cost_ratio_epsilon * distance
        };
        self.visible_obstacles.clear();
        self.reset_partial();
    }

    /// Clears everything after the shortest path: topology flags, growth and output.
    pub(crate) fn reset_partial(&mut self) {
        self.marked = false;
        self.inverted = false;
        self.sub_path = None;
        self.dirty = false;
        self.grown_segments.clear();
        if !self.points.is_empty() {
            self.last_points = std::mem::take(&mut self.points);
        }
    }

    /// Obstacles strictly containing either endpoint are ignored by this route.
    pub(crate) fn refresh_excluded_obstacles(&mut self, plane: &Plane) {
        let start = plane.origin(self.start);
        let end = plane.origin(self.end);
        self.excluded_obstacles = plane
            .obstacles()
            .filter(|o| o.bounds().contains_proper(start) || o.bounds().contains_proper(end))
            .map(Obstacle::id)
            .collect();
    }

    /// Builds the visibility graph and labels it. Returns whether a path was found.
    pub(crate) fn generate_shortest_path(&mut self, plane: &Plane) -> Result<bool, RouterError> {
        let graph = VisibilityGraph::build(
            plane,
            self.start,
            self.end,
            &self.excluded_obstacles,
            self.threshold,
        )?;
        self.visible_obstacles = graph.obstacles().to_vec();
        let found = !graph.is_empty() && self.determine_shortest_path(&graph, plane);
        self.graph = Some(graph);
        self.solved = found;
        Ok(found)
    }

    fn determine_shortest_path(&mut self, graph: &VisibilityGraph, plane: &Plane) -> bool {
        let Some(labeling) = Labeling::run(graph, plane, self.start) else {
            return false;
        };
        let Some(cost) = labeling.cost(self.end) else {
            return false;
        };
        trace!(
            "settled {} of {} vertices, cost {cost:.1}",
            labeling.settled().len(),
            graph.vertices().len()
        );
        let distance = plane.origin(self.start).distance(plane.origin(self.end));
        if distance > 0.0 {
            self.prev_cost_ratio = cost / distance;
        }
        match labeling.shortest_path(self.start, self.end) {
            Some(segments) => {
                self.segments = segments;
                true
            }
            None => false,
        }
    }

    /// Cost of the current shortest path, by original coordinates.
    pub(crate) fn cost(&self, plane: &Plane) -> f64 {
        self.segments
            .iter()
            .map(|s| plane.origin(s.start).distance(plane.origin(s.end)))
            .sum()
    }

    /// Dirties a clean route whose output touches `obstacle`.
    pub(crate) fn test_and_set(&mut self, obstacle: &Obstacle) -> bool {
        if self.dirty || self.excluded_obstacles.contains(&obstacle.id()) {
            return false;
        }
        if obstacle.touches_polyline(&self.points) {
            self.dirty = true;
            return true;
        }
        false
    }

    pub(crate) fn is_obstacle_visible(&self, obstacle: ObstacleId) -> bool {
        self.visible_obstacles.contains(&obstacle)
    }

    /// Splits the grown chain at `index`: the parent keeps segments up to and
    /// including it and now ends at its end vertex; the returned subpath starts at
    /// its start vertex and runs to the old end.
    pub(crate) fn split_at(&mut self, index: usize, sub_id: RouteId) -> Route {
        let segment = self.grown_segments[index];
        let mut sub = Route::new(segment.start, self.end);
        sub.owns_endpoints = false;
        sub.dirty = false;
        sub.solved = true;
        sub.grown_segments = self.grown_segments[index..].to_vec();
        self.grown_segments.truncate(index + 1);
        self.end = segment.end;
        self.sub_path = Some(sub_id);
        sub
    }

    /// Reattaches a subpath produced by [`Route::split_at`]. The subpath must
    /// already have absorbed its own continuation.
    pub(crate) fn absorb(&mut self, mut sub: Route) {
        if !sub.grown_segments.is_empty() {
            let changed = sub.grown_segments.remove(0);
            if let Some(last) = self.grown_segments.last_mut() {
                last.end = changed.end;
            }
            self.grown_segments.append(&mut sub.grown_segments);
        }

        if !sub.points.is_empty() {
            sub.points.remove(0);
        }
        self.points.pop();
        self.points.append(&mut sub.points);

        for obstacle in sub.visible_obstacles {
            if !self.visible_obstacles.contains(&obstacle) {
                self.visible_obstacles.push(obstacle);
            }
        }
        self.end = sub.end;
        self.sub_path = None;
    }

    /// Interior vertices of the grown chain, in path order.
    pub(crate) fn bend_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        let n = self.grown_segments.len().saturating_sub(1);
        self.grown_segments[..n].iter().map(|s| s.end)
    }

    pub(crate) fn cleanup(&mut self) {
        self.graph = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn route_between(plane: &mut Plane, s: Point, e: Point) -> Route {
        let start = plane.add_free_vertex(s);
        let end = plane.add_free_vertex(e);
        Route::new(start, end)
    }

    #[test]
    fn first_solve_uses_oval_constant() {
        let mut plane = Plane::new(4);
        let mut route = route_between(&mut plane, Point::new(0, 0), Point::new(30, 40));
        route.full_reset(&plane, &RouterConfig::default());
        assert!((route.threshold - 50.0 * 1.13).abs() < 1e-9);
        assert!(!route.dirty);
    }

    #[test]
    fn later_solves_scale_previous_cost_ratio() {
        let mut plane = Plane::new(4);
        plane.add_obstacle(Rect::new(45, 45, 10, 10));
        let mut route = route_between(&mut plane, Point::new(0, 0), Point::new(100, 100));
        let config = RouterConfig::default();
        route.full_reset(&plane, &config);
        assert!(route.generate_shortest_path(&plane).expect("graph"));
        let ratio = route.prev_cost_ratio;
        assert!(ratio > 1.0);
        route.full_reset(&plane, &config);
        let distance = Point::new(0, 0).distance(Point::new(100, 100));
        assert!((route.threshold - ratio * 1.04 * distance).abs() < 1e-9);
    }

    #[test]
    fn exclusions_cover_containing_obstacles() {
        let mut plane = Plane::new(4);
        let inner = plane.add_obstacle(Rect::new(-10, -10, 20, 20));
        plane.add_obstacle(Rect::new(40, 40, 10, 10));
        let mut route = route_between(&mut plane, Point::new(0, 0), Point::new(100, 100));
        route.refresh_excluded_obstacles(&plane);
        assert_eq!(route.excluded_obstacles, vec![inner]);
    }

    #[test]
    fn split_and_absorb_restore_the_chain() {
        let mut plane = Plane::new(4);
        let a = plane.add_free_vertex(Point::new(0, 0));
        let b = plane.add_free_vertex(Point::new(10, 0));
        let c = plane.add_free_vertex(Point::new(10, 10));
        let d = plane.add_free_vertex(Point::new(20, 10));
        let mut route = Route::new(a, d);
        route.grown_segments = vec![Segment::new(a, b), Segment::new(b, c), Segment::new(c, d)];
        let original = route.grown_segments.clone();

        let mut sub = route.split_at(1, RouteId(9));
        assert_eq!(route.end, c);
        assert_eq!(route.grown_segments.len(), 2);
        assert_eq!(sub.start, b);
        assert_eq!(sub.end, d);
        assert_eq!(sub.grown_segments.len(), 2);

        route.points = vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)];
        sub.points = vec![Point::new(10, 0), Point::new(10, 10), Point::new(20, 10)];
        route.absorb(sub);
        assert_eq!(route.end, d);
        assert_eq!(route.grown_segments, original);
        assert_eq!(
            route.points,
            vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10), Point::new(20, 10)]
        );
        assert!(route.sub_path.is_none());
    }

    #[test]
    fn test_and_set_dirties_touching_routes_only() {
        let mut plane = Plane::new(4);
        let mut route = route_between(&mut plane, Point::new(0, 50), Point::new(100, 50));
        route.dirty = false;
        route.points = vec![Point::new(0, 50), Point::new(100, 50)];
        let id = plane.add_obstacle(Rect::new(0, 0, 10, 10));
        let far = plane.obstacle(id).expect("obstacle").clone();
        assert!(!route.test_and_set(&far));
        let id = plane.add_obstacle(Rect::new(45, 45, 10, 10));
        let near = plane.obstacle(id).expect("obstacle").clone();
        assert!(route.test_and_set(&near));
        assert!(route.dirty);
        assert!(!route.test_and_set(&near));
    }
}
