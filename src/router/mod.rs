mod growth;
mod labeling;
mod obstacle;
mod path;
mod plane;
mod route;
mod segment;
mod topology;
mod vertex;
mod visibility;

use std::collections::HashMap;

use log::{debug, warn};

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::geometry::{Point, Rect};

pub use obstacle::{Obstacle, ObstacleId};
pub use path::{Path, PathId};
use plane::Plane;
use route::{Route, RouteId};

/// Routes connectors around rectangular obstacles. Paths are re-solved lazily:
/// registry changes only mark the affected paths dirty and [`Router::solve`]
/// recomputes them.
#[derive(Debug)]
pub struct Router<T = ()> {
    config: RouterConfig,
    plane: Plane,
    paths: HashMap<PathId, Path<T>>,
    user_paths: Vec<PathId>,
    routes: HashMap<RouteId, Route>,
    working_paths: Vec<RouteId>,
    /// One route for a simple path, one per leg for a path with bend points.
    path_routes: HashMap<PathId, Vec<RouteId>>,
    next_path: u32,
    next_route: u32,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::with_config(RouterConfig::default())
    }
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            plane: Plane::new(config.spacing),
            config,
            paths: HashMap::new(),
            user_paths: Vec::new(),
            routes: HashMap::new(),
            working_paths: Vec::new(),
            path_routes: HashMap::new(),
            next_path: 0,
            next_route: 0,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn spacing(&self) -> i32 {
        self.config.spacing
    }

    /// Minimum distance kept between paths and from obstacles. When it cannot be
    /// honored, paths around a corner are squeezed together uniformly.
    pub fn set_spacing(&mut self, spacing: i32) {
        self.config.spacing = spacing;
        self.plane.spacing = spacing;
    }

    // ── Obstacles ───────────────────────────────────────────────────────

    /// Registers an obstacle. Returns true when a clean path now touches it and
    /// was marked dirty.
    pub fn add_obstacle(&mut self, bounds: Rect) -> bool {
        let id = self.plane.add_obstacle(bounds);
        let Some(obstacle) = self.plane.obstacle(id) else {
            return false;
        };
        let mut dirtied = false;
        for route_id in &self.working_paths {
            if let Some(route) = self.routes.get_mut(route_id) {
                dirtied |= route.test_and_set(obstacle);
            }
        }
        dirtied
    }

    /// Removes the first obstacle with exactly these bounds. Returns true when a
    /// path was marked dirty by the removal.
    pub fn remove_obstacle(&mut self, bounds: Rect) -> bool {
        let Some(obstacle) = self.plane.remove_obstacle(bounds) else {
            return false;
        };
        let mut dirtied = false;
        for corner in [
            obstacle::Corner::BottomLeft,
            obstacle::Corner::TopLeft,
            obstacle::Corner::BottomRight,
            obstacle::Corner::TopRight,
        ] {
            dirtied |= self.dirty_routes_on(obstacle.vertex(corner));
        }
        for route_id in &self.working_paths {
            if let Some(route) = self.routes.get_mut(route_id)
                && !route.dirty
                && route.is_obstacle_visible(obstacle.id())
            {
                route.dirty = true;
                dirtied = true;
            }
        }
        dirtied
    }

    pub fn update_obstacle(&mut self, old_bounds: Rect, new_bounds: Rect) -> bool {
        let removed = self.remove_obstacle(old_bounds);
        self.add_obstacle(new_bounds) | removed
    }

    /// Obstacles in registration order.
    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> + '_ {
        self.plane.obstacles()
    }

    /// Dirties the routes still registered among the vertex's back-references.
    /// Records of dropped routes linger until the next solve and are skipped.
    fn dirty_routes_on(&mut self, vertex: &vertex::Vertex) -> bool {
        let mut dirtied = false;
        for (route_id, _) in &vertex.paths {
            if let Some(route) = self.routes.get_mut(route_id) {
                route.dirty = true;
                dirtied = true;
            }
        }
        dirtied
    }

    // ── Paths ───────────────────────────────────────────────────────────

    pub fn add_path(&mut self, path: Path<T>) -> PathId {
        let id = PathId(self.next_path);
        self.next_path += 1;
        let route_id = self.spawn_route(path.start_point(), path.end_point());
        self.working_paths.push(route_id);
        self.path_routes.insert(id, vec![route_id]);
        self.user_paths.push(id);
        self.paths.insert(id, path);
        id
    }

    /// Unregisters a path together with its bend-point legs. Returns false for an
    /// unknown id.
    pub fn remove_path(&mut self, id: PathId) -> bool {
        if self.paths.remove(&id).is_none() {
            return false;
        }
        self.user_paths.retain(|p| *p != id);
        for route_id in self.path_routes.remove(&id).unwrap_or_default() {
            self.drop_route(route_id);
        }
        true
    }

    pub fn path(&self, id: PathId) -> Option<&Path<T>> {
        self.paths.get(&id)
    }

    pub fn path_mut(&mut self, id: PathId) -> Option<&mut Path<T>> {
        self.paths.get_mut(&id)
    }

    pub fn set_bend_points(
        &mut self,
        id: PathId,
        bend_points: Vec<Point>,
    ) -> Result<(), RouterError> {
        let path = self.paths.get_mut(&id).ok_or(RouterError::UnknownPath(id))?;
        path.set_bend_points(bend_points);
        Ok(())
    }

    /// Registered paths in registration order.
    pub fn user_paths(&self) -> impl Iterator<Item = (PathId, &Path<T>)> + '_ {
        self.user_paths
            .iter()
            .filter_map(|id| self.paths.get(id).map(|p| (*id, p)))
    }

    /// Obstacles the last solve of this path had to route around.
    pub fn visible_obstacles(&self, id: PathId) -> Result<Vec<ObstacleId>, RouterError> {
        let routes = self.path_routes.get(&id).ok_or(RouterError::UnknownPath(id))?;
        let mut visible = Vec::new();
        for route in routes.iter().filter_map(|r| self.routes.get(r)) {
            for obstacle in &route.visible_obstacles {
                if !visible.contains(obstacle) {
                    visible.push(*obstacle);
                }
            }
        }
        Ok(visible)
    }

    fn spawn_route(&mut self, start: Point, end: Point) -> RouteId {
        let id = self.allocate_route_id();
        let start = self.plane.add_free_vertex(start);
        let end = self.plane.add_free_vertex(end);
        self.routes.insert(id, Route::new(start, end));
        id
    }

    fn allocate_route_id(&mut self) -> RouteId {
        let id = RouteId(self.next_route);
        self.next_route += 1;
        id
    }

    fn drop_route(&mut self, id: RouteId) {
        self.working_paths.retain(|r| *r != id);
        if let Some(route) = self.routes.remove(&id)
            && route.owns_endpoints
        {
            self.plane.remove_free_vertex(route.start);
            self.plane.remove_free_vertex(route.end);
        }
    }

    // ── Solve ───────────────────────────────────────────────────────────

    /// Brings every path up to date and returns the user paths in registration
    /// order.
    pub fn solve(&mut self) -> Result<Vec<&Path<T>>, RouterError> {
        let solved = self.solve_dirty_paths()?;

        self.count_vertices();
        self.check_vertex_intersections();
        self.grow_obstacles();

        let subpaths = self.label_paths();
        let ordered = self.order_paths();
        self.bend_paths(&ordered);
        self.recombine_subpaths(&ordered, &subpaths);
        self.recombine_children_paths();
        self.cleanup();

        debug!(
            "solved {solved} dirty route(s) of {} working, {} split(s)",
            self.working_paths.len(),
            subpaths.len()
        );

        Ok(self
            .user_paths
            .iter()
            .filter_map(|id| self.paths.get(id))
            .collect())
    }

    fn solve_dirty_paths(&mut self) -> Result<usize, RouterError> {
        self.reconcile_compound_paths();
        self.plane.reset_vertices();

        let mut solved = 0;
        for route_id in self.working_paths.clone() {
            let Some(route) = self.routes.get_mut(&route_id) else {
                continue;
            };
            route.refresh_excluded_obstacles(&self.plane);
            if !route.dirty {
                route.reset_partial();
                continue;
            }

            solved += 1;
            route.full_reset(&self.plane, &self.config);
            let mut found = route.generate_shortest_path(&self.plane)?;
            if !found || route.cost(&self.plane) > route.threshold {
                debug!(
                    "route {:?} retrying without threshold (found: {found}, threshold: {:.1})",
                    route_id, route.threshold
                );
                route.full_reset(&self.plane, &self.config);
                route.threshold = 0.0;
                found = route.generate_shortest_path(&self.plane)?;
            }
            if !found {
                warn!(
                    "no route from {:?} to {:?}",
                    self.plane.origin(route.start),
                    self.plane.origin(route.end)
                );
            }
        }

        self.plane.reset_vertices();
        Ok(solved)
    }

    /// Matches each dirty user path's legs to its bend points and moves leg
    /// endpoints onto the current waypoints.
    fn reconcile_compound_paths(&mut self) {
        for path_id in self.user_paths.clone() {
            let Some(path) = self.paths.get(&path_id) else {
                continue;
            };
            if !path.dirty {
                continue;
            }
            let waypoints = path.waypoints();
            let wanted = waypoints.len() - 1;
            let mut legs = self.path_routes.remove(&path_id).unwrap_or_default();

            while legs.len() > wanted {
                if let Some(leg) = legs.pop() {
                    self.drop_route(leg);
                }
            }
            while legs.len() < wanted {
                let leg = self.spawn_route(waypoints[legs.len()], waypoints[legs.len() + 1]);
                self.working_paths.push(leg);
                legs.push(leg);
            }
            for (i, leg) in legs.iter().enumerate() {
                self.move_route_endpoints(*leg, waypoints[i], waypoints[i + 1]);
            }
            self.path_routes.insert(path_id, legs);
        }
    }

    fn move_route_endpoints(&mut self, id: RouteId, start: Point, end: Point) {
        let Some(route) = self.routes.get_mut(&id) else {
            return;
        };
        if self.plane.origin(route.start) != start {
            self.plane.remove_free_vertex(route.start);
            route.start = self.plane.add_free_vertex(start);
            route.dirty = true;
        }
        if self.plane.origin(route.end) != end {
            self.plane.remove_free_vertex(route.end);
            route.end = self.plane.add_free_vertex(end);
            route.dirty = true;
        }
    }

    fn recombine_children_paths(&mut self) {
        for path_id in &self.user_paths {
            let (Some(path), Some(legs)) =
                (self.paths.get_mut(path_id), self.path_routes.get(path_id))
            else {
                continue;
            };
            path.points.clear();
            path.solved = true;
            for route in legs.iter().filter_map(|r| self.routes.get(r)) {
                path.points.extend_from_slice(&route.points);
                path.points.pop();
                path.solved &= route.solved;
            }
            if let Some(last) = legs
                .last()
                .and_then(|r| self.routes.get(r))
                .and_then(|r| r.points.last())
            {
                path.points.push(*last);
            }
            path.dirty = false;
        }
    }

    fn cleanup(&mut self) {
        for route in self.routes.values_mut() {
            route.cleanup();
        }
    }
}
