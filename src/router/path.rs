use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Stable handle of a registered path. Never reused within a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathId(pub(crate) u32);

/// A connector to route from `start` to `end`, optionally through ordered bend
/// points, carrying an opaque caller payload.
#[derive(Debug, Clone)]
pub struct Path<T = ()> {
    start: Point,
    end: Point,
    bend_points: Vec<Point>,
    pub(crate) points: Vec<Point>,
    data: Option<T>,
    pub(crate) dirty: bool,
    pub(crate) solved: bool,
}

impl<T> Path<T> {
    pub fn new(start: impl Into<Point>, end: impl Into<Point>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            bend_points: Vec::new(),
            points: Vec::new(),
            data: None,
            dirty: true,
            solved: false,
        }
    }

    pub fn with_data(data: T, start: impl Into<Point>, end: impl Into<Point>) -> Self {
        let mut path = Self::new(start, end);
        path.data = Some(data);
        path
    }

    pub fn start_point(&self) -> Point {
        self.start
    }

    pub fn end_point(&self) -> Point {
        self.end
    }

    pub fn set_start_point(&mut self, start: impl Into<Point>) {
        let start = start.into();
        if start != self.start {
            self.start = start;
            self.dirty = true;
        }
    }

    pub fn set_end_point(&mut self, end: impl Into<Point>) {
        let end = end.into();
        if end != self.end {
            self.end = end;
            self.dirty = true;
        }
    }

    pub fn bend_points(&self) -> &[Point] {
        &self.bend_points
    }

    /// Replaces the bend points the route must pass through, in order.
    pub fn set_bend_points(&mut self, bend_points: Vec<Point>) {
        self.bend_points = bend_points;
        self.dirty = true;
    }

    /// The routed polyline. Empty until the first [`crate::Router::solve`], then
    /// at least `[start, end]`, even when no route was found.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// False when the last solve found no route; `points()` then keeps the
    /// previous polyline.
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    /// Start, bend points, end.
    pub(crate) fn waypoints(&self) -> Vec<Point> {
        let mut waypoints = Vec::with_capacity(self.bend_points.len() + 2);
        waypoints.push(self.start);
        waypoints.extend_from_slice(&self.bend_points);
        waypoints.push(self.end);
        waypoints
    }
}
