use log::trace;

use super::Router;
use super::obstacle::{Corner, ObstacleId};
use super::plane::{Placement, Plane};
use super::segment::Segment;
use super::vertex::VertexId;
use crate::geometry::Point;

impl<T> Router<T> {
    /// Counts how many chains bend at each vertex.
    pub(super) fn count_vertices(&mut self) {
        for route_id in &self.working_paths {
            let Some(route) = self.routes.get(route_id) else {
                continue;
            };
            let bends = route.segments.len().saturating_sub(1);
            for segment in &route.segments[..bends] {
                if let Some(vertex) = self.plane.vertex_mut(segment.end) {
                    vertex.total_count += 1;
                }
            }
        }
    }

    pub(super) fn check_vertex_intersections(&mut self) {
        for route_id in &self.working_paths {
            let Some(route) = self.routes.get(route_id) else {
                continue;
            };
            let bends = route.segments.len().saturating_sub(1);
            for segment in &route.segments[..bends] {
                self.plane.probe_nearest_obstacle(segment.end);
            }
        }
    }

    pub(super) fn grow_obstacles(&mut self) {
        let mut changed = false;
        for pass in 0..self.config.grow_passes {
            if pass == 0 || changed {
                changed = self.grow_obstacles_pass();
            }
        }
    }

    /// Re-checks every route against the grown corners and inserts via vertices
    /// where a grown segment now clips another obstacle.
    fn grow_obstacles_pass(&mut self) -> bool {
        let mut changed = false;
        for route_id in &self.working_paths {
            let Some(route) = self.routes.get_mut(route_id) else {
                continue;
            };
            let excluded = route.excluded_obstacles.clone();

            if route.grown_segments.is_empty() {
                for segment in route.segments.clone() {
                    match test_offset_segment(&mut self.plane, segment, &excluded) {
                        Some((first, second)) => {
                            route.grown_segments.push(first);
                            route.grown_segments.push(second);
                            changed = true;
                        }
                        None => route.grown_segments.push(segment),
                    }
                }
            } else {
                let current = route.grown_segments.clone();
                let mut inserted = 0;
                for (s, segment) in current.into_iter().enumerate() {
                    if let Some((first, second)) =
                        test_offset_segment(&mut self.plane, segment, &excluded)
                    {
                        let index = s + inserted;
                        route.grown_segments.splice(index..=index, [first, second]);
                        inserted += 1;
                        changed = true;
                    }
                }
            }
        }
        changed
    }
}

/// Looks for an obstacle clipped by the grown segment. On a hit the nearer corner
/// of the clipped diagonal becomes a via vertex and the two replacement segments
/// are returned.
fn test_offset_segment(
    plane: &mut Plane,
    segment: Segment,
    excluded: &[ObstacleId],
) -> Option<(Segment, Segment)> {
    let offset = plane.spacing;
    let via = find_via_vertex(plane, segment, excluded, offset)?;

    if let Some(vertex) = plane.vertex_mut(via) {
        vertex.total_count += 1;
        vertex.nearest_obstacle_checked = false;
    }
    plane.probe_nearest_obstacle(via);
    if let Some(vertex) = plane.vertex_mut(via)
        && vertex.nearest_obstacle != 0
    {
        vertex.update_offset();
    }
    trace!("via vertex {via:?} inserted");

    Some((Segment::new(segment.start, via), Segment::new(via, segment.end)))
}

fn find_via_vertex(
    plane: &Plane,
    segment: Segment,
    excluded: &[ObstacleId],
    offset: i32,
) -> Option<VertexId> {
    let line = plane.line(segment, Placement::Grown);
    let start_owner = segment.start.obstacle();
    let end_owner = segment.end.obstacle();

    for obstacle in plane.obstacles() {
        let id = obstacle.id();
        if Some(id) == start_owner || Some(id) == end_owner || excluded.contains(&id) {
            continue;
        }
        let grown = |corner: Corner| plane.point(obstacle.corner_id(corner), Placement::Grown);
        let (tl, tr) = (grown(Corner::TopLeft), grown(Corner::TopRight));
        let (bl, br) = (grown(Corner::BottomLeft), grown(Corner::BottomRight));
        let main = (
            Point::new(tl.x - offset, tl.y - offset),
            Point::new(br.x + offset, br.y + offset),
        );
        let anti = (
            Point::new(bl.x - offset, bl.y + offset),
            Point::new(tr.x + offset, tr.y - offset),
        );
        let main_pair = (Corner::TopLeft, Corner::BottomRight);
        let anti_pair = (Corner::BottomLeft, Corner::TopRight);
        let order = if line.slope() < 0 {
            [(main, main_pair), (anti, anti_pair)]
        } else {
            [(anti, anti_pair), (main, main_pair)]
        };
        let Some((first, second)) = order
            .into_iter()
            .find(|((a, b), _)| line.intersects(*a, *b))
            .map(|(_, pair)| pair)
        else {
            continue;
        };

        let v1 = obstacle.corner_id(first);
        let v2 = obstacle.corner_id(second);
        let reach = |v: VertexId| {
            let p = plane.point(v, Placement::Grown);
            line.start.distance(p) + line.end.distance(p)
        };
        let via = if reach(v1) > reach(v2) { v2 } else { v1 };

        let Some(via_rect) = plane.vertex(via).map(|v| v.deformed_rect(offset, offset)) else {
            continue;
        };
        let overlaps = |end: VertexId| {
            end.obstacle().is_some()
                && plane
                    .vertex(end)
                    .is_some_and(|v| via_rect.intersects(&v.deformed_rect(offset, offset)))
        };
        if overlaps(segment.end) || overlaps(segment.start) {
            continue;
        }
        return Some(via);
    }
    None
}
