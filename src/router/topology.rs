use log::trace;

use super::Router;
use super::plane::Placement;
use super::route::RouteId;
use super::segment::Line;
use super::vertex::TurnKind;

/// One level of the ordering walk: the route being ordered, the bend it is at,
/// and the next sharer of that bend to look at.
struct OrderFrame {
    route: RouteId,
    bend: usize,
    sharer: usize,
}

impl<T> Router<T> {
    /// Classifies every bend as innie or outie, splitting routes whose bends
    /// disagree with classifications other routes already made. Returns the
    /// subpaths created by splits.
    pub(super) fn label_paths(&mut self) -> Vec<RouteId> {
        let mut stack: Vec<RouteId> = self.working_paths.clone();
        let mut subpaths = Vec::new();

        while let Some(route_id) = stack.pop() {
            let Some(route) = self.routes.get_mut(&route_id) else {
                continue;
            };
            if route.marked {
                continue;
            }
            route.marked = true;
            self.label_path(route_id, &mut stack, &mut subpaths);
        }

        for route_id in &self.working_paths {
            if let Some(route) = self.routes.get_mut(route_id) {
                route.marked = false;
            }
        }
        subpaths
    }

    fn label_path(
        &mut self,
        route_id: RouteId,
        stack: &mut Vec<RouteId>,
        subpaths: &mut Vec<RouteId>,
    ) {
        let mut agree = false;
        let mut v = 0;
        loop {
            let Some(route) = self.routes.get(&route_id) else {
                return;
            };
            if v + 1 >= route.grown_segments.len() {
                return;
            }
            let segment = route.grown_segments[v];
            let next = route.grown_segments[v + 1];
            let inverted = route.inverted;
            let vertex_id = segment.end;

            let Some(center) = vertex_id
                .obstacle()
                .and_then(|o| self.plane.obstacle(o))
                .map(|o| o.center())
            else {
                v += 1;
                continue;
            };
            let incoming = self.plane.line(segment, Placement::Original);
            let vertex_point = self.plane.origin(vertex_id);
            let cross = incoming.cross_product(&Line::new(vertex_point, center));
            let kind = self.plane.vertex(vertex_id).map_or(TurnKind::Unset, |vx| vx.kind);

            if kind == TurnKind::Unset {
                let start_kind = self
                    .plane
                    .vertex(segment.start)
                    .map_or(TurnKind::Unset, |vx| vx.kind);
                let label = if cross > 0 {
                    if inverted { TurnKind::Outie } else { TurnKind::Innie }
                } else if cross < 0 {
                    if inverted { TurnKind::Innie } else { TurnKind::Outie }
                } else if start_kind != TurnKind::Unset {
                    start_kind
                } else {
                    TurnKind::Innie
                };
                if let Some(vertex) = self.plane.vertex_mut(vertex_id) {
                    vertex.kind = label;
                }
            } else if !inverted
                && ((cross > 0 && kind == TurnKind::Outie)
                    || (cross < 0 && kind == TurnKind::Innie))
            {
                if agree {
                    self.split(route_id, v, stack, subpaths);
                    return;
                }
                self.invert_prior_vertices(route_id, v);
            } else if inverted
                && ((cross < 0 && kind == TurnKind::Outie)
                    || (cross > 0 && kind == TurnKind::Innie))
            {
                self.split(route_id, v, stack, subpaths);
                return;
            } else {
                agree = true;
            }

            let sharers: Vec<RouteId> = self
                .plane
                .vertex(vertex_id)
                .map(|vx| vx.paths.iter().map(|(id, _)| *id).collect())
                .unwrap_or_default();
            for sharer in sharers {
                if let Some(other) = self.routes.get_mut(&sharer)
                    && !other.marked
                {
                    other.marked = true;
                    stack.push(sharer);
                }
            }

            let cosine = incoming.cosine(&self.plane.line(next, Placement::Original));
            if let Some(vertex) = self.plane.vertex_mut(vertex_id) {
                vertex.add_path(route_id, cosine);
            }
            v += 1;
        }
    }

    fn invert_prior_vertices(&mut self, route_id: RouteId, stop: usize) {
        let Some(route) = self.routes.get_mut(&route_id) else {
            return;
        };
        route.inverted = true;
        for segment in &route.grown_segments[..stop] {
            if let Some(vertex) = self.plane.vertex_mut(segment.end) {
                vertex.kind = vertex.kind.flipped();
            }
        }
    }

    fn split(
        &mut self,
        route_id: RouteId,
        index: usize,
        stack: &mut Vec<RouteId>,
        subpaths: &mut Vec<RouteId>,
    ) {
        let sub_id = self.allocate_route_id();
        let Some(route) = self.routes.get_mut(&route_id) else {
            return;
        };
        let sub = route.split_at(index, sub_id);
        trace!("route {route_id:?} split at bend {index} into {sub_id:?}");
        self.routes.insert(sub_id, sub);
        self.working_paths.push(sub_id);
        subpaths.push(sub_id);
        stack.push(sub_id);
    }

    /// Orders routes so that at every shared bend the route with the more acute
    /// turn is bent first (innermost).
    pub(super) fn order_paths(&mut self) -> Vec<RouteId> {
        let mut ordered = Vec::with_capacity(self.working_paths.len());
        for root in self.working_paths.clone() {
            match self.routes.get_mut(&root) {
                Some(route) if !route.marked => route.marked = true,
                _ => continue,
            }
            let mut frames = vec![OrderFrame {
                route: root,
                bend: 0,
                sharer: 0,
            }];

            while let Some(frame) = frames.last_mut() {
                let Some(route) = self.routes.get(&frame.route) else {
                    frames.pop();
                    continue;
                };
                let bends = route.grown_segments.len().saturating_sub(1);
                if frame.bend >= bends {
                    ordered.push(frame.route);
                    frames.pop();
                    continue;
                }
                let vertex_id = route.grown_segments[frame.bend].end;
                let Some(vertex) = self.plane.vertex(vertex_id) else {
                    frame.bend += 1;
                    continue;
                };
                if frame.sharer >= vertex.paths.len() {
                    frame.bend += 1;
                    frame.sharer = 0;
                    continue;
                }
                let this_angle =
                    signed(vertex.cosine_for(frame.route).unwrap_or(0.0), route.inverted);
                let (other_id, other_cosine) = vertex.paths[frame.sharer];
                frame.sharer += 1;

                let Some(other) = self.routes.get_mut(&other_id) else {
                    continue;
                };
                if other.marked {
                    continue;
                }
                if signed(other_cosine, other.inverted) < this_angle {
                    other.marked = true;
                    frames.push(OrderFrame {
                        route: other_id,
                        bend: 0,
                        sharer: 0,
                    });
                }
            }
        }
        ordered
    }

    /// Turns each ordered route's grown chain into its output polyline.
    pub(super) fn bend_paths(&mut self, ordered: &[RouteId]) {
        for route_id in ordered {
            let Some(route) = self.routes.get_mut(route_id) else {
                continue;
            };
            if !route.solved {
                route.points = if route.last_points.is_empty() {
                    vec![self.plane.origin(route.start), self.plane.origin(route.end)]
                } else {
                    route.last_points.clone()
                };
                continue;
            }

            let mut points = vec![self.plane.origin(route.start)];
            for vertex_id in route.bend_vertices() {
                let Some(vertex) = self.plane.vertex_mut(vertex_id) else {
                    continue;
                };
                if vertex.kind == TurnKind::Innie {
                    vertex.count += 1;
                    points.push(vertex.bend(vertex.count));
                } else {
                    points.push(vertex.bend(vertex.total_count));
                    vertex.total_count -= 1;
                }
            }
            points.push(self.plane.origin(route.end));
            route.points = points;
        }
    }

    /// Folds every split subpath back into the route it was split from.
    pub(super) fn recombine_subpaths(&mut self, ordered: &[RouteId], subpaths: &[RouteId]) {
        for route_id in ordered {
            let mut chain = vec![*route_id];
            while let Some(next) = chain
                .last()
                .and_then(|id| self.routes.get(id))
                .and_then(|r| r.sub_path)
            {
                chain.push(next);
            }
            for pair in chain.windows(2).rev() {
                let (parent_id, sub_id) = (pair[0], pair[1]);
                let Some(sub) = self.routes.remove(&sub_id) else {
                    continue;
                };
                let bends: Vec<_> = sub.bend_vertices().collect();
                for vertex_id in bends {
                    if let Some(vertex) = self.plane.vertex_mut(vertex_id) {
                        vertex.reassign_path(sub_id, parent_id);
                    }
                }
                if let Some(parent) = self.routes.get_mut(&parent_id) {
                    parent.absorb(sub);
                }
            }
        }
        self.working_paths.retain(|id| !subpaths.contains(id));
        for sub_id in subpaths {
            self.routes.remove(sub_id);
        }
    }
}

fn signed(cosine: f64, inverted: bool) -> f64 {
    if inverted { -cosine } else { cosine }
}
