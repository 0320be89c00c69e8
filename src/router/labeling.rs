use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::plane::Plane;
use super::segment::Segment;
use super::vertex::VertexId;
use super::visibility::VisibilityGraph;

#[derive(Debug, Clone, Copy)]
struct Label {
    cost: f64,
    predecessor: Option<VertexId>,
    permanent: bool,
}

/// Min-heap entry: lowest cost first, ties broken by graph insertion order.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    cost: f64,
    order: usize,
    vertex: VertexId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra labels over one visibility graph.
#[derive(Debug, Default)]
pub(crate) struct Labeling {
    labels: HashMap<VertexId, Label>,
    settled: Vec<VertexId>,
}

impl Labeling {
    /// Labels every vertex reachable from `start`. `None` when the search runs
    /// into a settled vertex the graph has no adjacency for.
    pub(crate) fn run(graph: &VisibilityGraph, plane: &Plane, start: VertexId) -> Option<Self> {
        let mut labeling = Labeling::default();
        labeling.labels.insert(
            start,
            Label {
                cost: 0.0,
                predecessor: None,
                permanent: true,
            },
        );
        labeling.settled.push(start);

        let mut heap = BinaryHeap::new();
        let mut current = start;
        let total = graph.vertices().len();

        while labeling.settled.len() < total {
            let neighbors = graph.neighbors(current)?;
            let base = labeling.labels.get(&current).map_or(0.0, |l| l.cost);
            let from = plane.origin(current);
            for &neighbor in neighbors {
                let cost = base + from.distance(plane.origin(neighbor));
                let label = labeling.labels.entry(neighbor).or_insert(Label {
                    cost: f64::INFINITY,
                    predecessor: None,
                    permanent: false,
                });
                if label.permanent || label.cost <= cost {
                    continue;
                }
                label.cost = cost;
                label.predecessor = Some(current);
                heap.push(HeapEntry {
                    cost,
                    order: graph.index_of(neighbor).unwrap_or(usize::MAX),
                    vertex: neighbor,
                });
            }

            let next = loop {
                let Some(entry) = heap.pop() else {
                    break None;
                };
                match labeling.labels.get(&entry.vertex) {
                    Some(label) if !label.permanent && label.cost == entry.cost => {
                        break Some(entry.vertex);
                    }
                    _ => continue,
                }
            };
            let Some(next) = next else {
                break;
            };
            if let Some(label) = labeling.labels.get_mut(&next) {
                label.permanent = true;
            }
            labeling.settled.push(next);
            current = next;
        }

        Some(labeling)
    }

    pub(crate) fn cost(&self, vertex: VertexId) -> Option<f64> {
        self.labels
            .get(&vertex)
            .filter(|l| l.cost.is_finite())
            .map(|l| l.cost)
    }

    /// Vertices in the order they became permanent.
    pub(crate) fn settled(&self) -> &[VertexId] {
        &self.settled
    }

    /// Segments from `start` to `end` along the predecessor chain.
    pub(crate) fn shortest_path(&self, start: VertexId, end: VertexId) -> Option<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut vertex = end;
        while vertex != start {
            let predecessor = self.labels.get(&vertex)?.predecessor?;
            segments.push(Segment::new(predecessor, vertex));
            vertex = predecessor;
        }
        segments.reverse();
        Some(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};

    fn solve(obstacles: &[Rect], s: Point, e: Point) -> (Plane, VertexId, VertexId, Labeling) {
        let mut plane = Plane::new(4);
        for rect in obstacles {
            plane.add_obstacle(*rect);
        }
        let start = plane.add_free_vertex(s);
        let end = plane.add_free_vertex(e);
        let graph = VisibilityGraph::build(&plane, start, end, &[], 0.0).expect("graph");
        let labeling = Labeling::run(&graph, &plane, start).expect("labeling");
        (plane, start, end, labeling)
    }

    #[test]
    fn straight_line_without_obstacles() {
        let (_, start, end, labeling) = solve(&[], Point::new(0, 0), Point::new(30, 40));
        assert_eq!(labeling.cost(end), Some(50.0));
        let path = labeling.shortest_path(start, end).expect("path");
        assert_eq!(path, vec![Segment::new(start, end)]);
    }

    #[test]
    fn ties_go_to_earliest_vertex() {
        let (plane, start, end, labeling) =
            solve(&[Rect::new(45, 45, 10, 10)], Point::new(0, 0), Point::new(100, 100));
        let path = labeling.shortest_path(start, end).expect("path");
        assert_eq!(path.len(), 2);
        assert_eq!(plane.origin(path[0].end), Point::new(45, 54));
    }

    #[test]
    fn settled_costs_never_decrease() {
        let (_, _, _, labeling) = solve(
            &[
                Rect::new(40, 10, 20, 30),
                Rect::new(40, 60, 20, 30),
                Rect::new(80, 30, 15, 40),
            ],
            Point::new(0, 50),
            Point::new(130, 50),
        );
        let costs: Vec<f64> = labeling
            .settled()
            .iter()
            .filter_map(|v| labeling.cost(*v))
            .collect();
        assert!(costs.len() > 2);
        assert!(costs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn empty_graph_labels_only_start() {
        let mut plane = Plane::new(4);
        let start = plane.add_free_vertex(Point::new(0, 0));
        let graph = VisibilityGraph::default();
        let labeling = Labeling::run(&graph, &plane, start).expect("trivial");
        assert!(labeling.shortest_path(start, start).is_some_and(|p| p.is_empty()));
    }
}
