use std::{cmp::Ordering, collections::BinaryHeap};

use jiff::SignedDuration;

use crate::{graph::StationGraph, shortest_path_table::ShortestPath, station::StationIdx};

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
struct HeapItem {
    station: StationIdx,
    distance: SignedDuration,
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &HeapItem) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flip both keys to make this a min-heap: smallest distance first,
        // then the station registered first.
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.station.cmp(&self.station))
    }
}

#[derive(Clone, Copy, Default)]
struct NodeData {
    distance: Option<SignedDuration>,
    settled: bool,
    parent: Option<StationIdx>,
}

/// Single-source Dijkstra over a [`StationGraph`].
///
/// Equal-distance candidates are settled in station registration order and a
/// predecessor is only replaced on a strict improvement, so the produced paths
/// are reproducible for a given graph.
pub struct Dijkstra<'a> {
    graph: &'a StationGraph,
    heap: BinaryHeap<HeapItem>,
    data: Vec<NodeData>,
}

impl<'a> Dijkstra<'a> {
    pub fn new(graph: &'a StationGraph) -> Self {
        Dijkstra {
            graph,
            heap: BinaryHeap::with_capacity(graph.num_stations()),
            data: vec![NodeData::default(); graph.num_stations()],
        }
    }

    fn reset(&mut self) {
        self.heap.clear();
        self.data.fill(NodeData::default());
    }

    /// Shortest path from `source` to every station, indexed by destination.
    pub fn run(&mut self, source: StationIdx) -> Vec<Option<ShortestPath>> {
        self.reset();
        let graph = self.graph;

        self.data[source.get()].distance = Some(SignedDuration::ZERO);
        self.heap.push(HeapItem {
            station: source,
            distance: SignedDuration::ZERO,
        });

        while let Some(HeapItem { station, distance }) = self.heap.pop() {
            let node = self.data[station.get()];

            if node.settled {
                continue;
            }

            // Stale entry, a shorter distance was pushed later
            if node.distance.is_some_and(|best| distance > best) {
                continue;
            }

            for edge in graph.edges_from(station) {
                let adj = edge.to();
                let adj_node = &mut self.data[adj.get()];

                if adj_node.settled {
                    continue;
                }

                let next_distance = distance + edge.duration();

                if adj_node.distance.is_none_or(|best| next_distance < best) {
                    adj_node.distance = Some(next_distance);
                    adj_node.parent = Some(station);
                    self.heap.push(HeapItem {
                        station: adj,
                        distance: next_distance,
                    });
                }
            }

            self.data[station.get()].settled = true;
        }

        (0..self.data.len())
            .map(|index| self.build_path(source, StationIdx::new(index)))
            .collect()
    }

    fn build_path(&self, source: StationIdx, target: StationIdx) -> Option<ShortestPath> {
        let distance = self.data[target.get()].distance?;

        let mut stations = Vec::with_capacity(8);
        let mut station = target;
        stations.push(station);

        while station != source {
            // Every reached station except the source has a parent
            station = self.data[station.get()].parent?;
            stations.push(station);
        }

        stations.reverse();

        Some(ShortestPath::new(distance, stations))
    }
}
