use fxhash::FxHashMap;
use jiff::SignedDuration;
use rayon::prelude::*;
use tracing::{Level, debug, instrument};

use crate::{
    dijkstra::Dijkstra,
    edge::Edge,
    error::GraphError,
    shortest_path_table::ShortestPathTable,
    station::{Station, StationIdx},
    timer_debug,
    utils::enumerate_idx::EnumerateIdx,
};

/// Adjacency-list graph over interned stations.
///
/// Station names are resolved to a [`StationIdx`] once, when they are
/// registered; every later lookup works on indices.
#[derive(Debug, Clone, Default)]
pub struct StationGraph {
    stations: Vec<Station>,
    station_ids: FxHashMap<String, StationIdx>,
    adjacency: Vec<Vec<Edge>>,
    num_edges: usize,
}

impl StationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_station(&mut self, name: impl Into<String>) -> Result<StationIdx, GraphError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GraphError::EmptyStationName);
        }

        if self.station_ids.contains_key(&name) {
            return Err(GraphError::DuplicateStation(name));
        }

        let idx = StationIdx::new(self.stations.len());
        self.station_ids.insert(name.clone(), idx);
        self.stations.push(Station::new(name));
        self.adjacency.push(Vec::new());

        Ok(idx)
    }

    /// Adds an undirected link, stored as the pair `from -> to` and `to -> from`
    /// with the same duration.
    pub fn add_edge(
        &mut self,
        name: impl Into<String>,
        from: &str,
        to: &str,
        duration: SignedDuration,
    ) -> Result<(), GraphError> {
        let name = name.into();
        let (from, to) = self.resolve_edge(&name, from, to, duration)?;

        self.push_edge(Edge::new(name.clone(), from, to, duration));
        self.push_edge(Edge::new(name, to, from, duration));

        Ok(())
    }

    /// Adds a single `from -> to` edge, for links whose durations differ per
    /// direction.
    pub fn add_directed_edge(
        &mut self,
        name: impl Into<String>,
        from: &str,
        to: &str,
        duration: SignedDuration,
    ) -> Result<(), GraphError> {
        let name = name.into();
        let (from, to) = self.resolve_edge(&name, from, to, duration)?;

        self.push_edge(Edge::new(name, from, to, duration));

        Ok(())
    }

    fn resolve_edge(
        &self,
        name: &str,
        from: &str,
        to: &str,
        duration: SignedDuration,
    ) -> Result<(StationIdx, StationIdx), GraphError> {
        let from = self.require_station(from)?;
        let to = self.require_station(to)?;

        if duration.is_negative() {
            return Err(GraphError::InvalidEdgeWeight {
                edge: name.to_owned(),
                duration,
            });
        }

        Ok((from, to))
    }

    fn push_edge(&mut self, edge: Edge) {
        self.adjacency[edge.from().get()].push(edge);
        self.num_edges += 1;
    }

    pub fn station_idx(&self, name: &str) -> Option<StationIdx> {
        self.station_ids.get(name).copied()
    }

    pub fn require_station(&self, name: &str) -> Result<StationIdx, GraphError> {
        self.station_idx(name)
            .ok_or_else(|| GraphError::UnknownStation(name.to_owned()))
    }

    pub fn station(&self, idx: StationIdx) -> &Station {
        &self.stations[idx]
    }

    pub fn station_name(&self, idx: StationIdx) -> &str {
        self.stations[idx].name()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn stations_iter(&self) -> impl Iterator<Item = (StationIdx, &Station)> {
        self.stations.iter().enumerate_idx()
    }

    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn edges_from(&self, station: StationIdx) -> &[Edge] {
        &self.adjacency[station.get()]
    }

    /// Duration of the fastest direct edge between two adjacent stations.
    pub fn edge_duration(&self, from: StationIdx, to: StationIdx) -> Option<SignedDuration> {
        self.edges_from(from)
            .iter()
            .filter(|edge| edge.to() == to)
            .map(Edge::duration)
            .min()
    }

    /// Runs Dijkstra from every station. Sources are independent, so they are
    /// spread over the rayon pool and reassembled in station order.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn compute_all_pairs(&self) -> ShortestPathTable {
        debug!(
            stations = self.num_stations(),
            edges = self.num_edges(),
            "Computing all-pairs shortest paths"
        );

        timer_debug!("compute_all_pairs", {
            let rows = (0..self.num_stations())
                .into_par_iter()
                .map_init(
                    || Dijkstra::new(self),
                    |dijkstra, source| dijkstra.run(StationIdx::new(source)),
                )
                .collect::<Vec<_>>();

            ShortestPathTable::from_rows(rows)
        })
    }
}
