use jiff::SignedDuration;
use serde::Serialize;

use crate::station::StationIdx;

/// Total travel time and the ordered stations visited, origin first.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    distance: SignedDuration,
    stations: Vec<StationIdx>,
}

impl ShortestPath {
    pub fn new(distance: SignedDuration, stations: Vec<StationIdx>) -> Self {
        ShortestPath { distance, stations }
    }

    pub fn distance(&self) -> SignedDuration {
        self.distance
    }

    pub fn stations(&self) -> &[StationIdx] {
        &self.stations
    }

    pub fn origin(&self) -> StationIdx {
        self.stations[0]
    }

    pub fn destination(&self) -> StationIdx {
        self.stations[self.stations.len() - 1]
    }

    /// Consecutive `(from, to)` station pairs, one per edge traversal.
    pub fn legs(&self) -> impl Iterator<Item = (StationIdx, StationIdx)> + '_ {
        self.stations.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn num_legs(&self) -> usize {
        self.stations.len() - 1
    }
}

/// All-pairs shortest paths stored in a flat matrix.
/// The entry for a pair of stations lives at `from * num_stations + to`;
/// `None` means the destination cannot be reached from the origin.
#[derive(Debug, Clone)]
pub struct ShortestPathTable {
    paths: Vec<Option<ShortestPath>>,
    num_stations: usize,
}

impl ShortestPathTable {
    pub(crate) fn from_rows(rows: Vec<Vec<Option<ShortestPath>>>) -> Self {
        let num_stations = rows.len();
        debug_assert!(rows.iter().all(|row| row.len() == num_stations));

        ShortestPathTable {
            paths: rows.into_iter().flatten().collect(),
            num_stations,
        }
    }

    #[inline(always)]
    fn index(&self, from: StationIdx, to: StationIdx) -> usize {
        from.get() * self.num_stations + to.get()
    }

    #[inline(always)]
    pub fn get(&self, from: StationIdx, to: StationIdx) -> Option<&ShortestPath> {
        self.paths[self.index(from, to)].as_ref()
    }

    #[inline(always)]
    pub fn distance(&self, from: StationIdx, to: StationIdx) -> Option<SignedDuration> {
        self.get(from, to).map(ShortestPath::distance)
    }

    #[inline(always)]
    pub fn is_reachable(&self, from: StationIdx, to: StationIdx) -> bool {
        self.get(from, to).is_some()
    }

    pub fn num_stations(&self) -> usize {
        self.num_stations
    }

    /// Every destination reachable from `from`, including `from` itself.
    pub fn reachable_from(
        &self,
        from: StationIdx,
    ) -> impl Iterator<Item = (StationIdx, &ShortestPath)> + '_ {
        let start = from.get() * self.num_stations;
        self.paths[start..start + self.num_stations]
            .iter()
            .enumerate()
            .filter_map(|(to, path)| path.as_ref().map(|path| (StationIdx::new(to), path)))
    }

    /// Mean travel time from `from` to every other station it can reach.
    /// Zero when `from` cannot reach any other station.
    pub fn average_distance_to_others(&self, from: StationIdx) -> SignedDuration {
        let (total, count) = self
            .reachable_from(from)
            .filter(|&(to, _)| to != from)
            .fold((0.0, 0usize), |(total, count), (_, path)| {
                (total + path.distance().as_secs_f64(), count + 1)
            });

        if count == 0 {
            return SignedDuration::ZERO;
        }

        SignedDuration::from_secs_f64(total / count as f64)
    }
}
