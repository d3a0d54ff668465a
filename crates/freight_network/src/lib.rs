pub mod dijkstra;
pub mod edge;
pub mod error;
pub mod graph;
pub mod shortest_path_table;
pub mod station;
pub mod utils;

pub use error::GraphError;
pub use graph::StationGraph;
pub use shortest_path_table::{ShortestPath, ShortestPathTable};
pub use station::{Station, StationIdx};

#[cfg(test)]
pub(crate) mod test_utils;
