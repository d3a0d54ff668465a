use freight_network::{GraphError, StationIdx};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Package {0} must weigh more than zero")]
    InvalidPackageWeight(String),

    #[error("Vehicle {0} must have a capacity greater than zero")]
    InvalidVehicleCapacity(String),

    #[error("Package {0} is declared more than once")]
    DuplicatePackage(String),

    #[error("Vehicle {0} is declared more than once")]
    DuplicateVehicle(String),

    #[error("{owner} references station index {station} which is not part of the graph")]
    UnknownStationIndex { owner: String, station: StationIdx },

    /// A shortest path contains a step with no matching edge in the graph.
    /// This means the shortest path table and the graph disagree.
    #[error("Corrupted path: no edge from {from} to {to}")]
    CorruptedPath { from: String, to: String },
}
