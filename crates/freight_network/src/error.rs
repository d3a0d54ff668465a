use jiff::SignedDuration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Edge {edge} has a negative duration: {duration:?}")]
    InvalidEdgeWeight {
        edge: String,
        duration: SignedDuration,
    },

    #[error("Station {0} is already registered")]
    DuplicateStation(String),

    #[error("Station name is empty")]
    EmptyStationName,
}
