use freight_network::{StationIdx, define_index_newtype};
use serde::Serialize;

use super::Weight;

define_index_newtype!(VehicleIdx, Vehicle);

/// Static description of a vehicle. Its position, load and clock during a run
/// live in [`crate::solver::vehicle_state::VehicleState`].
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    name: String,
    capacity: Weight,
    start_station: StationIdx,
}

impl Vehicle {
    pub fn new(name: impl Into<String>, capacity: Weight, start_station: StationIdx) -> Self {
        Vehicle {
            name: name.into(),
            capacity,
            start_station,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> Weight {
        self.capacity
    }

    pub fn start_station(&self) -> StationIdx {
        self.start_station
    }
}
