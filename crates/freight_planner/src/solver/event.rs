use freight_network::StationIdx;
use jiff::SignedDuration;
use serde::Serialize;
use smallvec::SmallVec;

use crate::problem::{package::PackageIdx, vehicle::VehicleIdx};

pub type PackageList = SmallVec<[PackageIdx; 4]>;

/// One edge traversal of a vehicle, stamped with its departure time.
///
/// `pickups` are the packages loaded at `from` right before departing,
/// `dropoffs` the packages unloaded on arrival at `to`. A stationary event
/// (`from == to`) records a pickup or drop-off that needed no travel.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MovementEvent {
    timestamp: SignedDuration,
    vehicle: VehicleIdx,
    from: StationIdx,
    to: StationIdx,
    pickups: PackageList,
    dropoffs: PackageList,
}

impl MovementEvent {
    pub fn new(
        timestamp: SignedDuration,
        vehicle: VehicleIdx,
        from: StationIdx,
        to: StationIdx,
        pickups: PackageList,
        dropoffs: PackageList,
    ) -> Self {
        MovementEvent {
            timestamp,
            vehicle,
            from,
            to,
            pickups,
            dropoffs,
        }
    }

    pub fn timestamp(&self) -> SignedDuration {
        self.timestamp
    }

    pub fn vehicle(&self) -> VehicleIdx {
        self.vehicle
    }

    pub fn from(&self) -> StationIdx {
        self.from
    }

    pub fn to(&self) -> StationIdx {
        self.to
    }

    pub fn pickups(&self) -> &[PackageIdx] {
        &self.pickups
    }

    pub fn dropoffs(&self) -> &[PackageIdx] {
        &self.dropoffs
    }

    pub fn is_stationary(&self) -> bool {
        self.from == self.to
    }
}
