use freight_network::StationIdx;
use jiff::SignedDuration;
use serde::Serialize;

use crate::problem::{
    Weight,
    vehicle::{Vehicle, VehicleIdx},
};

use super::event::MovementEvent;

/// Position, load and clock of a vehicle during a run, with its append-only
/// event log.
#[derive(Serialize, Debug, Clone)]
pub struct VehicleState {
    vehicle: VehicleIdx,
    capacity: Weight,
    station: StationIdx,
    load: Weight,
    time: SignedDuration,
    events: Vec<MovementEvent>,
}

impl VehicleState {
    pub fn new(idx: VehicleIdx, vehicle: &Vehicle) -> Self {
        VehicleState {
            vehicle: idx,
            capacity: vehicle.capacity(),
            station: vehicle.start_station(),
            load: 0,
            time: SignedDuration::ZERO,
            events: Vec::new(),
        }
    }

    pub fn vehicle(&self) -> VehicleIdx {
        self.vehicle
    }

    pub fn station(&self) -> StationIdx {
        self.station
    }

    pub fn load(&self) -> Weight {
        self.load
    }

    pub fn time(&self) -> SignedDuration {
        self.time
    }

    pub fn events(&self) -> &[MovementEvent] {
        &self.events
    }

    pub fn remaining_capacity(&self) -> Weight {
        self.capacity.saturating_sub(self.load)
    }

    pub fn is_idle(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn load_packages(&mut self, weight: Weight) {
        debug_assert!(self.load + weight <= self.capacity, "capacity exceeded");
        self.load += weight;
    }

    pub(crate) fn unload_packages(&mut self, weight: Weight) {
        self.load -= weight;
    }

    /// Appends `event` and moves the vehicle to its destination, `duration` later.
    pub(crate) fn traverse(&mut self, event: MovementEvent, duration: SignedDuration) {
        debug_assert_eq!(event.from(), self.station);
        debug_assert!(event.timestamp() == self.time);

        self.station = event.to();
        self.time += duration;
        self.events.push(event);
    }
}
