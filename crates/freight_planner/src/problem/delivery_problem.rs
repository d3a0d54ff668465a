use fxhash::FxHashSet;
use freight_network::{
    ShortestPath, ShortestPathTable, StationGraph, StationIdx,
    utils::{enumerate_idx::EnumerateIdx, time::as_minutes},
};
use jiff::SignedDuration;
use tracing::{Level, instrument};

use crate::error::PlannerError;

use super::{
    Cost, Weight,
    package::{Package, PackageIdx},
    vehicle::{Vehicle, VehicleIdx},
};

type PrecomputedAveragePositioningCost = Vec<Cost>;

/// Everything a strategy needs to plan one run: the station graph, its
/// shortest path table (computed once when the problem is built), the packages
/// and the fleet.
#[derive(Debug)]
pub struct DeliveryProblem {
    id: Option<String>,
    graph: StationGraph,
    shortest_paths: ShortestPathTable,
    packages: Vec<Package>,
    vehicles: Vec<Vehicle>,

    /// Mean travel time from a station to every other station it can reach
    precomputed_average_positioning_cost: PrecomputedAveragePositioningCost,
    precomputed_max_capacity: Weight,
}

impl DeliveryProblem {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn graph(&self) -> &StationGraph {
        &self.graph
    }

    pub fn shortest_paths(&self) -> &ShortestPathTable {
        &self.shortest_paths
    }

    pub fn station_name(&self, station: StationIdx) -> &str {
        self.graph.station_name(station)
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn package(&self, idx: PackageIdx) -> &Package {
        &self.packages[idx]
    }

    pub fn packages_iter(&self) -> impl Iterator<Item = (PackageIdx, &Package)> {
        self.packages.iter().enumerate_idx()
    }

    pub fn package_idx(&self, name: &str) -> Option<PackageIdx> {
        self.packages
            .iter()
            .position(|package| package.name() == name)
            .map(PackageIdx::new)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, idx: VehicleIdx) -> &Vehicle {
        &self.vehicles[idx]
    }

    pub fn vehicles_iter(&self) -> impl Iterator<Item = (VehicleIdx, &Vehicle)> {
        self.vehicles.iter().enumerate_idx()
    }

    pub fn vehicle_idx(&self, name: &str) -> Option<VehicleIdx> {
        self.vehicles
            .iter()
            .position(|vehicle| vehicle.name() == name)
            .map(VehicleIdx::new)
    }

    #[inline(always)]
    pub fn shortest_path(&self, from: StationIdx, to: StationIdx) -> Option<&ShortestPath> {
        self.shortest_paths.get(from, to)
    }

    #[inline(always)]
    pub fn travel_time(&self, from: StationIdx, to: StationIdx) -> Option<SignedDuration> {
        self.shortest_paths.distance(from, to)
    }

    #[inline(always)]
    pub fn is_reachable(&self, from: StationIdx, to: StationIdx) -> bool {
        self.shortest_paths.is_reachable(from, to)
    }

    pub fn average_positioning_cost(&self, station: StationIdx) -> Cost {
        self.precomputed_average_positioning_cost[station.get()]
    }

    pub fn max_capacity(&self) -> Weight {
        self.precomputed_max_capacity
    }

    pub fn bundle_weight(&self, bundle: &[PackageIdx]) -> Weight {
        bundle.iter().map(|&idx| self.package(idx).weight()).sum()
    }

    fn precompute_average_positioning_cost(
        graph: &StationGraph,
        shortest_paths: &ShortestPathTable,
    ) -> PrecomputedAveragePositioningCost {
        graph
            .stations_iter()
            .map(|(station, _)| as_minutes(shortest_paths.average_distance_to_others(station)))
            .collect()
    }
}

pub struct DeliveryProblemBuilder {
    id: Option<String>,
    graph: StationGraph,
    packages: Vec<Package>,
    vehicles: Vec<Vehicle>,
}

impl DeliveryProblemBuilder {
    pub fn new(graph: StationGraph) -> Self {
        DeliveryProblemBuilder {
            id: None,
            graph,
            packages: Vec::new(),
            vehicles: Vec::new(),
        }
    }

    pub fn set_id(&mut self, id: String) -> &mut DeliveryProblemBuilder {
        self.id = Some(id);
        self
    }

    pub fn set_packages(&mut self, packages: Vec<Package>) -> &mut DeliveryProblemBuilder {
        self.packages = packages;
        self
    }

    pub fn add_package(&mut self, package: Package) -> &mut DeliveryProblemBuilder {
        self.packages.push(package);
        self
    }

    pub fn set_vehicles(&mut self, vehicles: Vec<Vehicle>) -> &mut DeliveryProblemBuilder {
        self.vehicles = vehicles;
        self
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> &mut DeliveryProblemBuilder {
        self.vehicles.push(vehicle);
        self
    }

    fn validate(&self) -> Result<(), PlannerError> {
        let num_stations = self.graph.num_stations();
        let check_station = |owner: &str, station: StationIdx| {
            if station.get() >= num_stations {
                Err(PlannerError::UnknownStationIndex {
                    owner: owner.to_owned(),
                    station,
                })
            } else {
                Ok(())
            }
        };

        let mut names = FxHashSet::default();
        for package in &self.packages {
            if !names.insert(package.name()) {
                return Err(PlannerError::DuplicatePackage(package.name().to_owned()));
            }

            if package.weight() == 0 {
                return Err(PlannerError::InvalidPackageWeight(
                    package.name().to_owned(),
                ));
            }

            check_station(package.name(), package.origin())?;
            check_station(package.name(), package.destination())?;
        }

        let mut names = FxHashSet::default();
        for vehicle in &self.vehicles {
            if !names.insert(vehicle.name()) {
                return Err(PlannerError::DuplicateVehicle(vehicle.name().to_owned()));
            }

            if vehicle.capacity() == 0 {
                return Err(PlannerError::InvalidVehicleCapacity(
                    vehicle.name().to_owned(),
                ));
            }

            check_station(vehicle.name(), vehicle.start_station())?;
        }

        Ok(())
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn build(self) -> Result<DeliveryProblem, PlannerError> {
        self.validate()?;

        let shortest_paths = self.graph.compute_all_pairs();
        Ok(self.assemble(shortest_paths))
    }

    /// Pairs the graph with a table computed elsewhere, which may disagree with it.
    #[cfg(test)]
    pub(crate) fn build_with_shortest_paths(
        self,
        shortest_paths: ShortestPathTable,
    ) -> Result<DeliveryProblem, PlannerError> {
        self.validate()?;
        Ok(self.assemble(shortest_paths))
    }

    fn assemble(self, shortest_paths: ShortestPathTable) -> DeliveryProblem {
        let precomputed_average_positioning_cost =
            DeliveryProblem::precompute_average_positioning_cost(&self.graph, &shortest_paths);

        let precomputed_max_capacity = self
            .vehicles
            .iter()
            .map(Vehicle::capacity)
            .max()
            .unwrap_or(0);

        DeliveryProblem {
            id: self.id,
            graph: self.graph,
            shortest_paths,
            packages: self.packages,
            vehicles: self.vehicles,
            precomputed_average_positioning_cost,
            precomputed_max_capacity,
        }
    }
}
