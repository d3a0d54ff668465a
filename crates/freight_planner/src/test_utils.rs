use freight_network::{StationGraph, StationIdx};
use jiff::SignedDuration;
use rand::Rng;

use crate::{
    problem::{
        Weight,
        delivery_problem::{DeliveryProblem, DeliveryProblemBuilder},
        package::{Package, PackageIdx},
        vehicle::{Vehicle, VehicleIdx},
    },
    solver::{delivery_plan::DeliveryPlan, vehicle_state::VehicleState},
};

pub fn create_graph(stations: &[&str], edges: &[(&str, &str, i64)]) -> StationGraph {
    let mut graph = StationGraph::new();

    for &station in stations {
        graph.add_station(station).unwrap();
    }

    for &(from, to, minutes) in edges {
        graph
            .add_edge(
                format!("{from}-{to}"),
                from,
                to,
                SignedDuration::from_mins(minutes),
            )
            .unwrap();
    }

    graph
}

/// Like [`create_graph`], with every edge one-way.
pub fn create_one_way_graph(stations: &[&str], edges: &[(&str, &str, i64)]) -> StationGraph {
    let mut graph = StationGraph::new();

    for &station in stations {
        graph.add_station(station).unwrap();
    }

    for &(from, to, minutes) in edges {
        graph
            .add_directed_edge(
                format!("{from}->{to}"),
                from,
                to,
                SignedDuration::from_mins(minutes),
            )
            .unwrap();
    }

    graph
}

/// Builds a problem from names. Edge durations are in minutes.
pub fn create_test_problem(
    stations: &[&str],
    edges: &[(&str, &str, i64)],
    packages: &[(&str, Weight, &str, &str)],
    vehicles: &[(&str, Weight, &str)],
) -> DeliveryProblem {
    create_problem_on(create_graph(stations, edges), packages, vehicles)
}

pub fn create_problem_on(
    graph: StationGraph,
    packages: &[(&str, Weight, &str, &str)],
    vehicles: &[(&str, Weight, &str)],
) -> DeliveryProblem {
    let station = |name: &str| graph.station_idx(name).unwrap();

    let packages = packages
        .iter()
        .map(|&(name, weight, origin, destination)| {
            Package::new(name, weight, station(origin), station(destination))
        })
        .collect::<Vec<_>>();
    let vehicles = vehicles
        .iter()
        .map(|&(name, capacity, at)| Vehicle::new(name, capacity, station(at)))
        .collect::<Vec<_>>();

    let mut builder = DeliveryProblemBuilder::new(graph);
    builder.set_packages(packages).set_vehicles(vehicles);
    builder.build().unwrap()
}

/// Connected graph with random packages and fleet. Some packages may be too
/// heavy for every vehicle.
pub fn create_random_problem(
    rng: &mut impl Rng,
    stations: usize,
    packages: usize,
    vehicles: usize,
) -> DeliveryProblem {
    let mut graph = StationGraph::new();
    let names = (0..stations).map(|i| format!("S{i}")).collect::<Vec<_>>();
    for name in &names {
        graph.add_station(name.as_str()).unwrap();
    }

    for i in 1..stations {
        let parent = rng.random_range(0..i);
        graph
            .add_edge(
                format!("E{i}"),
                &names[parent],
                &names[i],
                SignedDuration::from_mins(rng.random_range(1..=30)),
            )
            .unwrap();
    }

    for i in 0..stations / 2 {
        let from = rng.random_range(0..stations);
        let to = rng.random_range(0..stations);
        graph
            .add_edge(
                format!("X{i}"),
                &names[from],
                &names[to],
                SignedDuration::from_mins(rng.random_range(1..=30)),
            )
            .unwrap();
    }

    let mut builder = DeliveryProblemBuilder::new(graph);

    for i in 0..packages {
        builder.add_package(Package::new(
            format!("P{i}"),
            rng.random_range(1..=10),
            StationIdx::new(rng.random_range(0..stations)),
            StationIdx::new(rng.random_range(0..stations)),
        ));
    }

    for i in 0..vehicles {
        builder.add_vehicle(Vehicle::new(
            format!("T{i}"),
            rng.random_range(8..=15),
            StationIdx::new(rng.random_range(0..stations)),
        ));
    }

    builder.build().unwrap()
}

pub fn create_vehicle_state(problem: &DeliveryProblem, vehicle: usize) -> VehicleState {
    let idx = VehicleIdx::new(vehicle);
    VehicleState::new(idx, problem.vehicle(idx))
}

pub fn package_ids(problem: &DeliveryProblem, names: &[&str]) -> Vec<PackageIdx> {
    names
        .iter()
        .map(|name| problem.package_idx(name).unwrap())
        .collect()
}

pub fn station(problem: &DeliveryProblem, name: &str) -> StationIdx {
    problem.graph().station_idx(name).unwrap()
}

/// Replays the log of `state`: events chain, time never goes back and the load
/// stays within capacity.
pub fn assert_capacity_respected(problem: &DeliveryProblem, state: &VehicleState) {
    let capacity = problem.vehicle(state.vehicle()).capacity();
    let mut load: Weight = 0;
    let mut time = SignedDuration::ZERO;
    let mut station = problem.vehicle(state.vehicle()).start_station();

    for event in state.events() {
        assert_eq!(event.from(), station, "events must chain");
        assert!(event.timestamp() >= time, "timestamps must not decrease");

        load += problem.bundle_weight(event.pickups());
        assert!(
            load <= capacity,
            "load {load} exceeds capacity {capacity} of vehicle {}",
            state.vehicle()
        );
        load -= problem.bundle_weight(event.dropoffs());

        time = event.timestamp();
        station = event.to();
    }

    assert_eq!(load, state.load());
    assert_eq!(station, state.station());
}

/// Every delivered package is picked up and dropped off exactly once, by the
/// vehicle it is assigned to. Every other package is reported undelivered.
pub fn assert_plan_consistent(problem: &DeliveryProblem, plan: &DeliveryPlan) {
    let num_packages = problem.packages().len();
    let mut pickups = vec![Vec::new(); num_packages];
    let mut dropoffs = vec![Vec::new(); num_packages];

    for state in plan.vehicles() {
        assert_capacity_respected(problem, state);

        for event in state.events() {
            for &idx in event.pickups() {
                pickups[idx.get()].push(state.vehicle());
            }
            for &idx in event.dropoffs() {
                dropoffs[idx.get()].push(state.vehicle());
            }
        }
    }

    for (idx, package) in problem.packages_iter() {
        match plan.assignment(idx) {
            Some(vehicle) => {
                assert_eq!(pickups[idx.get()], vec![vehicle], "{}", package.name());
                assert_eq!(dropoffs[idx.get()], vec![vehicle], "{}", package.name());
                assert!(plan.undelivered_reason(idx).is_none());
            }
            None => {
                assert!(pickups[idx.get()].is_empty(), "{}", package.name());
                assert!(dropoffs[idx.get()].is_empty(), "{}", package.name());
                assert!(
                    plan.undelivered_reason(idx).is_some(),
                    "{} is neither delivered nor reported",
                    package.name()
                );
            }
        }
    }
}
