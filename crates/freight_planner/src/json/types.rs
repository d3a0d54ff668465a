use freight_network::StationGraph;
use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{Level, instrument};

use crate::{
    error::PlannerError,
    problem::{
        Weight,
        delivery_problem::{DeliveryProblem, DeliveryProblemBuilder},
        package::{Package, PackageIdx},
        vehicle::Vehicle,
    },
    solver::{
        delivery_plan::{DeliveryPlan, PlanWarning, UndeliveredReason},
        event::MovementEvent,
        planner_params::StrategyKind,
        vehicle_state::VehicleState,
    },
};

pub trait FromProblem<T> {
    fn from_problem(value: T, problem: &DeliveryProblem) -> Self;
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename = "DeliveryProblem")]
pub struct JsonDeliveryProblem {
    pub id: Option<String>,
    pub stations: Vec<String>,
    pub edges: Vec<JsonEdge>,
    pub packages: Vec<JsonPackage>,
    pub vehicles: Vec<JsonVehicle>,
}

/// A link between two stations. Links are two-way unless `directed` is set.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields, rename = "Edge")]
pub struct JsonEdge {
    pub name: String,
    pub from: String,
    pub to: String,
    pub duration: SignedDuration,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub directed: bool,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields, rename = "Package")]
pub struct JsonPackage {
    pub name: String,
    pub weight: Weight,
    pub origin: String,
    pub destination: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields, rename = "Vehicle")]
pub struct JsonVehicle {
    pub name: String,
    pub capacity: Weight,
    pub station: String,
}

impl JsonDeliveryProblem {
    pub fn build_graph(&self) -> Result<StationGraph, PlannerError> {
        let mut graph = StationGraph::new();

        for station in &self.stations {
            graph.add_station(station.as_str())?;
        }

        for edge in &self.edges {
            if edge.directed {
                graph.add_directed_edge(edge.name.as_str(), &edge.from, &edge.to, edge.duration)?;
            } else {
                graph.add_edge(edge.name.as_str(), &edge.from, &edge.to, edge.duration)?;
            }
        }

        Ok(graph)
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn build_problem(self) -> Result<DeliveryProblem, PlannerError> {
        let graph = self.build_graph()?;

        let packages = self
            .packages
            .into_iter()
            .map(|package| {
                Ok(Package::new(
                    package.name,
                    package.weight,
                    graph.require_station(&package.origin)?,
                    graph.require_station(&package.destination)?,
                ))
            })
            .collect::<Result<Vec<_>, PlannerError>>()?;

        let vehicles = self
            .vehicles
            .into_iter()
            .map(|vehicle| {
                Ok(Vehicle::new(
                    vehicle.name,
                    vehicle.capacity,
                    graph.require_station(&vehicle.station)?,
                ))
            })
            .collect::<Result<Vec<_>, PlannerError>>()?;

        let mut builder = DeliveryProblemBuilder::new(graph);

        if let Some(id) = self.id {
            builder.set_id(id);
        }

        builder.set_packages(packages).set_vehicles(vehicles);
        builder.build()
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename = "DeliveryPlan")]
pub struct JsonDeliveryPlan {
    pub id: Option<String>,
    pub strategy: StrategyKind,
    pub makespan: SignedDuration,
    pub total_travel_time: SignedDuration,
    pub assignments: Vec<JsonAssignment>,
    pub undelivered: Vec<JsonUndeliveredPackage>,
    pub routes: Vec<JsonVehicleRoute>,
    pub warnings: Vec<JsonPlanWarning>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename = "Assignment")]
pub struct JsonAssignment {
    pub package: String,
    pub vehicle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename = "UndeliveredPackage")]
pub struct JsonUndeliveredPackage {
    pub package: String,
    pub reason: UndeliveredReason,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename = "VehicleRoute")]
pub struct JsonVehicleRoute {
    pub vehicle: String,
    pub station: String,
    pub time: SignedDuration,
    pub load: Weight,
    pub events: Vec<JsonMovementEvent>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename = "MovementEvent")]
pub struct JsonMovementEvent {
    pub timestamp: SignedDuration,
    pub vehicle: String,
    pub from: String,
    pub to: String,
    pub pickups: Vec<String>,
    pub dropoffs: Vec<String>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename = "PlanWarning", rename_all = "camelCase", tag = "type")]
pub enum JsonPlanWarning {
    ConvergenceLimitReached { rounds: usize },
}

fn package_names(packages: &[PackageIdx], problem: &DeliveryProblem) -> Vec<String> {
    packages
        .iter()
        .map(|&idx| problem.package(idx).name().to_owned())
        .collect()
}

impl FromProblem<&MovementEvent> for JsonMovementEvent {
    fn from_problem(value: &MovementEvent, problem: &DeliveryProblem) -> Self {
        JsonMovementEvent {
            timestamp: value.timestamp(),
            vehicle: problem.vehicle(value.vehicle()).name().to_owned(),
            from: problem.station_name(value.from()).to_owned(),
            to: problem.station_name(value.to()).to_owned(),
            pickups: package_names(value.pickups(), problem),
            dropoffs: package_names(value.dropoffs(), problem),
        }
    }
}

impl FromProblem<&VehicleState> for JsonVehicleRoute {
    fn from_problem(value: &VehicleState, problem: &DeliveryProblem) -> Self {
        JsonVehicleRoute {
            vehicle: problem.vehicle(value.vehicle()).name().to_owned(),
            station: problem.station_name(value.station()).to_owned(),
            time: value.time(),
            load: value.load(),
            events: value
                .events()
                .iter()
                .map(|event| JsonMovementEvent::from_problem(event, problem))
                .collect(),
        }
    }
}

impl From<&PlanWarning> for JsonPlanWarning {
    fn from(value: &PlanWarning) -> Self {
        match *value {
            PlanWarning::ConvergenceLimitReached { rounds } => {
                JsonPlanWarning::ConvergenceLimitReached { rounds }
            }
        }
    }
}

impl FromProblem<&DeliveryPlan> for JsonDeliveryPlan {
    fn from_problem(value: &DeliveryPlan, problem: &DeliveryProblem) -> Self {
        let assignments = problem
            .packages_iter()
            .filter_map(|(idx, package)| {
                value.assignment(idx).map(|vehicle| JsonAssignment {
                    package: package.name().to_owned(),
                    vehicle: problem.vehicle(vehicle).name().to_owned(),
                    price: value.prices().map(|prices| prices[idx.get()]),
                })
            })
            .collect();

        JsonDeliveryPlan {
            id: problem.id().map(str::to_owned),
            strategy: value.strategy(),
            makespan: value.makespan(),
            total_travel_time: value.total_travel_time(),
            assignments,
            undelivered: value
                .undelivered()
                .iter()
                .map(|undelivered| JsonUndeliveredPackage {
                    package: problem.package(undelivered.package()).name().to_owned(),
                    reason: undelivered.reason(),
                })
                .collect(),
            routes: value
                .vehicles()
                .iter()
                .map(|state| JsonVehicleRoute::from_problem(state, problem))
                .collect(),
            warnings: value.warnings().iter().map(JsonPlanWarning::from).collect(),
        }
    }
}
