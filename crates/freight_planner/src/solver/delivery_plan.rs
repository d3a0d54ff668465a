use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::problem::{delivery_problem::DeliveryProblem, package::PackageIdx, vehicle::VehicleIdx};

use super::{
    planner_params::StrategyKind, route_executor::RouteOutcome, vehicle_state::VehicleState,
};

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum UndeliveredReason {
    /// Heavier than the largest vehicle capacity
    ExceedsCapacity,
    /// No path links the package origin to its destination, or the vehicle
    /// carrying it could not reach one of them
    Unreachable,
    /// Deliverable on paper, but no vehicle could take it
    NoEligibleVehicle,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndeliveredPackage {
    package: PackageIdx,
    reason: UndeliveredReason,
}

impl UndeliveredPackage {
    pub fn package(&self) -> PackageIdx {
        self.package
    }

    pub fn reason(&self) -> UndeliveredReason {
        self.reason
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanWarning {
    /// The auction stopped on its round cap while assignments were still moving
    ConvergenceLimitReached { rounds: usize },
}

/// Result of a strategy run: who carries what, and every vehicle's event log.
#[derive(Serialize, Debug, Clone)]
pub struct DeliveryPlan {
    strategy: StrategyKind,
    assignments: Vec<Option<VehicleIdx>>,
    prices: Option<Vec<f64>>,
    vehicles: Vec<VehicleState>,
    undelivered: Vec<UndeliveredPackage>,
    warnings: Vec<PlanWarning>,
}

impl DeliveryPlan {
    pub(crate) fn new(strategy: StrategyKind, problem: &DeliveryProblem) -> Self {
        DeliveryPlan {
            strategy,
            assignments: vec![None; problem.packages().len()],
            prices: None,
            vehicles: problem
                .vehicles_iter()
                .map(|(idx, vehicle)| VehicleState::new(idx, vehicle))
                .collect(),
            undelivered: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Vehicle that delivered `package`, if any.
    pub fn assignment(&self, package: PackageIdx) -> Option<VehicleIdx> {
        self.assignments[package.get()]
    }

    pub fn assignments(&self) -> &[Option<VehicleIdx>] {
        &self.assignments
    }

    pub fn prices(&self) -> Option<&[f64]> {
        self.prices.as_deref()
    }

    pub fn vehicles(&self) -> &[VehicleState] {
        &self.vehicles
    }

    pub fn vehicle(&self, idx: VehicleIdx) -> &VehicleState {
        &self.vehicles[idx.get()]
    }

    pub fn undelivered(&self) -> &[UndeliveredPackage] {
        &self.undelivered
    }

    pub fn undelivered_reason(&self, package: PackageIdx) -> Option<UndeliveredReason> {
        self.undelivered
            .iter()
            .find(|undelivered| undelivered.package == package)
            .map(|undelivered| undelivered.reason)
    }

    pub fn warnings(&self) -> &[PlanWarning] {
        &self.warnings
    }

    pub fn num_delivered(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_some()).count()
    }

    /// Time at which the last vehicle becomes idle.
    pub fn makespan(&self) -> SignedDuration {
        self.vehicles
            .iter()
            .map(VehicleState::time)
            .max()
            .unwrap_or(SignedDuration::ZERO)
    }

    pub fn total_travel_time(&self) -> SignedDuration {
        self.vehicles
            .iter()
            .fold(SignedDuration::ZERO, |acc, state| acc + state.time())
    }

    pub(crate) fn vehicle_state_mut(&mut self, idx: VehicleIdx) -> &mut VehicleState {
        &mut self.vehicles[idx.get()]
    }

    pub(crate) fn set_prices(&mut self, prices: Vec<f64>) {
        self.prices = Some(prices);
    }

    pub(crate) fn add_warning(&mut self, warning: PlanWarning) {
        self.warnings.push(warning);
    }

    pub(crate) fn mark_undelivered(
        &mut self,
        problem: &DeliveryProblem,
        package: PackageIdx,
        reason: UndeliveredReason,
    ) {
        warn!(
            package = problem.package(package).name(),
            ?reason,
            "Package cannot be delivered"
        );
        self.undelivered.push(UndeliveredPackage { package, reason });
    }

    pub(crate) fn record_outcome(
        &mut self,
        problem: &DeliveryProblem,
        vehicle: VehicleIdx,
        outcome: RouteOutcome,
    ) {
        for package in outcome.delivered {
            self.assignments[package.get()] = Some(vehicle);
        }

        for package in outcome.undelivered {
            self.mark_undelivered(problem, package, UndeliveredReason::Unreachable);
        }
    }

    /// Orders the undelivered list by package.
    pub(crate) fn finish(mut self) -> Self {
        self.undelivered.sort_by_key(|undelivered| undelivered.package);
        self
    }
}

/// Reason a package can never be delivered, whatever the vehicle.
pub(crate) fn unassignable_reason(
    problem: &DeliveryProblem,
    package: PackageIdx,
) -> Option<UndeliveredReason> {
    let package = problem.package(package);

    if package.weight() > problem.max_capacity() {
        Some(UndeliveredReason::ExceedsCapacity)
    } else if !problem.is_reachable(package.origin(), package.destination()) {
        Some(UndeliveredReason::Unreachable)
    } else {
        None
    }
}
