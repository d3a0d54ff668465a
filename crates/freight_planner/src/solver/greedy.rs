use std::collections::BTreeMap;

use freight_network::StationIdx;
use tracing::{Level, debug, info, instrument};

use crate::{
    error::PlannerError,
    problem::{delivery_problem::DeliveryProblem, package::PackageIdx, vehicle::VehicleIdx},
};

use super::{
    assignment_strategy::AssignmentStrategy,
    delivery_plan::{DeliveryPlan, UndeliveredReason, unassignable_reason},
    planner_params::StrategyKind,
    route_executor::RouteExecutor,
    vehicle_state::VehicleState,
};

type WaitingPool = BTreeMap<StationIdx, Vec<PackageIdx>>;

/// Commits vehicles one pickup batch at a time and never revisits a decision.
///
/// The first vehicle (fleet order) that can take packages wins: either every
/// package waiting at its own station, or every package waiting at the nearest
/// station it can reach. A station's batch is never split, it is taken whole
/// only if it fits the vehicle's remaining capacity.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyStrategy;

impl GreedyStrategy {
    fn select_batch(
        problem: &DeliveryProblem,
        state: &VehicleState,
        waiting: &WaitingPool,
    ) -> Option<Vec<PackageIdx>> {
        let here = state.station();
        let remaining_capacity = state.remaining_capacity();
        let fits = |batch: &[PackageIdx]| problem.bundle_weight(batch) <= remaining_capacity;

        if let Some(batch) = waiting.get(&here).filter(|batch| fits(batch)) {
            return Some(batch.clone());
        }

        waiting
            .iter()
            .filter(|&(&station, batch)| station != here && fits(batch))
            .filter_map(|(&station, batch)| {
                problem
                    .travel_time(here, station)
                    .map(|time| (time, station, batch))
            })
            .min_by_key(|&(time, station, _)| (time, station))
            .map(|(_, _, batch)| batch.clone())
    }

    fn select(
        problem: &DeliveryProblem,
        plan: &DeliveryPlan,
        waiting: &WaitingPool,
    ) -> Option<(VehicleIdx, Vec<PackageIdx>)> {
        plan.vehicles().iter().find_map(|state| {
            Self::select_batch(problem, state, waiting).map(|batch| (state.vehicle(), batch))
        })
    }
}

impl AssignmentStrategy for GreedyStrategy {
    fn name(&self) -> &'static str {
        StrategyKind::Greedy.as_str()
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    fn assign(&self, problem: &DeliveryProblem) -> Result<DeliveryPlan, PlannerError> {
        let mut plan = DeliveryPlan::new(StrategyKind::Greedy, problem);
        let executor = RouteExecutor::new(problem);

        let mut waiting = WaitingPool::new();
        for (idx, package) in problem.packages_iter() {
            match unassignable_reason(problem, idx) {
                Some(reason) => plan.mark_undelivered(problem, idx, reason),
                None => waiting.entry(package.origin()).or_default().push(idx),
            }
        }

        let mut batches = 0;
        while let Some((vehicle, batch)) = Self::select(problem, &plan, &waiting) {
            debug!(
                vehicle = problem.vehicle(vehicle).name(),
                packages = batch.len(),
                "Commit batch"
            );

            let origin = problem.package(batch[0]).origin();
            if let Some(packages) = waiting.get_mut(&origin) {
                packages.retain(|idx| !batch.contains(idx));
                if packages.is_empty() {
                    waiting.remove(&origin);
                }
            }

            let outcome = executor.execute(plan.vehicle_state_mut(vehicle), &batch)?;
            plan.record_outcome(problem, vehicle, outcome);
            batches += 1;
        }

        for idx in waiting.into_values().flatten() {
            plan.mark_undelivered(problem, idx, UndeliveredReason::NoEligibleVehicle);
        }

        let plan = plan.finish();

        info!(
            batches,
            delivered = plan.num_delivered(),
            undelivered = plan.undelivered().len(),
            "Greedy assignment done"
        );

        Ok(plan)
    }
}
