use freight_network::utils::time::as_minutes;
use tracing::{Level, debug, info, instrument, warn};

use crate::{
    error::PlannerError,
    problem::{
        Cost, delivery_problem::DeliveryProblem, package::PackageIdx, vehicle::VehicleIdx,
    },
};

use super::{
    assignment_strategy::AssignmentStrategy,
    delivery_plan::{DeliveryPlan, PlanWarning, UndeliveredReason, unassignable_reason},
    planner_params::{AuctionParams, StrategyKind},
    route_executor::RouteExecutor,
};

struct Bid {
    vehicle: VehicleIdx,
    cost: Cost,
}

/// Tentative state of the auction between rounds.
struct Ledger {
    holders: Vec<Option<VehicleIdx>>,
    bundles: Vec<Vec<PackageIdx>>,
    prices: Vec<f64>,
}

impl Ledger {
    fn new(problem: &DeliveryProblem) -> Self {
        Ledger {
            holders: vec![None; problem.packages().len()],
            bundles: vec![Vec::new(); problem.vehicles().len()],
            prices: vec![0.0; problem.packages().len()],
        }
    }

    fn reassign(&mut self, package: PackageIdx, vehicle: VehicleIdx) {
        if let Some(previous) = self.holders[package.get()] {
            self.bundles[previous.get()].retain(|&idx| idx != package);
        }

        self.bundles[vehicle.get()].push(package);
        self.holders[package.get()] = Some(vehicle);
    }
}

/// Iterative auction: every round, each package goes to the vehicle bidding
/// the lowest cost for its bundle with the package added. Stops on the first
/// round without any change, or on the round cap.
#[derive(Debug, Default, Clone)]
pub struct AuctionStrategy {
    params: AuctionParams,
}

impl AuctionStrategy {
    pub fn new(params: AuctionParams) -> Self {
        AuctionStrategy { params }
    }

    pub fn params(&self) -> &AuctionParams {
        &self.params
    }

    /// Cost of `vehicle` serving `bundle` from its starting station.
    pub fn bundle_cost(
        &self,
        problem: &DeliveryProblem,
        executor: &RouteExecutor,
        vehicle: VehicleIdx,
        bundle: &[PackageIdx],
    ) -> Cost {
        let vehicle = problem.vehicle(vehicle);
        let estimate = executor.estimate(vehicle.start_station(), bundle);
        let load_ratio = problem.bundle_weight(bundle) as f64 / vehicle.capacity() as f64;

        as_minutes(estimate.travel_time)
            + self.params.future_cost_weight
                * problem.average_positioning_cost(estimate.final_station)
            - self.params.utilization_bonus_weight * self.params.utilization_bonus(load_ratio)
    }

    fn is_eligible(
        problem: &DeliveryProblem,
        vehicle: VehicleIdx,
        bundle: &[PackageIdx],
        package: PackageIdx,
    ) -> bool {
        let vehicle = problem.vehicle(vehicle);
        problem.bundle_weight(bundle) <= vehicle.capacity()
            && problem.is_reachable(vehicle.start_station(), problem.package(package).origin())
    }

    /// Lowest and second lowest bids for `package`. Ties keep the earlier vehicle.
    fn collect_bids(
        &self,
        problem: &DeliveryProblem,
        executor: &RouteExecutor,
        ledger: &Ledger,
        package: PackageIdx,
    ) -> (Option<Bid>, Option<Cost>) {
        let mut best: Option<Bid> = None;
        let mut second_best: Option<Cost> = None;

        for (vehicle, _) in problem.vehicles_iter() {
            let mut bundle = ledger.bundles[vehicle.get()].clone();
            if ledger.holders[package.get()] != Some(vehicle) {
                bundle.push(package);
            }

            if !Self::is_eligible(problem, vehicle, &bundle, package) {
                continue;
            }

            let cost = self.bundle_cost(problem, executor, vehicle, &bundle);

            let best_cost = best.as_ref().map(|bid| bid.cost);
            match best_cost {
                Some(best_cost) if cost >= best_cost => {
                    if second_best.is_none_or(|second| cost < second) {
                        second_best = Some(cost);
                    }
                }
                _ => {
                    second_best = best_cost;
                    best = Some(Bid { vehicle, cost });
                }
            }
        }

        (best, second_best)
    }

    /// Runs one round, returns the number of packages that changed vehicle.
    fn run_round(
        &self,
        problem: &DeliveryProblem,
        executor: &RouteExecutor,
        ledger: &mut Ledger,
        candidates: &[PackageIdx],
    ) -> usize {
        let mut changes = 0;

        for &package in candidates {
            let (Some(best), second_best) = self.collect_bids(problem, executor, ledger, package)
            else {
                continue;
            };

            if ledger.holders[package.get()] == Some(best.vehicle) {
                continue;
            }

            ledger.reassign(package, best.vehicle);
            if let Some(second_best) = second_best {
                ledger.prices[package.get()] +=
                    self.params.price_increment * (second_best - best.cost);
            }
            changes += 1;
        }

        changes
    }
}

impl AssignmentStrategy for AuctionStrategy {
    fn name(&self) -> &'static str {
        StrategyKind::Auction.as_str()
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    fn assign(&self, problem: &DeliveryProblem) -> Result<DeliveryPlan, PlannerError> {
        let mut plan = DeliveryPlan::new(StrategyKind::Auction, problem);
        let executor = RouteExecutor::new(problem);
        let mut ledger = Ledger::new(problem);

        let mut candidates = Vec::with_capacity(problem.packages().len());
        for (idx, _) in problem.packages_iter() {
            match unassignable_reason(problem, idx) {
                Some(reason) => plan.mark_undelivered(problem, idx, reason),
                None => candidates.push(idx),
            }
        }

        let mut rounds = 0;
        let mut converged = false;
        while rounds < self.params.max_rounds {
            rounds += 1;
            let changes = self.run_round(problem, &executor, &mut ledger, &candidates);
            debug!(round = rounds, changes, "Auction round");

            if changes == 0 {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(rounds, "Auction stopped on its round cap before stabilizing");
            plan.add_warning(PlanWarning::ConvergenceLimitReached { rounds });
        }

        for (vehicle, bundle) in ledger.bundles.iter().enumerate() {
            if bundle.is_empty() {
                continue;
            }

            let vehicle = VehicleIdx::new(vehicle);
            let outcome = executor.execute(plan.vehicle_state_mut(vehicle), bundle)?;
            plan.record_outcome(problem, vehicle, outcome);
        }

        for &idx in &candidates {
            if ledger.holders[idx.get()].is_none() {
                plan.mark_undelivered(problem, idx, UndeliveredReason::NoEligibleVehicle);
            }
        }

        plan.set_prices(ledger.prices);
        let plan = plan.finish();

        info!(
            rounds,
            converged,
            delivered = plan.num_delivered(),
            undelivered = plan.undelivered().len(),
            "Auction assignment done"
        );

        Ok(plan)
    }
}
