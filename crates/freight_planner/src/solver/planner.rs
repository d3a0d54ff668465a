use std::sync::Arc;

use freight_network::timer_debug;
use tracing::info;

use crate::{error::PlannerError, problem::delivery_problem::DeliveryProblem};

use super::{
    assignment_strategy::AssignmentStrategy,
    auction::AuctionStrategy,
    delivery_plan::DeliveryPlan,
    greedy::GreedyStrategy,
    planner_params::{PlannerParams, StrategyKind},
};

/// Entry point of a planning run: picks the strategy from the params and runs
/// it against the problem.
pub struct Planner {
    problem: Arc<DeliveryProblem>,
    params: PlannerParams,
}

impl Planner {
    pub fn new(problem: impl Into<Arc<DeliveryProblem>>, params: PlannerParams) -> Self {
        Planner {
            problem: problem.into(),
            params,
        }
    }

    pub fn problem(&self) -> &DeliveryProblem {
        &self.problem
    }

    pub fn params(&self) -> &PlannerParams {
        &self.params
    }

    pub fn strategy(&self) -> Box<dyn AssignmentStrategy> {
        match self.params.strategy {
            StrategyKind::Greedy => Box::new(GreedyStrategy),
            StrategyKind::Auction => Box::new(AuctionStrategy::new(self.params.auction.clone())),
        }
    }

    pub fn plan(&self) -> Result<DeliveryPlan, PlannerError> {
        let strategy = self.strategy();

        info!(
            strategy = strategy.name(),
            packages = self.problem.packages().len(),
            vehicles = self.problem.vehicles().len(),
            "Planning deliveries"
        );

        timer_debug!("Assignment", strategy.assign(&self.problem))
    }
}
