use crate::{error::PlannerError, problem::delivery_problem::DeliveryProblem};

use super::delivery_plan::DeliveryPlan;

/// Decides which vehicle carries which package and materializes the routes.
pub trait AssignmentStrategy {
    fn name(&self) -> &'static str;

    fn assign(&self, problem: &DeliveryProblem) -> Result<DeliveryPlan, PlannerError>;
}
