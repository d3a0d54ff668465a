pub mod assignment_strategy;
pub mod auction;
pub mod delivery_plan;
pub mod event;
pub mod greedy;
pub mod planner;
pub mod planner_params;
pub mod route_executor;
pub mod vehicle_state;
