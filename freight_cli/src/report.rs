use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use freight_network::utils::time::as_minutes;
use freight_planner::{
    problem::{delivery_problem::DeliveryProblem, package::PackageIdx},
    solver::{
        delivery_plan::{DeliveryPlan, PlanWarning},
        event::MovementEvent,
    },
};

fn names(problem: &DeliveryProblem, packages: &[PackageIdx]) -> Vec<String> {
    packages
        .iter()
        .map(|&idx| problem.package(idx).name().to_owned())
        .collect()
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn summary_table(problem: &DeliveryProblem, plan: &DeliveryPlan) -> Table {
    let mut table = new_table(vec!["Vehicle", "Capacity", "Station", "Time", "Load", "Moves"]);

    for state in plan.vehicles() {
        let vehicle = problem.vehicle(state.vehicle());
        table.add_row(vec![
            vehicle.name().to_owned(),
            vehicle.capacity().to_string(),
            problem.station_name(state.station()).to_owned(),
            format!("{:#}", state.time()),
            state.load().to_string(),
            state.events().len().to_string(),
        ]);
    }

    table
}

pub fn events_table(problem: &DeliveryProblem, plan: &DeliveryPlan) -> Table {
    let mut table = new_table(vec!["Time", "Vehicle", "From", "Pickups", "To", "Dropoffs"]);

    for event in plan.vehicles().iter().flat_map(|state| state.events()) {
        table.add_row(vec![
            format!("{:#}", event.timestamp()),
            problem.vehicle(event.vehicle()).name().to_owned(),
            problem.station_name(event.from()).to_owned(),
            names(problem, event.pickups()).join(", "),
            problem.station_name(event.to()).to_owned(),
            names(problem, event.dropoffs()).join(", "),
        ]);
    }

    table
}

pub fn undelivered_table(problem: &DeliveryProblem, plan: &DeliveryPlan) -> Table {
    let mut table = new_table(vec!["Package", "Weight", "Origin", "Destination", "Reason"]);

    for undelivered in plan.undelivered() {
        let package = problem.package(undelivered.package());
        table.add_row(vec![
            package.name().to_owned(),
            package.weight().to_string(),
            problem.station_name(package.origin()).to_owned(),
            problem.station_name(package.destination()).to_owned(),
            format!("{:?}", undelivered.reason()),
        ]);
    }

    table
}

/// One line per movement: `W=<minutes>, T=<vehicle>, N1=<from>, P1=[..], N2=<to>, P2=[..]`.
pub fn log_line(problem: &DeliveryProblem, event: &MovementEvent) -> String {
    format!(
        "W={}, T={}, N1={}, P1=[{}], N2={}, P2=[{}]",
        as_minutes(event.timestamp()),
        problem.vehicle(event.vehicle()).name(),
        problem.station_name(event.from()),
        names(problem, event.pickups()).join(", "),
        problem.station_name(event.to()),
        names(problem, event.dropoffs()).join(", "),
    )
}

pub fn log_lines(problem: &DeliveryProblem, plan: &DeliveryPlan) -> Vec<String> {
    plan.vehicles()
        .iter()
        .flat_map(|state| state.events())
        .map(|event| log_line(problem, event))
        .collect()
}

pub fn warning_message(warning: &PlanWarning) -> String {
    match warning {
        PlanWarning::ConvergenceLimitReached { rounds } => {
            format!("auction did not stabilize within {rounds} rounds")
        }
    }
}
