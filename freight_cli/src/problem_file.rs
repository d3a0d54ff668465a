use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use freight_planner::{
    json::types::JsonDeliveryProblem, problem::delivery_problem::DeliveryProblem,
};
use serde::Serialize;
use tracing::{Level, instrument};

pub fn read_problem(path: &Path) -> Result<JsonDeliveryProblem, anyhow::Error> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let json = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid problem file {}", path.display()))?;

    Ok(json)
}

#[instrument(level = Level::DEBUG)]
pub fn load_problem(path: &Path) -> Result<DeliveryProblem, anyhow::Error> {
    let problem = read_problem(path)?
        .build_problem()
        .with_context(|| format!("Invalid problem in {}", path.display()))?;

    Ok(problem)
}

pub fn write_json(path: &Path, value: &impl Serialize) -> Result<(), anyhow::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, serde_json::to_string_pretty(value)?)?;

    Ok(())
}
