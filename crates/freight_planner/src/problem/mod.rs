pub mod delivery_problem;
pub mod package;
pub mod vehicle;

pub type Weight = u64;

/// Planning cost, expressed in minutes of travel.
pub type Cost = f64;
