pub mod error;
pub mod json;
pub mod problem;
pub mod solver;

pub use error::PlannerError;

#[cfg(test)]
pub(crate) mod test_utils;
