use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    Greedy,
    #[default]
    Auction,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Greedy => "greedy",
            StrategyKind::Auction => "auction",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greedy" => Ok(StrategyKind::Greedy),
            "auction" => Ok(StrategyKind::Auction),
            other => Err(format!(
                "unknown strategy '{other}', expected 'greedy' or 'auction'"
            )),
        }
    }
}

/// Tuning values of the auction heuristic.
///
/// The cost of giving a bundle to a vehicle is
/// `route_minutes + future_cost_weight * positioning - utilization_bonus_weight * bonus`,
/// where `positioning` is the mean travel time from the route's final station
/// to the other stations and `bonus` is the logistic curve
/// `utilization_scale / (1 + exp(-utilization_steepness * (load_ratio - utilization_midpoint)))`.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AuctionParams {
    pub max_rounds: usize,
    pub future_cost_weight: f64,
    pub utilization_bonus_weight: f64,
    pub price_increment: f64,
    pub utilization_scale: f64,
    pub utilization_steepness: f64,
    pub utilization_midpoint: f64,
}

impl Default for AuctionParams {
    fn default() -> Self {
        Self {
            max_rounds: 50,
            future_cost_weight: 0.3,
            utilization_bonus_weight: 0.2,
            price_increment: 0.1,
            utilization_scale: 100.0,
            utilization_steepness: 10.0,
            utilization_midpoint: 0.5,
        }
    }
}

impl AuctionParams {
    pub fn utilization_bonus(&self, load_ratio: f64) -> f64 {
        self.utilization_scale
            / (1.0
                + (-self.utilization_steepness * (load_ratio - self.utilization_midpoint)).exp())
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerParams {
    pub strategy: StrategyKind,
    pub auction: AuctionParams,
}
