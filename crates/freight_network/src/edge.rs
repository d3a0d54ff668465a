use jiff::SignedDuration;
use serde::Serialize;

use crate::station::StationIdx;

/// A directed, weighted link between two stations.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    name: String,
    from: StationIdx,
    to: StationIdx,
    duration: SignedDuration,
}

impl Edge {
    pub(crate) fn new(
        name: String,
        from: StationIdx,
        to: StationIdx,
        duration: SignedDuration,
    ) -> Self {
        Edge {
            name,
            from,
            to,
            duration,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from(&self) -> StationIdx {
        self.from
    }

    pub fn to(&self) -> StationIdx {
        self.to
    }

    pub fn duration(&self) -> SignedDuration {
        self.duration
    }
}
