use freight_network::{StationIdx, define_index_newtype};
use serde::Serialize;

use super::Weight;

define_index_newtype!(PackageIdx, Package);

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: String,
    weight: Weight,
    origin: StationIdx,
    destination: StationIdx,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        weight: Weight,
        origin: StationIdx,
        destination: StationIdx,
    ) -> Self {
        Package {
            name: name.into(),
            weight,
            origin,
            destination,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn origin(&self) -> StationIdx {
        self.origin
    }

    pub fn destination(&self) -> StationIdx {
        self.destination
    }
}
