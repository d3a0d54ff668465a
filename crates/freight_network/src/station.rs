use serde::Serialize;

use crate::define_index_newtype;

define_index_newtype!(StationIdx, Station);

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Station {
    name: String,
}

impl Station {
    pub fn new(name: impl Into<String>) -> Self {
        Station { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
