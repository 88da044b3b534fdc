pub use config::{EdgeSpec, Layout, TrafficConfig};
pub use error::{Result, TrafficError};
pub use gate::{Gate, OpenPath};
pub use graph::{Edge, Graph};
pub use path::LongestPath;
pub use slotmap::{Key, KeyData};
pub use traffic::{Snapshot, StepResult, Traffic};

mod config;
mod error;
mod flow;
mod gate;
mod graph;
mod path;
mod traffic;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Unique ID of a car.
    pub struct CarId;
}

/// ID of a node (intersection). Nodes are numbered densely from zero.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// ID of an edge: its index in the graph's sorted edge list,
/// so ordering edge IDs orders the edges themselves.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
