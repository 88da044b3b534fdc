use crate::{CarId, NodeId};

/// Errors raised while building or driving a traffic simulation.
#[derive(Debug, thiserror::Error)]
pub enum TrafficError {
    #[error("the network must contain at least one node")]
    NoNodes,
    #[error("the network has no edges once self-loops are discarded")]
    NoEdges,
    #[error("duplicate edge {src} -> {dst}")]
    DuplicateEdge { src: NodeId, dst: NodeId },
    #[error("edge {src} -> {dst} has zero capacity")]
    ZeroCapacity { src: NodeId, dst: NodeId },
    #[error("at least one car is required")]
    NoCars,
    #[error("node {node} is out of range for a network of {count} nodes")]
    UnknownNode { node: NodeId, count: usize },
    #[error("no gate with index {0}")]
    UnknownGate(usize),
    #[error("no edge {src} -> {dst}")]
    EdgeNotFound { src: NodeId, dst: NodeId },
    #[error("action vector has {actual} entries but there are {expected} gates")]
    ActionLength { expected: usize, actual: usize },
    #[error("car {0:?} is not queued at any node")]
    LostCar(CarId),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrafficError>;
