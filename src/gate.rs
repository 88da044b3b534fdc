use crate::graph::Graph;
use crate::{EdgeId, NodeId, Result, TrafficError};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// A node with more than two incident edges. A gate lets traffic through
/// only one of its managed edges at a time.
#[derive(Clone, Debug)]
pub struct Gate {
    /// The gated node.
    node: NodeId,
    /// The cycle over the gate's managed edges.
    pool: SwitchPool,
}

/// A restartable cycle over a gate's managed edges.
#[derive(Clone, Debug)]
pub struct SwitchPool {
    /// The managed edges, in ascending order.
    edges: SmallVec<[EdgeId; 4]>,
    /// The index of the edge the next switch will select.
    cursor: usize,
    /// The edge currently selected, once the pool has been switched.
    selected: Option<EdgeId>,
}

/// The set of edges that may carry traffic this tick, in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPath(BTreeSet<EdgeId>);

/// Owns the gates and the open path, which only gate switches may alter.
#[derive(Clone, Debug)]
pub(crate) struct GateController {
    gates: Vec<Gate>,
    open: OpenPath,
}

impl Gate {
    /// Gets the gated node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Gets the edges the gate switches between.
    pub fn managed_edges(&self) -> &[EdgeId] {
        &self.pool.edges
    }

    /// Gets the managed edge that is currently selected.
    pub fn selected(&self) -> Option<EdgeId> {
        self.pool.selected
    }
}

impl SwitchPool {
    fn new(edges: &[EdgeId]) -> Self {
        Self {
            edges: edges.into(),
            cursor: 0,
            selected: None,
        }
    }

    /// Selects the next edge in the cycle, wrapping round after the last.
    fn advance(&mut self) -> EdgeId {
        let edge = self.edges[self.cursor];
        self.cursor = (self.cursor + 1) % self.edges.len();
        self.selected = Some(edge);
        edge
    }
}

impl OpenPath {
    /// Checks whether an edge is open.
    pub fn contains(&self, edge: EdgeId) -> bool {
        self.0.contains(&edge)
    }

    /// Returns an iterator over the open edges in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = EdgeId> + '_ {
        self.0.iter().copied()
    }

    /// Gets the number of open edges.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks whether no edges are open.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl GateController {
    /// Finds the gates of a graph and opens the first managed edge of each.
    ///
    /// Every edge starts open; gates are then switched in ascending node
    /// order, which closes all but one of each gate's managed edges.
    pub fn new(graph: &Graph) -> Self {
        let gates = graph
            .node_ids()
            .filter(|node| graph.degree(*node) > 2)
            .map(|node| Gate {
                node,
                pool: SwitchPool::new(managed_edges(graph, node)),
            })
            .collect::<Vec<_>>();

        let open = OpenPath((0..graph.edges().len()).map(EdgeId).collect());
        let mut controller = Self { gates, open };
        for idx in 0..controller.gates.len() {
            controller.select_open_path(idx);
        }

        log::debug!(
            "Found {} gates at nodes {:?}",
            controller.gates.len(),
            controller.gates.iter().map(|g| g.node.0).collect::<Vec<_>>()
        );

        controller
    }

    /// Gets the gates in ascending node order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Gets the currently open edges.
    pub fn open_path(&self) -> &OpenPath {
        &self.open
    }

    /// Switches the gate at index `idx` to its next managed edge, closing
    /// the others.
    pub fn select_open_path(&mut self, idx: usize) {
        let gate = &mut self.gates[idx];
        let edge = gate.pool.advance();
        for managed in &gate.pool.edges {
            self.open.0.remove(managed);
        }
        self.open.0.insert(edge);
        log::trace!("Gate at node {} switched to edge {:?}", gate.node, edge);
    }

    /// Switches every gate whose entry in `switches` is set.
    /// `switches` must have one entry per gate.
    pub fn action(&mut self, switches: &[bool]) -> Result<()> {
        if switches.len() != self.gates.len() {
            return Err(TrafficError::ActionLength {
                expected: self.gates.len(),
                actual: switches.len(),
            });
        }
        for (idx, _) in switches.iter().enumerate().filter(|(_, s)| **s) {
            self.select_open_path(idx);
        }
        Ok(())
    }
}

/// The edges a gate switches between: its incoming edges if it has
/// more of those than outgoing ones, otherwise its outgoing edges.
fn managed_edges(graph: &Graph, node: NodeId) -> &[EdgeId] {
    let (edges_in, edges_out) = (graph.edges_in(node), graph.edges_out(node));
    if edges_in.len() > edges_out.len() {
        edges_in
    } else {
        edges_out
    }
}
