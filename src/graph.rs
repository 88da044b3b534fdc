use crate::config::EdgeSpec;
use crate::{CarId, EdgeId, NodeId, Result, TrafficError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

mod generate;

/// A directed road between two intersections.
///
/// Edges order by `(src, dst)`; no two edges share that pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// The node cars leave from.
    pub src: NodeId,
    /// The node cars arrive at.
    pub dst: NodeId,
    /// The maximum number of cars moved along the edge per tick.
    pub capacity: u32,
}

/// An intersection.
#[derive(Clone, Debug, Default)]
struct Node {
    /// The cars waiting at the intersection, front first.
    queue: VecDeque<CarId>,
    /// The edges arriving at this node.
    edges_in: SmallVec<[EdgeId; 4]>,
    /// The edges leaving this node.
    edges_out: SmallVec<[EdgeId; 4]>,
}

/// A directed, weighted road network with a car queue at every node.
///
/// The topology is fixed once built; only the queues change.
#[derive(Clone, Debug)]
pub struct Graph {
    /// The nodes, indexed by [NodeId].
    nodes: Vec<Node>,
    /// The edges in ascending order, indexed by [EdgeId].
    edges: Vec<Edge>,
}

impl Graph {
    /// Builds a graph from an explicit edge list.
    ///
    /// The node count is the larger of `min_nodes` and one past the largest
    /// node referenced. Node IDs must be dense: an ID at or beyond both
    /// `min_nodes` and twice the number of edges is rejected. Self-loops
    /// are discarded; duplicate pairs and zero capacities are rejected.
    pub fn new(min_nodes: usize, specs: &[EdgeSpec]) -> Result<Self> {
        let limit = usize::max(min_nodes, specs.len().saturating_mul(2));
        let largest = specs.iter().map(|e| usize::max(e.src, e.dst)).max();
        if let Some(node) = largest.filter(|node| *node >= limit) {
            return Err(TrafficError::UnknownNode {
                node: NodeId(node),
                count: limit,
            });
        }
        let node_count = largest
            .and_then(|node| node.checked_add(1))
            .map_or(min_nodes, |count| usize::max(count, min_nodes));

        let mut edges = Vec::with_capacity(specs.len());
        for spec in specs {
            let (src, dst) = (NodeId(spec.src), NodeId(spec.dst));
            if src == dst {
                log::warn!("Discarding self-loop at node {}", src);
                continue;
            }
            if spec.w == 0 {
                return Err(TrafficError::ZeroCapacity { src, dst });
            }
            edges.push(Edge {
                src,
                dst,
                capacity: spec.w,
            });
        }

        if let Some((src, dst)) = edges.iter().map(|e| (e.src, e.dst)).duplicates().next() {
            return Err(TrafficError::DuplicateEdge { src, dst });
        }

        Self::from_edges(node_count, edges)
    }

    /// Generates a random connected chain over `node_count` nodes.
    pub fn random(node_count: usize, rng: &mut impl rand::Rng) -> Result<Self> {
        if node_count == 0 {
            return Err(TrafficError::NoNodes);
        }
        Self::from_edges(node_count, generate::random_edges(node_count, rng))
    }

    fn from_edges(node_count: usize, mut edges: Vec<Edge>) -> Result<Self> {
        if node_count == 0 {
            return Err(TrafficError::NoNodes);
        }
        if edges.is_empty() {
            return Err(TrafficError::NoEdges);
        }
        edges.sort();

        let mut nodes = vec![Node::default(); node_count];
        for (idx, edge) in edges.iter().enumerate() {
            nodes[edge.src.0].edges_out.push(EdgeId(idx));
            nodes[edge.dst.0].edges_in.push(EdgeId(idx));
        }

        log::debug!(
            "Built network with {} nodes and {} edges",
            nodes.len(),
            edges.len()
        );

        Ok(Self { nodes, edges })
    }

    /// Gets the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns an iterator over the node IDs in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Gets the edges in ascending order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Gets the edge with the given ID.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// Finds the edge from `src` to `dst`, if there is one.
    pub fn find_edge(&self, src: NodeId, dst: NodeId) -> Option<EdgeId> {
        self.edges
            .binary_search_by(|e| (e.src, e.dst).cmp(&(src, dst)))
            .ok()
            .map(EdgeId)
    }

    /// Gets the edges arriving at a node, in ascending order.
    ///
    /// Panics if `node` is not in the graph.
    pub fn edges_in(&self, node: NodeId) -> &[EdgeId] {
        &self.nodes[node.0].edges_in
    }

    /// Gets the edges leaving a node, in ascending order.
    ///
    /// Panics if `node` is not in the graph.
    pub fn edges_out(&self, node: NodeId) -> &[EdgeId] {
        &self.nodes[node.0].edges_out
    }

    /// Gets the total number of edges touching a node.
    ///
    /// Panics if `node` is not in the graph.
    pub fn degree(&self, node: NodeId) -> usize {
        let node = &self.nodes[node.0];
        node.edges_in.len() + node.edges_out.len()
    }

    /// Adds a car to the back of a node's queue.
    pub(crate) fn enqueue(&mut self, node: NodeId, car: CarId) {
        self.nodes[node.0].queue.push_back(car);
    }

    /// Removes the car at the front of a node's queue.
    pub(crate) fn dequeue(&mut self, node: NodeId) -> Option<CarId> {
        self.nodes[node.0].queue.pop_front()
    }

    /// Gets the number of cars waiting at a node.
    ///
    /// Panics if `node` is not in the graph.
    pub fn queue_len(&self, node: NodeId) -> usize {
        self.nodes[node.0].queue.len()
    }

    /// Gets the cars waiting at a node, front first.
    ///
    /// Panics if `node` is not in the graph.
    pub fn queue(&self, node: NodeId) -> &VecDeque<CarId> {
        &self.nodes[node.0].queue
    }

    /// Finds the node at which a car is queued.
    pub fn locate(&self, car: CarId) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.queue.contains(&car))
            .map(NodeId)
    }
}
