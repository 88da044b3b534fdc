use crate::graph::Graph;
use crate::NodeId;
use pathfinding::directed::dijkstra::{build_path, dijkstra_all};
use serde::{Deserialize, Serialize};

/// The shortest path between the pair of nodes whose shortest path visits
/// the most nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestPath {
    /// The first node of the path.
    pub start: NodeId,
    /// The last node of the path.
    pub end: NodeId,
    /// The number of nodes on the path.
    pub len: usize,
    /// The nodes on the path, `start` first.
    pub nodes: Vec<NodeId>,
}

impl LongestPath {
    /// Finds the longest of the all-pairs shortest paths of a graph,
    /// weighting each edge by its capacity.
    ///
    /// Sources and targets are visited in ascending ID order; the first
    /// path strictly longer than all before it wins. Returns `None` only if
    /// the graph has no edges.
    pub fn find(graph: &Graph) -> Option<Self> {
        let mut best: Option<Self> = None;

        for start in graph.node_ids() {
            let parents = dijkstra_all(&start, |node| successors(graph, *node));
            for end in graph.node_ids().filter(|end| parents.contains_key(end)) {
                let nodes = build_path(&end, &parents);
                if best.as_ref().map_or(true, |best| nodes.len() > best.len) {
                    best = Some(Self {
                        start,
                        end,
                        len: nodes.len(),
                        nodes,
                    });
                }
            }
        }

        best
    }
}

/// The nodes reachable in one hop from `node`, with the cost of each hop.
fn successors(graph: &Graph, node: NodeId) -> Vec<(NodeId, u64)> {
    graph
        .edges_out(node)
        .iter()
        .map(|id| graph.edge(*id))
        .map(|edge| (edge.dst, edge.capacity as u64))
        .collect()
}
