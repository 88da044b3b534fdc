//! Random network generation.

use super::Edge;
use crate::NodeId;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Uniform};

/// Probability that a step continues the chain to a fresh node rather than
/// doubling back to one already visited.
const FRESH_NODE_P: f64 = 0.8;

/// Probability that the next edge starts from the node just reached.
const ADVANCE_P: f64 = 0.8;

/// The largest capacity assigned to a generated edge.
const MAX_CAPACITY: u32 = 10;

/// Generates the edges of a randomly wandering chain over `node_count` nodes.
///
/// Walks a random permutation of the nodes. Each step draws an edge from the
/// current node to either the next node in the permutation or, less often,
/// a random node of the permutation, with a capacity uniform in `1..=10`.
/// The walk then usually advances to the node just reached.
/// Self-loops and repeated pairs are skipped.
pub(crate) fn random_edges(node_count: usize, rng: &mut impl Rng) -> Vec<Edge> {
    let mut order = (0..node_count).map(NodeId).collect::<Vec<_>>();
    order.shuffle(rng);

    let fresh = Bernoulli::new(FRESH_NODE_P).expect("Invalid probability");
    let advance = Bernoulli::new(ADVANCE_P).expect("Invalid probability");
    let capacity = Uniform::new_inclusive(1, MAX_CAPACITY);

    let mut edges: Vec<Edge> = vec![];
    let Some(mut src) = order.pop() else {
        return edges;
    };

    for next in order.iter().copied() {
        let dst = if fresh.sample(rng) {
            next
        } else {
            *order.choose(rng).unwrap_or(&next)
        };
        let capacity = capacity.sample(rng);

        if dst != src && !edges.iter().any(|e| e.src == src && e.dst == dst) {
            edges.push(Edge { src, dst, capacity });
        }

        if advance.sample(rng) {
            src = dst;
        }
    }

    edges
}
