//! Advancing cars along the open path.

use crate::gate::OpenPath;
use crate::graph::Graph;
use crate::{NodeId, Result, TrafficError};

/// Recirculation of cars from one node straight back to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Refeed {
    pub from: NodeId,
    pub to: NodeId,
    pub flow: u32,
}

/// Moves up to `flow` cars from the front of the `src` queue to the back of
/// the `dst` queue, or up to the capacity of the `src -> dst` edge if `flow`
/// is `None`. Stops early once `src` runs dry.
///
/// Returns the number of cars moved.
pub(crate) fn move_cars(
    graph: &mut Graph,
    src: NodeId,
    dst: NodeId,
    flow: Option<u32>,
) -> Result<usize> {
    let flow = match flow {
        Some(flow) => flow,
        None => {
            let edge = graph
                .find_edge(src, dst)
                .ok_or(TrafficError::EdgeNotFound { src, dst })?;
            graph.edge(edge).capacity
        }
    };
    Ok(transfer(graph, src, dst, flow as usize, None))
}

/// Advances traffic by one tick.
///
/// Open edges are processed in descending order, so an edge is usually
/// drained before the edges feeding its source are. In addition only cars
/// that were already queued at a node when the tick began may leave it,
/// so no car crosses more than one edge per tick whatever the node
/// numbering. A refeed, if given, runs last under the same rule.
///
/// Returns the number of cars moved.
pub(crate) fn tick(graph: &mut Graph, open: &OpenPath, refeed: Option<Refeed>) -> usize {
    let mut supply = graph
        .node_ids()
        .map(|node| graph.queue_len(node))
        .collect::<Vec<_>>();

    let mut moved = 0;
    for id in open.iter().rev() {
        let edge = *graph.edge(id);
        moved += transfer(
            graph,
            edge.src,
            edge.dst,
            edge.capacity as usize,
            Some(&mut supply),
        );
    }

    if let Some(Refeed { from, to, flow }) = refeed {
        let refed = transfer(graph, from, to, flow as usize, Some(&mut supply));
        log::trace!("Refed {} cars from node {} to node {}", refed, from, to);
        moved += refed;
    }

    moved
}

/// Moves up to `flow` cars from `src` to `dst`, drawing down `supply[src]`
/// when a supply budget is given.
fn transfer(
    graph: &mut Graph,
    src: NodeId,
    dst: NodeId,
    flow: usize,
    supply: Option<&mut Vec<usize>>,
) -> usize {
    let flow = match &supply {
        Some(supply) => usize::min(flow, supply[src.0]),
        None => flow,
    };

    let mut moved = 0;
    while moved < flow {
        let Some(car) = graph.dequeue(src) else {
            break;
        };
        graph.enqueue(dst, car);
        moved += 1;
    }

    if let Some(supply) = supply {
        supply[src.0] -= moved;
    }
    moved
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::EdgeSpec;
    use crate::gate::GateController;
    use crate::CarId;
    use slotmap::SlotMap;

    fn graph(edges: &[(usize, usize, u32)]) -> Graph {
        let specs = edges
            .iter()
            .map(|&(src, dst, w)| EdgeSpec { src, dst, w })
            .collect::<Vec<_>>();
        Graph::new(0, &specs).unwrap()
    }

    fn place(graph: &mut Graph, node: usize, count: usize) -> Vec<CarId> {
        let mut cars = SlotMap::<CarId, ()>::with_key();
        (0..count)
            .map(|_| {
                let car = cars.insert(());
                graph.enqueue(NodeId(node), car);
                car
            })
            .collect()
    }

    fn lens(graph: &Graph) -> Vec<usize> {
        graph.node_ids().map(|n| graph.queue_len(n)).collect()
    }

    #[test]
    fn move_uses_capacity() {
        let mut graph = graph(&[(0, 1, 3)]);
        let cars = place(&mut graph, 0, 5);
        assert_eq!(move_cars(&mut graph, NodeId(0), NodeId(1), None).unwrap(), 3);
        assert_eq!(lens(&graph), [2, 3]);
        // The front of the queue leaves first and joins the back.
        assert_eq!(graph.queue(NodeId(1)).iter().copied().collect::<Vec<_>>(), cars[..3]);
    }

    #[test]
    fn move_stops_when_empty() {
        let mut graph = graph(&[(0, 1, 3)]);
        place(&mut graph, 0, 1);
        assert_eq!(move_cars(&mut graph, NodeId(0), NodeId(1), Some(10)).unwrap(), 1);
        assert_eq!(move_cars(&mut graph, NodeId(0), NodeId(1), None).unwrap(), 0);
        assert_eq!(lens(&graph), [0, 1]);
    }

    #[test]
    fn move_with_override_needs_no_edge() {
        let mut graph = graph(&[(0, 1, 3)]);
        place(&mut graph, 1, 4);
        assert_eq!(move_cars(&mut graph, NodeId(1), NodeId(0), Some(2)).unwrap(), 2);
        assert!(matches!(
            move_cars(&mut graph, NodeId(1), NodeId(0), None),
            Err(TrafficError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn chain_tick() {
        let mut graph = graph(&[(0, 1, 3), (1, 2, 2)]);
        place(&mut graph, 0, 5);
        let gates = GateController::new(&graph);

        assert_eq!(tick(&mut graph, gates.open_path(), None), 3);
        assert_eq!(lens(&graph), [2, 3, 0]);

        assert_eq!(tick(&mut graph, gates.open_path(), None), 4);
        assert_eq!(lens(&graph), [0, 3, 2]);
    }

    #[test]
    fn descending_numbering_does_not_double_advance() {
        // Cars flow 2 -> 1 -> 0, against the processing order.
        let mut graph = graph(&[(2, 1, 5), (1, 0, 5)]);
        place(&mut graph, 2, 3);
        let gates = GateController::new(&graph);

        tick(&mut graph, gates.open_path(), None);
        assert_eq!(lens(&graph), [0, 3, 0]);
        tick(&mut graph, gates.open_path(), None);
        assert_eq!(lens(&graph), [3, 0, 0]);
    }

    #[test]
    fn refeed_runs_after_edges() {
        let mut graph = graph(&[(0, 1, 3), (1, 2, 2)]);
        place(&mut graph, 2, 3);
        place(&mut graph, 1, 2);
        let gates = GateController::new(&graph);
        let refeed = Refeed {
            from: NodeId(2),
            to: NodeId(0),
            flow: 2,
        };

        // The two cars reaching node 2 this tick stay there.
        assert_eq!(tick(&mut graph, gates.open_path(), Some(refeed)), 4);
        assert_eq!(lens(&graph), [2, 0, 3]);
    }

    #[test]
    fn closed_edges_carry_nothing() {
        // Gate at node 0 with outgoing edges to 1, 2 and 3.
        let mut graph = graph(&[(0, 1, 5), (0, 2, 5), (0, 3, 5)]);
        place(&mut graph, 0, 6);
        let gates = GateController::new(&graph);

        tick(&mut graph, gates.open_path(), None);
        assert_eq!(lens(&graph), [1, 5, 0, 0]);
    }
}
