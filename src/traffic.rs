use crate::config::{Layout, TrafficConfig};
use crate::flow::{self, Refeed};
use crate::gate::{Gate, GateController, OpenPath};
use crate::graph::{Edge, Graph};
use crate::path::LongestPath;
use crate::{CarId, EdgeId, NodeId, Result, TrafficError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use slotmap::SlotMap;
use std::collections::VecDeque;

/// The number of nodes in a random network when none is configured.
const DEFAULT_NODE_COUNT: usize = 10;

/// The index of the car whose journey is rewarded.
const TRACKED_CAR: usize = 1;

/// Reward for the tracked car being at the designated end.
const GOAL_REWARD: i32 = 20;

/// Reward for every other step.
const STEP_REWARD: i32 = -1;

/// A traffic network with cars queued at its nodes and gates at its busy
/// intersections, driven one tick at a time by an external controller.
#[derive(Clone, Debug)]
pub struct Traffic {
    /// The road network and its queues.
    graph: Graph,
    /// The gates and the open path.
    gates: GateController,
    /// The cars, labelled in creation order.
    cars: SlotMap<CarId, String>,
    /// The car whose position decides the reward.
    tracked: CarId,
    /// The node the tracked car is queued at.
    tracked_node: NodeId,
    /// The path whose ends are the designated start and end.
    path: LongestPath,
    /// Layout hint for renderers.
    layout: Layout,
    /// The number of ticks simulated.
    frame: usize,
}

/// The outcome of a [Traffic::step].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepResult {
    /// See [Traffic::state].
    pub state: Vec<usize>,
    /// See [Traffic::reward].
    pub reward: i32,
    /// See [Traffic::is_finished].
    pub done: bool,
}

/// A read-only view of the simulation for renderers.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub layout: Layout,
    pub edges: Vec<Edge>,
    pub open_edges: Vec<EdgeId>,
    pub queue_lengths: Vec<usize>,
    pub tracked_car: CarId,
    pub tracked_node: NodeId,
    pub start: NodeId,
    pub end: NodeId,
    pub frame: usize,
}

impl Traffic {
    /// Builds a traffic simulation.
    ///
    /// Builds (or generates) the network, designates the ends of its longest
    /// shortest path as start and end, opens one managed edge per gate and
    /// distributes the cars.
    ///
    /// The tracked car is `car_1`, the second car created, or `car_0` when
    /// there is only one car. At least one car is required, since the state
    /// and reward are defined by the tracked car's position; a configuration
    /// without cars fails with [TrafficError::NoCars].
    pub fn new(config: &TrafficConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut graph = match &config.edges {
            Some(specs) => Graph::new(config.node_count.unwrap_or(0), specs)?,
            None => Graph::random(config.node_count.unwrap_or(DEFAULT_NODE_COUNT), &mut rng)?,
        };

        let path = LongestPath::find(&graph).ok_or(TrafficError::NoEdges)?;
        log::debug!(
            "Designated start {} and end {} ({} nodes apart)",
            path.start,
            path.end,
            path.len
        );

        let gates = GateController::new(&graph);

        let placement = match &config.placement {
            Some(nodes) => nodes
                .iter()
                .map(|&node| {
                    if node < graph.node_count() {
                        Ok(NodeId(node))
                    } else {
                        Err(TrafficError::UnknownNode {
                            node: NodeId(node),
                            count: graph.node_count(),
                        })
                    }
                })
                .collect::<Result<Vec<_>>>()?,
            None => random_placement(&graph, config.car_count, &mut rng),
        };
        if placement.is_empty() {
            return Err(TrafficError::NoCars);
        }

        let mut cars = SlotMap::with_key();
        let car_ids = placement
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                let car = cars.insert(format!("car_{}", idx));
                graph.enqueue(*node, car);
                car
            })
            .collect::<Vec<_>>();
        let tracked = car_ids[usize::min(TRACKED_CAR, car_ids.len() - 1)];

        let mut traffic = Self {
            graph,
            gates,
            cars,
            tracked,
            tracked_node: NodeId::default(),
            path,
            layout: config.layout,
            frame: 0,
        };
        traffic.locate_tracked()?;
        Ok(traffic)
    }

    /// Gets the current state: the tracked car's node followed by the queue
    /// length at every node.
    pub fn state(&self) -> Vec<usize> {
        std::iter::once(self.tracked_node.0)
            .chain(self.graph.node_ids().map(|node| self.graph.queue_len(node)))
            .collect()
    }

    /// Switches every gate whose entry in `switches` is set.
    /// There must be one entry per gate, in the order of [Self::gates].
    pub fn action(&mut self, switches: &[bool]) -> Result<()> {
        self.gates.action(switches)
    }

    /// Switches a single gate to its next managed edge.
    pub fn select_open_path(&mut self, gate: usize) -> Result<()> {
        if gate >= self.gates.gates().len() {
            return Err(TrafficError::UnknownGate(gate));
        }
        self.gates.select_open_path(gate);
        Ok(())
    }

    /// Gets the reward for the current state.
    pub fn reward(&self) -> i32 {
        if self.is_finished() {
            GOAL_REWARD
        } else {
            STEP_REWARD
        }
    }

    /// Checks whether the tracked car has reached the designated end.
    pub fn is_finished(&self) -> bool {
        self.tracked_node == self.path.end
    }

    /// Advances the simulation by one tick.
    ///
    /// If `refeed` is set, up to `flow` cars are then moved from the
    /// designated end straight back to the designated start.
    pub fn step(&mut self, refeed: bool, flow: u32) -> Result<StepResult> {
        let refeed = refeed.then_some(Refeed {
            from: self.path.end,
            to: self.path.start,
            flow,
        });
        let moved = flow::tick(&mut self.graph, self.gates.open_path(), refeed);
        self.frame += 1;
        self.locate_tracked()?;
        log::trace!(
            "Frame {}: moved {} cars, tracked car at node {}",
            self.frame,
            moved,
            self.tracked_node
        );

        Ok(StepResult {
            state: self.state(),
            reward: self.reward(),
            done: self.is_finished(),
        })
    }

    /// Moves up to `flow` cars from `src` to `dst` outside of a tick,
    /// or up to the capacity of the `src -> dst` edge if `flow` is `None`.
    ///
    /// Returns the number of cars moved.
    pub fn move_cars(&mut self, src: NodeId, dst: NodeId, flow: Option<u32>) -> Result<usize> {
        for node in [src, dst] {
            if node.0 >= self.graph.node_count() {
                return Err(TrafficError::UnknownNode {
                    node,
                    count: self.graph.node_count(),
                });
            }
        }
        let moved = flow::move_cars(&mut self.graph, src, dst, flow)?;
        self.locate_tracked()?;
        Ok(moved)
    }

    /// Gets the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Gets the road network.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Gets the edges in ascending order.
    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    /// Gets the gates in ascending node order.
    pub fn gates(&self) -> &[Gate] {
        self.gates.gates()
    }

    /// Gets the edges currently open to traffic.
    pub fn open_path(&self) -> &OpenPath {
        self.gates.open_path()
    }

    /// Gets the path between the designated start and end.
    pub fn longest_path(&self) -> &LongestPath {
        &self.path
    }

    /// Gets the designated start node.
    pub fn start(&self) -> NodeId {
        self.path.start
    }

    /// Gets the designated end node.
    pub fn end(&self) -> NodeId {
        self.path.end
    }

    /// Gets the tracked car.
    pub fn tracked_car(&self) -> CarId {
        self.tracked
    }

    /// Gets the node the tracked car is queued at.
    pub fn tracked_node(&self) -> NodeId {
        self.tracked_node
    }

    /// Returns an iterator over all the cars in creation order.
    pub fn iter_cars(&self) -> impl Iterator<Item = (CarId, &str)> {
        self.cars.iter().map(|(id, label)| (id, label.as_str()))
    }

    /// Gets a car's label, `car_<n>` for the `n`th car created.
    pub fn car_label(&self, car: CarId) -> Option<&str> {
        self.cars.get(car).map(String::as_str)
    }

    /// Gets the cars queued at a node, front first.
    ///
    /// Panics if `node` is not in the network.
    pub fn queue(&self, node: NodeId) -> &VecDeque<CarId> {
        self.graph.queue(node)
    }

    /// Gets the number of ticks simulated.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Takes a snapshot for rendering.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            layout: self.layout,
            edges: self.graph.edges().to_vec(),
            open_edges: self.open_path().iter().collect(),
            queue_lengths: self
                .graph
                .node_ids()
                .map(|node| self.graph.queue_len(node))
                .collect(),
            tracked_car: self.tracked,
            tracked_node: self.tracked_node,
            start: self.path.start,
            end: self.path.end,
            frame: self.frame,
        }
    }

    /// Finds the tracked car's node. A missing car means a car was lost.
    fn locate_tracked(&mut self) -> Result<()> {
        self.tracked_node = self
            .graph
            .locate(self.tracked)
            .ok_or(TrafficError::LostCar(self.tracked))?;
        Ok(())
    }
}

/// Picks a node for each of `count` cars, uniformly and with replacement,
/// from the nodes that have at least one edge.
fn random_placement(graph: &Graph, count: usize, rng: &mut StdRng) -> Vec<NodeId> {
    let candidates = graph
        .node_ids()
        .filter(|node| graph.degree(*node) > 0)
        .collect::<Vec<_>>();
    (0..count)
        .flat_map(|_| candidates.choose(rng).copied())
        .collect()
}
