use serde::{Deserialize, Serialize};

/// The parameters of a traffic network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// The number of nodes in a randomly generated network (10 if unset).
    /// With an explicit edge list, a lower bound on the node count.
    pub node_count: Option<usize>,
    /// An explicit edge list. When absent a random network is generated.
    pub edges: Option<Vec<EdgeSpec>>,
    /// The number of cars to distribute over the network.
    pub car_count: usize,
    /// The starting node of each car, overriding `car_count` and random
    /// placement.
    pub placement: Option<Vec<usize>>,
    /// Seed for network generation and car placement.
    pub seed: Option<u64>,
    /// How a renderer should lay the network out.
    pub layout: Layout,
}

/// A directed edge with a per-tick capacity `w`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub src: usize,
    pub dst: usize,
    pub w: u32,
}

/// Layout hint for external renderers. Has no effect on the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Spring,
    Spectral,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            node_count: None,
            edges: None,
            car_count: 50,
            placement: None,
            seed: None,
            layout: Layout::Spring,
        }
    }
}

impl TrafficConfig {
    /// A randomly generated network of `node_count` nodes.
    pub fn random(node_count: usize) -> Self {
        Self {
            node_count: Some(node_count),
            ..Default::default()
        }
    }

    /// A network with the given `(src, dst, w)` edges.
    pub fn with_edges(edges: &[(usize, usize, u32)]) -> Self {
        Self {
            edges: Some(
                edges
                    .iter()
                    .map(|&(src, dst, w)| EdgeSpec { src, dst, w })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    /// Sets the number of cars.
    pub fn cars(mut self, car_count: usize) -> Self {
        self.car_count = car_count;
        self
    }

    /// Places cars at the given nodes, one car per entry.
    pub fn place(mut self, nodes: &[usize]) -> Self {
        self.car_count = nodes.len();
        self.placement = Some(nodes.to_vec());
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the layout hint.
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_partial_json() {
        let config = TrafficConfig::from_json(
            r#"{ "edges": [{ "src": 0, "dst": 1, "w": 3 }], "car_count": 5, "layout": "spectral" }"#,
        )
        .unwrap();
        assert_eq!(config.node_count, None);
        assert_eq!(config.car_count, 5);
        assert_eq!(config.layout, Layout::Spectral);
        assert_eq!(
            config.edges,
            Some(vec![EdgeSpec { src: 0, dst: 1, w: 3 }])
        );
    }

    #[test]
    fn reject_malformed_json() {
        assert!(TrafficConfig::from_json("{ \"car_count\": -1 }").is_err());
    }
}
