//! Tests that drive whole networks through the public API.

use traffic_gates::{NodeId, Traffic, TrafficConfig, TrafficError};

/// A gate at node 0 fed by nodes 1, 2 and 3, draining into node 4.
fn merge() -> TrafficConfig {
    TrafficConfig::with_edges(&[(1, 0, 2), (2, 0, 2), (3, 0, 2), (0, 4, 5)])
}

#[test]
fn chain_moves_up_to_capacity() {
    let mut traffic =
        Traffic::new(&TrafficConfig::with_edges(&[(0, 1, 3), (1, 2, 2)]).place(&[0; 5])).unwrap();
    assert!(traffic.gates().is_empty());
    assert_eq!(traffic.state(), [0, 5, 0, 0]);

    // car_1 is among the three cars at the front of the queue.
    let result = traffic.step(false, 2).unwrap();
    assert_eq!(result.state, [1, 2, 3, 0]);
    assert_eq!(result.reward, -1);
    assert!(!result.done);
}

#[test]
fn tracked_car_reaches_end() {
    let mut traffic =
        Traffic::new(&TrafficConfig::with_edges(&[(0, 1, 3), (1, 2, 2)]).place(&[0; 5])).unwrap();
    assert_eq!((traffic.start(), traffic.end()), (NodeId(0), NodeId(2)));

    // car_1 is second in the queue at node 0, so it crosses in the first
    // tick and is second at node 1, which passes two cars per tick.
    assert_eq!(traffic.step(false, 2).unwrap().state[0], 1);
    let result = traffic.step(false, 2).unwrap();
    assert_eq!(result.state[0], 2);
    assert_eq!(result.reward, 20);
    assert!(result.done);
    assert_eq!(traffic.frame(), 2);
}

#[test]
fn refeed_returns_cars_to_start() {
    let mut traffic =
        Traffic::new(&TrafficConfig::with_edges(&[(0, 1, 3), (1, 2, 2)]).place(&[2; 4])).unwrap();
    assert!(traffic.is_finished());

    let result = traffic.step(true, 2).unwrap();
    assert_eq!(result.state[1..], [2, 0, 2]);
    // car_1 was second in line at the end, so it was recirculated.
    assert_eq!(result.state[0], 0);
    assert_eq!(result.reward, -1);
}

#[test]
fn gate_lets_one_feeder_through() {
    let mut traffic = Traffic::new(&merge().place(&[1, 1, 2, 2, 3, 3])).unwrap();
    assert_eq!(traffic.gates().len(), 1);
    assert_eq!(traffic.gates()[0].node(), NodeId(0));

    traffic.step(false, 2).unwrap();
    assert_eq!(traffic.state()[1..], [2, 0, 2, 2, 0]);

    // Switch to the edge from node 2.
    traffic.action(&[true]).unwrap();
    traffic.step(false, 2).unwrap();
    assert_eq!(traffic.state()[1..], [2, 0, 0, 2, 2]);
}

#[test]
fn all_false_action_changes_nothing() {
    let mut traffic = Traffic::new(&merge().place(&[1, 2, 3])).unwrap();
    let open = traffic.open_path().clone();
    let selected = traffic.gates()[0].selected();
    for _ in 0..5 {
        traffic.action(&[false]).unwrap();
    }
    assert_eq!(traffic.open_path(), &open);
    assert_eq!(traffic.gates()[0].selected(), selected);
}

#[test]
fn action_length_is_checked() {
    let mut traffic = Traffic::new(&merge().place(&[1])).unwrap();
    let open = traffic.open_path().clone();
    assert!(matches!(
        traffic.action(&[true, true]),
        Err(TrafficError::ActionLength {
            expected: 1,
            actual: 2
        })
    ));
    assert_eq!(traffic.open_path(), &open);
}

#[test]
fn move_cars_outside_tick() {
    let mut traffic =
        Traffic::new(&TrafficConfig::with_edges(&[(0, 1, 3), (1, 2, 2)]).place(&[0; 5])).unwrap();
    assert_eq!(traffic.move_cars(NodeId(0), NodeId(1), None).unwrap(), 3);
    assert_eq!(traffic.tracked_node(), NodeId(1));
    assert_eq!(traffic.move_cars(NodeId(1), NodeId(2), Some(10)).unwrap(), 3);
    assert!(traffic.is_finished());
    assert!(matches!(
        traffic.move_cars(NodeId(2), NodeId(0), None),
        Err(TrafficError::EdgeNotFound { .. })
    ));
    assert!(matches!(
        traffic.move_cars(NodeId(7), NodeId(0), Some(1)),
        Err(TrafficError::UnknownNode { .. })
    ));
}

#[test]
fn random_networks_are_reproducible() {
    let config = TrafficConfig::random(15).cars(30).seed(11);
    let mut a = Traffic::new(&config).unwrap();
    let mut b = Traffic::new(&config).unwrap();
    assert_eq!(a.edges(), b.edges());
    assert_eq!(a.longest_path(), b.longest_path());
    assert_eq!(a.state(), b.state());

    for i in 0..40 {
        let switches = (0..a.gates().len())
            .map(|g| (i + g) % 3 == 0)
            .collect::<Vec<_>>();
        a.action(&switches).unwrap();
        b.action(&switches).unwrap();
        assert_eq!(a.step(i % 2 == 0, 2).unwrap(), b.step(i % 2 == 0, 2).unwrap());
    }
}

#[test]
fn reward_matches_termination() {
    for seed in 0..20 {
        let mut traffic = Traffic::new(&TrafficConfig::random(12).cars(20).seed(seed)).unwrap();
        for _ in 0..30 {
            let result = traffic.step(true, 2).unwrap();
            assert_eq!(result.done, result.state[0] == traffic.end().0);
            assert_eq!(result.reward, if result.done { 20 } else { -1 });
            assert_eq!(result.state.len(), traffic.node_count() + 1);
        }
    }
}

#[test]
fn config_from_json() {
    let config = TrafficConfig::from_json(
        r#"{
            "edges": [
                { "src": 0, "dst": 1, "w": 3 },
                { "src": 1, "dst": 2, "w": 2 }
            ],
            "placement": [0, 0, 0, 0, 0]
        }"#,
    )
    .unwrap();
    let mut traffic = Traffic::new(&config).unwrap();
    assert_eq!(traffic.step(false, 2).unwrap().state, [1, 2, 3, 0]);
}
