use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use traffic_gates::{NodeId, Traffic, TrafficConfig};

/// Runs a traffic network under a random gate-switching controller.
#[derive(Parser, Debug)]
#[command(name = "traffic-gates")]
struct Args {
    /// JSON network configuration; a random network is used if absent.
    #[arg(short, long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    /// Number of nodes in a random network.
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Number of cars.
    #[arg(long)]
    cars: Option<usize>,

    /// Seed for the network, car placement and controller.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 50)]
    steps: usize,

    /// Recirculate cars from the designated end to the designated start.
    #[arg(long)]
    refeed: bool,

    /// Cars recirculated per tick.
    #[arg(long, default_value_t = 2)]
    flow: u32,

    /// Print a JSON snapshot of the final state.
    #[arg(long)]
    snapshot: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TrafficConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => TrafficConfig::default(),
    };
    if let Some(nodes) = args.nodes {
        config.node_count = Some(nodes);
    }
    if let Some(cars) = args.cars {
        config.car_count = cars;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let mut traffic = Traffic::new(&config)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!(
        "{} nodes, {} edges, {} gates; start {}, end {}",
        traffic.node_count(),
        traffic.edges().len(),
        traffic.gates().len(),
        traffic.start(),
        traffic.end()
    );

    let mut total = 0;
    for _ in 0..args.steps {
        let switches = (0..traffic.gates().len())
            .map(|_| rng.gen_bool(0.5))
            .collect::<Vec<_>>();
        traffic.action(&switches)?;
        let result = traffic.step(args.refeed, args.flow)?;
        total += result.reward;
        println!(
            "frame {:>4}: car at {:>3}, reward {:>3}, done {}",
            traffic.frame(),
            result.state[0],
            result.reward,
            result.done
        );
    }

    println!("Total reward: {}", total);
    for node in 0..traffic.node_count() {
        println!("node {:>3}: {} cars", node, traffic.queue(NodeId(node)).len());
    }

    if args.snapshot {
        println!("{}", serde_json::to_string_pretty(&traffic.snapshot())?);
    }

    Ok(())
}
