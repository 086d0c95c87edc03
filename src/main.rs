use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::sync::watch;
use tracing::Level;

use routing_sim::simulation::drive;
use routing_sim::{
    AlgorithmKind, ControllerState, Position, SimulationConfig, SimulationController, Snapshot,
    StepOutcome, Topology,
};

#[derive(Parser)]
#[command(name = "routing-sim", about = "Distance Vector / Link State routing simulator")]
struct Cli {
    /// JSON simulation settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute routing tables, printing them after every step
    Run(RunArgs),
    /// Print the link state path between two routers
    Path(PathArgs),
}

#[derive(Args)]
struct TopologyArgs {
    /// Router name (routers named in links are added automatically)
    #[arg(long = "node")]
    nodes: Vec<String>,

    /// Link as A-B:COST
    #[arg(long = "link", value_parser = parse_link)]
    links: Vec<LinkSpec>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    topology: TopologyArgs,

    #[arg(long, value_enum)]
    algo: Option<Algo>,

    #[arg(long)]
    source: Option<String>,

    /// Override the tick interval from the config
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Print snapshots as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PathArgs {
    #[command(flatten)]
    topology: TopologyArgs,

    #[arg(long)]
    from: String,

    #[arg(long)]
    to: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Algo {
    Dv,
    Ls,
}

impl From<Algo> for AlgorithmKind {
    fn from(algo: Algo) -> Self {
        match algo {
            Algo::Dv => AlgorithmKind::DistanceVector,
            Algo::Ls => AlgorithmKind::LinkState,
        }
    }
}

#[derive(Debug, Clone)]
struct LinkSpec {
    a: String,
    b: String,
    cost: i64,
}

fn parse_link(raw: &str) -> Result<LinkSpec, String> {
    let (ends, cost) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected A-B:COST, got {}", raw))?;
    let (a, b) = ends
        .split_once('-')
        .ok_or_else(|| format!("expected A-B:COST, got {}", raw))?;
    let cost = cost
        .parse::<i64>()
        .map_err(|e| format!("bad cost in {}: {}", raw, e))?;
    if a.is_empty() || b.is_empty() {
        return Err(format!("empty router name in {}", raw));
    }
    Ok(LinkSpec {
        a: a.to_string(),
        b: b.to_string(),
        cost,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    match cli.command {
        Command::Run(args) => run(args, &config),
        Command::Path(args) => path(args, &config),
    }
}

fn build_topology(args: &TopologyArgs) -> Result<Topology> {
    let mut topology = Topology::new();
    let names = args
        .nodes
        .iter()
        .chain(args.links.iter().flat_map(|l| [&l.a, &l.b]));

    for name in names {
        let slot = i32::try_from(topology.router_count()).unwrap_or(i32::MAX);
        let position = Position::new(100 + 120 * (slot % 5), 100 + 120 * (slot / 5));
        topology.add_router(name, position);
    }
    for link in &args.links {
        topology
            .add_link(&link.a, &link.b, link.cost)
            .with_context(|| format!("adding link {}-{}", link.a, link.b))?;
    }
    Ok(topology)
}

fn run(args: RunArgs, config: &SimulationConfig) -> Result<()> {
    let topology = build_topology(&args.topology)?;
    println!(
        "Topology: {} router(s), {} link(s), {}",
        topology.router_count(),
        topology.link_count(),
        if topology.is_connected() { "connected" } else { "not connected" }
    );

    let algorithm = args.algo.map_or(config.default_algorithm, AlgorithmKind::from);
    let period = args
        .tick_ms
        .map_or_else(|| config.tick_interval(algorithm), Duration::from_millis);

    let mut controller = SimulationController::with_config(topology, config)?;
    let json = args.json;
    controller.on_update(move |snapshot| {
        if json {
            match snapshot.to_json() {
                Ok(out) => println!("{}", out),
                Err(e) => eprintln!("failed to encode snapshot: {}", e),
            }
        } else {
            print_snapshot(snapshot);
        }
    });
    controller.on_complete(|run| {
        println!("{} completed after {} step(s)", run.algorithm, run.iteration);
    });

    controller.start(algorithm, args.source.as_deref())?;

    let rt = Builder::new_multi_thread().enable_all().build()?;
    let outcome = rt.block_on(async {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(true);
            }
        });
        drive(&mut controller, period, rx).await
    })?;

    match outcome {
        StepOutcome::Exhausted => {
            if let Some(run) = controller.run() {
                println!(
                    "No convergence after {} of {} allowed round(s)",
                    run.iteration, run.max_iterations
                );
            }
        }
        _ if controller.state() == ControllerState::Stopped => println!("Simulation stopped"),
        _ => {}
    }
    Ok(())
}

fn path(args: PathArgs, config: &SimulationConfig) -> Result<()> {
    let topology = build_topology(&args.topology)?;
    let mut controller = SimulationController::with_config(topology, config)?;
    controller.start(AlgorithmKind::LinkState, Some(args.from.as_str()))?;
    controller.run_to_completion()?;

    let hops = controller.shortest_path(&args.from, &args.to)?;
    let cost = controller
        .topology()
        .router(&args.from)
        .map(|r| r.routing_table().cost_to(&args.to))
        .context("source router vanished")?;

    println!("{} (cost {})", hops.join(" -> "), cost);
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("=== {} step {} ===", snapshot.algorithm, snapshot.iteration);
    for router in &snapshot.routers {
        println!("Router {}", router.router);
        for (destination, entry) in router.routes.iter() {
            println!(
                "  {:<10} {:>6}  via {}",
                destination,
                entry.cost.to_string(),
                entry.next_hop.as_deref().unwrap_or("-")
            );
        }
    }
}
