use std::path::PathBuf;

use clap::{Args, Subcommand};
use freight_planner::json::{
    schema,
    types::{JsonDeliveryProblem, JsonEdge, JsonPackage, JsonVehicle},
};
use jiff::SignedDuration;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::info;

use crate::{parsers, problem_file};

#[derive(Subcommand)]
pub enum GenerateSubcommands {
    JsonSchema {
        /// Output file of the schema
        #[arg(long, short = 'o')]
        out: PathBuf,

        /// Generate the schema of the plan output instead of the problem input
        #[arg(long)]
        plan: bool,
    },
    /// Random connected problem, reproducible from its seed
    Instance {
        #[command(flatten)]
        args: InstanceArgs,
    },
}

#[derive(Args, Clone, Debug)]
pub struct InstanceArgs {
    /// Output file of the problem
    #[arg(long, short = 'o')]
    out: PathBuf,

    #[arg(long, default_value_t = 20)]
    stations: usize,

    /// Links added on top of the spanning tree that keeps the graph connected
    #[arg(long, default_value_t = 20)]
    extra_edges: usize,

    #[arg(long, default_value_t = 40)]
    packages: usize,

    #[arg(long, default_value_t = 5)]
    vehicles: usize,

    /// Longest edge duration (e.g. "30m", "PT1H", or minutes)
    #[arg(long, value_parser = parsers::parse_duration, default_value = "30m")]
    max_duration: SignedDuration,

    #[arg(long, default_value_t = 10)]
    max_weight: u64,

    #[arg(long, default_value_t = 25)]
    max_capacity: u64,

    #[arg(long, env = "FREIGHT_SEED", default_value_t = 0)]
    seed: u64,
}

pub fn generate_instance(args: &InstanceArgs) -> JsonDeliveryProblem {
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let stations = (0..args.stations.max(1))
        .map(|i| format!("S{i}"))
        .collect::<Vec<_>>();
    let max_minutes = args.max_duration.as_mins().max(1);

    let random_edge = |rng: &mut SmallRng, name: String, from: usize, to: usize| JsonEdge {
        name,
        from: stations[from].clone(),
        to: stations[to].clone(),
        duration: SignedDuration::from_mins(rng.random_range(1..=max_minutes)),
        directed: false,
    };

    let mut edges = Vec::with_capacity(stations.len() + args.extra_edges);
    for i in 1..stations.len() {
        let parent = rng.random_range(0..i);
        edges.push(random_edge(&mut rng, format!("E{i}"), parent, i));
    }

    for i in 0..args.extra_edges {
        let from = rng.random_range(0..stations.len());
        let to = rng.random_range(0..stations.len());
        edges.push(random_edge(&mut rng, format!("X{i}"), from, to));
    }

    let packages = (0..args.packages)
        .map(|i| JsonPackage {
            name: format!("P{i}"),
            weight: rng.random_range(1..=args.max_weight.max(1)),
            origin: stations[rng.random_range(0..stations.len())].clone(),
            destination: stations[rng.random_range(0..stations.len())].clone(),
        })
        .collect();

    let vehicles = (0..args.vehicles)
        .map(|i| JsonVehicle {
            name: format!("T{i}"),
            capacity: rng.random_range(1..=args.max_capacity.max(1)),
            station: stations[rng.random_range(0..stations.len())].clone(),
        })
        .collect();

    JsonDeliveryProblem {
        id: Some(format!("random-{}", args.seed)),
        stations,
        edges,
        packages,
        vehicles,
    }
}

pub fn run(subcommand: GenerateSubcommands) -> Result<(), anyhow::Error> {
    match subcommand {
        GenerateSubcommands::JsonSchema { out, plan } => {
            let schema = if plan {
                schema::generate_plan_json_schema()?
            } else {
                schema::generate_json_schema()?
            };

            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }

            std::fs::write(out, schema)?;
        }
        GenerateSubcommands::Instance { args } => {
            let instance = generate_instance(&args);
            problem_file::write_json(&args.out, &instance)?;
            info!(
                stations = args.stations,
                packages = args.packages,
                vehicles = args.vehicles,
                "Instance written to {}",
                args.out.display()
            );
        }
    }

    Ok(())
}
