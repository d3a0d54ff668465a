use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tracing::debug;

use crate::{
    generate::GenerateSubcommands, parsers::Threads, paths::PathsArgs, plan::PlanArgs,
};

mod file_utils;
mod generate;
mod parsers;
mod paths;
mod plan;
mod problem_file;
mod report;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, env = "FREIGHT_DEBUG")]
    debug: bool,

    /// Threads used for the shortest path precomputation ("auto" or a number)
    #[arg(
        short,
        long,
        env = "FREIGHT_THREADS",
        default_value = "auto",
        value_parser = parsers::parse_threads
    )]
    threads: Threads,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign packages to vehicles and print the routes
    Plan {
        #[command(flatten)]
        args: PlanArgs,
    },
    /// Print the adjacency lists and the shortest path table of a problem
    Paths {
        #[command(flatten)]
        args: PathsArgs,
    },
    #[command(visible_alias = "g")]
    Generate {
        #[command(subcommand)]
        commands: GenerateSubcommands,
    },
}

fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let num_threads = cli.threads.number_of_threads();
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;
    debug!(num_threads, "Configured thread pool");

    match cli.command {
        Some(Commands::Plan { args }) => plan::run(args)?,
        Some(Commands::Paths { args }) => paths::run(args)?,
        Some(Commands::Generate { commands }) => generate::run(commands)?,
        None => {}
    }

    Ok(())
}
