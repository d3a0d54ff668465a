use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use freight_planner::{
    json::types::{FromProblem, JsonDeliveryPlan},
    solver::{
        planner::Planner,
        planner_params::{AuctionParams, PlannerParams, StrategyKind},
    },
};
use tracing::{info, warn};

use crate::{file_utils::resolve_inputs, problem_file, report};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Summary, movements and undelivered packages as tables
    Table,
    /// One `W=..., T=..., N1=..., P1=..., N2=..., P2=...` line per movement
    Log,
    /// The plan as JSON on stdout
    Json,
}

#[derive(Args)]
pub struct PlanArgs {
    /// A problem file, or a folder searched recursively for `.json` problems
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long, env = "FREIGHT_STRATEGY", default_value_t = StrategyKind::Auction)]
    strategy: StrategyKind,

    /// Round cap of the auction strategy
    #[arg(long, env = "FREIGHT_MAX_ROUNDS")]
    max_rounds: Option<usize>,

    /// Share of the bid gap added to a package price when it changes vehicle
    #[arg(long, env = "FREIGHT_PRICE_INCREMENT")]
    price_increment: Option<f64>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Output folder receiving one `<problem>.plan.json` per input
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl PlanArgs {
    fn planner_params(&self) -> PlannerParams {
        let mut auction = AuctionParams::default();

        if let Some(max_rounds) = self.max_rounds {
            auction.max_rounds = max_rounds;
        }

        if let Some(price_increment) = self.price_increment {
            auction.price_increment = price_increment;
        }

        PlannerParams {
            strategy: self.strategy,
            auction,
        }
    }
}

fn output_path(output: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "problem".into(), |stem| stem.to_string_lossy());

    output.join(format!("{stem}.plan.json"))
}

pub fn run(args: PlanArgs) -> Result<(), anyhow::Error> {
    let params = args.planner_params();

    for path in resolve_inputs(&args.input)? {
        info!("Planning {}", path.display());

        let problem = problem_file::load_problem(&path)?;
        let planner = Planner::new(problem, params.clone());
        let plan = planner.plan()?;
        let problem = planner.problem();

        for warning in plan.warnings() {
            warn!("{}", report::warning_message(warning));
        }

        let json = JsonDeliveryPlan::from_problem(&plan, problem);

        match args.format {
            OutputFormat::Table => {
                println!("{}", report::summary_table(problem, &plan));
                println!("{}", report::events_table(problem, &plan));
                if !plan.undelivered().is_empty() {
                    println!("{}", report::undelivered_table(problem, &plan));
                }
            }
            OutputFormat::Log => {
                for line in report::log_lines(problem, &plan) {
                    println!("{line}");
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json)?),
        }

        info!(
            delivered = plan.num_delivered(),
            undelivered = plan.undelivered().len(),
            makespan = %plan.makespan(),
            "Plan ready"
        );

        if let Some(output) = &args.output {
            let out = output_path(output, &path);
            problem_file::write_json(&out, &json)?;
            info!("Plan written to {}", out.display());
        }
    }

    Ok(())
}
