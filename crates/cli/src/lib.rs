pub mod commands;

use brickwise_agent::WorkflowKind;
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

use crate::commands::features::FeatureRequest;

#[derive(Debug, Parser)]
#[command(
    name = "brickwise",
    about = "Brickwise construction assistant",
    long_about = "Price materials, compare competitor rates, estimate costs, draft schedules, list permits, and shape bids.",
    after_help = "Examples:\n  brickwise price --material bricks\n  brickwise estimate --material steel --location Pune --floors 2\n  brickwise session\n  brickwise doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Look up the current unit price of a construction material")]
    Price {
        #[arg(long)]
        material: String,
    },
    #[command(about = "Collect competitor builder prices for a project type")]
    Competitors {
        #[arg(long)]
        project_type: String,
        #[arg(long, help = "City or region used to narrow the quotes")]
        location: Option<String>,
    },
    #[command(about = "Price the material, then estimate total cost and duration")]
    Estimate(EstimateArgs),
    #[command(about = "Draft a project schedule from free-text project details")]
    Schedule {
        #[arg(long)]
        details: String,
    },
    #[command(about = "List permits required for a location and project type")]
    Permits {
        #[arg(long)]
        location: String,
        #[arg(long, help = "Residential, Commercial, or Industrial (default Residential)")]
        project_type: Option<String>,
    },
    #[command(about = "Suggest an optimized bid for the described project")]
    Bid {
        #[arg(long)]
        data: String,
    },
    #[command(about = "Interactive loop that remembers the last input for each feature")]
    Session,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and report search and text-generation readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct EstimateArgs {
    #[arg(long)]
    material: String,
    #[arg(long)]
    location: String,
    #[arg(long, help = "Residential, Commercial, or Industrial (default Residential)")]
    building_type: Option<String>,
    #[arg(long)]
    floors: Option<u32>,
    #[arg(long)]
    area_sqft: Option<f64>,
    #[arg(long, help = "Total labor cost in INR (default 500 per sqft)")]
    labor_cost: Option<f64>,
    #[arg(long, help = "Material to compare against (default Bricks)")]
    alternative_material: Option<String>,
    #[arg(long)]
    quantity: Option<u32>,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Price { material } => {
            commands::features::run(FeatureRequest::new(WorkflowKind::MaterialPrice).with("material", material))
        }
        Command::Competitors { project_type, location } => commands::features::run(
            FeatureRequest::new(WorkflowKind::CompetitorPricing)
                .with("project_type", project_type)
                .with_opt("location", location),
        ),
        Command::Estimate(args) => commands::features::run(
            FeatureRequest::new(WorkflowKind::CostEstimation)
                .with("material", args.material)
                .with("location", args.location)
                .with_opt("building_type", args.building_type)
                .with_opt("floors", args.floors)
                .with_opt("area_sqft", args.area_sqft)
                .with_opt("labor_cost", args.labor_cost)
                .with_opt("alternative_material", args.alternative_material)
                .with_opt("quantity", args.quantity),
        ),
        Command::Schedule { details } => commands::features::run(
            FeatureRequest::new(WorkflowKind::ProjectScheduling).with("project_details", details),
        ),
        Command::Permits { location, project_type } => commands::features::run(
            FeatureRequest::new(WorkflowKind::PermitDetection)
                .with("location", location)
                .with_opt("project_type", project_type),
        ),
        Command::Bid { data } => commands::features::run(
            FeatureRequest::new(WorkflowKind::BidOptimization).with("project_data", data),
        ),
        Command::Session => commands::session::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
