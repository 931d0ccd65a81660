mod plan;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use geofence_pipeline::{DeliveryTarget, OutputTarget};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "geofence-cli")]
#[command(about = "Plan a driving route through the businesses around a point")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover, order and export one route.
    Plan(PlanArgs),
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Origin as "lat,lng".
    #[arg(long)]
    location: String,

    /// Search radius in miles (default 5, clamped to 2..=10).
    #[arg(long)]
    radius: Option<f64>,

    /// Category to leave out. Repeatable.
    #[arg(long = "exclude", value_name = "CATEGORY")]
    exclude: Vec<String>,

    #[arg(long, default_value = "sheet")]
    output: OutputTarget,

    #[arg(long, default_value = "auto")]
    deliver: DeliveryTarget,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    slack_recipient: Option<String>,

    /// Serve providers from fixture files instead of Google.
    #[arg(long)]
    test_mode: bool,

    /// Fixture directory; overrides GEOFENCE_FIXTURES_DIR.
    #[arg(long, value_name = "DIR")]
    fixtures: Option<PathBuf>,

    /// Export directory; overrides GEOFENCE_EXPORT_DIR.
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Print the whole outcome as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = geofence_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Plan(args) => {
            if let Some(dir) = &args.fixtures {
                config.fixtures_dir.clone_from(dir);
            }
            if let Some(dir) = &args.export_dir {
                config.export_dir.clone_from(dir);
            }
            plan::run_plan(&config, args.to_request(), args.json).await?;
        }
    }

    Ok(())
}

impl PlanArgs {
    fn to_request(&self) -> geofence_pipeline::PlanRequest {
        geofence_pipeline::PlanRequest {
            location: self.location.clone(),
            radius_miles: self.radius,
            excluded_categories: self.exclude.clone(),
            output: self.output,
            deliver: self.deliver,
            email: self.email.clone(),
            slack_recipient: self.slack_recipient.clone(),
            test_mode: self.test_mode,
        }
    }
}
