use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "costscope", version, about = "AWS cost analysis and forecasting pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the multi-account analysis pipeline over a cost snapshot
    Analyze(AnalyzeArgs),
    /// Forecast future spend and flag anomalous days in historical series
    Forecast(ForecastArgs),
    /// Print the execution plan for a catalog without running it
    Plan(PlanArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct AnalyzeArgs {
    /// JSON cost snapshot file (per-account per-service observations)
    #[arg(short, long)]
    pub snapshot: String,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Comma-separated account ids (defaults to config, then snapshot)
    #[arg(long)]
    pub accounts: Option<String>,

    /// Output directory for results
    #[arg(short, long, default_value = "./results")]
    pub output: String,

    /// Probes per batch (overrides config)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Aggregation timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Analyze the full service registry instead of only snapshotted services
    #[arg(long)]
    pub full_catalog: bool,
}

#[derive(Args, Clone)]
pub struct ForecastArgs {
    /// JSON file mapping category name to an array of daily costs
    #[arg(short, long)]
    pub input: String,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Forecast horizon in days (overrides config)
    #[arg(long)]
    pub days: Option<usize>,

    /// Anomaly deviation threshold (overrides config)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct PlanArgs {
    /// Comma-separated service ids (defaults to the full registry)
    #[arg(long)]
    pub services: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Probes per batch (overrides config)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
