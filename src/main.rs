use clap::Parser;
use tracing_subscriber::EnvFilter;

use costscope::cli;
use costscope::config;
use costscope::errors::CostScopeError;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    let result = match cli.command {
        cli::Commands::Analyze(args) => cli::analyze::handle_analyze(args).await,
        cli::Commands::Forecast(args) => cli::forecast::handle_forecast(args).await,
        cli::Commands::Plan(args) => cli::plan::handle_plan(args).await,
        cli::Commands::Validate(args) => handle_validate(args).await,
    };

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                CostScopeError::Config(_) => 2,
                CostScopeError::Integrity(_) => 3,
                CostScopeError::InvalidInput(_) => 5,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), CostScopeError> {
    let path = std::path::PathBuf::from(&args.config);
    let _config = config::parse_config(&path).await?;
    println!("Configuration is valid: {}", args.config);
    Ok(())
}
