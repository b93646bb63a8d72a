use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::commands::AnalyzeArgs;
use crate::catalog::ProbeCatalog;
use crate::config::{self, CostScopeConfig};
use crate::dispatch::{CostSnapshot, SnapshotProbeRunner};
use crate::errors::CostScopeError;
use crate::models::ProbeId;
use crate::pipeline::MultiAccountOrchestrator;
use crate::report::format_cross_account_summary;

pub async fn handle_analyze(args: AnalyzeArgs) -> Result<(), CostScopeError> {
    let config = load_config(args.config.as_deref()).await?;
    let mut settings = config.pipeline_settings();
    if let Some(batch_size) = args.batch_size {
        settings.batch_size = batch_size;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.timeout = Duration::from_secs(timeout_secs);
    }

    let snapshot = CostSnapshot::from_file(Path::new(&args.snapshot)).await?;
    let accounts = resolve_accounts(&args, &config, &snapshot)?;
    let catalog = resolve_catalog(&args, &snapshot);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "Analyzing {} account(s), {} service(s)...",
        accounts.len(),
        catalog.len()
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let runner = Arc::new(SnapshotProbeRunner::new(snapshot));
    let orchestrator = MultiAccountOrchestrator::new(settings, catalog, runner);
    let summary = orchestrator.run(&accounts).await?;

    spinner.finish_and_clear();

    println!("{}", format_cross_account_summary(&summary));
    write_summary_json(Path::new(&args.output), &summary).await?;
    Ok(())
}

pub async fn load_config(path: Option<&str>) -> Result<CostScopeConfig, CostScopeError> {
    match path {
        Some(p) => config::parse_config(Path::new(p)).await,
        None => Ok(CostScopeConfig::default()),
    }
}

fn resolve_accounts(
    args: &AnalyzeArgs,
    config: &CostScopeConfig,
    snapshot: &CostSnapshot,
) -> Result<Vec<String>, CostScopeError> {
    if let Some(list) = &args.accounts {
        let accounts: Vec<String> = list
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if accounts.is_empty() {
            return Err(CostScopeError::InvalidInput(
                "--accounts contained no account ids".into(),
            ));
        }
        return Ok(accounts);
    }
    if let Some(accounts) = &config.accounts {
        if !accounts.is_empty() {
            return Ok(accounts.clone());
        }
    }
    let from_snapshot = snapshot.account_ids();
    if from_snapshot.is_empty() {
        return Err(CostScopeError::InvalidInput(
            "snapshot contains no accounts and none were configured".into(),
        ));
    }
    Ok(from_snapshot)
}

/// Default to the services actually present in the snapshot so a focused
/// snapshot does not drown the summary in soft failures.
fn resolve_catalog(args: &AnalyzeArgs, snapshot: &CostSnapshot) -> ProbeCatalog {
    if args.full_catalog {
        return ProbeCatalog::standard();
    }
    let services: BTreeSet<&String> = snapshot
        .accounts
        .values()
        .flat_map(|services| services.keys())
        .collect();
    if services.is_empty() {
        return ProbeCatalog::standard();
    }
    services
        .into_iter()
        .map(|s| ProbeId::new(s.clone()))
        .collect()
}

async fn write_summary_json(
    output_dir: &Path,
    summary: &crate::models::CrossAccountSummary,
) -> Result<(), CostScopeError> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path: PathBuf = output_dir.join("cross_account_summary.json");
    let json = serde_json::to_string_pretty(summary)?;
    tokio::fs::write(&path, &json).await?;
    info!(path = %path.display(), "Summary written");
    Ok(())
}
