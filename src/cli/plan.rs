use super::analyze::load_config;
use super::commands::PlanArgs;
use crate::catalog::ProbeCatalog;
use crate::errors::CostScopeError;
use crate::models::ProbeId;
use crate::pipeline::BatchMapper;

pub async fn handle_plan(args: PlanArgs) -> Result<(), CostScopeError> {
    let config = load_config(args.config.as_deref()).await?;
    let batch_size = args
        .batch_size
        .unwrap_or_else(|| config.pipeline_settings().batch_size);

    let catalog = match &args.services {
        Some(list) => list
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(ProbeId::from)
            .collect(),
        None => ProbeCatalog::standard(),
    };

    let plan = BatchMapper::plan(&catalog, batch_size)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "Execution plan {} - {} service(s) in {} batch(es) of up to {}",
        plan.execution_id, plan.total_services, plan.total_batches, batch_size
    );
    for batch in &plan.batches {
        let services: Vec<&str> = batch.probe_ids.iter().map(|p| p.as_str()).collect();
        println!("  {}: {}", batch.batch_id, services.join(", "));
    }
    Ok(())
}
