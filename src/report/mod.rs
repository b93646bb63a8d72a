//! Plain-text rendering of summaries for the CLI.

use crate::forecast::{AggregateForecast, AnomalyReport};
use crate::models::{CrossAccountSummary, Recommendation, RunSummary};

const TOP_RECOMMENDATIONS: usize = 10;

pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "## Run {} - {}\n\nTotal monthly cost: ${:.2}\n",
        summary.execution_id,
        summary.status.as_str().to_uppercase(),
        summary.total_cost,
    ));

    if !summary.missing_batches.is_empty() {
        let missing: Vec<&str> = summary.missing_batches.iter().map(|s| s.as_str()).collect();
        out.push_str(&format!(
            "\nMissing batches ({} of {}): {}\n",
            summary.missing_batches.len(),
            summary.total_batches,
            missing.join(", ")
        ));
    }

    out.push_str(&format_category_table(&summary.cost_by_category));
    out.push_str(&format!(
        "\nResources analyzed: {} | Anomalies: {} | Optimizations: {} | Probe failures: {}\n",
        summary.metrics.resources_analyzed,
        summary.metrics.anomalies_detected,
        summary.metrics.optimizations_found,
        summary.metrics.soft_failures,
    ));
    out.push_str(&format_recommendations(&summary.recommendations));
    out
}

pub fn format_cross_account_summary(summary: &CrossAccountSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Cross-account cost analysis - {}\n\nAccounts: {} | Batches: {} | Total monthly cost: ${:.2}\n",
        summary.status.as_str().to_uppercase(),
        summary.accounts_count,
        summary.batches_count,
        summary.total_cost,
    ));

    out.push_str("\n| Account | Status | Monthly cost | Missing batches |\n|---|---|---|---|\n");
    for account in &summary.accounts {
        out.push_str(&format!(
            "| {} | {} | ${:.2} | {} |\n",
            account.account_id,
            account.summary.status,
            account.summary.total_cost,
            account.summary.missing_batches.len(),
        ));
    }

    out.push_str(&format_category_table(&summary.cost_by_category));
    out.push_str(&format_recommendations(&summary.recommendations));
    out
}

pub fn format_forecast(aggregate: &AggregateForecast) -> String {
    let mut out = String::new();
    let total: f64 = aggregate.total_forecast.iter().sum();
    out.push_str(&format!(
        "# Cost forecast - {} days\n\nProjected total spend: ${:.2}\n",
        aggregate.total_forecast.len(),
        total,
    ));

    out.push_str("\n| Category | Method | Projected daily mean |\n|---|---|---|\n");
    for (category, result) in &aggregate.by_category {
        out.push_str(&format!(
            "| {} | {:?} | ${:.2} |\n",
            category, result.method, result.forecast_mean,
        ));
    }

    if !aggregate.skipped.is_empty() {
        out.push_str("\nExcluded categories:\n");
        for skipped in &aggregate.skipped {
            out.push_str(&format!("- {}: {}\n", skipped.category, skipped.reason));
        }
    }
    out
}

pub fn format_anomaly_report(category: &str, report: &AnomalyReport) -> String {
    if report.total_anomalies == 0 {
        return format!("{}: no anomalous days\n", category);
    }
    let mut out = format!("{}: {} anomalous day(s)\n", category, report.total_anomalies);
    for anomaly in &report.anomalies_detected {
        out.push_str(&format!(
            "  day {} - ${:.2} (deviation score {:.2})\n",
            anomaly.index, anomaly.value, anomaly.deviation_score,
        ));
    }
    out
}

fn format_category_table(cost_by_category: &std::collections::BTreeMap<String, f64>) -> String {
    if cost_by_category.is_empty() {
        return String::new();
    }
    let mut rows: Vec<(&String, &f64)> = cost_by_category.iter().collect();
    rows.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut out = String::from("\n| Category | Monthly cost |\n|---|---|\n");
    for (category, cost) in rows {
        out.push_str(&format!("| {} | ${:.2} |\n", category, cost));
    }
    out
}

fn format_recommendations(recommendations: &[Recommendation]) -> String {
    if recommendations.is_empty() {
        return String::new();
    }
    let mut out = format!(
        "\nTop recommendations ({} total):\n",
        recommendations.len()
    );
    for rec in recommendations.iter().take(TOP_RECOMMENDATIONS) {
        out.push_str(&format!(
            "- [{:?}] {} {}: {} (est. ${:.2}/mo)\n",
            rec.priority, rec.resource_type, rec.resource_id, rec.recommendation,
            rec.estimated_monthly_savings,
        ));
    }
    out
}
