use anyhow::Context;
use tower::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timecard_stats::{format_minutes, Snapshot, StatsConfig, StatsRequest, StatsService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timecard_stats=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = StatsConfig::from_env();
    tracing::info!("Starting timecard report v{}", config.version);

    let snapshot = Snapshot::from_path(&config.snapshot_path)
        .with_context(|| format!("loading {}", config.snapshot_path.display()))?;

    let service = StatsService::new(snapshot);
    let report = service.oneshot(StatsRequest::new(config.filter())).await?;

    let summary = &report.rollups.summary;
    tracing::info!(
        entries = summary.entries_count,
        work_days = summary.work_days,
        "Worked {} with {} overtime",
        format_minutes(summary.total_worked_minutes),
        format_minutes(summary.total_overtime_minutes)
    );

    let output = if config.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}
