//! Refresh and read command handlers for the CLI.
//!
//! Both print JSON to stdout so the output can be piped straight into other
//! tools. A refresh that produced nothing usable exits non-zero.

use chrono::SecondsFormat;
use livewall_aggregator::{read_snapshot, Aggregator, ReadOutcome};
use livewall_core::{AppConfig, Snapshot, StoreBackend};

/// Run one refresh cycle and print the resulting snapshot.
///
/// # Errors
///
/// Returns an error if the store or clients cannot be built, no platform is
/// configured, every platform failed, or the snapshot could not be stored.
pub(crate) async fn run_refresh(
    config: &AppConfig,
    query: Option<&str>,
    max: Option<u32>,
) -> anyhow::Result<()> {
    let store = livewall_store::open_store(config).await?;
    let aggregator = Aggregator::from_config(config, store)?;

    let query = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(&config.default_query);
    let limit = max.unwrap_or(config.default_limit);
    tracing::info!(
        platforms = ?aggregator.platforms(),
        store = aggregator.store().backend_name(),
        query,
        limit,
        "running refresh"
    );

    let report = aggregator.refresh(query, limit).await;

    if report.no_platforms() {
        anyhow::bail!("no platforms configured; check LIVEWALL_PLATFORMS and credentials");
    }
    if report.all_failed() {
        anyhow::bail!("every platform failed: {}", report.failure_summary());
    }

    println!("{}", serde_json::to_string_pretty(&report.snapshot)?);

    for failure in &report.failures {
        eprintln!("warning: {}: {}", failure.platform, failure.message);
    }
    if !report.persisted {
        anyhow::bail!("snapshot was fetched but could not be stored");
    }
    Ok(())
}

/// Print the stored snapshot, or fail with the read diagnostic.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or holds no readable
/// snapshot.
pub(crate) async fn run_show(config: &AppConfig, summary: bool) -> anyhow::Result<()> {
    let store = livewall_store::open_store(config).await?;

    match read_snapshot(&store).await {
        ReadOutcome::Found(snapshot) if summary => println!("{}", summarize(&snapshot)),
        ReadOutcome::Found(snapshot) => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        ReadOutcome::Empty => anyhow::bail!(livewall_aggregator::NO_DATA),
        ReadOutcome::Corrupt(detail) => {
            anyhow::bail!("{}: {detail}", livewall_aggregator::INVALID_JSON)
        }
        ReadOutcome::Unavailable(detail) => {
            anyhow::bail!("{}: {detail}", livewall_aggregator::STORE_UNAVAILABLE)
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the store cannot be opened or does not answer.
pub(crate) async fn run_store_ping(config: &AppConfig) -> anyhow::Result<()> {
    let store = livewall_store::open_store(config).await?;
    store.health_check().await?;
    println!("{} store ok (key: {})", store.backend_name(), store.key());
    Ok(())
}

/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub(crate) async fn run_store_migrate(config: &AppConfig) -> anyhow::Result<()> {
    if config.store_backend == StoreBackend::Memory {
        println!("memory store has no migrations");
        return Ok(());
    }

    let pool = livewall_store::connect_pool_from_config(config).await?;
    let applied = livewall_store::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// One line: timestamp, total, and a count per platform in key order.
pub(crate) fn summarize(snapshot: &Snapshot) -> String {
    let header = format!(
        "{} {} item(s)",
        snapshot
            .updated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        snapshot.all.len()
    );
    std::iter::once(header)
        .chain(
            snapshot
                .by_platform
                .iter()
                .map(|(platform, items)| format!("{platform}: {}", items.len())),
        )
        .collect::<Vec<_>>()
        .join(", ")
}
