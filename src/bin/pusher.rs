use std::sync::Arc;

use statuspage_pusher::{
    Args, CollectionCycle, PrometheusClient, PusherMetrics, QueryConfig, Scheduler, Settings,
    StatuspageClient, api::spawn_api_server,
};
use tracing::{debug, info, level_filters::LevelFilter};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// The library and this binary share the `statuspage_pusher` target
fn log_filter(level: LevelFilter) -> filter::Targets {
    filter::Targets::new()
        .with_target("statuspage_pusher", level)
        .with_default(LevelFilter::WARN.min(level))
}

fn init(level: LevelFilter) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(log_filter(level))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let settings = Args::from_env().resolve()?;
    init(settings.log_level);
    debug!("started with settings: {settings:?}");

    run(settings).await
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let queries = Arc::new(QueryConfig::load(&settings.query_config)?);
    info!(
        "loaded {} queries from {}",
        queries.len(),
        settings.query_config
    );

    let metrics = PusherMetrics::new()?;

    let source = PrometheusClient::new(&settings.prometheus_url, metrics.clone())?;
    let reporter = StatuspageClient::new(
        settings.statuspage_url.clone(),
        settings.page_id.clone(),
        settings.api_key.clone(),
    )?;

    spawn_api_server(settings.listen, metrics.clone()).await?;

    let cycle = CollectionCycle::new(queries, source, reporter, metrics);
    Scheduler::new(settings.interval, Arc::new(cycle)).run().await;

    Ok(())
}
