use app_runtime::{bootstrap, config_path, init_tracing, load_config};
use db::models::event_outbox::EventOutbox;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = config_path();
    let config = load_config(&path).await?;
    init_tracing(&config.log)?;

    let runtime = bootstrap(config).await?;
    let pending = EventOutbox::fetch_unpublished(&runtime.db.pool, 1000).await?;
    tracing::info!(
        config = %path.display(),
        pending_events = pending.len(),
        default_page_limit = runtime.db.pages.default_limit,
        "Collaboration store ready"
    );
    Ok(())
}
