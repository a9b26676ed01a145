use anyhow::Context;
use trivia_api::db;
use trivia_api::server::app::run_server;
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().context("Failed to install tracing subscriber")?;
    let settings = Settings::load().context("Failed to load settings")?;

    let pool = db::establish_connection(&settings.database)
        .await
        .with_context(|| {
            format!(
                "Cannot open database {}",
                settings.database.path.display()
            )
        })?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    run_server(pool, &settings.server).await
}
