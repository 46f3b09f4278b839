use anyhow::{Context as _, Result};
use foodgram::{config::Config, create_pool, routes::api, run_migrations, state::Context};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting foodgram");

    let config = Config::load().context("Failed to load configuration")?;

    log::info!("Connecting to database...");
    let pool = create_pool(&config.database_url, config.max_connections).await?;

    log::info!("Running database migrations...");
    run_migrations(&pool).await?;

    tokio::fs::create_dir_all(&config.media_root)
        .await
        .with_context(|| format!("Failed to create media root {}", config.media_root.display()))?;

    let ctx = Context::new(pool, &config);

    log::info!("Listening on {}", config.bind_address);
    warp::serve(api(ctx)).run(config.bind_address).await;

    Ok(())
}
