use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reactivities::config::Config;
use reactivities::database;
use reactivities::state::AppState;
use reactivities::web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reactivities=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(build = env!("REACTIVITIES_BUILD_ID"), env = ?config.environment, "starting");

    info!(url = %config.database_url, "connecting to database");
    let pool = database::connect(&config.database_url)
        .await
        .context("cannot connect to database")?;
    database::migrate(&pool)
        .await
        .context("cannot run migrations")?;

    let host = config.host.clone();
    let port = config.port;
    let app = web::router(AppState::new(pool, config));

    // Bind, falling back to the next port when taken.
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("cannot parse host/port")?;
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            warn!("cannot bind {}: {}, trying {}:{}", addr, e, host, port + 1);
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .context("cannot parse fallback host/port")?;
            tokio::net::TcpListener::bind(fallback)
                .await
                .context("cannot bind fallback port")?
        }
    };

    info!("listening on http://{}/api", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
