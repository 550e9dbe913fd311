mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use parkon_search::{PgSearchSink, PostcodeClient, SearchService};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::PrivilegeState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = parkon_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting parkon-server");

    let pool_config = parkon_db::PoolConfig::from_app_config(&config);
    let pool = parkon_db::connect_pool(config.database_url()?, pool_config).await?;
    let applied = parkon_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");

    let sink = Arc::new(PgSearchSink::new(pool.clone()));
    let search = SearchService::from_app_config(&config, sink)?;
    let geocoder = PostcodeClient::from_app_config(&config)?;

    let _scheduler = scheduler::build_scheduler(pool.clone(), config.cache_retention_days).await?;

    let state = AppState {
        pool,
        search: Arc::new(search),
        geocoder: Arc::new(geocoder),
    };
    let app = build_app(state, PrivilegeState::from_env(), default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
