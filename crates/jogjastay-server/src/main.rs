mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use jogjastay_store::Store;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(jogjastay_core::load_app_config_from_env()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = match &config.store_path {
        Some(path) => Store::open(path).await?,
        None => {
            tracing::warn!("JOGJASTAY_STORE_PATH not set; store is in-memory only");
            Store::in_memory()
        }
    };

    match jogjastay_core::catalog::load_catalog(&config.hotels_path) {
        Ok(catalog) => {
            let report = jogjastay_store::run_migration(&store, &catalog.hotels).await?;
            tracing::info!(
                created = report.created,
                skipped = report.skipped,
                failed = report.failed,
                "startup seeding done"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "hotel catalog unavailable, skipping startup seeding");
        }
    }

    if let Some(email) = &config.bootstrap_admin_email {
        if let Some(uid) = jogjastay_store::bootstrap_admin(&store, email).await? {
            tracing::info!(uid = %uid, "bootstrap admin promoted at startup");
        }
    }

    let auth = AuthState::from_env(matches!(
        config.env,
        jogjastay_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            store,
            config: Arc::clone(&config),
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
