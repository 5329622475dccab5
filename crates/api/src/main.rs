use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_core::config::Settings;
use pulse_core::storage::{seed, Repositories};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let repos = Repositories::in_memory();
    if let Err(e) = seed::seed(&repos).await {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %e, "loading sample data failed; starting with an empty store");
    }

    let state = Arc::new(pulse_api::AppState::from_settings(repos, &settings));
    let mut app = pulse_api::router(state);
    if let Some(dir) = settings.static_dir.as_deref() {
        tracing::info!(static_dir = dir, "serving dashboard files");
        app = pulse_api::with_static_dir(app, dir);
    }

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
