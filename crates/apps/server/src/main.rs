use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;
use feed::HttpFeedClient;
use shell::GlobeView;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod routes;

use config::ServerConfig;
use routes::{AppState, View};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("configuration error: {err}");
            std::process::exit(2);
        }
    };
    let client = match HttpFeedClient::new(config.feed.clone()) {
        Ok(client) => client,
        Err(err) => {
            error!("feed client init failed: {err}");
            std::process::exit(1);
        }
    };
    let view = match GlobeView::mount(client, config.initial_filter, config.view.clone()) {
        Ok(view) => Arc::new(view),
        Err(err) => {
            error!("globe mount failed: {err}");
            std::process::exit(1);
        }
    };

    spawn_snapshot_sync(view.clone());
    spawn_frame_ticker(view.clone(), config.frame_interval);
    view.start_auto_refresh(config.feed.refresh_interval);
    {
        let view = view.clone();
        tokio::spawn(async move {
            view.refresh().await;
        });
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let app = routes::router(AppState { view: view.clone() })
        .nest_service("/textures", ServeDir::new(&config.texture_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("bind {} failed: {err}", config.addr);
            std::process::exit(1);
        }
    };
    info!("earthquake globe listening on http://{}", config.addr);
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {err}");
    }

    if let Some(report) = view.unmount() {
        info!(
            markers = report.markers_released,
            live = report.resources_live,
            "shutdown complete"
        );
    }
}

/// Rebuilds markers whenever the fetcher publishes a new snapshot, including
/// ones produced by the auto-refresh timer.
fn spawn_snapshot_sync(view: Arc<View>) {
    let mut rx = view.fetcher().subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            match view.sync_snapshot() {
                Ok(Some(report)) => debug!(created = report.created, "markers synced"),
                Ok(None) => {}
                Err(err) => {
                    debug!(%err, "snapshot sync stopped");
                    break;
                }
            }
        }
    });
}

fn spawn_frame_ticker(view: Arc<View>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut last = Instant::now();
        loop {
            interval.tick().await;
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;
            if view.tick(dt).is_err() {
                break;
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("ctrl-c handler failed: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
