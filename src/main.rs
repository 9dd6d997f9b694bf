//! Daily-poll backend binary entrypoint wiring the REST API, storage
//! supervision, and tracing layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use predict_people_back::{
    config::AppConfig,
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[cfg(any(feature = "mongo-store", feature = "rest-store"))]
use predict_people_back::dao::poll_store::PollStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    spawn_storage_supervisor(app_state.clone());
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick a durable backend and hand it to the storage supervisor.
///
/// A configured `REST_BASE_URL` selects the remote table store; otherwise
/// MongoDB is used with its usual environment variables.
fn spawn_storage_supervisor(state: SharedState) {
    #[cfg(feature = "rest-store")]
    {
        use predict_people_back::dao::poll_store::rest::{RestConfig, RestPollStore};

        if env::var("REST_BASE_URL").is_ok() {
            info!("using the REST table store backend");
            tokio::spawn(storage_supervisor::run(state, || async {
                let config = RestConfig::from_env()?;
                let store = RestPollStore::connect(config).await?;
                Ok(Arc::new(store) as Arc<dyn PollStore>)
            }));
            return;
        }
    }

    #[cfg(feature = "mongo-store")]
    {
        use predict_people_back::dao::poll_store::mongodb::{MongoConfig, MongoPollStore};

        let uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
        let db = env::var("MONGO_DB").ok();
        info!("using the MongoDB store backend");
        tokio::spawn(storage_supervisor::run(state, move || {
            let uri = uri.clone();
            let db = db.clone();
            async move {
                let config = MongoConfig::from_uri(&uri, db.as_deref()).await?;
                let store = MongoPollStore::connect(config).await?;
                Ok(Arc::new(store) as Arc<dyn PollStore>)
            }
        }));
        return;
    }

    #[cfg(not(feature = "mongo-store"))]
    {
        warn!("no storage backend selected; staying in degraded mode");
        let _ = state;
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
