use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{extract::State, response::Redirect, routing::get, Json, Router};
use chrono::Utc;
use thiserror::Error;
use tokio::{net::TcpListener, signal, sync::RwLock, task, time};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use itinerary_parser::{TripDocument, TripView};

/// Built snapshots are kept until the TTL eviction task clears them; the
/// clock-derived fields are refreshed per request instead.
type Cache = Arc<RwLock<Option<Arc<TripView>>>>;

const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone)]
struct AppState {
    client: reqwest::Client,
    upstream: Arc<str>,
    cache: Cache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    const ADDR_VAR: &str = "ITINERARY_PROXY_ADDR";
    const UPSTREAM_VAR: &str = "ITINERARY_UPSTREAM";

    let addr: SocketAddr = env::var(ADDR_VAR)
        .map_or_else(|_| Ok(SocketAddr::from(([127, 0, 0, 1], 8080))), |value| value.parse())
        .with_context(|| format!("failed to parse `{ADDR_VAR}` environment variable"))?;

    let upstream = env::var(UPSTREAM_VAR)
        .with_context(|| format!("`{UPSTREAM_VAR}` environment variable is required"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to create HTTP client")?;

    let state = AppState {
        client,
        upstream: upstream.into(),
        cache: Arc::new(RwLock::new(None)),
    };

    let router = Router::new()
        .route("/itinerary", get(handle_itinerary))
        .fallback(|| async { Redirect::permanent(env!("CARGO_PKG_REPOSITORY")) })
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    info!("listening at http://{addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
}

#[derive(Debug, Error)]
enum LoadError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("malformed itinerary document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Build(#[from] itinerary_parser::Error),
}

/// A failed load is not an HTTP error: the contract is a terminal error
/// state the presentation layer renders as a banner.
async fn handle_itinerary(State(state): State<AppState>) -> Json<TripView> {
    let now = Utc::now();

    match load_trip(&state).await {
        Ok(snapshot) => {
            let mut view = (*snapshot).clone();
            view.refresh_now(now);
            Json(view)
        }
        Err(err) => {
            error!("failed to load itinerary: {err}");
            Json(TripView::error_view(&err.to_string(), now.date_naive(), now))
        }
    }
}

async fn load_trip(state: &AppState) -> Result<Arc<TripView>, LoadError> {
    if let Some(snapshot) = state.cache.read().await.clone() {
        return Ok(snapshot);
    }

    info!(url = %state.upstream, "fetching itinerary document");
    let body = state
        .client
        .get(state.upstream.as_ref())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let doc: TripDocument = serde_json::from_str(&body)?;

    let now = Utc::now();
    let snapshot = Arc::new(TripView::build(&doc, now.date_naive(), now)?);

    *state.cache.write().await = Some(Arc::clone(&snapshot));

    let cache = Arc::clone(&state.cache);
    task::spawn(async move {
        time::sleep(CACHE_TTL).await;
        *cache.write().await = None;
    });

    Ok(snapshot)
}
