use std::{fmt, path::Path, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    AppState,
    config::Config,
    routes,
    shutdown::ShutdownSignal,
    store::{DiaryRepository, Storage},
};

/// Upper bound on how long in-flight requests may run after shutdown begins.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Abandoned requests may still hold pool connections; closing does not wait past this.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

pub fn router<R: DiaryRepository>(state: Arc<AppState<R>>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(routes::index::<R>))
        .route("/about", get(routes::about))
        .route("/health", get(routes::health))
        .route("/recent-entries", get(routes::recent_entries::<R>))
        .route("/diary/new", get(routes::new_entry_form).post(routes::create_entry::<R>))
        .route(
            "/diary/{id}",
            get(routes::entry_detail::<R>)
                .put(routes::update_entry::<R>)
                .delete(routes::delete_entry::<R>),
        )
        .route("/diary/{id}/edit", get(routes::edit_entry_form::<R>))
        .route("/diary/{id}/lookups", post(routes::add_lookup::<R>))
        .route("/diary-short/{id}", get(routes::entry_short::<R>))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Phase {
    Starting,
    Serving,
    Draining,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Starting => "starting",
            Phase::Serving => "serving",
            Phase::Draining => "draining",
            Phase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Process phase tracker. Phases only move forward.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { phase: Phase::Starting }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Moves to `next`; returns false and stays put if that would go backwards.
    pub fn advance(&mut self, next: Phase) -> bool {
        if next <= self.phase {
            warn!(from = %self.phase, to = %next, "ignored backwards lifecycle transition");
            return false;
        }
        info!(from = %self.phase, to = %next, "lifecycle transition");
        self.phase = next;
        true
    }
}

/// Opens storage, serves until a shutdown signal, drains, then closes storage. Storage is
/// closed on every path once it has been opened.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let mut lifecycle = Lifecycle::new();

    let storage = match Storage::open(&config.database_path).await {
        Ok(storage) => storage,
        Err(err) => {
            lifecycle.advance(Phase::Stopped);
            return Err(anyhow::Error::new(err).context("opening database"));
        },
    };

    let result = serve_storage(&config, storage.clone(), &mut lifecycle).await;

    close_storage(storage, CLOSE_TIMEOUT).await;
    lifecycle.advance(Phase::Stopped);
    info!(phase = %lifecycle.phase(), ok = result.is_ok(), "server exited");
    result
}

async fn close_storage(storage: Storage, limit: Duration) {
    match tokio::time::timeout(limit, storage.close()).await {
        Ok(Ok(())) => {},
        Ok(Err(err)) => warn!(error = %err, "failed to close storage"),
        Err(_) => warn!(timeout_secs = limit.as_secs(), "storage close timed out, giving up"),
    }
}

async fn serve_storage(
    config: &Config,
    storage: Storage,
    lifecycle: &mut Lifecycle,
) -> anyhow::Result<()> {
    if config.seed {
        let seeded = storage.seed_samples().await?;
        info!(seeded, "seeded sample diary");
    }

    let listener = TcpListener::bind(config.addr).await?;
    let app = router(Arc::new(AppState { repo: storage }), &config.static_dir);

    let shutdown = ShutdownSignal::new();
    shutdown.listen_for_os_signals();

    info!(addr = %config.addr, database = %config.database_path.display(), "listening");
    lifecycle.advance(Phase::Serving);
    serve_until(listener, app, shutdown, DRAIN_TIMEOUT, || lifecycle.advance(Phase::Draining))
        .await
}

/// Serves `app` until `shutdown` fires, then stops accepting and gives in-flight requests up to
/// `drain_timeout` before abandoning them. `on_drain` runs when draining starts.
pub async fn serve_until(
    listener: TcpListener,
    app: Router,
    shutdown: ShutdownSignal,
    drain_timeout: Duration,
    on_drain: impl FnOnce() -> bool,
) -> anyhow::Result<()> {
    let graceful = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app).with_graceful_shutdown(async move { graceful.wait().await }).await
    });

    tokio::select! {
        res = &mut server => {
            // Ended before any shutdown request, which only happens on error.
            res??;
            return Ok(());
        }
        _ = shutdown.wait() => {}
    }

    on_drain();
    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(res) => {
            res??;
            info!("drained in-flight requests");
        },
        Err(_) => {
            warn!(timeout_secs = drain_timeout.as_secs(), "drain timed out, abandoning requests");
            server.abort();
        },
    }
    Ok(())
}
