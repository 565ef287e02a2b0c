use axum::{
    debug_handler,
    extract::{Path, State},
    routing::get,
    Router,
};
use metrics::counter;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{
    atomic::{AtomicU16, AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

pub use axum::http::StatusCode;

/// Shared view of what the mock service has been asked for.
#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    seen: Mutex<Vec<String>>,
    requests: AtomicU64,
    fail_with: AtomicU16,
}

impl MockState {
    /// Every address requested so far, in arrival order.
    pub fn seen(&self) -> Vec<String> {
        self.inner
            .seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn requests(&self) -> u64 {
        self.inner.requests.load(Ordering::Relaxed)
    }

    /// Answer every following request with `status`.
    pub fn fail_with(&self, status: StatusCode) {
        self.inner
            .fail_with
            .store(status.as_u16(), Ordering::Relaxed);
    }

    pub fn recover(&self) {
        self.inner.fail_with.store(0, Ordering::Relaxed);
    }

    fn record(&self, ip: &str) {
        self.inner.requests.fetch_add(1, Ordering::Relaxed);
        self.inner
            .seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ip.to_string());
    }

    fn forced_failure(&self) -> Option<StatusCode> {
        match self.inner.fail_with.load(Ordering::Relaxed) {
            0 => None,
            code => StatusCode::from_u16(code).ok(),
        }
    }
}

pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/rest/v1/:ip", get(lookup))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

/// Serve on an ephemeral localhost port in the background.
pub async fn spawn() -> anyhow::Result<(SocketAddr, MockState)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = MockState::default();

    let server_state = state.clone();
    tokio::spawn(async move {
        if let Err(err) = run(listener, server_state).await {
            error!("Mock service stopped: {err}");
        }
    });

    Ok((addr, state))
}

#[debug_handler]
async fn lookup(
    State(state): State<MockState>,
    Path(ip): Path<String>,
) -> Result<String, StatusCode> {
    counter!("mock_service.requests").increment(1);
    state.record(&ip);

    if let Some(status) = state.forced_failure() {
        return Err(status);
    }

    match ip.parse::<Ipv4Addr>() {
        Ok(addr) => Ok(addr.to_string()),
        Err(_) => {
            debug!("Rejecting {ip:?}");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

/** RPS Printer **/

pub async fn rps_measure_task(state: MockState) {
    let mut last = state.requests();
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let total = state.requests();
        info!("{} RPS", total - last);
        last = total;
    }
}
