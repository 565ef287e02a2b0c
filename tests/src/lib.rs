//! Shared setup for the end-to-end tests in `tests/`.
use mock_service::MockState;
use std::sync::OnceLock;
use tracing_subscriber::FmtSubscriber;

pub fn init_tracing() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let _ = FmtSubscriber::builder()
            .with_env_filter("ipswarm=debug,mock_service=debug,axum::rejection=trace")
            .try_init();
    });
}

/// Starts a mock service on an ephemeral port, returning its base URL.
pub async fn mock() -> anyhow::Result<(String, MockState)> {
    init_tracing();
    let (addr, state) = mock_service::spawn().await?;
    Ok((format!("http://{addr}"), state))
}
