use metrics_exporter_prometheus::PrometheusBuilder;
use mock_service::{rps_measure_task, run, MockState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_ADDR: &str = "0.0.0.0:3002";
const METRICS_ADDR: &str = "0.0.0.0:8002";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=info,tower_http=info")),
        )
        .init();

    PrometheusBuilder::new()
        .with_http_listener(METRICS_ADDR.parse::<SocketAddr>()?)
        .install()?;

    let addr: SocketAddr = std::env::args()
        .nth(1)
        .as_deref()
        .unwrap_or(DEFAULT_ADDR)
        .parse()?;

    let state = MockState::default();
    tokio::spawn(rps_measure_task(state.clone()));

    let listener = TcpListener::bind(addr).await?;
    info!("Mock service listening on {addr}");
    run(listener, state).await?;
    Ok(())
}
