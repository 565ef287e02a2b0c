use clap::Parser;
use ipswarm::prelude::*;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_LOG_FILTER: &str = "ipswarm=info";

/// Drive simulated users against `GET {host}/rest/v1/{ip}`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Base URL of the service under test, e.g. http://127.0.0.1:3002
    #[arg(short = 'H', long)]
    host: String,

    /// Number of simulated users
    #[arg(short, long, default_value_t = 1)]
    users: usize,

    /// Users started per second (all at once when omitted)
    #[arg(short = 'r', long)]
    spawn_rate: Option<NonZeroU32>,

    /// Stop after this long, e.g. 90s, 5m
    #[arg(short = 't', long, value_parser = humantime::parse_duration)]
    run_time: Option<Duration>,

    /// Stop each user after this many iterations
    #[arg(short, long)]
    iterations: Option<u64>,

    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    min_wait: Duration,

    #[arg(long, default_value = "2s", value_parser = humantime::parse_duration)]
    max_wait: Duration,

    /// Task weights as fixed_ip,random_fixed_ips,random_ip
    #[arg(short, long, default_value_t = TaskWeights::default())]
    weights: TaskWeights,

    /// Expose Prometheus metrics on this address
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,
}

impl Cli {
    fn scenario(&self) -> anyhow::Result<Scenario> {
        let wait_time = WaitTime::between(self.min_wait, self.max_wait)?;

        let mut scenario = Scenario::new("ipswarm", &self.host)
            .users(self.users)
            .wait_time(wait_time)
            .weights(self.weights);

        if let Some(rate) = self.spawn_rate {
            scenario = scenario.spawn_rate(rate);
        }
        if let Some(run_time) = self.run_time {
            scenario = scenario.duration(run_time);
        }
        if let Some(iterations) = self.iterations {
            scenario = scenario.iterations(iterations);
        }

        Ok(scenario)
    }
}

/// Runs `scenario` until it completes or `shutdown` resolves, whichever comes first. Either way
/// the statistics gathered so far are returned.
async fn run_until<F>(scenario: Scenario, shutdown: F) -> anyhow::Result<RunStatistics>
where
    F: Future<Output = ()> + Send + 'static,
{
    let signal = StopSignal::new();
    let stopper = signal.clone();
    let watcher = tokio::spawn(async move {
        shutdown.await;
        warn!("Interrupted, stopping");
        stopper.stop();
    });

    let stats = scenario.stop_signal(signal).await;
    watcher.abort();
    Ok(stats?)
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        info!("Serving metrics on {addr}");
    }

    let scenario = cli.scenario()?;

    let stats = run_until(scenario, ctrl_c()).await?;
    info!("{stats}");

    Ok(())
}
