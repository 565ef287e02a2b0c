//! Scenario logic
use crate::task::{Policy, TaskSet};
use crate::transaction::{TransactionData, TRANSACTION_HOOK};
use crate::user::RestUser;
use crate::Error;
use governor::{Quota, RateLimiter};
use ipswarm_core::{RunStatistics, ScenarioConfig, TaskWeights, WaitTime};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use reqwest::Client;
use std::{
    future::Future,
    num::NonZeroU32,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    task::{Context, Poll},
    time::{Duration, Instant},
};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn, Instrument};

/// Ends a running Scenario early.
///
/// Users finish their in-flight iteration, skip the remaining wait and exit; the Scenario then
/// resolves to the statistics gathered so far. Clones share the same signal.
#[derive(Clone, Debug)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once `stop()` has been called.
async fn stopped(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Load test scenario structure
///
/// Configure with the builder methods, then `.await` it to run the simulated users. Resolves to
/// the [`RunStatistics`] of the run, or an [`Error`] if the configuration is invalid.
///
/// # Example
/// ```no_run
/// use ipswarm::prelude::*;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let stats = Scenario::new("rest", "http://127.0.0.1:3002")
///         .users(50)
///         .duration(Duration::from_secs(120))
///         .await
///         .unwrap();
///     println!("{stats}");
/// }
/// ```
#[pin_project::pin_project]
pub struct Scenario {
    runner_fut: Option<Pin<Box<dyn Future<Output = Result<RunStatistics, Error>> + Send>>>,
    config: ScenarioConfig,
    client: Option<Client>,
    stop: StopSignal,
}

impl Scenario {
    pub fn new(name: &str, host: &str) -> Self {
        Self::from_config(ScenarioConfig::new(name, host))
    }

    pub fn from_config(config: ScenarioConfig) -> Self {
        Self {
            runner_fut: None,
            config,
            client: None,
            stop: StopSignal::new(),
        }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Number of simulated users (default `1`).
    pub fn users(mut self, users: usize) -> Self {
        self.config.users = users;
        self
    }

    /// Start at most `rate` users per second instead of all at once.
    pub fn spawn_rate(mut self, rate: NonZeroU32) -> Self {
        self.config.spawn_rate = Some(rate);
        self
    }

    /// Stop the run after `duration`. In-flight iterations are allowed to finish.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = Some(duration);
        self
    }

    /// Stop each user after it has run `iterations` tasks.
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.config.iterations = Some(iterations);
        self
    }

    /// Pause between two iterations of a user (default 1s to 2s).
    pub fn wait_time(mut self, wait_time: WaitTime) -> Self {
        self.config.wait_time = wait_time;
        self
    }

    /// Relative task weights (default `4,3,1`).
    pub fn weights(mut self, weights: TaskWeights) -> Self {
        self.config.weights = weights;
        self
    }

    /// Stop the run when `signal` fires, e.g. on Ctrl-C.
    pub fn stop_signal(mut self, signal: StopSignal) -> Self {
        self.stop = signal;
        self
    }

    /// Use a preconfigured HTTP client (timeouts, headers, ...).
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }
}

impl Future for Scenario {
    type Output = Result<RunStatistics, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.runner_fut.is_none() {
            let config = self.config.clone();
            let client = self.client.take().unwrap_or_default();
            let stop = self.stop.clone();
            self.runner_fut = Some(Box::pin(async move {
                run_scenario(config, client, stop).await
            }));
        }

        if let Some(runner) = &mut self.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

#[instrument(name="scenario", skip_all, fields(name=config.name))]
pub(crate) async fn run_scenario(
    config: ScenarioConfig,
    client: Client,
    stop: StopSignal,
) -> Result<RunStatistics, Error> {
    config.validate()?;
    let tasks = Arc::new(TaskSet::new(&config.weights)?);
    let user = RestUser::new(client, &config.host)?;

    info!("Running {} with config {:?}", config.name, &config);
    if !config.is_bounded() {
        warn!("No duration or iteration limit set, running until stopped");
    }

    let start = Instant::now();
    let deadline = config.duration.map(|duration| start + duration);
    let hook = TransactionData::default();
    let counters = Arc::new(TaskCounters::default());

    let limiter = config
        .spawn_rate
        .map(|rate| RateLimiter::direct(Quota::per_second(rate).allow_burst(NonZeroU32::MIN)));

    let mut stop_rx = stop.subscribe();
    let mut handles = Vec::new();
    for id in 0..config.users {
        if let Some(limiter) = &limiter {
            tokio::select! {
                _ = limiter.until_ready() => {}
                _ = stopped(&mut stop_rx) => {}
            }
        }
        if stop.is_stopped() {
            warn!("Stopped after spawning {id} of {} users", config.users);
            break;
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            warn!("Duration elapsed after spawning {id} of {} users", config.users);
            break;
        }

        let user_loop = UserLoop {
            user: user.clone(),
            tasks: tasks.clone(),
            counters: counters.clone(),
            wait_time: config.wait_time,
            iterations: config.iterations,
            deadline,
            stop: stop.subscribe(),
        };

        debug!("Spawning user {id}");
        let fut = TRANSACTION_HOOK.scope(hook.clone(), user_loop.run());
        handles.push(tokio::spawn(fut.instrument(tracing::debug_span!("user", id))));
    }

    let users = handles.len();
    for handle in handles {
        if let Err(err) = handle.await {
            error!("User task failed: {err}");
        }
    }

    let stats = RunStatistics {
        users,
        iterations: counters.total(),
        task_iterations: counters.by_task(),
        success: hook.success(),
        error: hook.error(),
        elapsed: start.elapsed(),
    };

    info!("Scenario complete: {stats}");

    Ok(stats)
}

struct UserLoop {
    user: RestUser,
    tasks: Arc<TaskSet>,
    counters: Arc<TaskCounters>,
    wait_time: WaitTime,
    iterations: Option<u64>,
    deadline: Option<Instant>,
    stop: watch::Receiver<bool>,
}

impl UserLoop {
    async fn run(mut self) {
        let mut rng = SmallRng::from_entropy();
        let mut completed = 0;

        loop {
            if self.iterations.is_some_and(|limit| completed >= limit) || self.expired() {
                break;
            }

            let policy = self.tasks.choose(&mut rng);
            let failed = self.user.run_policy(policy, &mut rng).await;
            if failed > 0 {
                debug!("{policy}: {failed} failed requests");
            }

            completed += 1;
            self.counters.record(policy);

            if self.iterations.is_some_and(|limit| completed >= limit) {
                break;
            }

            let mut wait = self.wait_time.sample(&mut rng);
            if let Some(deadline) = self.deadline {
                wait = wait.min(deadline.saturating_duration_since(Instant::now()));
            }
            if !wait.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = stopped(&mut self.stop) => break,
                }
            }
        }

        debug!("User finished after {completed} iterations");
    }

    fn expired(&self) -> bool {
        *self.stop.borrow()
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[derive(Default)]
struct TaskCounters {
    iterations: [AtomicU64; 3],
}

impl TaskCounters {
    fn slot(policy: Policy) -> usize {
        match policy {
            Policy::FixedIp => 0,
            Policy::RandomFixedIps => 1,
            Policy::RandomIp => 2,
        }
    }

    fn record(&self, policy: Policy) {
        self.iterations[Self::slot(policy)].fetch_add(1, Ordering::Relaxed);
    }

    fn total(&self) -> u64 {
        self.iterations
            .iter()
            .map(|count| count.load(Ordering::Relaxed))
            .sum()
    }

    fn by_task(&self) -> std::collections::BTreeMap<&'static str, u64> {
        Policy::ALL
            .iter()
            .map(|&policy| {
                let count = self.iterations[Self::slot(policy)].load(Ordering::Relaxed);
                (policy.name(), count)
            })
            .collect()
    }
}
