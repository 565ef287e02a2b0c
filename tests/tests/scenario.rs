use ipswarm::prelude::*;
use ipswarm::selector::{FIXED_POOL, FIXED_TRIPLET};
use ipswarm_tests::mock;
use reqwest::Client;
use std::net::Ipv4Addr;
use std::time::Duration;

fn no_wait() -> WaitTime {
    WaitTime::constant(Duration::ZERO)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fixed_ip_requests_in_order() -> anyhow::Result<()> {
    let (host, state) = mock().await?;

    let stats = Scenario::new("fixed_ip", &host)
        .weights(TaskWeights::new(1, 0, 0))
        .wait_time(no_wait())
        .iterations(1)
        .await?;

    assert_eq!(state.seen(), FIXED_TRIPLET.to_vec());
    assert_eq!(stats.users, 1);
    assert_eq!(stats.iterations, 1);
    assert_eq!(stats.task_iterations["fixed_ip"], 1);
    assert_eq!(stats.success, 3);
    assert_eq!(stats.error, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fixed_ip_repeats_identically() -> anyhow::Result<()> {
    let (host, state) = mock().await?;

    Scenario::new("fixed_ip", &host)
        .weights(TaskWeights::new(1, 0, 0))
        .wait_time(no_wait())
        .iterations(4)
        .await?;

    let seen = state.seen();
    assert_eq!(seen.len(), 12);
    for chunk in seen.chunks(3) {
        assert_eq!(chunk, &FIXED_TRIPLET[..]);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn random_fixed_ips_stay_in_pool() -> anyhow::Result<()> {
    let (host, state) = mock().await?;

    let stats = Scenario::new("random_fixed_ips", &host)
        .users(2)
        .weights(TaskWeights::new(0, 1, 0))
        .wait_time(no_wait())
        .iterations(20)
        .await?;

    let seen = state.seen();
    assert_eq!(seen.len(), 40);
    assert!(seen.iter().all(|ip| FIXED_POOL.contains(&ip.as_str())));
    assert_eq!(stats.task_iterations["random_fixed_ips"], 40);
    assert_eq!(stats.success, 40);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn random_ips_are_valid() -> anyhow::Result<()> {
    let (host, state) = mock().await?;

    let stats = Scenario::new("random_ip", &host)
        .weights(TaskWeights::new(0, 0, 1))
        .wait_time(no_wait())
        .iterations(25)
        .await?;

    let seen = state.seen();
    assert_eq!(seen.len(), 25);
    assert!(seen.iter().all(|ip| ip.parse::<Ipv4Addr>().is_ok()));
    assert_eq!(stats.error, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn default_weights_mix_tasks() -> anyhow::Result<()> {
    let (host, state) = mock().await?;

    let stats = Scenario::new("mixed", &host)
        .users(4)
        .wait_time(no_wait())
        .iterations(50)
        .await?;

    assert_eq!(stats.users, 4);
    assert_eq!(stats.iterations, 200);
    assert_eq!(stats.task_iterations.values().sum::<u64>(), 200);

    let fixed = stats.task_iterations["fixed_ip"];
    let expected_requests = 3 * fixed + (200 - fixed);
    assert_eq!(stats.requests(), expected_requests);
    assert_eq!(state.requests(), expected_requests);
    assert_eq!(stats.success, expected_requests);

    // 4:3:1 over 200 draws; every task should show up.
    assert!(stats.task_iterations.values().all(|&count| count > 0));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_errors_are_counted() -> anyhow::Result<()> {
    let (host, state) = mock().await?;
    state.fail_with(mock_service::StatusCode::INTERNAL_SERVER_ERROR);

    let stats = Scenario::new("failing", &host)
        .users(2)
        .wait_time(no_wait())
        .iterations(5)
        .await?;

    assert_eq!(stats.iterations, 10);
    assert_eq!(stats.success, 0);
    assert_eq!(stats.error, stats.requests());
    assert_eq!(stats.error, state.requests());
    assert!((stats.error_rate() - 1.).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_host_counts_errors() -> anyhow::Result<()> {
    ipswarm_tests::init_tracing();

    let stats = Scenario::new("unreachable", "http://127.0.0.1:1")
        .weights(TaskWeights::new(0, 1, 0))
        .wait_time(no_wait())
        .iterations(3)
        .await?;

    assert_eq!(stats.iterations, 3);
    assert_eq!(stats.error, 3);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stops_after_duration() -> anyhow::Result<()> {
    let (host, state) = mock().await?;

    let stats = Scenario::new("timed", &host)
        .users(2)
        .wait_time(WaitTime::constant(Duration::from_millis(50)))
        .duration(Duration::from_millis(300))
        .await?;

    assert!(stats.elapsed >= Duration::from_millis(300));
    assert!(stats.elapsed < Duration::from_secs(3));
    assert!(stats.iterations >= 2);
    assert_eq!(stats.requests(), state.requests());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_signal_returns_partial_stats() -> anyhow::Result<()> {
    let (host, state) = mock().await?;

    let signal = StopSignal::new();
    let stopper = signal.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        stopper.stop();
    });

    // Unbounded, with the default 1s..2s wait: only the signal ends this run.
    let stats = Scenario::new("interrupted", &host)
        .users(3)
        .stop_signal(signal)
        .await?;

    assert_eq!(stats.users, 3);
    assert_eq!(stats.iterations, 3);
    assert_eq!(stats.requests(), state.requests());
    assert!(stats.elapsed < Duration::from_secs(1));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawn_rate_paces_users() -> anyhow::Result<()> {
    let (host, _state) = mock().await?;

    let stats = Scenario::new("ramp", &host)
        .users(3)
        .spawn_rate(NonZeroU32::new(10).unwrap())
        .wait_time(no_wait())
        .iterations(1)
        .await?;

    assert_eq!(stats.users, 3);
    assert_eq!(stats.iterations, 3);
    // One user immediately, then one every 100ms.
    assert!(stats.elapsed >= Duration::from_millis(150));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn custom_client() -> anyhow::Result<()> {
    let (host, state) = mock().await?;

    let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
    let stats = Scenario::new("custom_client", &host)
        .client(client)
        .weights(TaskWeights::new(1, 0, 0))
        .wait_time(no_wait())
        .iterations(2)
        .await?;

    assert_eq!(stats.success, 6);
    assert_eq!(state.requests(), 6);
    Ok(())
}

#[transaction]
async fn lookup(client: &Client, url: String) -> Result<String, reqwest::Error> {
    client.get(url).send().await?.error_for_status()?.text().await
}

#[tokio::test]
async fn transaction_outside_scenario() -> anyhow::Result<()> {
    let (host, _state) = mock().await?;

    let client = Client::new();
    let body = lookup(&client, format!("{host}/rest/v1/63.127.26.70")).await?;
    assert_eq!(body, "63.127.26.70");

    assert!(lookup(&client, format!("{host}/rest/v1/not-an-ip"))
        .await
        .is_err());
    Ok(())
}
