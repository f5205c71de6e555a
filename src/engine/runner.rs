use reqwest::Client;
use tracing::info;

use super::discovery::fetch_endpoints;
use super::error::SpeedTestError;
use super::trial::run_trial;
use super::types::{Endpoint, EventSender, SpeedTestConfig, SpeedTestEvent, SpeedTestResult};

/// Discover endpoints once, then measure. Discovery failure is the only
/// fatal error in a run; anything after it degrades into low figures.
pub async fn run_speed_test(
    client: &Client,
    config: &SpeedTestConfig,
    tx: EventSender,
) -> Result<SpeedTestResult, SpeedTestError> {
    info!("Discovering test endpoints...");
    let endpoints = fetch_endpoints(client, config.nr_urls).await?;
    Ok(measure(client, &endpoints, config, tx).await)
}

/// Run all trials sequentially over a fixed endpoint set, emitting an
/// event as each trial lands.
pub async fn measure(
    client: &Client,
    endpoints: &[Endpoint],
    config: &SpeedTestConfig,
    tx: EventSender,
) -> SpeedTestResult {
    if endpoints.is_empty() {
        info!("No endpoints to measure");
        let _ = tx.send(SpeedTestEvent::NoEndpoints).await;
        return SpeedTestResult::from_trials(Vec::new());
    }

    let _ = tx
        .send(SpeedTestEvent::EndpointsReady {
            count: endpoints.len(),
        })
        .await;
    info!(
        "Running {} trials across {} endpoints ({} streams each)",
        config.nr_trials,
        endpoints.len(),
        config.streams_per_url
    );

    let mut trials = Vec::with_capacity(config.nr_trials as usize);
    for i in 0..config.nr_trials {
        let measurement = run_trial(client, endpoints, config).await;
        trials.push(measurement);
        let _ = tx
            .send(SpeedTestEvent::TrialComplete {
                index: i + 1,
                total: config.nr_trials,
                measurement,
            })
            .await;
    }

    let result = SpeedTestResult::from_trials(trials);
    let _ = tx.send(SpeedTestEvent::Complete(result.clone())).await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn no_endpoints_runs_zero_trials() {
        let client = Client::new();
        let (tx, mut rx) = mpsc::channel(8);
        let result = measure(&client, &[], &SpeedTestConfig::default(), tx).await;

        assert!(result.trials.is_empty());
        assert_eq!(result.mean_mbps, 0.0);
        assert!(matches!(rx.recv().await, Some(SpeedTestEvent::NoEndpoints)));
        assert!(rx.recv().await.is_none());
    }

    /// Keep answering requests with a fixed-size body until dropped.
    async fn serve_fixed_body(listener: TcpListener, body_len: usize) {
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            tokio::spawn(async move {
                let mut req = [0u8; 2048];
                let _ = socket.read(&mut req).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\ncontent-length: {body_len}\r\nconnection: close\r\n\r\n"
                );
                socket.write_all(head.as_bytes()).await.unwrap();
                socket.write_all(&vec![7u8; body_len]).await.unwrap();
                socket.flush().await.unwrap();
            });
        }
    }

    #[tokio::test]
    async fn runs_all_trials_in_order_against_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve_fixed_body(listener, 10_000));

        let endpoints: Vec<Endpoint> =
            (0..3).map(|i| format!("http://{addr}/file-{i}")).collect();
        let config = SpeedTestConfig {
            nr_trials: 2,
            streams_per_url: 1,
            ..Default::default()
        };
        let client = Client::new();
        let (tx, mut rx) = mpsc::channel(32);

        let result = measure(&client, &endpoints, &config, tx).await;

        assert_eq!(result.trials.len(), 2);
        for trial in &result.trials {
            assert_eq!(trial.total_bytes, 30_000);
            assert!(trial.mbps > 0.0);
        }
        let expected_mean = (result.trials[0].mbps + result.trials[1].mbps) / 2.0;
        assert_eq!(result.mean_mbps, expected_mean);

        assert!(matches!(
            rx.recv().await,
            Some(SpeedTestEvent::EndpointsReady { count: 3 })
        ));
        for expected_index in 1..=2 {
            match rx.recv().await {
                Some(SpeedTestEvent::TrialComplete { index, total, .. }) => {
                    assert_eq!(index, expected_index);
                    assert_eq!(total, 2);
                }
                other => panic!("expected TrialComplete, got {other:?}"),
            }
        }
        assert!(matches!(rx.recv().await, Some(SpeedTestEvent::Complete(_))));
    }
}
