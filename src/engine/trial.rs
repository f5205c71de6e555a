use reqwest::Client;
use std::future::Future;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::download::download;
use super::types::{DownloadResult, Endpoint, SpeedTestConfig, TrialMeasurement};

/// Run one measurement trial: fan out concurrent downloads across all
/// endpoints, wait for every task, and convert the aggregate to Mbps.
pub async fn run_trial(
    client: &Client,
    endpoints: &[Endpoint],
    config: &SpeedTestConfig,
) -> TrialMeasurement {
    let client = client.clone();
    let deadline = config.trial_timeout;
    run_trial_with(endpoints, config.streams_per_url, move |url| {
        let client = client.clone();
        async move { download(&client, &url, deadline).await }
    })
    .await
}

/// The fan-out/fan-in core, generic over the download so tests can
/// substitute fakes.
///
/// Launches `streams_per_url` tasks per endpoint and joins all of them
/// before reading the clock again: the measured window spans the whole
/// concurrent transfer, which is what aggregate throughput means here.
/// Each task returns its own immutable result and the byte counts are
/// merged on this task only, after the barrier, so no accumulator is
/// ever shared. Failed downloads contribute their partial byte counts.
pub(crate) async fn run_trial_with<F, Fut>(
    endpoints: &[Endpoint],
    streams_per_url: u32,
    fetch: F,
) -> TrialMeasurement
where
    F: Fn(Endpoint) -> Fut,
    Fut: Future<Output = DownloadResult> + Send + 'static,
{
    let start = Instant::now();

    let mut tasks = JoinSet::new();
    for _ in 0..streams_per_url {
        for url in endpoints {
            tasks.spawn(fetch(url.clone()));
        }
    }

    let mut total_bytes: u64 = 0;
    let mut failures: u32 = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => {
                total_bytes += result.bytes;
                if !result.succeeded {
                    failures += 1;
                }
            }
            Err(e) => {
                warn!("Download task panicked: {e}");
                failures += 1;
            }
        }
    }

    let elapsed_secs = start.elapsed().as_secs_f64();
    if failures > 0 {
        debug!("{failures} of this trial's downloads did not complete cleanly");
    }
    TrialMeasurement::new(total_bytes, elapsed_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn endpoints(n: usize) -> Vec<Endpoint> {
        (0..n).map(|i| format!("ep-{i}")).collect()
    }

    #[tokio::test]
    async fn empty_endpoint_list_launches_nothing() {
        let spawned = Arc::new(AtomicU32::new(0));
        let counter = spawned.clone();
        let m = run_trial_with(&[], 5, move |_url| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                DownloadResult {
                    bytes: 1,
                    succeeded: true,
                }
            }
        })
        .await;
        assert_eq!(spawned.load(Ordering::SeqCst), 0);
        assert_eq!(m.total_bytes, 0);
        assert_eq!(m.mbps, 0.0);
    }

    #[tokio::test]
    async fn sums_bytes_regardless_of_completion_order() {
        // Staggered delays so tasks finish in a scrambled order.
        let delays_ms = [40u64, 5, 25, 10];
        let m = run_trial_with(&endpoints(4), 1, move |url| async move {
            let idx: usize = url.rsplit('-').next().unwrap().parse().unwrap();
            tokio::time::sleep(Duration::from_millis(delays_ms[idx])).await;
            DownloadResult {
                bytes: 10_000,
                succeeded: true,
            }
        })
        .await;
        assert_eq!(m.total_bytes, 40_000);
    }

    #[tokio::test]
    async fn failed_download_contributes_its_partial_bytes() {
        let eps = vec!["ok".to_string(), "broken".to_string()];
        let m = run_trial_with(&eps, 1, |url| async move {
            if url == "broken" {
                DownloadResult {
                    bytes: 1_234,
                    succeeded: false,
                }
            } else {
                DownloadResult {
                    bytes: 10_000,
                    succeeded: true,
                }
            }
        })
        .await;
        assert_eq!(m.total_bytes, 11_234);
    }

    #[tokio::test]
    async fn replication_multiplies_the_task_count() {
        let spawned = Arc::new(AtomicU32::new(0));
        let counter = spawned.clone();
        let m = run_trial_with(&endpoints(2), 3, move |_url| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                DownloadResult {
                    bytes: 100,
                    succeeded: true,
                }
            }
        })
        .await;
        assert_eq!(spawned.load(Ordering::SeqCst), 6);
        assert_eq!(m.total_bytes, 600);
    }

    #[tokio::test]
    async fn elapsed_spans_the_slowest_task() {
        let m = run_trial_with(&endpoints(3), 1, |url| async move {
            let idx: u64 = url.rsplit('-').next().unwrap().parse().unwrap();
            tokio::time::sleep(Duration::from_millis(20 * (idx + 1))).await;
            DownloadResult {
                bytes: 1_000_000,
                succeeded: true,
            }
        })
        .await;
        // Slowest task sleeps 60 ms; the window must cover it.
        assert!(m.elapsed_secs >= 0.06);
        assert!(m.mbps > 0.0);
    }
}
