use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;

/// One test-file URL handed out by the fast.com API. The URLs are signed
/// and short-lived; they are treated as opaque strings.
pub type Endpoint = String;

/// Outcome of draining one endpoint's response body.
///
/// A failed download still carries whatever bytes made it over the wire
/// before the failure.
#[derive(Debug, Clone, Copy)]
pub struct DownloadResult {
    pub bytes: u64,
    pub succeeded: bool,
}

/// One concurrent-download cycle across all endpoints.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrialMeasurement {
    pub total_bytes: u64,
    pub elapsed_secs: f64,
    pub mbps: f64,
}

impl TrialMeasurement {
    pub fn new(total_bytes: u64, elapsed_secs: f64) -> Self {
        Self {
            total_bytes,
            elapsed_secs,
            mbps: megabits_per_second(total_bytes, elapsed_secs),
        }
    }
}

/// Final result of a complete run: per-trial speeds in execution order
/// plus their arithmetic mean.
#[derive(Debug, Clone, Serialize)]
pub struct SpeedTestResult {
    pub trials: Vec<TrialMeasurement>,
    pub mean_mbps: f64,
}

impl SpeedTestResult {
    pub fn from_trials(trials: Vec<TrialMeasurement>) -> Self {
        let mean_mbps = if trials.is_empty() {
            0.0
        } else {
            trials.iter().map(|t| t.mbps).sum::<f64>() / trials.len() as f64
        };
        Self { trials, mean_mbps }
    }
}

/// Bytes over wall-clock seconds as megabits per second.
///
/// Defined as 0 for a zero-length window so a degenerate clock reading
/// never produces infinity or NaN.
pub fn megabits_per_second(bytes: u64, secs: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 * 8.0 / 1_000_000.0 / secs
}

/// Configuration for a speed test run.
#[derive(Debug, Clone)]
pub struct SpeedTestConfig {
    /// Number of sequential measurement trials.
    pub nr_trials: u32,
    /// Number of download URLs requested from the API.
    pub nr_urls: u32,
    /// Concurrent downloads launched per URL within one trial.
    pub streams_per_url: u32,
    /// Upper bound on any single download within a trial.
    pub trial_timeout: Duration,
}

impl Default for SpeedTestConfig {
    fn default() -> Self {
        Self {
            nr_trials: 5,
            nr_urls: 5,
            streams_per_url: 5,
            trial_timeout: Duration::from_secs(30),
        }
    }
}

/// Events emitted by the engine for real-time consumption.
#[derive(Debug, Clone)]
pub enum SpeedTestEvent {
    EndpointsReady {
        count: usize,
    },
    NoEndpoints,
    TrialComplete {
        index: u32,
        total: u32,
        measurement: TrialMeasurement,
    },
    Complete(SpeedTestResult),
}

pub type EventSender = mpsc::Sender<SpeedTestEvent>;
