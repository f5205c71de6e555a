use crate::engine::types::{SpeedTestResult, TrialMeasurement};

/// Print one trial's figure as it lands, matching the classic
/// `Speed: X.XX Mbps` line.
pub fn print_trial(measurement: &TrialMeasurement) {
    println!("Speed: {:.2} Mbps", measurement.mbps);
}

pub fn print_summary(result: &SpeedTestResult) {
    println!("Average: {:.2} Mbps", result.mean_mbps);
}
