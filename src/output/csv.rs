use crate::engine::types::SpeedTestResult;

pub fn print_csv(result: &SpeedTestResult) {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());

    wtr.write_record(["trial", "bytes", "seconds", "mbps"])
        .unwrap();

    for (i, trial) in result.trials.iter().enumerate() {
        wtr.write_record([
            &(i + 1).to_string(),
            &trial.total_bytes.to_string(),
            &format!("{:.3}", trial.elapsed_secs),
            &format!("{:.2}", trial.mbps),
        ])
        .unwrap();
    }

    wtr.write_record(["mean", "", "", &format!("{:.2}", result.mean_mbps)])
        .unwrap();

    wtr.flush().unwrap();
}
