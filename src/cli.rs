use clap::Parser;
use clap_complete::Shell;
use std::time::Duration;

use crate::engine::types::SpeedTestConfig;

/// Which output mode was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Simple,
    Json,
    JsonPretty,
    Csv,
}

/// Unofficial CLI for fast.com
#[derive(Parser, Debug)]
#[command(name = "fastmeter", version, about)]
pub struct Cli {
    /// Number of measurement trials
    #[arg(short = 't', long = "nr-trials", default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=999))]
    pub nr_trials: u32,

    /// Number of download URLs requested from the API
    #[arg(short = 'c', long = "nr-urls", default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=25))]
    pub nr_urls: u32,

    /// Concurrent download streams per URL
    #[arg(short = 's', long = "streams-per-url", default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=25))]
    pub streams_per_url: u32,

    /// Upper bound in seconds on any single download within a trial
    #[arg(long = "max-trial-duration", value_name = "SECONDS", default_value_t = 30)]
    pub max_trial_duration: u64,

    /// JSON output
    #[arg(long)]
    pub json: bool,

    /// Pretty JSON output
    #[arg(long = "json-pretty")]
    pub json_pretty: bool,

    /// CSV output
    #[arg(long)]
    pub csv: bool,

    /// Force IPv4 with optional source address
    #[arg(long, num_args = 0..=1, default_missing_value = "0.0.0.0", conflicts_with = "ipv6")]
    pub ipv4: Option<String>,

    /// Force IPv6 with optional source address
    #[arg(long, num_args = 0..=1, default_missing_value = "::", conflicts_with = "ipv4")]
    pub ipv6: Option<String>,

    /// Verbose engine logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Generate shell completions
    #[arg(long = "generate-completion", value_name = "SHELL")]
    pub completion: Option<Shell>,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.json_pretty {
            OutputMode::JsonPretty
        } else if self.csv {
            OutputMode::Csv
        } else {
            OutputMode::Simple
        }
    }

    pub fn to_config(&self) -> SpeedTestConfig {
        SpeedTestConfig {
            nr_trials: self.nr_trials,
            nr_urls: self.nr_urls,
            streams_per_url: self.streams_per_url,
            trial_timeout: Duration::from_secs(self.max_trial_duration),
        }
    }
}
