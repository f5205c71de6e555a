use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::net::IpAddr;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use fastmeter::cli::{Cli, OutputMode};
use fastmeter::engine::client::build_client;
use fastmeter::engine::runner::run_speed_test;
use fastmeter::engine::types::SpeedTestEvent;
use fastmeter::output;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(cli.verbose);

    let local_addr = parse_local_addr(&cli)?;
    let client = build_client(local_addr)?;
    let config = cli.to_config();
    let mode = cli.output_mode();

    let (tx, mut rx) = mpsc::channel(32);
    let engine = tokio::spawn({
        let client = client.clone();
        let config = config.clone();
        async move { run_speed_test(&client, &config, tx).await }
    });

    while let Some(event) = rx.recv().await {
        match event {
            SpeedTestEvent::NoEndpoints => {
                eprintln!("The API returned no download endpoints; nothing to measure.");
            }
            SpeedTestEvent::EndpointsReady { count } if mode == OutputMode::Simple => {
                println!("Measuring against {count} endpoints");
            }
            SpeedTestEvent::TrialComplete { measurement, .. } if mode == OutputMode::Simple => {
                output::simple::print_trial(&measurement);
            }
            _ => {}
        }
    }

    let result = engine
        .await?
        .context("speed test aborted during endpoint discovery")?;

    if result.trials.is_empty() {
        return Ok(());
    }
    match mode {
        OutputMode::Simple => output::simple::print_summary(&result),
        OutputMode::Json => output::json::print_json(&result),
        OutputMode::JsonPretty => output::json::print_json_pretty(&result),
        OutputMode::Csv => output::csv::print_csv(&result),
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "fastmeter=debug" } else { "fastmeter=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn parse_local_addr(cli: &Cli) -> anyhow::Result<Option<IpAddr>> {
    let raw = cli.ipv4.as_deref().or(cli.ipv6.as_deref());
    raw.map(|addr| {
        addr.parse::<IpAddr>()
            .with_context(|| format!("invalid source address '{addr}'"))
    })
    .transpose()
}
