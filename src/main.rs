//! `forecast-arima`: read a forecast request on stdin, write the result to stdout.

use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use arima_forecast::engine::{self, Engine, ForecastConfig, ForecastResponse};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "forecast-arima")]
#[command(about = "Automatic seasonal ARIMA forecast over stdin/stdout JSON", long_about = None)]
struct Cli {
    /// Wall-clock budget for the model search, in milliseconds
    #[arg(long, value_name = "MS")]
    search_budget_ms: Option<u64>,

    /// Try every model order instead of a stepwise search
    #[arg(long)]
    exhaustive: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Skip the startup engine self-check
    #[arg(long)]
    skip_preflight: bool,
}

impl Cli {
    fn config(&self) -> ForecastConfig {
        let mut config = ForecastConfig::default();
        if let Some(ms) = self.search_budget_ms {
            config = config.with_search_budget(Duration::from_millis(ms));
        }
        if self.exhaustive {
            config = config.exhaustive();
        }
        config
    }
}

fn write_json(
    out: &mut impl Write,
    value: &impl serde::Serialize,
    pretty: bool,
) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("serializing response")?;

    writeln!(out, "{text}").context("writing response")?;
    out.flush().context("flushing output")
}

/// Serve one request from `input` to `out`.
///
/// `preflight` is the engine self-check; when it fails only the unavailable
/// notice is written and the exit code is a failure.
fn run(
    cli: &Cli,
    preflight: fn() -> arima_forecast::Result<()>,
    mut input: impl Read,
    out: &mut impl Write,
) -> anyhow::Result<ExitCode> {
    if !cli.skip_preflight {
        if let Err(err) = preflight() {
            error!(error = %err, "engine self-check failed");
            write_json(out, &engine::unavailable_notice(), cli.pretty)?;
            return Ok(ExitCode::FAILURE);
        }
    }

    let engine = Engine::new(cli.config());
    let mut text = String::new();
    let response = match input
        .read_to_string(&mut text)
        .context("reading request from stdin")
    {
        Ok(_) => engine.handle_json(&text),
        Err(err) => ForecastResponse::error_fallback(
            format!("{err:#}"),
            engine.config().default_horizon,
        ),
    };
    info!(model_info = %response.model_info.lines().next().unwrap_or_default(), "done");

    write_json(out, &response, cli.pretty)?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arima_forecast=warn,forecast_arima=warn".into()),
        )
        .init();

    let mut stdout = io::stdout().lock();
    match run(&cli, engine::preflight, io::stdin().lock(), &mut stdout) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
