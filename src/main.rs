use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::debug;

use tablewatch::config::{OnBadLines, Settings};
use tablewatch::data::duration::parse_duration;
use tablewatch::logging::init_logging;
use tablewatch::App;

#[derive(Parser, Debug)]
#[command(name = "tablewatch", version)]
#[command(about = "Watch a table occupancy sensor and serve its status and history")]
struct Args {
    /// Port to serve the status page on
    #[arg(short, long)]
    port: Option<u16>,

    /// Full listen address (host:port); --port still replaces the port
    #[arg(long)]
    listen: Option<String>,

    /// Event stream URL (takes priority over --url-file)
    #[arg(long)]
    url: Option<String>,

    /// File containing the event stream URL [default: url.txt]
    #[arg(short = 'f', long)]
    url_file: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Age after which the last status counts as unknown (e.g. "3m", "90s")
    #[arg(long, value_parser = parse_duration)]
    staleness: Option<Duration>,

    /// Interval between history samples (e.g. "60s")
    #[arg(long, value_parser = parse_duration)]
    sample_period: Option<Duration>,

    /// Wait between reconnect attempts (e.g. "60s")
    #[arg(long, value_parser = parse_duration)]
    backoff: Option<Duration>,

    /// Number of history samples to keep
    #[arg(long)]
    capacity: Option<usize>,

    /// Reaction to too many unrecognized lines: exit, stop or restart
    #[arg(long)]
    on_bad_lines: Option<OnBadLines>,
}

impl Args {
    /// Load file and environment settings, then apply command-line flags.
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())
            .context("failed to load configuration")?;
        self.apply(&mut settings)?;
        Ok(settings)
    }

    fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(listen) = &self.listen {
            settings.listen = listen.clone();
        }
        if let Some(port) = self.port {
            settings.set_port(port)?;
        }
        if let Some(url) = &self.url {
            settings.url = Some(url.clone());
        }
        if let Some(path) = &self.url_file {
            settings.url_file = path.clone();
        }
        if let Some(staleness) = self.staleness {
            settings.staleness = staleness;
        }
        if let Some(period) = self.sample_period {
            settings.sample_period = period;
        }
        if let Some(backoff) = self.backoff {
            settings.backoff = backoff;
        }
        if let Some(capacity) = self.capacity {
            settings.capacity = capacity;
        }
        if let Some(policy) = self.on_bad_lines {
            settings.on_bad_lines = policy;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let settings = args.settings()?;
    debug!(?settings, "resolved settings");

    let app = App::new(settings)?;
    app.run().await
}
