//! Wires ingestion, history recording and the status server together.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{error, info, warn};

use crate::config::{OnBadLines, Settings};
use crate::data::duration::format_duration;
use crate::data::{HistoryRecorder, SharedHistory, StatusStore};
use crate::error::IngestError;
use crate::server::{ServerState, StatusServer};
use crate::source::{Connector, HttpConnector, Ingestor, StreamDecoder};
use crate::ui::Theme;

/// The running monitor.
#[derive(Debug)]
pub struct App {
    settings: Settings,
    url: String,
}

impl App {
    /// Validate `settings` and resolve the stream URL.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let url = settings.resolve_url()?;
        Ok(Self { settings, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run until the server fails, ingestion gives up under the `exit`
    /// policy, or the process is interrupted.
    pub async fn run(self) -> Result<()> {
        let settings = self.settings;
        let addr = settings.listen_addr()?;

        let store = StatusStore::new();
        let history = SharedHistory::new(settings.capacity);

        let _recorder = HistoryRecorder::builder()
            .period(settings.sample_period)
            .staleness(settings.staleness)
            .build(store.reader(), history.clone())
            .start();

        let state = ServerState {
            page_refresh: settings.page_refresh,
            renderer: settings.timeline_renderer(),
            theme: Theme::default(),
            ..ServerState::new(store.reader(), history, settings.staleness)
        };
        let server = StatusServer::bind(addr, state)
            .await
            .with_context(|| format!("failed to bind status server to {}", addr))?;

        let connector = HttpConnector::new(self.url.as_str(), settings.connect_timeout)
            .context("failed to create HTTP client")?;
        let ingestor = Ingestor::new(connector, StreamDecoder::new(&settings.decoder_config()))
            .backoff(settings.backoff)
            .read_timeout(settings.read_timeout());

        info!(
            url = %self.url,
            staleness = %format_duration(settings.staleness),
            sample_period = %format_duration(settings.sample_period),
            capacity = settings.capacity,
            "starting table monitor"
        );

        let mut server = tokio::spawn(server.serve());
        let mut ingest = tokio::spawn(supervise(
            ingestor,
            store,
            settings.on_bad_lines,
            settings.backoff,
        ));

        tokio::select! {
            res = &mut server => return server_ended(res),
            res = &mut ingest => {
                res.context("ingestion task panicked")??;
                warn!("ingestion stopped; still serving the last known status");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                server.abort();
                ingest.abort();
                return Ok(());
            }
        }

        tokio::select! {
            res = &mut server => server_ended(res),
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                server.abort();
                Ok(())
            }
        }
    }
}

fn server_ended(res: Result<std::io::Result<()>, tokio::task::JoinError>) -> Result<()> {
    match res {
        Ok(Ok(())) => bail!("status server stopped"),
        Ok(Err(e)) => Err(e).context("status server failed"),
        Err(e) => Err(e).context("status server task panicked"),
    }
}

/// Run `ingestor` and apply `policy` whenever its circuit breaker trips.
///
/// Returns `Ok` when ingestion stops under [`OnBadLines::Stop`], and the
/// breaker error under [`OnBadLines::Exit`]. [`OnBadLines::Restart`] never
/// returns.
pub async fn supervise<C: Connector>(
    mut ingestor: Ingestor<C>,
    store: StatusStore,
    policy: OnBadLines,
    backoff: Duration,
) -> Result<(), IngestError> {
    loop {
        let err = ingestor.run(&store).await;
        match policy {
            OnBadLines::Exit => return Err(err),
            OnBadLines::Stop => {
                error!(error = %err, "ingestion stopped");
                return Ok(());
            }
            OnBadLines::Restart => {
                warn!(
                    error = %err,
                    backoff = %format_duration(backoff),
                    "restarting ingestion"
                );
                ingestor.reset_bad_lines();
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::source::DecoderConfig;

    /// Every connection delivers the same body, then EOF.
    #[derive(Clone, Default)]
    struct Replay {
        body: &'static [u8],
        connects: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Connector for Replay {
        type Reader = &'static [u8];

        async fn connect(&self) -> Result<Self::Reader, IngestError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(self.body)
        }

        fn describe(&self) -> &str {
            "replay://sensor"
        }
    }

    const JUNK: &[u8] = b"garbage 1\ngarbage 2\ngarbage 3\n";

    fn ingestor(connector: Replay) -> Ingestor<Replay> {
        let config = DecoderConfig {
            bad_line_ceiling: 2,
            ..DecoderConfig::default()
        };
        Ingestor::new(connector, StreamDecoder::new(&config))
            .backoff(Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn exit_policy_surfaces_breaker() {
        let connector = Replay {
            body: JUNK,
            ..Replay::default()
        };
        let err = supervise(
            ingestor(connector),
            StatusStore::new(),
            OnBadLines::Exit,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            IngestError::TooManyBadLines {
                count: 3,
                ceiling: 2
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_policy_returns_quietly() {
        let connector = Replay {
            body: JUNK,
            ..Replay::default()
        };
        let connects = connector.connects.clone();
        let result = supervise(
            ingestor(connector),
            StatusStore::new(),
            OnBadLines::Stop,
            Duration::from_secs(1),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_policy_reconnects() {
        let connector = Replay {
            body: JUNK,
            ..Replay::default()
        };
        let connects = connector.connects.clone();
        let supervised = supervise(
            ingestor(connector),
            StatusStore::new(),
            OnBadLines::Restart,
            Duration::from_secs(1),
        );

        let outcome = tokio::time::timeout(Duration::from_secs(30), supervised).await;
        assert!(outcome.is_err(), "restart policy should keep running");
        assert!(connects.load(Ordering::SeqCst) >= 3);
    }

    #[test]
    fn new_requires_url() {
        let settings = Settings {
            url: None,
            url_file: PathBuf::from("/nonexistent/url.txt"),
            ..Settings::default()
        };
        assert!(App::new(settings).is_err());
    }

    #[test]
    fn new_rejects_invalid_settings() {
        let settings = Settings {
            url: Some("http://sensor/events".to_string()),
            capacity: 0,
            ..Settings::default()
        };
        assert!(App::new(settings).is_err());
    }

    #[test]
    fn new_resolves_url() {
        let settings = Settings {
            url: Some("http://sensor/events".to_string()),
            ..Settings::default()
        };
        let app = App::new(settings).unwrap();
        assert_eq!(app.url(), "http://sensor/events");
    }
}
