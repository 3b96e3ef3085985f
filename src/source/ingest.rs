//! Reconnecting ingestion loop.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tracing::{error, info, warn};

use super::stream::StreamDecoder;
use crate::data::duration::format_duration;
use crate::data::StatusStore;
use crate::error::IngestError;

/// Default wait between connection attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(60);

/// Opens new connections to the event stream.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Body of a successful connection.
    type Reader: AsyncRead + Unpin + Send + 'static;

    /// Open a new connection.
    async fn connect(&self) -> Result<Self::Reader, IngestError>;

    /// Human-readable description of the endpoint, used in logs.
    fn describe(&self) -> &str;
}

/// Keeps one event stream connected and feeds it into a [`StatusStore`].
///
/// Connection failures and ended streams are retried after a fixed backoff,
/// forever. The loop only returns when the bad-line circuit breaker trips.
#[derive(Debug)]
pub struct Ingestor<C> {
    connector: C,
    decoder: StreamDecoder,
    backoff: Duration,
    read_timeout: Option<Duration>,
}

impl<C: Connector> Ingestor<C> {
    /// Create an ingestor.
    pub fn new(connector: C, decoder: StreamDecoder) -> Self {
        Self {
            connector,
            decoder,
            backoff: DEFAULT_BACKOFF,
            read_timeout: None,
        }
    }

    /// Set the wait between connection attempts.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set how long a connection may stay silent before it is dropped.
    pub fn read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Clear the bad-line count so a tripped ingestor can run again.
    pub fn reset_bad_lines(&mut self) {
        self.decoder.reset_bad_lines();
    }

    /// Run until the circuit breaker trips, returning that error.
    pub async fn run(&mut self, store: &StatusStore) -> IngestError {
        let url = self.connector.describe().to_string();

        loop {
            match self.connector.connect().await {
                Ok(reader) => {
                    info!(url = %url, "connected to event stream");
                    let end = self.decoder.pump(reader, store, self.read_timeout).await;
                    if end.is_fatal() {
                        error!(url = %url, error = %end, "giving up on event stream");
                        return end;
                    }
                    warn!(url = %url, error = %end, "event stream ended");
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "failed to connect to event stream");
                }
            }

            info!(backoff = %format_duration(self.backoff), "waiting before reconnecting");
            tokio::time::sleep(self.backoff).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Arc;

    use parking_lot::Mutex;

    /// Hands out one scripted body per connect; `None` entries refuse the connection.
    #[derive(Clone, Default)]
    struct FakeConnector {
        bodies: Arc<Mutex<VecDeque<Option<String>>>>,
        attempts: Arc<Mutex<u32>>,
    }

    impl FakeConnector {
        fn new(bodies: Vec<Option<String>>) -> Self {
            Self {
                bodies: Arc::new(Mutex::new(bodies.into())),
                attempts: Arc::default(),
            }
        }

        fn attempts(&self) -> u32 {
            *self.attempts.lock()
        }
    }

    #[async_trait]
    impl Connector for FakeConnector {
        type Reader = Cursor<Vec<u8>>;

        async fn connect(&self) -> Result<Cursor<Vec<u8>>, IngestError> {
            *self.attempts.lock() += 1;
            match self.bodies.lock().pop_front() {
                Some(Some(body)) => Ok(Cursor::new(body.into_bytes())),
                Some(None) => Err(IngestError::Connection("refused".into())),
                // Script exhausted: keep refusing
                None => Err(IngestError::Connection("refused".into())),
            }
        }

        fn describe(&self) -> &str {
            "fake://sensor"
        }
    }

    fn free_frame() -> String {
        "event: tableStatus\ndata: {\"data\":\"free\"}\n\n".to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn reconnects_after_fixed_backoff() {
        let connector = FakeConnector::new(vec![None, None, Some(free_frame())]);
        let seen = connector.clone();
        let store = StatusStore::new();
        let reader = store.reader();

        tokio::spawn(async move {
            let mut ingestor = Ingestor::new(connector, StreamDecoder::default())
                .backoff(Duration::from_secs(60));
            ingestor.run(&store).await
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(seen.attempts(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(seen.attempts(), 2);
        assert!(!reader.read().is_confirmed());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(seen.attempts(), 3);
        assert!(reader.read().available);

        // The stream closed after its frame; the next attempt waits another backoff
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(seen.attempts(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_when_breaker_trips_across_connections() {
        let junk = "junk\n".repeat(600);
        let connector = FakeConnector::new(vec![Some(junk.clone()), Some(junk)]);
        let seen = connector.clone();
        let store = StatusStore::new();

        let mut ingestor = Ingestor::new(connector, StreamDecoder::default())
            .backoff(Duration::from_secs(60));
        let err = ingestor.run(&store).await;

        assert!(matches!(
            err,
            IngestError::TooManyBadLines {
                count: 1001,
                ceiling: 1000
            }
        ));
        assert_eq!(seen.attempts(), 2);
    }
}
