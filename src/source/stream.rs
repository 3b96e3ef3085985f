//! Byte-stream ingestion into the status store.
//!
//! [`StreamDecoder`] turns the lines of one connection into committed status
//! updates. It reads any [`AsyncRead`]: an HTTP response body in production,
//! or an in-memory reader in tests.

use std::time::Duration;

use tablewatch_types::{current_timestamp_ms, Sentinel, DEFAULT_EVENT_NAME};
use tokio::io::AsyncRead;
use tracing::info;

use super::decoder::{Decoded, FrameDecoder, DEFAULT_BAD_LINE_CEILING};
use super::line::{LineReader, RawLine, DEFAULT_MAX_LINE_LEN};
use crate::data::StatusStore;
use crate::error::IngestError;

/// Settings for decoding frames into availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Name of the event that carries table status.
    pub event_name: String,
    /// Rule mapping the payload to availability.
    pub sentinel: Sentinel,
    /// Consecutive unrecognized lines tolerated before giving up.
    pub bad_line_ceiling: u32,
    /// Longest line accepted; longer lines count as unrecognized.
    pub max_line_len: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            event_name: DEFAULT_EVENT_NAME.to_string(),
            sentinel: Sentinel::default(),
            bad_line_ceiling: DEFAULT_BAD_LINE_CEILING,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// Decodes the event stream and commits every good frame to a [`StatusStore`].
///
/// The decoder outlives individual connections so the bad-line count
/// carries across reconnects.
///
/// # Example
///
/// ```
/// use tablewatch::{StatusStore, StreamDecoder};
///
/// # tokio_test::block_on(async {
/// let body: &[u8] = b"event: tableStatus\ndata: {\"data\":\"free\"}\n\n";
/// let store = StatusStore::new();
/// let mut decoder = StreamDecoder::default();
///
/// let end = decoder.pump(body, &store, None).await;
/// assert!(!end.is_fatal());
/// assert!(store.read().available);
/// # });
/// ```
#[derive(Debug)]
pub struct StreamDecoder {
    frames: FrameDecoder,
    sentinel: Sentinel,
    max_line_len: usize,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}

impl StreamDecoder {
    /// Create a decoder from its settings.
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            frames: FrameDecoder::new(config.event_name.clone(), config.bad_line_ceiling),
            sentinel: config.sentinel.clone(),
            max_line_len: config.max_line_len,
        }
    }

    /// Prepare for a fresh connection: drop any partial frame.
    pub fn start_connection(&mut self) {
        self.frames.reset_frame();
    }

    /// Consecutive unrecognized lines so far.
    pub fn bad_lines(&self) -> u32 {
        self.frames.bad_lines()
    }

    /// Reset the bad-line count, e.g. when a supervisor restarts ingestion.
    pub fn reset_bad_lines(&mut self) {
        self.frames.reset_bad_lines();
    }

    /// Feed one complete line. Returns true if it completed a frame that was
    /// committed to `store`.
    pub fn push_line(&mut self, line: &str, store: &StatusStore) -> Result<bool, IngestError> {
        match self.frames.decode_line(line) {
            Decoded::Event(event) => {
                let available = self.sentinel.is_available(&event.data);
                let snapshot = store.commit(available, current_timestamp_ms());
                info!(
                    available = snapshot.available,
                    last_updated_ms = snapshot.last_updated_ms,
                    data = %event.data,
                    source = %event.source_id,
                    "table status updated"
                );
                Ok(true)
            }
            Decoded::CircuitOpen { count, ceiling } => {
                Err(IngestError::TooManyBadLines { count, ceiling })
            }
            Decoded::Malformed { .. } | Decoded::Nothing => Ok(false),
        }
    }

    /// Count a line dropped for exceeding the length limit.
    pub fn push_overlong(&mut self, len: usize) -> Result<(), IngestError> {
        match self.frames.reject_line(len) {
            Decoded::CircuitOpen { count, ceiling } => {
                Err(IngestError::TooManyBadLines { count, ceiling })
            }
            _ => Ok(()),
        }
    }

    /// Read one connection until it ends and return why it ended.
    ///
    /// The result is always an error: [`IngestError::Closed`] on a clean
    /// close, a read or timeout error on failure, or
    /// [`IngestError::TooManyBadLines`] when the circuit breaker trips.
    /// `read_timeout` bounds the wait for each complete line.
    pub async fn pump<R>(
        &mut self,
        reader: R,
        store: &StatusStore,
        read_timeout: Option<Duration>,
    ) -> IngestError
    where
        R: AsyncRead + Unpin,
    {
        self.start_connection();
        let mut lines = LineReader::with_max_len(reader, self.max_line_len);

        loop {
            let next = match read_timeout {
                Some(limit) => match tokio::time::timeout(limit, lines.next_line()).await {
                    Ok(next) => next,
                    Err(_) => return IngestError::Timeout(limit),
                },
                None => lines.next_line().await,
            };

            let pushed = match next {
                Ok(RawLine::Line(line)) => self.push_line(&line, store).map(|_| ()),
                Ok(RawLine::TooLong { len }) => self.push_overlong(len),
                Ok(RawLine::Eof) => return IngestError::Closed,
                Err(e) => return e.into(),
            };

            if let Err(e) = pushed {
                return e;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablewatch_types::SentinelMode;
    use tokio_test::io::Builder;

    fn frame(event: &str, data: &str) -> String {
        format!("event: {}\ndata: {}\n\n", event, data)
    }

    async fn run(body: &str, store: &StatusStore) -> (StreamDecoder, IngestError) {
        let mut decoder = StreamDecoder::default();
        let end = decoder.pump(body.as_bytes(), store, None).await;
        (decoder, end)
    }

    #[tokio::test]
    async fn free_means_available() {
        let store = StatusStore::new();
        let (_, end) = run(&frame("tableStatus", r#"{"data":"free"}"#), &store).await;

        assert!(matches!(end, IngestError::Closed));
        assert!(store.read().available);
        assert!(store.read().is_confirmed());
    }

    #[tokio::test]
    async fn busy_means_not_available() {
        let store = StatusStore::new();
        store.commit(true, 1);
        run(&frame("tableStatus", r#"{"data":"busy"}"#), &store).await;

        assert!(!store.read().available);
        assert!(store.read().last_updated_ms > 1);
    }

    #[tokio::test]
    async fn unrelated_event_leaves_store_unchanged() {
        let store = StatusStore::new();
        run(&frame("somethingElse", r#"{"data":"free"}"#), &store).await;
        assert_eq!(store.read(), Default::default());
    }

    #[tokio::test]
    async fn last_good_frame_wins() {
        let store = StatusStore::new();
        let body = [
            frame("tableStatus", r#"{"data":"free"}"#),
            frame("tableStatus", r#"{"data":"busy"}"#),
            frame("tableStatus", r#"{"data":"free"}"#),
            frame("tableStatus", "{broken"),
            frame("other", r#"{"data":"busy"}"#),
        ]
        .concat();

        run(&body, &store).await;
        assert!(store.read().available);
    }

    #[tokio::test]
    async fn malformed_frame_does_not_commit() {
        let store = StatusStore::new();
        store.commit(false, 42);
        run(&frame("tableStatus", r#"{"nodata":true}"#), &store).await;
        assert_eq!(store.read().last_updated_ms, 42);
    }

    #[tokio::test]
    async fn frames_split_at_every_byte() {
        let body = format!(
            ":ok\r\n{}{}",
            frame("tableStatus", r#"{"data":"busy"}"#),
            frame("tableStatus", r#"{"data":"free","ttl":60}"#)
        );

        let mut builder = Builder::new();
        for byte in body.as_bytes() {
            builder.read(std::slice::from_ref(byte));
        }

        let store = StatusStore::new();
        let mut decoder = StreamDecoder::default();
        let end = decoder.pump(builder.build(), &store, None).await;

        assert!(matches!(end, IngestError::Closed));
        assert!(store.read().available);
    }

    #[tokio::test]
    async fn push_line_reports_commits() {
        let store = StatusStore::new();
        let mut decoder = StreamDecoder::default();

        assert!(!decoder.push_line("event: tableStatus", &store).unwrap());
        assert!(!decoder.push_line(r#"data: {"data":"busy"}"#, &store).unwrap());
        assert!(decoder.push_line("", &store).unwrap());
        assert!(!store.read().available);
    }

    #[tokio::test]
    async fn sentinel_is_configurable() {
        let config = DecoderConfig {
            sentinel: Sentinel::new("busy", SentinelMode::BusyIfEqual),
            ..DecoderConfig::default()
        };
        let store = StatusStore::new();
        let mut decoder = StreamDecoder::new(&config);

        let body = frame("tableStatus", r#"{"data":"idle"}"#);
        decoder.pump(body.as_bytes(), &store, None).await;
        assert!(store.read().available);

        let body = frame("tableStatus", r#"{"data":"busy"}"#);
        decoder.pump(body.as_bytes(), &store, None).await;
        assert!(!store.read().available);
    }

    #[tokio::test]
    async fn breaker_trips_on_line_1001() {
        let store = StatusStore::new();
        let body = "garbage\n".repeat(1000);

        let (mut decoder, end) = run(&body, &store).await;
        assert!(matches!(end, IngestError::Closed));
        assert_eq!(decoder.bad_lines(), 1000);

        let err = decoder.push_line("garbage", &store).unwrap_err();
        assert!(matches!(
            err,
            IngestError::TooManyBadLines {
                count: 1001,
                ceiling: 1000
            }
        ));
    }

    #[tokio::test]
    async fn breaker_ends_the_connection() {
        let store = StatusStore::new();
        let body = format!(
            "{}{}",
            "garbage\n".repeat(1001),
            frame("tableStatus", r#"{"data":"free"}"#)
        );

        let (_, end) = run(&body, &store).await;
        assert!(end.is_fatal());
        // The frame after the trip is never decoded
        assert!(!store.read().is_confirmed());
    }

    #[tokio::test]
    async fn overlong_lines_count_as_bad() {
        let config = DecoderConfig {
            bad_line_ceiling: 2,
            max_line_len: 32,
            ..DecoderConfig::default()
        };
        let store = StatusStore::new();
        let mut decoder = StreamDecoder::new(&config);

        // An oversized data line spoils its frame
        let body = format!(
            "event: tableStatus\ndata: {}\n\n{}",
            "x".repeat(64),
            frame("tableStatus", r#"{"data":"free"}"#)
        );
        let end = decoder.pump(body.as_bytes(), &store, None).await;
        assert!(matches!(end, IngestError::Closed));
        assert!(store.read().available);
        assert_eq!(decoder.bad_lines(), 0);

        let body = format!("{0}\n{0}\n{0}\n", "y".repeat(100));
        let end = decoder.pump(body.as_bytes(), &store, None).await;
        assert!(matches!(
            end,
            IngestError::TooManyBadLines {
                count: 3,
                ceiling: 2
            }
        ));
    }

    #[tokio::test]
    async fn bad_lines_survive_reconnects() {
        let store = StatusStore::new();
        let mut decoder = StreamDecoder::default();
        let junk = "junk\n".repeat(500);

        for _ in 0..2 {
            let end = decoder.pump(junk.as_bytes(), &store, None).await;
            assert!(matches!(end, IngestError::Closed));
        }
        assert_eq!(decoder.bad_lines(), 1000);

        let end = decoder.pump(&b"junk\n"[..], &store, None).await;
        assert!(end.is_fatal());

        decoder.reset_bad_lines();
        assert_eq!(decoder.bad_lines(), 0);
    }

    #[tokio::test]
    async fn partial_frame_is_dropped_on_reconnect() {
        let store = StatusStore::new();
        let mut decoder = StreamDecoder::default();

        let body: &[u8] = b"event: tableStatus\ndata: {\"data\":\"free\"}\n";
        decoder.pump(body, &store, None).await;

        // The terminator arrives on a new connection and must not complete the old frame
        decoder.pump(&b"\n"[..], &store, None).await;
        assert!(!store.read().is_confirmed());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_stream_times_out() {
        let store = StatusStore::new();
        let mut decoder = StreamDecoder::default();
        let (_client, server) = tokio::io::duplex(64);

        let end = decoder
            .pump(server, &store, Some(Duration::from_secs(30)))
            .await;
        assert!(matches!(end, IngestError::Timeout(d) if d == Duration::from_secs(30)));
    }

    #[tokio::test(start_paused = true)]
    async fn keepalives_reset_the_timeout() {
        let mock = Builder::new()
            .wait(Duration::from_secs(20))
            .read(b":ok\n")
            .wait(Duration::from_secs(20))
            .read(b"event: tableStatus\ndata: {\"data\":\"free\"}\n\n")
            .build();

        let store = StatusStore::new();
        let mut decoder = StreamDecoder::default();
        let end = decoder
            .pump(mock, &store, Some(Duration::from_secs(30)))
            .await;

        assert!(matches!(end, IngestError::Closed));
        assert!(store.read().available);
    }

    #[tokio::test]
    async fn read_errors_end_the_connection() {
        let mock = Builder::new()
            .read(b"event: tableStatus\n")
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))
            .build();

        let store = StatusStore::new();
        let mut decoder = StreamDecoder::default();
        let end = decoder.pump(mock, &store, None).await;

        assert!(matches!(end, IngestError::Read(_)));
        assert!(!end.is_fatal());
    }
}
