//! Event stream ingestion.
//!
//! The sensor publishes its status as Server-Sent Events. This module turns
//! that byte stream into commits on the [`StatusStore`](crate::StatusStore):
//!
//! ```text
//! Connector ──connect()──▶ AsyncRead ──bytes──▶ LineReader
//!     ▲                                             │ lines
//!     │ backoff                                     ▼
//! Ingestor ◀──IngestError── StreamDecoder ◀──Decoded── FrameDecoder
//!                               │
//!                               └──commit()──▶ StatusStore
//! ```
//!
//! - [`line`]: buffered line reading and classification
//! - [`decoder`]: the per-frame state machine and bad-line counter
//! - [`stream`]: decoding one connection into status commits
//! - [`ingest`]: reconnect loop with a fixed backoff
//! - [`http`]: the HTTP connector used in production

pub mod decoder;
pub mod http;
pub mod ingest;
pub mod line;
pub mod stream;

pub use decoder::{BadLineCounter, Decoded, FrameDecoder, DEFAULT_BAD_LINE_CEILING};
pub use http::{HttpBody, HttpConnector};
pub use ingest::{Connector, Ingestor, DEFAULT_BACKOFF};
pub use line::{LineKind, LineReader, RawLine, DEFAULT_MAX_LINE_LEN};
pub use stream::{DecoderConfig, StreamDecoder};
