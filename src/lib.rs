//! # tablewatch
//!
//! Watches a table occupancy sensor that pushes its state as Server-Sent
//! Events, keeps the latest status and a sliding window of samples, and
//! serves both as a web page, an SVG timeline and JSON.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Application                        │
//! │  ┌─────────┐ commit ┌──────────┐ sample ┌──────────────┐    │
//! │  │ source  │───────▶│   data   │───────▶│ SharedHistory│    │
//! │  │ (SSE)   │        │ (status) │        └──────┬───────┘    │
//! │  └─────────┘        └────┬─────┘               │            │
//! │                          │ read                │ render     │
//! │                          ▼                     ▼            │
//! │                     ┌─────────┐          ┌──────────┐       │
//! │                     │ server  │◀─────────│    ui    │       │
//! │                     │ (hyper) │          │(html/svg)│       │
//! │                     └─────────┘          └──────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: SSE line reading, frame decoding, bad-line circuit
//!   breaker and the reconnecting [`Ingestor`]
//! - **[`data`]**: the single-writer [`StatusStore`], the bounded
//!   [`HistoryBuffer`] and the periodic [`HistoryRecorder`]
//! - **[`ui`]**: status page, JSON report and SVG timeline rendering
//! - **[`server`]**: the HTTP endpoints
//! - **[`config`]**: [`Settings`] from file, environment and defaults
//! - **[`app`]**: wires the above together and applies the bad-line policy
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Stream URL read from ./url.txt, served on port 8888
//! tablewatch
//!
//! # Explicit URL and port, debug logging
//! tablewatch --url https://sensor.example/v1/events -p 8080 -v
//! ```
//!
//! ### As a library
//!
//! ```
//! use tablewatch::{HistoryBuffer, HistorySample};
//! use tablewatch::{StatusStore, StreamDecoder, TimelineRenderer};
//!
//! # tokio_test::block_on(async {
//! let store = StatusStore::new();
//! let mut decoder = StreamDecoder::default();
//!
//! let body: &[u8] = b"event: tableStatus\ndata: {\"data\":\"free\"}\n\n";
//! let end = decoder.pump(body, &store, None).await;
//! assert!(!end.is_fatal());
//! assert!(store.read().available);
//!
//! let mut history = HistoryBuffer::new(60);
//! history.push(HistorySample::Available);
//! let svg = TimelineRenderer::default().render(&history);
//! assert!(svg.contains("fill:green"));
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod server;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{OnBadLines, Settings};
pub use data::{HistoryBuffer, HistoryRecorder, SharedHistory, StatusReader, StatusStore};
pub use error::{ConfigError, IngestError};
pub use server::{ServerState, StatusServer};
pub use source::{Connector, HttpConnector, Ingestor, StreamDecoder};
pub use tablewatch_types::{
    AvailabilityEvent, HistorySample, Sentinel, SentinelMode, StatusSnapshot,
};
pub use ui::{StatusView, Theme, TimelineRenderer};
