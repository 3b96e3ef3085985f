//! Table status state and its history.
//!
//! This module owns everything that is shared between the ingestion task,
//! the sampling task and the HTTP server.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "60s", "3m")
//! - [`history`]: Fixed-capacity FIFO buffer of classified samples
//! - [`recorder`]: Periodic sampler that feeds the history
//! - [`status`]: Single-writer status store ([`StatusStore`], [`StatusReader`])
//!
//! ## Data Flow
//!
//! ```text
//! StreamDecoder ──commit()──▶ StatusStore
//!                                  │ read()
//!                 ┌────────────────┼──────────────────┐
//!                 ▼                ▼                  ▼
//!         HistoryRecorder     StatusView        /status.json
//!                 │ push()
//!                 ▼
//!           SharedHistory ──with()──▶ TimelineRenderer
//! ```

pub mod duration;
pub mod history;
pub mod recorder;
pub mod status;

pub use history::{HistoryBuffer, SharedHistory};
pub use recorder::{
    HistoryRecorder, HistoryRecorderBuilder, RecorderHandle, MAX_SAMPLE_PERIOD,
};
pub use status::{StatusReader, StatusStore};
