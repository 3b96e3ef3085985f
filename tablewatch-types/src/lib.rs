//! # tablewatch-types
//!
//! Core types for table availability monitoring. This crate defines the data
//! that flows between the stream decoder, the status store, the history
//! recorder and the renderers of `tablewatch`.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for JSON payloads and status output
//! - **Pure classification**: Staleness and sentinel rules are plain functions of their inputs
//!
//! ## Features
//!
//! - `std` (default): Standard library support (wall-clock timestamps)
//! - `serde`: JSON serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use tablewatch_types::{HistorySample, Sentinel, StatusSnapshot};
//!
//! let sentinel = Sentinel::default();
//! let snapshot = StatusSnapshot::new(sentinel.is_available("free"), 1_000);
//!
//! // Confirmed 30 seconds ago with a three minute threshold
//! let sample = snapshot.classify(31_000, Duration::from_secs(180));
//! assert_eq!(sample, HistorySample::Available);
//!
//! // Confirmed ten minutes ago
//! let sample = snapshot.classify(601_000, Duration::from_secs(180));
//! assert_eq!(sample, HistorySample::Unknown);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod event;
mod sample;
mod sentinel;
mod status;

pub use event::*;
pub use sample::*;
pub use sentinel::*;
pub use status::*;

/// Event name that carries table status frames on the sensor stream.
pub const DEFAULT_EVENT_NAME: &str = "tableStatus";
