//! Sumomine Ingest
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Imports wrestlers, tournaments, bouts and banzuke from the public
//! sumo-api.com JSON API into PostgreSQL.
//!
//! # Pipeline
//!
//! Every wrestler record flows through the same stages, sequentially:
//!
//! 1. [`source`] fetches it (throttled, one request at a time)
//! 2. [`resolve`] finds the local row by external id, then by name and debut
//! 3. [`writer`] inserts or updates the wrestler row
//! 4. [`history`] replaces rank, measurement and name history wholesale
//!
//! Steps 2-4 share one transaction per wrestler. Per-record failures are
//! logged and counted; a batch job always runs to the end and reports
//! `{imported, updated, skipped, errored}`.
//!
//! Statistics over the stored ledger live in `sumo-stats`; [`queries`]
//! loads their inputs.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod images;
pub mod matches;
pub mod pipeline;
pub mod queries;
pub mod resolve;
pub mod source;
pub mod writer;

pub use cli::Cli;
pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use resolve::Resolution;
pub use writer::{ImportStats, WriteOutcome};
