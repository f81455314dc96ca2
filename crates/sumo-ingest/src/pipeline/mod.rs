//! Batch import jobs
//!
//! Every job runs sequentially against the throttled source client, logs
//! per-record failures, and returns its [`ImportStats`](crate::writer::ImportStats)
//! instead of aborting.
//!
//! - `rikishi`: full catalog crawl with identity resolution and history
//! - `basho`: tournament headers and top-division yusho
//! - `bouts`: daily schedules and results
//! - `banzuke`: ranking sheets for stored tournaments
//! - `measurements`: height/weight refresh
//! - `records`: win/loss counters from the bout ledger

pub mod banzuke;
pub mod basho;
pub mod bouts;
pub mod measurements;
pub mod records;
pub mod rikishi;

pub use records::recompute_win_loss;
pub use rikishi::{CrawlBudget, RikishiCrawler, RikishiImporter};
