//! External source adapter
//!
//! - `client`: HTTP access with not-found probing
//! - `models`: API payloads
//! - `throttle`: minimum inter-request delay

pub mod client;
pub mod models;
pub mod throttle;

pub use client::{SumoApiClient, RIKISHI_PAGE_SIZE};
pub use models::{
    BanzukeRecord, BanzukeSheet, BoutRecord, MeasurementRecord, RankHistoryRecord, RikishiPage,
    RikishiRecord, ShikonaRecord, TorikumiDay, YushoRecord,
};
pub use throttle::RequestThrottle;
