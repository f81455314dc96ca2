//! Sumomine Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the sumomine workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`SumoError`] and the [`Result`] alias
//! - **Types**: tournament period codes ([`types::BashoId`]), divisions,
//!   banzuke sides
//! - **Logging**: tracing subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use sumo_common::types::{BashoId, Division};
//!
//! fn main() -> sumo_common::Result<()> {
//!     let basho: BashoId = "202301".parse()?;
//!     let division: Division = "makuuchi".parse()?;
//!     println!("{} {}", basho, division);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SumoError};
