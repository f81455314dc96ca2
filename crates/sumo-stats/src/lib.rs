//! Sumomine Statistics
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Pure aggregation over an already-imported bout ledger and rank history.
//! Nothing here touches the database; loaders in `sumo-ingest` build the
//! input slices.
//!
//! # Counting rules
//!
//! - A bout with no recorded winner counts for neither side.
//! - A loss is a participation where a winner is recorded and it is someone
//!   else.
//! - Head-to-head ignores east/west assignment.
//!
//! # Example
//!
//! ```
//! use sumo_stats::{head_to_head, BoutResult};
//!
//! let bouts = vec![
//!     BoutResult::new("202301", 1, "Terunofuji", "Kiribayama", Some("Terunofuji")),
//!     BoutResult::new("202303", 4, "Kiribayama", "Terunofuji", Some("Kiribayama")),
//!     BoutResult::new("202305", 2, "Kiribayama", "Terunofuji", None),
//! ];
//! let h2h = head_to_head(&bouts, "Terunofuji", "Kiribayama");
//! assert_eq!((h2h.a_wins, h2h.b_wins), (1, 1));
//! ```

pub mod bouts;
pub mod ranks;

pub use bouts::{
    career_records, head_to_head, kimarite_usage, kinboshi, running_records, tournament_records,
    win_loss, BoutResult, HeadToHead, Kinboshi, Record, TournamentRecord,
};
pub use ranks::{align_series, basho_labels, is_sentinel_rank, rank_series, RankEntry, RankPoint};
