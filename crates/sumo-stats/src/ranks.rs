//! Rank progression series

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Rank strings that mean "not ranked" or "not on the banzuke".
const SENTINEL_RANKS: [&str; 4] = ["banzuke-gai", "banzukegai", "mae-zumo", "maezumo"];

/// One stored rank history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub basho_id: String,
    pub rank: String,
    pub rank_value: Option<i32>,
}

impl RankEntry {
    pub fn new(basho_id: impl Into<String>, rank: impl Into<String>, rank_value: Option<i32>) -> Self {
        Self {
            basho_id: basho_id.into(),
            rank: rank.into(),
            rank_value,
        }
    }
}

/// A plotted point; lower `rank_value` is a higher rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPoint {
    pub basho_id: String,
    pub rank: String,
    pub rank_value: Option<i32>,
}

pub fn is_sentinel_rank(rank: &str) -> bool {
    let lower = rank.to_lowercase();
    SENTINEL_RANKS.iter().any(|s| lower.contains(s))
}

/// Time series of real ranks, oldest tournament first.
pub fn rank_series(history: &[RankEntry]) -> Vec<RankPoint> {
    let mut points: Vec<RankPoint> = history
        .iter()
        .filter(|entry| !is_sentinel_rank(&entry.rank))
        .map(|entry| RankPoint {
            basho_id: entry.basho_id.clone(),
            rank: entry.rank.clone(),
            rank_value: entry.rank_value,
        })
        .collect();
    points.sort_by(|a, b| a.basho_id.cmp(&b.basho_id));
    points
}

/// Sorted union of tournaments across several series.
pub fn basho_labels<'a>(series: impl IntoIterator<Item = &'a [RankPoint]>) -> Vec<String> {
    series
        .into_iter()
        .flat_map(|points| points.iter().map(|p| p.basho_id.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Values of `series` at each label; tournaments the wrestler has no real
/// rank for are `None`.
pub fn align_series(labels: &[String], series: &[RankPoint]) -> Vec<Option<i32>> {
    let by_basho: HashMap<&str, Option<i32>> = series
        .iter()
        .map(|p| (p.basho_id.as_str(), p.rank_value))
        .collect();
    labels
        .iter()
        .map(|label| by_basho.get(label.as_str()).copied().flatten())
        .collect()
}
