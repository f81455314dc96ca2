//! Win/loss aggregation over bouts

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One bout as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutResult {
    pub basho_id: String,
    pub day: i32,
    pub match_no: i32,
    pub east_shikona: String,
    pub east_rank: Option<String>,
    pub west_shikona: String,
    pub west_rank: Option<String>,
    pub kimarite: Option<String>,
    /// Winning shikona; `None` when no result was recorded.
    pub winner: Option<String>,
}

impl BoutResult {
    /// Minimal bout without ranks or technique.
    pub fn new(
        basho_id: impl Into<String>,
        day: i32,
        east: impl Into<String>,
        west: impl Into<String>,
        winner: Option<&str>,
    ) -> Self {
        Self {
            basho_id: basho_id.into(),
            day,
            match_no: 0,
            east_shikona: east.into(),
            east_rank: None,
            west_shikona: west.into(),
            west_rank: None,
            kimarite: None,
            winner: winner.map(str::to_string),
        }
    }

    pub fn with_ranks(mut self, east: &str, west: &str) -> Self {
        self.east_rank = Some(east.to_string());
        self.west_rank = Some(west.to_string());
        self
    }

    pub fn with_kimarite(mut self, kimarite: &str) -> Self {
        self.kimarite = Some(kimarite.to_string());
        self
    }

    fn involves(&self, name: &str) -> bool {
        self.east_shikona == name || self.west_shikona == name
    }

    fn is_pairing(&self, a: &str, b: &str) -> bool {
        (self.east_shikona == a && self.west_shikona == b)
            || (self.east_shikona == b && self.west_shikona == a)
    }

    /// Winner and loser when a result is recorded and names one side.
    fn decided(&self) -> Option<(&str, &str)> {
        let winner = self.winner.as_deref()?;
        if winner == self.east_shikona {
            Some((self.east_shikona.as_str(), self.west_shikona.as_str()))
        } else if winner == self.west_shikona {
            Some((self.west_shikona.as_str(), self.east_shikona.as_str()))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
}

impl Record {
    pub fn bouts(&self) -> u32 {
        self.wins + self.losses
    }
}

/// Wins of `a` and `b` against each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub a_wins: u32,
    pub b_wins: u32,
}

impl HeadToHead {
    pub fn swap(self) -> Self {
        Self {
            a_wins: self.b_wins,
            b_wins: self.a_wins,
        }
    }
}

/// Final record of one wrestler within a single tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub shikona: String,
    /// Rank on the first decided bout the wrestler appears in.
    pub rank: Option<String>,
    pub record: Record,
}

/// A Maegashira defeating a Yokozuna.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kinboshi {
    pub rikishi: String,
    pub defeated: String,
    pub basho_id: String,
    pub day: i32,
}

/// Career record of `name` across `bouts`.
///
/// Bouts without a result, or whose recorded winner is neither side, are
/// skipped.
pub fn win_loss(bouts: &[BoutResult], name: &str) -> Record {
    let mut record = Record::default();
    for bout in bouts.iter().filter(|b| b.involves(name)) {
        match bout.decided() {
            Some((winner, _)) if winner == name => record.wins += 1,
            Some(_) => record.losses += 1,
            None => {},
        }
    }
    record
}

/// Career record of every wrestler in `bouts`, in one pass.
///
/// Same counting as [`win_loss`] for each name.
pub fn career_records(bouts: &[BoutResult]) -> HashMap<String, Record> {
    let mut records: HashMap<String, Record> = HashMap::new();
    for bout in bouts {
        if let Some((winner, loser)) = bout.decided() {
            records.entry(winner.to_string()).or_default().wins += 1;
            records.entry(loser.to_string()).or_default().losses += 1;
        }
    }
    records
}

pub fn head_to_head(bouts: &[BoutResult], a: &str, b: &str) -> HeadToHead {
    let mut h2h = HeadToHead::default();
    for bout in bouts.iter().filter(|bout| bout.is_pairing(a, b)) {
        match bout.winner.as_deref() {
            Some(w) if w == a => h2h.a_wins += 1,
            Some(w) if w == b => h2h.b_wins += 1,
            _ => {},
        }
    }
    h2h
}

/// Cumulative record of every wrestler through `through_day` (inclusive).
///
/// `bouts` should belong to a single tournament.
pub fn running_records(bouts: &[BoutResult], through_day: i32) -> BTreeMap<String, Record> {
    let mut records: BTreeMap<String, Record> = BTreeMap::new();
    for bout in bouts.iter().filter(|b| b.day <= through_day) {
        if let Some((winner, loser)) = bout.decided() {
            records.entry(winner.to_string()).or_default().wins += 1;
            records.entry(loser.to_string()).or_default().losses += 1;
        }
    }
    records
}

/// Final standings of a tournament, most wins first.
///
/// Ties keep fewer losses first, then shikona order.
pub fn tournament_records(bouts: &[BoutResult]) -> Vec<TournamentRecord> {
    let mut by_name: HashMap<&str, TournamentRecord> = HashMap::new();
    let mut ordered: Vec<_> = bouts.iter().collect();
    ordered.sort_by_key(|b| (b.day, b.match_no));

    for bout in ordered {
        let Some((winner, loser)) = bout.decided() else {
            continue;
        };
        for (name, rank) in [
            (bout.east_shikona.as_str(), &bout.east_rank),
            (bout.west_shikona.as_str(), &bout.west_rank),
        ] {
            by_name.entry(name).or_insert_with(|| TournamentRecord {
                shikona: name.to_string(),
                rank: rank.clone(),
                record: Record::default(),
            });
        }
        if let Some(entry) = by_name.get_mut(winner) {
            entry.record.wins += 1;
        }
        if let Some(entry) = by_name.get_mut(loser) {
            entry.record.losses += 1;
        }
    }

    let mut standings: Vec<_> = by_name.into_values().collect();
    standings.sort_by(|x, y| {
        y.record
            .wins
            .cmp(&x.record.wins)
            .then(x.record.losses.cmp(&y.record.losses))
            .then_with(|| x.shikona.cmp(&y.shikona))
    });
    standings
}

pub fn kinboshi(bouts: &[BoutResult]) -> Vec<Kinboshi> {
    let rank_has = |rank: &Option<String>, needle: &str| {
        rank.as_deref().is_some_and(|r| r.contains(needle))
    };

    bouts
        .iter()
        .filter_map(|bout| {
            let (winner, loser) = bout.decided()?;
            let (winner_rank, loser_rank) = if winner == bout.east_shikona {
                (&bout.east_rank, &bout.west_rank)
            } else {
                (&bout.west_rank, &bout.east_rank)
            };
            (rank_has(winner_rank, "Maegashira") && rank_has(loser_rank, "Yokozuna")).then(|| {
                Kinboshi {
                    rikishi: winner.to_string(),
                    defeated: loser.to_string(),
                    basho_id: bout.basho_id.clone(),
                    day: bout.day,
                }
            })
        })
        .collect()
}

/// Winning techniques used by `name`, most frequent first.
pub fn kimarite_usage(bouts: &[BoutResult], name: &str) -> Vec<(String, u32)> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for bout in bouts {
        if !bout.decided().is_some_and(|(winner, _)| winner == name) {
            continue;
        }
        if let Some(kimarite) = bout.kimarite.as_deref().filter(|k| !k.is_empty()) {
            *counts.entry(kimarite).or_default() += 1;
        }
    }

    let mut usage: Vec<_> = counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect();
    usage.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    usage
}
