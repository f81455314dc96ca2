//! Common types used across sumomine

use crate::error::{Result, SumoError};
use serde::{Deserialize, Serialize};

/// Months in which the six regular tournaments are held.
pub const REGULAR_BASHO_MONTHS: [u32; 6] = [1, 3, 5, 7, 9, 11];

/// Tournament period identifier (`YYYYMM`).
///
/// Ordering follows the string form, which is chronological because the
/// code is fixed-width.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BashoId(String);

impl BashoId {
    /// Build a period code from a year and month.
    pub fn new(year: u32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
            return Err(SumoError::InvalidBashoId(format!("{year}{month:02}")));
        }
        Ok(Self(format!("{year:04}{month:02}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> u32 {
        self.0[..4].parse().unwrap_or_default()
    }

    pub fn month(&self) -> u32 {
        self.0[4..].parse().unwrap_or_default()
    }

    /// Regular tournament periods from `from_year` through `to_year`,
    /// stopping at `latest` (inclusive).
    ///
    /// # Example
    ///
    /// ```
    /// use sumo_common::types::BashoId;
    ///
    /// let latest: BashoId = "202403".parse().unwrap();
    /// let schedule = BashoId::schedule(2023, 2024, &latest);
    /// assert_eq!(schedule.len(), 8);
    /// assert_eq!(schedule.last(), Some(&latest));
    /// ```
    pub fn schedule(from_year: u32, to_year: u32, latest: &BashoId) -> Vec<BashoId> {
        let mut periods = Vec::new();
        for year in from_year..=to_year {
            for month in REGULAR_BASHO_MONTHS {
                match BashoId::new(year, month) {
                    Ok(id) if &id <= latest => periods.push(id),
                    _ => {},
                }
            }
        }
        periods
    }
}

impl std::str::FromStr for BashoId {
    type Err = SumoError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SumoError::InvalidBashoId(s.to_string()));
        }
        let year: u32 = s[..4]
            .parse()
            .map_err(|_| SumoError::InvalidBashoId(s.to_string()))?;
        let month: u32 = s[4..]
            .parse()
            .map_err(|_| SumoError::InvalidBashoId(s.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for BashoId {
    type Error = SumoError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<BashoId> for String {
    fn from(value: BashoId) -> Self {
        value.0
    }
}

impl std::fmt::Display for BashoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Competitive tier, top division first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Division {
    Makuuchi,
    Juryo,
    Makushita,
    Sandanme,
    Jonidan,
    Jonokuchi,
}

impl Division {
    /// Every division in banzuke order.
    pub const ALL: [Division; 6] = [
        Division::Makuuchi,
        Division::Juryo,
        Division::Makushita,
        Division::Sandanme,
        Division::Jonidan,
        Division::Jonokuchi,
    ];

    /// Name as used in source API paths and stored rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Division::Makuuchi => "Makuuchi",
            Division::Juryo => "Juryo",
            Division::Makushita => "Makushita",
            Division::Sandanme => "Sandanme",
            Division::Jonidan => "Jonidan",
            Division::Jonokuchi => "Jonokuchi",
        }
    }
}

impl std::str::FromStr for Division {
    type Err = SumoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "makuuchi" => Ok(Division::Makuuchi),
            "juryo" => Ok(Division::Juryo),
            "makushita" => Ok(Division::Makushita),
            "sandanme" => Ok(Division::Sandanme),
            "jonidan" => Ok(Division::Jonidan),
            "jonokuchi" => Ok(Division::Jonokuchi),
            _ => Err(SumoError::InvalidDivision(s.to_string())),
        }
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of the banzuke a wrestler is listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    East,
    West,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::East => "East",
            Side::West => "West",
        }
    }
}

impl std::str::FromStr for Side {
    type Err = SumoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "east" => Ok(Side::East),
            "west" => Ok(Side::West),
            _ => Err(SumoError::InvalidSide(s.to_string())),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
