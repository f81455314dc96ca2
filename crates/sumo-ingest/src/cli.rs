//! Command-line surface of the `sumo-ingest` binary

use crate::matches::MatchResult;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use sumo_common::types::{BashoId, Division};

/// Sumomine importer - load sumo-api.com data into PostgreSQL and query it
#[derive(Parser, Debug)]
#[command(name = "sumo-ingest")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the full wrestler catalog with rank, measurement and name history
    Rikishi,

    /// Import tournament headers and top-division champions
    Basho {
        /// First year to import
        #[arg(long)]
        from_year: Option<u32>,

        /// Last year to import
        #[arg(long)]
        to_year: Option<u32>,
    },

    /// Import daily bout results
    Bouts {
        /// First year to import
        #[arg(long)]
        from_year: Option<u32>,

        /// Last year to import
        #[arg(long)]
        to_year: Option<u32>,

        /// Divisions to import (comma separated)
        #[arg(long, value_delimiter = ',')]
        divisions: Vec<Division>,
    },

    /// Import ranking sheets for every stored tournament
    Banzuke,

    /// Refresh height and weight of known wrestlers
    Measurements,

    /// Recompute win/loss counters from the bout ledger
    Records,

    /// Link image files to wrestlers by filename
    MatchImages {
        /// Directory containing jpg/jpeg/png/gif/webp files
        #[arg(required_unless_present = "manual")]
        dir: Option<PathBuf>,

        /// Show matches without updating the database
        #[arg(long, conflicts_with = "manual")]
        dry_run: bool,

        /// Minimum confidence to accept a match (0-1)
        #[arg(long, default_value_t = crate::images::DEFAULT_MIN_CONFIDENCE)]
        min_confidence: f64,

        /// Link one file to a wrestler id instead of scanning
        #[arg(long, num_args = 2, value_names = ["FILE", "RIKISHI_ID"], conflicts_with = "dir")]
        manual: Option<Vec<String>>,
    },

    /// Query statistics over imported bouts (JSON output)
    Stats {
        #[command(subcommand)]
        command: StatsCommand,
    },

    /// Manual match log
    Matches {
        #[command(subcommand)]
        command: MatchCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// Wins of two wrestlers against each other
    HeadToHead {
        a: String,
        b: String,
    },

    /// Win/loss record and winning techniques of one wrestler
    Record {
        shikona: String,

        /// Restrict to one tournament (YYYYMM)
        #[arg(long)]
        basho: Option<BashoId>,
    },

    /// Standings and kinboshi of one tournament
    Basho {
        basho: BashoId,

        /// Running records through this day instead of final standings
        #[arg(long)]
        through_day: Option<i32>,
    },

    /// Rank progression of one or more wrestlers on a shared axis
    Ranks {
        #[arg(required = true)]
        rikishi_ids: Vec<i32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MatchCommand {
    /// Log a match and update the wrestler's record
    Record {
        rikishi_id: i32,

        /// win or loss
        result: MatchResult,

        opponent: String,

        /// Name to store (defaults to the wrestler's current shikona)
        #[arg(long)]
        name: Option<String>,

        /// Match date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete a logged match and revert the record change
    Delete { id: i32 },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bouts_divisions() {
        let cli = Cli::try_parse_from([
            "sumo-ingest",
            "bouts",
            "--from-year",
            "2024",
            "--divisions",
            "Makuuchi,juryo",
        ])
        .unwrap();
        match cli.command {
            Commands::Bouts { from_year, divisions, .. } => {
                assert_eq!(from_year, Some(2024));
                assert_eq!(divisions, vec![Division::Makuuchi, Division::Juryo]);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_match_images_modes() {
        let cli = Cli::try_parse_from([
            "sumo-ingest",
            "match-images",
            "./images",
            "--dry-run",
            "--min-confidence",
            "0.7",
        ])
        .unwrap();
        match cli.command {
            Commands::MatchImages { dir, dry_run, min_confidence, manual } => {
                assert_eq!(dir, Some(PathBuf::from("./images")));
                assert!(dry_run);
                assert_eq!(min_confidence, 0.7);
                assert!(manual.is_none());
            },
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "sumo-ingest",
            "match-images",
            "--manual",
            "./images/terunofuji.jpg",
            "123",
        ])
        .unwrap();
        match cli.command {
            Commands::MatchImages { dir, manual, .. } => {
                assert!(dir.is_none());
                assert_eq!(
                    manual,
                    Some(vec!["./images/terunofuji.jpg".to_string(), "123".to_string()])
                );
            },
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["sumo-ingest", "match-images"]).is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["sumo-ingest", "-vv", "records"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_invalid_basho_rejected() {
        assert!(Cli::try_parse_from(["sumo-ingest", "stats", "basho", "2023-01"]).is_err());
        let cli = Cli::try_parse_from(["sumo-ingest", "stats", "basho", "202301"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Stats { command: StatsCommand::Basho { through_day: None, .. } }
        ));
    }

    #[test]
    fn test_match_record_args() {
        let cli = Cli::try_parse_from([
            "sumo-ingest",
            "matches",
            "record",
            "7",
            "win",
            "Hoshoryu",
            "--date",
            "2024-01-14",
        ])
        .unwrap();
        match cli.command {
            Commands::Matches {
                command: MatchCommand::Record { rikishi_id, result, date, .. },
            } => {
                assert_eq!(rikishi_id, 7);
                assert_eq!(result, MatchResult::Win);
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 14));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
