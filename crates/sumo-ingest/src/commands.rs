//! Command execution for the CLI

use crate::cli::{Commands, MatchCommand, StatsCommand};
use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::images::{self, LinkOptions};
use crate::matches::{self, NewMatch};
use crate::pipeline::{self, RikishiCrawler};
use crate::queries;
use crate::source::SumoApiClient;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::path::Path;
use sumo_common::types::BashoId;
use sumo_stats::{
    align_series, basho_labels, head_to_head, kimarite_usage, kinboshi, rank_series,
    running_records, tournament_records, win_loss, HeadToHead, Kinboshi, Record,
    TournamentRecord,
};

#[derive(Debug, Serialize)]
pub struct HeadToHeadReport {
    pub a: String,
    pub b: String,
    #[serde(flatten)]
    pub result: HeadToHead,
}

#[derive(Debug, Serialize)]
pub struct RecordReport {
    pub shikona: String,
    pub basho: Option<BashoId>,
    #[serde(flatten)]
    pub record: Record,
    pub kimarite: Vec<(String, u32)>,
}

#[derive(Debug, Serialize)]
pub struct BashoReport {
    pub basho: BashoId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub through_day: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standings: Option<Vec<TournamentRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<BTreeMap<String, Record>>,
    pub kinboshi: Vec<Kinboshi>,
}

#[derive(Debug, Serialize)]
pub struct RankSeriesReport {
    pub labels: Vec<String>,
    pub series: Vec<RankSeries>,
}

#[derive(Debug, Serialize)]
pub struct RankSeries {
    pub rikishi_id: i32,
    pub shikona: String,
    pub rank_values: Vec<Option<i32>>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(sumo_common::SumoError::from)?;
    println!("{json}");
    Ok(())
}

/// Run one command to completion.
pub async fn execute(command: &Commands, config: &IngestConfig, pool: &PgPool) -> Result<()> {
    match command {
        Commands::Rikishi => {
            let client = SumoApiClient::new(&config.source)?;
            RikishiCrawler::new(client, pool.clone(), &config.source).run().await?;
        },

        Commands::Basho { from_year, to_year } => {
            let mut jobs = config.jobs.clone();
            jobs.basho_from_year = from_year.unwrap_or(jobs.basho_from_year);
            jobs.to_year = to_year.unwrap_or(jobs.to_year);
            let client = SumoApiClient::new(&config.source)?;
            pipeline::basho::run(pool, &client, &jobs).await?;
        },

        Commands::Bouts { from_year, to_year, divisions } => {
            let mut jobs = config.jobs.clone();
            jobs.bouts_from_year = from_year.unwrap_or(jobs.bouts_from_year);
            jobs.to_year = to_year.unwrap_or(jobs.to_year);
            if !divisions.is_empty() {
                jobs.bout_divisions = divisions.clone();
            }
            let client = SumoApiClient::new(&config.source)?;
            pipeline::bouts::run(pool, &client, &jobs).await?;
        },

        Commands::Banzuke => {
            let client = SumoApiClient::new(&config.source)?;
            pipeline::banzuke::run(pool, &client).await?;
        },

        Commands::Measurements => {
            let client = SumoApiClient::new(&config.source)?;
            pipeline::measurements::run(pool, &client).await?;
        },

        Commands::Records => {
            pipeline::recompute_win_loss(pool).await?;
        },

        Commands::MatchImages { dir, dry_run, min_confidence, manual } => {
            if let Some(manual) = manual {
                let (file, id) = parse_manual(manual)?;
                images::manual_match(pool, Path::new(file), id).await?;
            } else if let Some(dir) = dir {
                let options = LinkOptions {
                    min_confidence: *min_confidence,
                    dry_run: *dry_run,
                };
                images::link_images(pool, dir, options).await?;
            }
        },

        Commands::Stats { command } => execute_stats(command, pool).await?,

        Commands::Matches { command } => execute_matches(command, pool).await?,
    }

    Ok(())
}

fn parse_manual(args: &[String]) -> Result<(&str, i32)> {
    let [file, id] = args else {
        return Err(IngestError::Validation(
            "--manual requires an image file and a rikishi id".to_string(),
        ));
    };
    let id = id
        .parse()
        .map_err(|_| IngestError::Validation(format!("invalid rikishi id: {id}")))?;
    Ok((file.as_str(), id))
}

async fn execute_stats(command: &StatsCommand, pool: &PgPool) -> Result<()> {
    match command {
        StatsCommand::HeadToHead { a, b } => {
            let bouts = queries::load_head_to_head_bouts(pool, a, b).await?;
            print_json(&HeadToHeadReport {
                a: a.clone(),
                b: b.clone(),
                result: head_to_head(&bouts, a, b),
            })
        },

        StatsCommand::Record { shikona, basho } => {
            let bouts = queries::load_rikishi_bouts(pool, shikona, basho.as_ref()).await?;
            print_json(&RecordReport {
                shikona: shikona.clone(),
                basho: basho.clone(),
                record: win_loss(&bouts, shikona),
                kimarite: kimarite_usage(&bouts, shikona),
            })
        },

        StatsCommand::Basho { basho, through_day } => {
            let bouts = queries::load_bouts(pool, Some(basho)).await?;
            if bouts.is_empty() {
                return Err(IngestError::not_found("Bouts for basho", basho));
            }
            let (standings, running) = match through_day {
                Some(day) => (None, Some(running_records(&bouts, *day))),
                None => (Some(tournament_records(&bouts)), None),
            };
            print_json(&BashoReport {
                basho: basho.clone(),
                through_day: *through_day,
                standings,
                running,
                kinboshi: kinboshi(&bouts),
            })
        },

        StatsCommand::Ranks { rikishi_ids } => {
            let mut named = Vec::with_capacity(rikishi_ids.len());
            for &id in rikishi_ids {
                let shikona = queries::rikishi_name(pool, id).await?;
                let history = queries::load_rank_history(pool, id).await?;
                named.push((id, shikona, rank_series(&history)));
            }

            let labels = basho_labels(named.iter().map(|(_, _, points)| points.as_slice()));
            let series = named
                .into_iter()
                .map(|(rikishi_id, shikona, points)| RankSeries {
                    rikishi_id,
                    shikona,
                    rank_values: align_series(&labels, &points),
                })
                .collect();
            print_json(&RankSeriesReport { labels, series })
        },
    }
}

async fn execute_matches(command: &MatchCommand, pool: &PgPool) -> Result<()> {
    match command {
        MatchCommand::Record { rikishi_id, result, opponent, name, date } => {
            let rikishi_name = match name {
                Some(name) => name.clone(),
                None => queries::rikishi_name(pool, *rikishi_id).await?,
            };
            let id = matches::record_match(
                pool,
                &NewMatch {
                    rikishi_id: *rikishi_id,
                    rikishi_name,
                    result: *result,
                    opponent: opponent.clone(),
                    match_date: *date,
                },
            )
            .await?;
            print_json(&serde_json::json!({ "id": id }))
        },

        MatchCommand::Delete { id } => {
            let deleted = matches::delete_match(pool, *id).await?;
            print_json(&deleted)
        },
    }
}
