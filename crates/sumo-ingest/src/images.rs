//! Link portrait files to wrestlers by fuzzy filename matching
//!
//! This resolver is separate from the import-time identity resolver and is
//! only used for images. Names and filenames are folded to `[a-z0-9]`
//! before scoring, so the extension takes part in the comparison.

use crate::error::{IngestError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use sumo_common::SumoError;
use tracing::{info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Scores at or below this are never considered.
pub const CANDIDATE_FLOOR: f64 = 0.4;

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

pub const MAPPING_FILE: &str = "mapping.json";

/// Lowercase, strip diacritics, keep only ASCII letters and digits.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Containment-biased similarity of two strings in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (normalize(a), normalize(b));
    let (longer, shorter) = if a.len() > b.len() { (a, b) } else { (b, a) };

    if longer.is_empty() {
        return 1.0;
    }
    if longer.contains(shorter.as_str()) {
        return 0.8;
    }

    let shared = shorter.chars().filter(|c| longer.contains(*c)).count();
    shared as f64 / longer.len() as f64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RosterEntry {
    pub id: i32,
    pub shikona_en: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub entry: &'a RosterEntry,
    pub score: f64,
}

/// Highest-scoring roster entry above [`CANDIDATE_FLOOR`].
///
/// Equal scores go to the lexicographically smallest name, then the lowest
/// id. Names that normalize to nothing are skipped.
pub fn best_candidate<'a>(filename: &str, roster: &'a [RosterEntry]) -> Option<Candidate<'a>> {
    let mut best: Option<Candidate<'a>> = None;

    for entry in roster {
        if normalize(&entry.shikona_en).is_empty() {
            continue;
        }
        let score = similarity(filename, &entry.shikona_en);
        if score <= CANDIDATE_FLOOR {
            continue;
        }
        let better = match &best {
            None => true,
            Some(current) => {
                score > current.score
                    || (score == current.score
                        && (entry.shikona_en.as_str(), entry.id)
                            < (current.entry.shikona_en.as_str(), current.entry.id))
            },
        };
        if better {
            best = Some(Candidate { entry, score });
        }
    }

    best
}

/// Best candidate, accepted only at or above `min_confidence`.
pub fn find_best_match<'a>(
    filename: &str,
    roster: &'a [RosterEntry],
    min_confidence: f64,
) -> Option<Candidate<'a>> {
    best_candidate(filename, roster).filter(|c| c.score >= min_confidence)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Image filenames directly inside `dir`, sorted.
pub fn list_images(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.push(name.to_string());
        }
    }
    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMatch {
    pub filename: String,
    pub rikishi_id: i32,
    pub rikishi_name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedImage {
    pub filename: String,
    pub best_guess: Option<String>,
    pub score: f64,
}

/// Contents of `mapping.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingReport {
    pub timestamp: DateTime<Utc>,
    pub image_dir: String,
    pub matches: Vec<ImageMatch>,
    pub unmatched: Vec<UnmatchedImage>,
}

impl MappingReport {
    /// Score `files` against `roster` without touching the store.
    pub fn build(
        image_dir: &Path,
        files: &[String],
        roster: &[RosterEntry],
        min_confidence: f64,
    ) -> Self {
        let mut matches = Vec::new();
        let mut unmatched = Vec::new();

        for filename in files {
            let best = best_candidate(filename, roster);
            match best.filter(|c| c.score >= min_confidence) {
                Some(candidate) => matches.push(ImageMatch {
                    filename: filename.clone(),
                    rikishi_id: candidate.entry.id,
                    rikishi_name: candidate.entry.shikona_en.clone(),
                    confidence: candidate.score,
                }),
                None => unmatched.push(UnmatchedImage {
                    filename: filename.clone(),
                    best_guess: best.map(|c| c.entry.shikona_en.clone()),
                    score: best.map_or(0.0, |c| c.score),
                }),
            }
        }

        Self {
            timestamp: Utc::now(),
            image_dir: image_dir.display().to_string(),
            matches,
            unmatched,
        }
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MAPPING_FILE);
        let json = serde_json::to_string_pretty(self).map_err(SumoError::from)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkOptions {
    pub min_confidence: f64,
    pub dry_run: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            dry_run: false,
        }
    }
}

pub fn image_url(filename: &str) -> String {
    format!("/images/{filename}")
}

async fn set_image_url(pool: &PgPool, rikishi_id: i32, url: &str) -> Result<bool> {
    let result =
        sqlx::query("UPDATE rikishis SET image_url = $1, updated_at = NOW() WHERE id = $2")
            .bind(url)
            .bind(rikishi_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Automatic mode: scan `dir`, link confident matches, write `mapping.json`.
pub async fn link_images(pool: &PgPool, dir: &Path, options: LinkOptions) -> Result<MappingReport> {
    if !dir.is_dir() {
        return Err(IngestError::not_found("Directory", dir.display()));
    }

    let roster: Vec<RosterEntry> =
        sqlx::query_as("SELECT id, shikona_en FROM rikishis ORDER BY shikona_en, id")
            .fetch_all(pool)
            .await?;
    let files = list_images(dir)?;
    info!(rikishi = roster.len(), images = files.len(), "Matching images");

    let report = MappingReport::build(dir, &files, &roster, options.min_confidence);
    for m in &report.matches {
        info!(
            filename = %m.filename,
            rikishi_id = m.rikishi_id,
            rikishi = %m.rikishi_name,
            confidence = m.confidence,
            "Matched"
        );
    }
    for u in &report.unmatched {
        warn!(
            filename = %u.filename,
            best_guess = u.best_guess.as_deref().unwrap_or("-"),
            score = u.score,
            "Unmatched"
        );
    }

    if options.dry_run {
        info!(would_update = report.matches.len(), "Dry run, no database changes");
    } else {
        let mut updated = 0;
        for m in &report.matches {
            if set_image_url(pool, m.rikishi_id, &image_url(&m.filename)).await? {
                updated += 1;
            }
        }
        info!(updated, "Updated image links");
    }

    let path = report.write_to(dir)?;
    info!(
        matched = report.matches.len(),
        unmatched = report.unmatched.len(),
        mapping = %path.display(),
        "Image matching finished"
    );
    Ok(report)
}

/// Manual mode: link one existing file to a given wrestler.
pub async fn manual_match(pool: &PgPool, file: &Path, rikishi_id: i32) -> Result<String> {
    if !file.is_file() {
        return Err(IngestError::not_found("Image file", file.display()));
    }
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| IngestError::Validation(format!("invalid file name: {}", file.display())))?;

    let url = image_url(filename);
    if !set_image_url(pool, rikishi_id, &url).await? {
        return Err(IngestError::not_found("Rikishi", rikishi_id));
    }
    info!(file = %file.display(), rikishi_id, url = %url, "Linked image");
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(id: i32, name: &str) -> RosterEntry {
        RosterEntry {
            id,
            shikona_en: name.to_string(),
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Asashōryū Akinori"), "asashoryuakinori");
        assert_eq!(normalize("asashoryu_2007.jpg"), "asashoryu2007jpg");
        assert_eq!(normalize("横綱"), "");
    }

    #[test]
    fn test_similarity_rules() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("asashoryu_2007.jpg", "Asashoryu"), 0.8);
        // 7 of "asasekiryu"'s letters appear in the 16-char filename.
        assert!((similarity("asashoryu_2007.jpg", "Asasekiryu") - 7.0 / 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_filename_matches_expected_wrestler() {
        let roster = vec![entry(1, "Asasekiryu"), entry(2, "Asashoryu")];
        let best = find_best_match("asashoryu_2007.jpg", &roster, DEFAULT_MIN_CONFIDENCE).unwrap();
        assert_eq!(best.entry.id, 2);
        assert!(best.score > 0.5);
    }

    #[test]
    fn test_ties_prefer_smallest_name_then_id() {
        let roster = vec![entry(9, "Ura"), entry(3, "Ura"), entry(1, "Ura2")];
        // "ura" is contained in both the filename and "ura2": every entry scores 0.8.
        let best = best_candidate("ura2_portrait.png", &roster).unwrap();
        assert_eq!(best.entry.id, 3);
    }

    #[test]
    fn test_low_scores_are_unmatched() {
        let roster = vec![entry(1, "Terunofuji")];
        // "crowdgif" shares 4 letters with "terunofuji": 0.4, not above the floor.
        assert!(best_candidate("crowd.gif", &roster).is_none());
        assert!(find_best_match("crowd.gif", &roster, DEFAULT_MIN_CONFIDENCE).is_none());
    }

    #[test]
    fn test_list_images_filters_extensions() {
        let dir = TempDir::new().unwrap();
        for name in ["b.JPG", "a.webp", "notes.txt", "c.jpeg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let files = list_images(dir.path()).unwrap();
        assert_eq!(files, vec!["a.webp", "b.JPG", "c.jpeg"]);
    }

    #[test]
    fn test_mapping_report_written() {
        let dir = TempDir::new().unwrap();
        let roster = vec![entry(1, "Asashoryu"), entry(2, "Hakuho")];
        let files = vec!["asashoryu_2007.jpg".to_string(), "crowd.gif".to_string()];

        let report = MappingReport::build(dir.path(), &files, &roster, DEFAULT_MIN_CONFIDENCE);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.unmatched.len(), 1);
        assert_eq!(report.unmatched[0].filename, "crowd.gif");

        let path = report.write_to(dir.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["matches"][0]["rikishiId"], 1);
        assert!(json["imageDir"].is_string());
        assert!(json["unmatched"][0].get("bestGuess").is_some());
    }
}
