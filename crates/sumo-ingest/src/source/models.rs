//! Payloads returned by the source API
//!
//! Field names follow the API's camelCase JSON. Arrays the API may send as
//! `null` deserialize to empty vectors.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse the date part of an API timestamp such as `2023-01-08T00:00:00Z`.
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Empty strings mean "absent" in several API fields.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn positive(value: Option<f32>) -> Option<f32> {
    value.filter(|v| *v > 0.0)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RikishiRecord {
    /// The API's own sequential id.
    pub id: i32,
    #[serde(default)]
    pub sumodb_id: Option<i32>,
    #[serde(default)]
    pub nsk_id: Option<i32>,
    #[serde(default)]
    pub shikona_en: String,
    #[serde(default)]
    pub shikona_jp: Option<String>,
    #[serde(default)]
    pub current_rank: Option<String>,
    #[serde(default)]
    pub heya: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub shusshin: Option<String>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub debut: Option<String>,
    #[serde(default)]
    pub intai: Option<String>,
    /// `None` when the array was not requested or not sent.
    #[serde(default)]
    pub rank_history: Option<Vec<RankHistoryRecord>>,
    #[serde(default)]
    pub measurement_history: Option<Vec<MeasurementRecord>>,
    #[serde(default)]
    pub shikona_history: Option<Vec<ShikonaRecord>>,
}

impl RikishiRecord {
    /// Primary-source id; the API reports unknown ids as 0.
    pub fn sumo_db_id(&self) -> Option<i32> {
        self.sumodb_id.filter(|id| *id > 0)
    }

    pub fn nsk_id(&self) -> Option<i32> {
        self.nsk_id.filter(|id| *id > 0)
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date.as_deref().and_then(parse_api_date)
    }

    pub fn debut(&self) -> Option<&str> {
        non_empty(&self.debut)
    }

    pub fn height(&self) -> Option<f32> {
        positive(self.height)
    }

    pub fn weight(&self) -> Option<f32> {
        positive(self.weight)
    }

    pub fn has_measurements(&self) -> bool {
        self.height().is_some() || self.weight().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankHistoryRecord {
    pub basho_id: String,
    pub rank: String,
    #[serde(default)]
    pub rank_value: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    pub basho_id: String,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub weight: Option<f32>,
}

/// Name history entry. The API either lists one row per tournament
/// (`bashoId`) or explicit periods (`dateStart`/`dateEnd`/`current`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShikonaRecord {
    #[serde(default)]
    pub basho_id: Option<String>,
    pub shikona_en: String,
    #[serde(default)]
    pub shikona_jp: Option<String>,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
    #[serde(default)]
    pub current: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RikishiPage {
    #[serde(default)]
    pub total: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub records: Vec<RikishiRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YushoRecord {
    #[serde(rename = "type")]
    pub division: String,
    #[serde(default)]
    pub rikishi_id: Option<i32>,
    #[serde(default)]
    pub shikona_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoutRecord {
    pub basho_id: String,
    pub division: String,
    pub day: i32,
    pub match_no: i32,
    #[serde(default)]
    pub east_id: Option<i32>,
    pub east_shikona: String,
    #[serde(default)]
    pub east_rank: Option<String>,
    #[serde(default)]
    pub west_id: Option<i32>,
    pub west_shikona: String,
    #[serde(default)]
    pub west_rank: Option<String>,
    #[serde(default)]
    pub kimarite: Option<String>,
    #[serde(default)]
    pub winner_id: Option<i32>,
    #[serde(default)]
    pub winner_en: Option<String>,
    #[serde(default)]
    pub winner_jp: Option<String>,
}

/// One day of a division's schedule, plus the tournament header fields the
/// API repeats on every day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorikumiDay {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub yusho: Vec<YushoRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub torikumi: Vec<BoutRecord>,
}

impl TorikumiDay {
    pub fn yusho_for(&self, division: &str) -> Option<&YushoRecord> {
        self.yusho
            .iter()
            .find(|y| y.division.eq_ignore_ascii_case(division))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanzukeRecord {
    #[serde(rename = "rikishiID", alias = "rikishiId")]
    pub rikishi_id: i32,
    pub shikona_en: String,
    #[serde(default)]
    pub shikona_jp: Option<String>,
    pub rank: String,
    #[serde(default)]
    pub rank_value: Option<i32>,
    #[serde(default)]
    pub heya: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BanzukeSheet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub east: Vec<BanzukeRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub west: Vec<BanzukeRecord>,
}

impl BanzukeSheet {
    pub fn is_empty(&self) -> bool {
        self.east.is_empty() && self.west.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rikishi_record_from_api() {
        let raw = json!({
            "id": 19,
            "sumodbId": 11927,
            "nskId": 3842,
            "shikonaEn": "Hoshoryu",
            "shikonaJp": "豊昇龍　智勝",
            "currentRank": "Ozeki 1 East",
            "heya": "Tatsunami",
            "birthDate": "1999-05-22T00:00:00Z",
            "shusshin": "Mongolia, Ulaanbaatar",
            "height": 188,
            "weight": 149,
            "debut": "201801",
            "rankHistory": [
                { "id": "201801-19", "bashoId": "201801", "rikishiId": 19, "rankValue": 999, "rank": "Mae-zumo" }
            ]
        });

        let record: RikishiRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.sumo_db_id(), Some(11927));
        assert_eq!(record.birth_date(), NaiveDate::from_ymd_opt(1999, 5, 22));
        assert_eq!(record.debut(), Some("201801"));
        assert_eq!(record.rank_history.as_ref().map(Vec::len), Some(1));
        assert!(record.measurement_history.is_none());
    }

    #[test]
    fn test_zero_ids_and_measurements_are_absent() {
        let record: RikishiRecord = serde_json::from_value(json!({
            "id": 7,
            "sumodbId": 0,
            "shikonaEn": "Example",
            "height": 0,
            "weight": 0,
            "debut": ""
        }))
        .unwrap();
        assert_eq!(record.sumo_db_id(), None);
        assert!(!record.has_measurements());
        assert_eq!(record.debut(), None);
    }

    #[test]
    fn test_torikumi_day_with_null_arrays() {
        let day: TorikumiDay = serde_json::from_value(json!({
            "date": "202301",
            "location": "Tokyo, Ryogoku Kokugikan",
            "startDate": "2023-01-08T00:00:00Z",
            "endDate": "2023-01-22T00:00:00Z",
            "yusho": null,
            "torikumi": null
        }))
        .unwrap();
        assert!(day.torikumi.is_empty());
        assert!(day.yusho_for("Makuuchi").is_none());
        assert_eq!(
            day.start_date.as_deref().and_then(parse_api_date),
            NaiveDate::from_ymd_opt(2023, 1, 8)
        );
    }

    #[test]
    fn test_banzuke_accepts_both_id_spellings() {
        let sheet: BanzukeSheet = serde_json::from_value(json!({
            "east": [{ "rikishiID": 8850, "shikonaEn": "Terunofuji", "rank": "Yokozuna 1 East", "rankValue": 101 }],
            "west": [{ "rikishiId": 45, "shikonaEn": "Kirishima", "rank": "Ozeki 1 West" }]
        }))
        .unwrap();
        assert_eq!(sheet.east[0].rikishi_id, 8850);
        assert_eq!(sheet.west[0].rikishi_id, 45);
        assert!(!sheet.is_empty());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&Some("  ".to_string())), None);
        assert_eq!(non_empty(&Some("Kotonowaka".to_string())), Some("Kotonowaka"));
        assert_eq!(non_empty(&None), None);
    }
}
