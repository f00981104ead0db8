pub mod client;
pub mod format;
pub mod validate;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Domain types, mirroring the static JSON files served under data/
// ---------------------------------------------------------------------------

/// Which side of the dohyo a wrestler stands on. East and west are fixed
/// ceremonial sides, so a `Match` is never symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "E")]
    East,
    #[serde(rename = "W")]
    West,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::East => Side::West,
            Side::West => Side::East,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basho {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub east: String,
    pub west: String,
}

/// One day's torikumi for one division.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorikumiData {
    #[serde(default)]
    pub source: String,
    pub basho: Basho,
    pub day: u8,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub division: String,
    pub matches: Vec<Match>,
}

impl TorikumiData {
    /// `updatedAt` rendered in local time, or the raw string when it is not RFC 3339.
    pub fn updated_at_local(&self) -> String {
        DateTime::parse_from_rfc3339(&self.updated_at)
            .map(|dt| dt.with_timezone(&Local).format("%Y/%m/%d %H:%M").to_string())
            .unwrap_or_else(|_| self.updated_at.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BashoInfo {
    pub id: String,
    pub label: String,
    pub days: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestDay {
    pub basho_id: String,
    pub day: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "off-season")]
    OffSeason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorikumiIndex {
    pub basho_list: Vec<BashoInfo>,
    pub latest: LatestDay,
    /// Older index files predate this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SeasonStatus>,
}

impl TorikumiIndex {
    pub fn find(&self, basho_id: &str) -> Option<&BashoInfo> {
        self.basho_list.iter().find(|b| b.id == basho_id)
    }

    /// Number of browsable days for a basho; a full fifteen when unknown.
    pub fn days_for(&self, basho_id: &str) -> u32 {
        self.find(basho_id).map(|b| b.days).unwrap_or(15)
    }

    pub fn is_off_season(&self) -> bool {
        self.status == Some(SeasonStatus::OffSeason)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizIndex {
    pub basho_list: Vec<Basho>,
}

/// A historical bout with its actual result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizMatch {
    pub east: String,
    pub west: String,
    pub winner: Side,
    pub kimarite: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizBashoData {
    pub basho: Basho,
    /// Keyed by day number as a string ("1".."15"); not validated numerically.
    pub days: BTreeMap<String, Vec<QuizMatch>>,
}

impl QuizBashoData {
    /// Day keys in numeric order where they parse, lexical order otherwise.
    pub fn day_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.days.keys().map(String::as_str).collect();
        keys.sort_by_key(|k| (k.parse::<u32>().unwrap_or(u32::MAX), k.to_string()));
        keys
    }
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

/// Sparse mapping from match index to predicted winner.
///
/// A missing key and an explicit `None` are both "unset". Serializes as the
/// persisted layout `{"0":"E","1":"W","2":null}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predictions(BTreeMap<usize, Option<Side>>);

impl Predictions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The explicitly chosen side, if any.
    pub fn get(&self, index: usize) -> Option<Side> {
        self.0.get(&index).copied().flatten()
    }

    /// The side shown as the winner; unset bouts default to an east win.
    pub fn winner_or_default(&self, index: usize) -> Side {
        self.get(index).unwrap_or(Side::East)
    }

    /// A copy of this mapping with `index` set to `value`.
    pub fn with(&self, index: usize, value: Option<Side>) -> Self {
        let mut next = self.0.clone();
        next.insert(index, value);
        Self(next)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<Side>)> + '_ {
        self.0.iter().map(|(i, v)| (*i, *v))
    }
}

impl FromIterator<(usize, Option<Side>)> for Predictions {
    fn from_iter<T: IntoIterator<Item = (usize, Option<Side>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
