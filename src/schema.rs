use std::fmt;
use std::str::FromStr;
use std::sync::atomic::Ordering;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::metrics::METRICS;

/// Identifier of a figure as stored by the backend.
///
/// Hosted tables use either integer keys or text keys (uuid).
/// Ordering puts integers first, then text, which gives the
/// ranked view a deterministic secondary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(untagged)]
pub enum FigureId {
    Int(i64),
    Text(String),
}

// ------------------------------------------------------------
// Category
// ------------------------------------------------------------
//
// Stored verbatim in the `category` column. Any other value
// fails to decode and the row is quarantined.
//
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Category {
    Politicians,
    Executives,
    Influencers,
    Historical,
    Fictional,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Politicians,
        Category::Executives,
        Category::Influencers,
        Category::Historical,
        Category::Fictional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Politicians => "Politicians",
            Category::Executives => "Executives",
            Category::Influencers => "Influencers",
            Category::Historical => "Historical",
            Category::Fictional => "Fictional",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Case-insensitive, for user input. Backend rows go through serde.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Vote direction.
///
/// Anything other than the three known values decodes as
/// `Unrecognized`; such votes are kept but never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Resonate,
    Reject,
    Ambivalent,
    #[serde(other)]
    Unrecognized,
}

// ------------------------------------------------------------
// Records
// ------------------------------------------------------------

/// A row of the figures collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Figure {
    pub id: FigureId,
    pub name: String,
    pub category: Category,

    /// Empty strings are stored as `None`
    #[serde(default, deserialize_with = "empty_as_none")]
    pub country: Option<String>,
}

/// A row of the vote-events collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoteEvent {
    pub figure_id: FigureId,
    pub direction: Direction,
}

fn empty_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

// ------------------------------------------------------------
// Ingestion boundary
// ------------------------------------------------------------

/// Typed records plus the number of rows that could not be decoded.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub quarantined: usize,
}

/// Decodes raw backend rows, setting aside rows with missing or
/// invalid required fields instead of passing them on.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>, kind: &str) -> Decoded<T> {
    let mut records = Vec::with_capacity(rows.len());
    let mut quarantined = 0;

    for row in rows {
        match T::deserialize(&row) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!("quarantined {kind} row {row}: {e}");
                quarantined += 1;
            }
        }
    }

    if quarantined > 0 {
        warn!("{quarantined} {kind} rows quarantined (missing or invalid fields)");
        METRICS.rows_quarantined.fetch_add(quarantined, Ordering::Relaxed);
    }

    Decoded {
        records,
        quarantined,
    }
}
