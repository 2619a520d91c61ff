//! Core data model and reshaping logic for the hotel review dashboard.

use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod figures;
pub mod gazetteer;
pub mod view;

pub use config::MapboxConfig;
pub use gazetteer::MapView;

/// Published review dataset fetched once at startup.
pub const DATA_URL: &str =
    "https://raw.githubusercontent.com/sebastianrosado/hilton-compass/master/countries_trimmed.csv";

#[derive(Error, Debug)]
pub enum CompassError {
    #[error("failed to fetch dataset: {0}")]
    Fetch(String),
    #[error("failed to parse dataset: {0}")]
    Parse(String),
    #[error("dataset is missing required column: {0}")]
    MissingColumn(String),
    #[error("dataset contains no reviews")]
    EmptyDataset,
    #[error("unknown city: {0}")]
    UnknownCity(String),
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
}

/// Columns the source CSV must carry; anything else is ignored.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "review_date",
    "hotel_name",
    "hotel_address",
    "average_score",
    "reviewer_nationality",
    "reviewer_score",
    "negative_review",
    "positive_review",
    "total_number_of_reviews_reviewer_has_given",
    "lat",
    "lng",
];

/// One reviewer submission for one hotel stay.
///
/// `average_score` keeps the source string so hover text preserves the
/// original formatting; the numeric form lives in [`HotelSummary`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review_date: String,
    #[serde(rename = "hotel_name")]
    pub hotel: String,
    #[serde(rename = "hotel_address")]
    pub address: String,
    pub average_score: String,
    #[serde(rename = "reviewer_nationality")]
    pub nationality: String,
    pub reviewer_score: f64,
    pub negative_review: String,
    pub positive_review: String,
    #[serde(rename = "total_number_of_reviews_reviewer_has_given")]
    pub reviews_by_reviewer: u32,
    pub lat: f64,
    #[serde(rename = "lng")]
    pub lon: f64,
}

/// Canonical rating for one hotel: the value of its last record in source
/// order, in both display and numeric form.
#[derive(Clone, Debug, Serialize)]
pub struct HotelSummary {
    pub hotel: String,
    pub rating_display: String,
    pub rating: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct HotelCount {
    pub hotel: String,
    pub count: u64,
}

/// Row of the count/rating table behind the bar chart. `rating` is `None`
/// when the hotel has no summary entry; the chart renders that as a gap.
#[derive(Clone, Debug, Serialize)]
pub struct HistogramRow {
    pub hotel: String,
    pub count: u64,
    pub rating: Option<f64>,
}

/// The immutable loaded dataset plus its derived views.
///
/// Built once at startup; the reactive handlers only ever read it.
#[derive(Clone, Debug)]
pub struct ReviewSet {
    records: Vec<ReviewRecord>,
    summaries: Vec<HotelSummary>,
    counts: Vec<HotelCount>,
    histogram: Vec<HistogramRow>,
}

impl ReviewSet {
    pub fn from_records(records: Vec<ReviewRecord>) -> Result<Self, CompassError> {
        if records.is_empty() {
            return Err(CompassError::EmptyDataset);
        }
        let summaries = derive_summaries(&records)?;
        let counts = derive_counts(&records);
        let histogram = join_histogram(&counts, &summaries);
        Ok(Self {
            records,
            summaries,
            counts,
            histogram,
        })
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    pub fn summaries(&self) -> &[HotelSummary] {
        &self.summaries
    }

    pub fn counts(&self) -> &[HotelCount] {
        &self.counts
    }

    pub fn histogram(&self) -> &[HistogramRow] {
        &self.histogram
    }
}

/// Parse the review CSV, checking the header row for the required columns
/// before touching any data row.
pub fn parse_reviews(input: impl Read) -> Result<Vec<ReviewRecord>, CompassError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader
        .headers()
        .map_err(|e| CompassError::Parse(e.to_string()))?
        .clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == required) {
            return Err(CompassError::MissingColumn(required.to_string()));
        }
    }
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: ReviewRecord = row.map_err(|e| CompassError::Parse(e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

/// Fetch the review CSV from `url` and parse it. One attempt, no retry; any
/// transport or schema failure is fatal to startup.
#[cfg(not(target_arch = "wasm32"))]
pub fn fetch_reviews(url: &str) -> Result<Vec<ReviewRecord>, CompassError> {
    let response = reqwest::blocking::get(url).map_err(|e| CompassError::Fetch(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(CompassError::Fetch(format!("{url} returned {status}")));
    }
    let body = response
        .text()
        .map_err(|e| CompassError::Fetch(e.to_string()))?;
    parse_reviews(body.as_bytes())
}

/// One summary per distinct hotel, last record wins, rows ordered by each
/// hotel's last occurrence.
fn derive_summaries(records: &[ReviewRecord]) -> Result<Vec<HotelSummary>, CompassError> {
    let mut last_index: HashMap<&str, usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        last_index.insert(record.hotel.as_str(), index);
    }
    let mut order: Vec<usize> = last_index.into_values().collect();
    order.sort_unstable();

    let mut summaries = Vec::with_capacity(order.len());
    for index in order {
        let record = &records[index];
        summaries.push(HotelSummary {
            hotel: record.hotel.clone(),
            rating_display: record.average_score.clone(),
            rating: parse_rating(&record.average_score)?,
        });
    }
    Ok(summaries)
}

/// Per-hotel record counts, ordered by descending count with ties broken by
/// first occurrence.
fn derive_counts(records: &[ReviewRecord]) -> Vec<HotelCount> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut tallies: HashMap<&str, u64> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        first_seen.entry(record.hotel.as_str()).or_insert(index);
        *tallies.entry(record.hotel.as_str()).or_insert(0) += 1;
    }
    let mut counts: Vec<HotelCount> = tallies
        .into_iter()
        .map(|(hotel, count)| HotelCount {
            hotel: hotel.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| first_seen[a.hotel.as_str()].cmp(&first_seen[b.hotel.as_str()]))
    });
    counts
}

/// Left join of the count table with the summary ratings. A hotel missing
/// from the summaries yields a `None` rating rather than an error.
pub fn join_histogram(counts: &[HotelCount], summaries: &[HotelSummary]) -> Vec<HistogramRow> {
    let ratings: HashMap<&str, f64> = summaries
        .iter()
        .map(|summary| (summary.hotel.as_str(), summary.rating))
        .collect();
    counts
        .iter()
        .map(|count| HistogramRow {
            hotel: count.hotel.clone(),
            count: count.count,
            rating: ratings.get(count.hotel.as_str()).copied(),
        })
        .collect()
}

fn parse_rating(raw: &str) -> Result<f64, CompassError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CompassError::Parse(format!("average_score `{raw}` is not numeric")))
}
