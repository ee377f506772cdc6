//! Per-record display values
//!
//! Everything drawn on a certificate is derived here from a
//! [`ParticipantRecord`]: the formatted registration date, the mission label,
//! and the photo/chart assets. Derivation never fails on data quality; bad
//! values fall back to defaults and are reported as [`Anomaly`] entries.

use crate::config::BatchConfig;
use crate::error::{Error, Result};
use crate::source::{load_asset, AssetOutcome, CellValue, ParticipantRecord};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Output date format (`DD/MM/YYYY`)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

const ISO_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

// ============================================================================
// Anomalies
// ============================================================================

/// A recoverable data problem met while building one certificate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Registration date absent or unparseable; today's date was used
    DateFallback { value: String },
    /// Mission type matched neither vocabulary entry; ground label was used
    UnrecognizedMissionType { value: String },
    MissingPhoto { expected: PathBuf },
    MissingChart { round: u8, expected: PathBuf },
    ImageDecodeFailed { path: PathBuf, reason: String },
    /// Image decoded but PDFium refused to place it; its rectangle is blank
    ImageEmbedFailed { path: PathBuf, reason: String },
}

// ============================================================================
// Date formatting
// ============================================================================

/// Parse a registration date cell.
///
/// Accepts native date cells, ISO-8601 timestamps (with or without a `Z` or
/// numeric offset) and plain `YYYY-MM-DD` strings.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Text(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    let cleaned = s.replace('Z', "");
    if cleaned.contains('T') || cleaned.contains(' ') {
        ISO_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())
            .map(|dt| dt.date())
    } else {
        NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d").ok()
    }
}

/// Format a registration date as `DD/MM/YYYY`, falling back to `today`
pub fn format_date_or(value: &CellValue, today: NaiveDate) -> String {
    match parse_date(value) {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => {
            tracing::warn!(
                value = ?value,
                "Unrecognized registration date, using current date"
            );
            today.format(DATE_FORMAT).to_string()
        }
    }
}

/// Format a registration date as `DD/MM/YYYY`, falling back to the current date
pub fn format_date(value: &CellValue) -> String {
    format_date_or(value, Local::now().date_naive())
}

// ============================================================================
// Mission names
// ============================================================================

/// Location label printed for a mission type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MissionName {
    /// Air-to-ground missions
    Suippes,
    /// Air-to-air missions
    Taxan,
}

impl MissionName {
    pub fn label(self) -> &'static str {
        match self {
            MissionName::Suippes => "Suippes",
            MissionName::Taxan => "Taxan",
        }
    }
}

impl fmt::Display for MissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Match a mission type against the vocabulary, ignoring case and whitespace
pub fn classify_mission(mission_type: &str) -> Option<MissionName> {
    let normalized: String = mission_type
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if normalized.contains("AIR-GROUND") {
        Some(MissionName::Suippes)
    } else if normalized.contains("AIR-AIR") {
        Some(MissionName::Taxan)
    } else {
        None
    }
}

/// Resolve a mission type to its label; anything unrecognized maps to Suippes
pub fn resolve_mission_name(mission_type: Option<&str>) -> MissionName {
    mission_type
        .and_then(classify_mission)
        .unwrap_or(MissionName::Suippes)
}

// ============================================================================
// Derived fields
// ============================================================================

/// Everything the overlay composer needs for one record
#[derive(Debug, Clone)]
pub struct DerivedFields {
    pub identifier: String,
    pub last_name: String,
    pub first_name: String,
    pub instructor: String,
    pub aircraft: String,
    pub map: String,
    /// Mission type as printed
    pub mission_type: String,
    pub mission_name: MissionName,
    /// Registration date, `DD/MM/YYYY`
    pub date: String,
    pub photo: AssetOutcome,
    /// One outcome per probed round, keyed 1..=max_rounds
    pub charts: BTreeMap<u8, AssetOutcome>,
    /// Problems met while deriving (date, mission type)
    pub anomalies: Vec<Anomaly>,
}

impl DerivedFields {
    /// Derive display values and load assets for `record`
    pub fn derive(record: &ParticipantRecord, config: &BatchConfig) -> Result<Self> {
        let identifier = record
            .identifier
            .clone()
            .ok_or(Error::MissingIdentifier { row: record.row })?;

        let mut anomalies = Vec::new();

        let mission_type = record
            .mission_type
            .as_text()
            .or(record.mission.as_deref())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| config.text.default_mission_type.clone());

        let mission_name = match classify_mission(&mission_type) {
            Some(name) => name,
            None => {
                tracing::warn!(
                    id = %identifier,
                    mission_type = %mission_type,
                    "Unrecognized mission type, defaulting to {}",
                    MissionName::Suippes
                );
                anomalies.push(Anomaly::UnrecognizedMissionType {
                    value: mission_type.clone(),
                });
                resolve_mission_name(None)
            }
        };

        if parse_date(&record.registration_date).is_none() {
            anomalies.push(Anomaly::DateFallback {
                value: record
                    .registration_date
                    .display()
                    .unwrap_or_default(),
            });
        }
        let date = format_date(&record.registration_date);

        let photo = load_asset(&config.photos_dir, &identifier);
        let charts = (1..=config.variant.max_rounds())
            .map(|round| {
                let stem = config.variant.chart_stem(&identifier, round);
                (round, load_asset(&config.charts_dir, &stem))
            })
            .collect();

        Ok(Self {
            identifier,
            last_name: record.last_name.clone(),
            first_name: record.first_name.clone(),
            instructor: config.text.instructor.clone(),
            aircraft: config.text.aircraft.clone(),
            map: config.text.map.clone(),
            mission_type,
            mission_name,
            date,
            photo,
            charts,
            anomalies,
        })
    }

    /// "Last First", as printed on page 1
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }

    /// Rounds whose chart file exists, decodable or not
    pub fn rounds_found(&self) -> Vec<u8> {
        self.charts
            .iter()
            .filter(|(_, outcome)| outcome.is_located())
            .map(|(round, _)| *round)
            .collect()
    }

    /// Number of chart files found; drives the page plan
    pub fn chart_count(&self) -> usize {
        self.rounds_found().len()
    }

    pub fn has_chart(&self, round: u8) -> bool {
        self.charts
            .get(&round)
            .map(AssetOutcome::is_located)
            .unwrap_or(false)
    }

    /// `{id}_{last}_{first}.pdf`, with path separators neutralized
    pub fn output_file_name(&self) -> String {
        let sanitize = |s: &str| s.replace(['/', '\\'], "_");
        format!(
            "{}_{}_{}.pdf",
            sanitize(&self.identifier),
            sanitize(&self.last_name),
            sanitize(&self.first_name)
        )
    }
}
