//! Loader for observed trip tables.
//!
//! The caller names its own columns; a [`ColumnMapping`] resolves them to the
//! canonical names below. Timestamps are normalized to naive UTC following a
//! [`TimezonePolicy`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{EvalError, Result};
use crate::trips::TripRecord;

pub const REQUIRED_COLUMNS: [&str; 9] = [
    "request_time",
    "pickup_time",
    "dropoff_time",
    "request_lat",
    "request_lon",
    "pickup_lat",
    "pickup_lon",
    "dropoff_lat",
    "dropoff_lon",
];

/// Needed only by the baseline summary. Blank cells read as missing values.
pub const OPTIONAL_COLUMNS: [&str; 2] = ["straight_distance_km", "fare"];

/// Which of [`OPTIONAL_COLUMNS`] a table carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalColumns {
    pub straight_distance_km: bool,
    pub fare: bool,
}

impl OptionalColumns {
    /// For trips built in memory: a column counts as present when any trip has a value.
    pub fn observed(trips: &[TripRecord]) -> Self {
        Self {
            straight_distance_km: trips.iter().any(|t| t.straight_distance_km.is_some()),
            fare: trips.iter().any(|t| t.fare.is_some()),
        }
    }
}

/// Trips read from one table.
#[derive(Debug, Clone, Default)]
pub struct TripTable {
    pub trips: Vec<TripRecord>,
    pub columns: OptionalColumns,
}

/// Canonical column name -> caller column name.
///
/// Canonical names without an entry are looked up under their own name.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    entries: HashMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, canonical: &str, column: &str) -> Self {
        self.entries.insert(canonical.to_string(), column.to_string());
        self
    }

    /// Loads the mapping from a JSON object, e.g. `{"pickup_time": "boarded_at"}`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: HashMap<String, String> = serde_json::from_str(&content)?;
        Ok(Self { entries })
    }

    /// Builds the mapping from `canonical=column` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> std::result::Result<Self, String> {
        let mut entries = HashMap::new();
        for pair in pairs {
            let (canonical, column) = pair
                .split_once('=')
                .ok_or_else(|| format!("mapping '{pair}' must look like canonical=column"))?;
            entries.insert(canonical.trim().to_string(), column.trim().to_string());
        }
        Ok(Self { entries })
    }

    pub fn extend(&mut self, other: ColumnMapping) {
        self.entries.extend(other.entries);
    }

    pub fn column_for<'a>(&'a self, canonical: &'a str) -> &'a str {
        self.entries.get(canonical).map(String::as_str).unwrap_or(canonical)
    }
}

/// How timestamps are brought onto a single naive UTC time line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum TimezonePolicy {
    /// Offsets are converted to UTC; values without an offset are taken as UTC.
    #[default]
    Utc,
    /// Values without an offset are read in this offset, then converted to UTC.
    AssumeOffset(FixedOffset),
    /// Values without an offset are rejected.
    RequireOffset,
}

impl FromStr for TimezonePolicy {
    type Err = String;

    /// Accepts `utc`, `require`, or an offset such as `+09:00`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utc" => Ok(TimezonePolicy::Utc),
            "require" => Ok(TimezonePolicy::RequireOffset),
            other => parse_offset(other)
                .map(TimezonePolicy::AssumeOffset)
                .ok_or_else(|| format!("unknown timezone policy '{s}'")),
        }
    }
}

/// Parses `+HH:MM` / `-HHMM` into a [`FixedOffset`].
pub fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses one timestamp cell into naive UTC.
pub fn parse_timestamp(raw: &str, policy: TimezonePolicy) -> std::result::Result<NaiveDateTime, String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Ok(dt.naive_utc());
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| "not a recognised timestamp".to_string())?;

    match policy {
        TimezonePolicy::Utc => Ok(naive),
        TimezonePolicy::AssumeOffset(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| format!("local time does not exist in offset {offset}")),
        TimezonePolicy::RequireOffset => Err("timestamp carries no UTC offset".to_string()),
    }
}

/// Loads a trip table from a CSV file on disk.
pub fn load_trips_from_path(
    path: impl AsRef<Path>,
    mapping: &ColumnMapping,
    policy: TimezonePolicy,
) -> Result<TripTable> {
    let file = std::fs::File::open(path)?;
    load_trips(file, mapping, policy)
}

/// Reads a CSV trip table, renaming columns through `mapping`.
///
/// # Errors
///
/// [`EvalError::MissingColumn`] when one of [`REQUIRED_COLUMNS`] is absent,
/// [`EvalError::InvalidValue`] when a cell does not parse. Blank cells in
/// the optional columns are not errors; they leave that trip's value unset.
pub fn load_trips<R: Read>(
    reader: R,
    mapping: &ColumnMapping,
    policy: TimezonePolicy,
) -> Result<TripTable> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let position = |canonical: &str| {
        let column = mapping.column_for(canonical);
        headers.iter().position(|h| h.trim() == column)
    };

    let mut required = HashMap::new();
    for canonical in REQUIRED_COLUMNS {
        let idx = position(canonical).ok_or_else(|| EvalError::MissingColumn {
            canonical: canonical.to_string(),
            column: mapping.column_for(canonical).to_string(),
        })?;
        required.insert(canonical, idx);
    }
    let distance_idx = position(OPTIONAL_COLUMNS[0]);
    let fare_idx = position(OPTIONAL_COLUMNS[1]);

    let mut trips = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let cells = RowCells {
            record: &record,
            row,
            mapping,
        };
        let time = |canonical: &str| cells.time(canonical, required[canonical], policy);
        let coord = |canonical: &str| cells.number(canonical, required[canonical]);

        let trip = TripRecord {
            request_time: time("request_time")?,
            pickup_time: time("pickup_time")?,
            dropoff_time: time("dropoff_time")?,
            request_lat: coord("request_lat")?,
            request_lon: coord("request_lon")?,
            pickup_lat: coord("pickup_lat")?,
            pickup_lon: coord("pickup_lon")?,
            dropoff_lat: coord("dropoff_lat")?,
            dropoff_lon: coord("dropoff_lon")?,
            straight_distance_km: match distance_idx {
                Some(idx) => cells.optional_number(OPTIONAL_COLUMNS[0], idx)?,
                None => None,
            },
            fare: match fare_idx {
                Some(idx) => cells.optional_number(OPTIONAL_COLUMNS[1], idx)?,
                None => None,
            },
        };

        if !trip.is_ordered() {
            warn!(row, "Trip timestamps out of order; durations will be negative");
        }
        trips.push(trip);
    }

    debug!(rows = trips.len(), "Trip table loaded");
    Ok(TripTable {
        trips,
        columns: OptionalColumns {
            straight_distance_km: distance_idx.is_some(),
            fare: fare_idx.is_some(),
        },
    })
}

/// Typed access to the cells of one CSV row.
struct RowCells<'r> {
    record: &'r csv::StringRecord,
    row: usize,
    mapping: &'r ColumnMapping,
}

impl<'r> RowCells<'r> {
    fn raw(&self, canonical: &str, idx: usize) -> Result<&'r str> {
        self.record
            .get(idx)
            .ok_or_else(|| self.invalid(canonical, "", "row is shorter than the header".to_string()))
    }

    fn number(&self, canonical: &str, idx: usize) -> Result<f64> {
        let raw = self.raw(canonical, idx)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|e| self.invalid(canonical, raw, e.to_string()))
    }

    fn optional_number(&self, canonical: &str, idx: usize) -> Result<Option<f64>> {
        match self.record.get(idx).map(str::trim) {
            None | Some("") => Ok(None),
            Some(_) => self.number(canonical, idx).map(Some),
        }
    }

    fn time(&self, canonical: &str, idx: usize, policy: TimezonePolicy) -> Result<NaiveDateTime> {
        let raw = self.raw(canonical, idx)?;
        parse_timestamp(raw, policy).map_err(|reason| self.invalid(canonical, raw, reason))
    }

    fn invalid(&self, canonical: &str, raw: &str, reason: String) -> EvalError {
        EvalError::InvalidValue {
            row: self.row,
            column: self.mapping.column_for(canonical).to_string(),
            value: raw.to_string(),
            reason,
        }
    }
}
