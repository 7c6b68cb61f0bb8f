//! Earthquake catalog reader (`database.csv` layout).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use record_indexer_shared::{Earthquake, Geo};
use tracing::{debug, info, warn};

use crate::errors::PipelineError;

/// Rows with fewer fields than this are skipped.
pub const EARTHQUAKE_MIN_FIELDS: usize = 21;

const INPUT_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";
const OUTPUT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Open and parse an earthquake catalog file.
pub fn open_earthquakes(path: impl AsRef<Path>, limit: usize) -> Result<Vec<Earthquake>, PipelineError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| PipelineError::read(format!("could not open {}: {}", path.display(), e)))?;

    info!(path = %path.display(), "Reading earthquake catalog");
    read_earthquakes(file, limit)
}

/// Parse earthquake rows from `reader`.
///
/// The header row fails time parsing and is skipped like any other invalid
/// row. Reading stops once `limit` records were accepted; a `limit` of 0
/// reads everything.
pub fn read_earthquakes<R: Read>(reader: R, limit: usize) -> Result<Vec<Earthquake>, PipelineError> {
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut earthquakes = Vec::new();
    let mut rows = 0usize;

    for row in csv.byte_records() {
        if limit != 0 && earthquakes.len() >= limit {
            break;
        }

        let row = row.map_err(|e| PipelineError::read(format!("could not read records: {}", e)))?;
        rows += 1;

        let Some(row) = super::decode_row(row) else {
            continue;
        };

        let id = earthquakes.len() as u64 + 1;
        if let Some(earthquake) = parse_row(&row, id) {
            earthquakes.push(earthquake);
        }
    }

    info!(rows = rows, records = earthquakes.len(), "Parsed earthquake catalog");
    Ok(earthquakes)
}

fn parse_row(row: &StringRecord, id: u64) -> Option<Earthquake> {
    if row.len() < EARTHQUAKE_MIN_FIELDS {
        warn!(fields = row.len(), "Not enough required fields, skipping row");
        return None;
    }

    let field = |i: usize| row.get(i).unwrap_or_default();

    let raw_time = format!("{} {}", field(0), field(1));
    let timestamp = match NaiveDateTime::parse_from_str(&raw_time, INPUT_TIME_FORMAT) {
        Ok(ts) => ts.format(OUTPUT_TIME_FORMAT).to_string(),
        Err(e) => {
            debug!(value = %raw_time, error = %e, "Invalid time format, skipping row");
            return None;
        }
    };

    let depth = parse_finite(field(5), "depth")?;
    let magnitude = parse_finite(field(8), "magnitude")?;

    Some(Earthquake {
        id,
        timestamp,
        geo: Geo {
            lat: field(2).to_string(),
            lon: field(3).to_string(),
        },
        kind: field(4).to_string(),
        depth,
        magnitude,
        mag_type: field(9).to_string(),
        source: field(18).to_string(),
        source_id: field(16).to_string(),
    })
}

/// Parse a float that JSON can represent.
fn parse_finite(value: &str, name: &str) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Some(number),
        Ok(_) => {
            warn!(field = name, value = %value, "Non-finite number, skipping row");
            None
        }
        Err(e) => {
            warn!(field = name, value = %value, error = %e, "Invalid number, skipping row");
            None
        }
    }
}
