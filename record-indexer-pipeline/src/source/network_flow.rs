//! Network flow reader for the CSE-CIC-IDS2018 processed traffic CSVs.

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use record_indexer_shared::NetworkFlow;
use tracing::{debug, info, warn};

use crate::errors::PipelineError;

const TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const MIN_FIELDS: usize = 3;

/// Parse network flow rows from a downloaded CSV prefix.
///
/// The first line is the header. When `truncated` is set the data was cut
/// at an arbitrary byte offset, so everything after the last newline is a
/// partial row and is dropped.
pub fn parse_network_flows(data: &[u8], truncated: bool) -> Result<Vec<NetworkFlow>, PipelineError> {
    let data = if truncated {
        match data.iter().rposition(|&b| b == b'\n') {
            Some(end) => &data[..=end],
            None => &[][..],
        }
    } else {
        data
    };

    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let mut flows = Vec::new();
    let mut rows = 0usize;

    for row in csv.byte_records() {
        let row = row.map_err(|e| PipelineError::read(format!("could not read records: {}", e)))?;
        rows += 1;

        let Some(row) = super::decode_row(row) else {
            continue;
        };

        let id = flows.len() as u64 + 1;
        if let Some(flow) = parse_row(&row, id) {
            flows.push(flow);
        }
    }

    info!(rows = rows, records = flows.len(), "Parsed network flows");
    Ok(flows)
}

fn parse_row(row: &StringRecord, id: u64) -> Option<NetworkFlow> {
    if row.len() < MIN_FIELDS {
        warn!(fields = row.len(), "Not enough required fields, skipping row");
        return None;
    }

    let raw_time = row.get(2).unwrap_or_default();
    let timestamp = match NaiveDateTime::parse_from_str(raw_time, TIME_FORMAT) {
        Ok(ts) => ts.and_utc(),
        Err(e) => {
            debug!(value = %raw_time, error = %e, "Invalid timestamp, skipping row");
            return None;
        }
    };

    Some(NetworkFlow {
        id,
        timestamp,
        dst_port: row.get(0).unwrap_or_default().to_string(),
        protocol: row.get(1).unwrap_or_default().to_string(),
    })
}
