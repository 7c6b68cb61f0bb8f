//! Record sources for the record indexer pipeline.
//!
//! Sources turn raw CSV input into an ordered, finished sequence of typed
//! records. Malformed rows are logged and skipped; identities are assigned
//! only to accepted rows.

use csv::{ByteRecord, StringRecord};
use tracing::warn;

mod earthquake;
mod network_flow;
mod object_fetch;

pub use earthquake::{open_earthquakes, read_earthquakes, EARTHQUAKE_MIN_FIELDS};
pub use network_flow::parse_network_flows;
pub use object_fetch::{FetchedPrefix, ObjectFetcher, DEFAULT_REGION};

/// Decode a raw row, skipping it when a field is not valid UTF-8.
fn decode_row(row: ByteRecord) -> Option<StringRecord> {
    let line = row.position().map(|p| p.line());
    match StringRecord::from_byte_record(row) {
        Ok(row) => Some(row),
        Err(e) => {
            warn!(line = ?line, error = %e, "Invalid UTF-8, skipping row");
            None
        }
    }
}
