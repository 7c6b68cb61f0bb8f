//! Network flow records from the CSE-CIC-IDS2018 processed traffic dataset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Document;

/// A single network flow row.
///
/// Only the destination port, protocol and flow timestamp are indexed. The
/// identity is not part of the document body; it is carried as the `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkFlow {
    #[serde(skip)]
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "dstport")]
    pub dst_port: String,
    pub protocol: String,
}

impl Document for NetworkFlow {
    fn id(&self) -> u64 {
        self.id
    }
}
