//! Index settings and mappings.
//!
//! This module defines the index bodies used when the loader is asked to
//! create its target index before ingesting.

use serde_json::{json, Value};

/// Default index for earthquake catalog documents.
pub const EARTHQUAKE_INDEX: &str = "earthquake_bulk";

/// Default index for network flow documents.
pub const NETWORK_FLOW_INDEX: &str = "netdata";

/// Settings and mappings for the earthquake index.
///
/// - `@timestamp` is parsed with the catalog's `yyyy-MM-dd HH:mm:ss` layout
/// - `geo` is a `geo_point`, so `lat`/`lon` strings are coerced on ingest
/// - categorical fields are keywords for aggregations
pub fn earthquake_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0
        },
        "mappings": {
            "properties": {
                "id": { "type": "long" },
                "@timestamp": {
                    "type": "date",
                    "format": "yyyy-MM-dd HH:mm:ss"
                },
                "geo": { "type": "geo_point" },
                "type": { "type": "keyword" },
                "depth": { "type": "float" },
                "magnitude": { "type": "float" },
                "mag_type": { "type": "keyword" },
                "source": { "type": "keyword" },
                "source_id": { "type": "keyword" }
            }
        }
    })
}

/// Settings and mappings for the network flow index.
pub fn network_flow_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0
        },
        "mappings": {
            "properties": {
                "timestamp": { "type": "date" },
                "dstport": { "type": "keyword" },
                "protocol": { "type": "keyword" }
            }
        }
    })
}
