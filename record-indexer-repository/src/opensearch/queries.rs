//! Search query builders.

use serde_json::{json, Value};

/// Build a `match` query on a single field.
///
/// Total hit counting is enabled so the reported total is exact rather than
/// capped at 10 000.
pub fn match_query(field: &str, value: &str) -> Value {
    json!({
        "query": {
            "match": {
                field: value
            }
        },
        "track_total_hits": true
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_query() {
        let query = match_query("dstport", "443");

        assert_eq!(query["query"]["match"]["dstport"], "443");
        assert_eq!(query["track_total_hits"], true);
    }
}
