//! Earthquake catalog records.

use serde::{Deserialize, Serialize};

use crate::Document;

/// Geographic coordinates as they appear in the catalog.
///
/// Values are kept verbatim; the index maps the object as a `geo_point` and
/// coerces the strings on ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lon: String,
}

/// One row of the significant-earthquakes catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Earthquake {
    /// 1-based identity, counted over accepted rows only.
    pub id: u64,
    /// Event time formatted as `YYYY-MM-DD hh:mm:ss`.
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    pub geo: Geo,
    /// Event type (e.g. `Earthquake`, `Nuclear Explosion`).
    #[serde(rename = "type")]
    pub kind: String,
    pub depth: f64,
    pub magnitude: f64,
    pub mag_type: String,
    pub source: String,
    pub source_id: String,
}

impl Document for Earthquake {
    fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Earthquake {
        Earthquake {
            id: 1,
            timestamp: "1965-01-02 13:44:18".to_string(),
            geo: Geo {
                lat: "19.246".to_string(),
                lon: "145.616".to_string(),
            },
            kind: "Earthquake".to_string(),
            depth: 131.6,
            magnitude: 6.0,
            mag_type: "MW".to_string(),
            source: "ISCGEM".to_string(),
            source_id: "ISCGEM860706".to_string(),
        }
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["@timestamp"], "1965-01-02 13:44:18");
        assert_eq!(value["geo"]["lat"], "19.246");
        assert_eq!(value["geo"]["lon"], "145.616");
        assert_eq!(value["type"], "Earthquake");
        assert_eq!(value["mag_type"], "MW");
        assert_eq!(value["source_id"], "ISCGEM860706");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_document_id() {
        assert_eq!(Document::id(&sample()), 1);
    }
}
