//! Bulk API wire format.
//!
//! A bulk body is newline-delimited JSON: for every document an action line
//! `{"index":{"_id":"<id>"}}` followed by the document itself, each line
//! terminated by `\n`. This module builds such bodies and decodes the
//! responses the store sends back.

use serde_json::{json, Value};

use crate::errors::StoreError;
use crate::types::{BulkOutcome, ItemFailure};
use record_indexer_shared::Document;

/// A reusable bulk request body.
///
/// A worker keeps one `BulkBody` for its whole lifetime and clears it after
/// each batch, so the allocation is reused across requests.
#[derive(Debug, Default)]
pub struct BulkBody {
    buf: Vec<u8>,
    docs: usize,
}

impl BulkBody {
    /// Create an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty body with room for `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            docs: 0,
        }
    }

    /// Append one action/document pair.
    ///
    /// The document is serialized before anything is written, so a failing
    /// document leaves the body untouched and the caller can skip it.
    pub fn push<D: Document>(&mut self, document: &D) -> Result<(), StoreError> {
        let data =
            serde_json::to_vec(document).map_err(|e| StoreError::serialization(e.to_string()))?;
        let action = action_line(document.id());

        self.buf.reserve(action.len() + data.len() + 2);
        self.buf.extend_from_slice(action.as_bytes());
        self.buf.push(b'\n');
        self.buf.extend_from_slice(&data);
        self.buf.push(b'\n');
        self.docs += 1;
        Ok(())
    }

    /// The encoded body.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of documents in the body.
    pub fn len(&self) -> usize {
        self.docs
    }

    pub fn is_empty(&self) -> bool {
        self.docs == 0
    }

    /// Reset the body, keeping its allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.docs = 0;
    }
}

/// Build the action line for a document id.
pub fn action_line(id: u64) -> String {
    json!({ "index": { "_id": id.to_string() } }).to_string()
}

/// Decode the body of a bulk response the store accepted.
///
/// Only items carrying an `error` object are collected; the top-level
/// `errors` flag is a hint and is not trusted on its own.
pub fn parse_bulk_response(body: &Value) -> BulkOutcome {
    let took_ms = body.get("took").and_then(Value::as_u64).unwrap_or(0);
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let failures = items
        .iter()
        .filter_map(|item| {
            // Each item is keyed by its action: index, create, update or delete.
            let result = item.as_object()?.values().next()?;
            let error = result.get("error")?;
            Some(ItemFailure {
                id: result
                    .get("_id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                status: result
                    .get("status")
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as u16,
                kind: error_field(error, "type"),
                reason: error_field(error, "reason"),
            })
        })
        .collect();

    BulkOutcome {
        took_ms,
        items: items.len(),
        failures,
    }
}

/// Decode a non-success response into a [`StoreError::Rejected`].
///
/// Stores answer with `{"error":{"type":..,"reason":..},"status":..}`. Older
/// servers send `error` as a plain string, and proxies may send no JSON at all;
/// both are still reported with whatever information is present.
pub fn parse_error_response(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("error") {
            Some(error @ Value::Object(_)) => StoreError::rejected(
                status,
                error_field(error, "type"),
                error_field(error, "reason"),
            ),
            Some(Value::String(reason)) => StoreError::rejected(status, "error", reason.as_str()),
            _ => StoreError::rejected(status, "unknown", body),
        },
        Err(_) => StoreError::rejected(status, "unknown", body),
    }
}

fn error_field(error: &Value, field: &str) -> String {
    error
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::{Serialize, Serializer};

    #[derive(Serialize)]
    struct Row {
        #[serde(skip)]
        id: u64,
        name: &'static str,
    }

    impl Document for Row {
        fn id(&self) -> u64 {
            self.id
        }
    }

    struct Broken;

    impl Serialize for Broken {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("unsupported value"))
        }
    }

    impl Document for Broken {
        fn id(&self) -> u64 {
            99
        }
    }

    #[test]
    fn test_action_line() {
        assert_eq!(action_line(17), r#"{"index":{"_id":"17"}}"#);
    }

    #[test]
    fn test_body_layout() {
        let mut body = BulkBody::new();
        body.push(&Row { id: 1, name: "a" }).unwrap();
        body.push(&Row { id: 2, name: "b" }).unwrap();

        let text = std::str::from_utf8(body.as_bytes()).unwrap();
        assert_eq!(
            text,
            "{\"index\":{\"_id\":\"1\"}}\n{\"name\":\"a\"}\n{\"index\":{\"_id\":\"2\"}}\n{\"name\":\"b\"}\n"
        );
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_failed_document_leaves_body_untouched() {
        let mut body = BulkBody::new();
        body.push(&Row { id: 1, name: "a" }).unwrap();
        let before = body.as_bytes().to_vec();

        let err = body.push(&Broken).unwrap_err();

        assert!(matches!(err, StoreError::SerializationError(_)));
        assert_eq!(body.as_bytes(), before.as_slice());
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut body = BulkBody::with_capacity(1024);
        body.push(&Row { id: 1, name: "a" }).unwrap();
        body.clear();

        assert!(body.is_empty());
        assert!(body.as_bytes().is_empty());
        assert!(body.buf.capacity() >= 1024);
    }

    #[test]
    fn test_parse_bulk_response_success() {
        let response = json!({
            "took": 30,
            "errors": false,
            "items": [
                { "index": { "_id": "1", "status": 201, "result": "created" } },
                { "index": { "_id": "2", "status": 200, "result": "updated" } }
            ]
        });

        let outcome = parse_bulk_response(&response);

        assert_eq!(outcome.took_ms, 30);
        assert_eq!(outcome.items, 2);
        assert_eq!(outcome.succeeded(), 2);
        assert!(!outcome.has_failures());
    }

    #[test]
    fn test_parse_bulk_response_item_failures() {
        let response = json!({
            "took": 12,
            "errors": true,
            "items": [
                { "index": { "_id": "1", "status": 201 } },
                {
                    "index": {
                        "_id": "2",
                        "status": 400,
                        "error": {
                            "type": "mapper_parsing_exception",
                            "reason": "failed to parse field [depth]"
                        }
                    }
                }
            ]
        });

        let outcome = parse_bulk_response(&response);

        assert_eq!(outcome.items, 2);
        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(
            outcome.failures,
            vec![ItemFailure {
                id: "2".to_string(),
                status: 400,
                kind: "mapper_parsing_exception".to_string(),
                reason: "failed to parse field [depth]".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_bulk_response_missing_items() {
        let outcome = parse_bulk_response(&json!({ "took": 1 }));
        assert_eq!(outcome.items, 0);
        assert!(!outcome.has_failures());
    }

    #[test]
    fn test_parse_error_response_structured() {
        let body = r#"{"error":{"type":"index_not_found_exception","reason":"no such index [quakes]"},"status":404}"#;

        match parse_error_response(404, body) {
            StoreError::Rejected {
                status,
                kind,
                reason,
            } => {
                assert_eq!(status, 404);
                assert_eq!(kind, "index_not_found_exception");
                assert_eq!(reason, "no such index [quakes]");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_response_unstructured() {
        match parse_error_response(502, "Bad Gateway") {
            StoreError::Rejected { status, kind, reason } => {
                assert_eq!(status, 502);
                assert_eq!(kind, "unknown");
                assert_eq!(reason, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match parse_error_response(400, r#"{"error":"request body is required"}"#) {
            StoreError::Rejected { kind, reason, .. } => {
                assert_eq!(kind, "error");
                assert_eq!(reason, "request body is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
