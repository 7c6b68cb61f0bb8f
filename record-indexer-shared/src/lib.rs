//! # Record Indexer Shared
//!
//! Record types shared by the ingest pipeline and the document store
//! repository. Every record carries a stable integer identity that becomes
//! its document id in the index.

mod document;
mod earthquake;
mod network_flow;

pub use document::Document;
pub use earthquake::{Earthquake, Geo};
pub use network_flow::NetworkFlow;
