//! Durable state persistence.
//!
//! The whole engine persists as a single JSON document, loaded once at
//! startup and rewritten atomically after each mutating operation.

pub mod document;
pub mod fsync;

pub use document::{
    load_document, save_document_atomic, try_load_document, StateDocument, StateDocumentError,
    SCHEMA_VERSION,
};
