pub mod achievement;
pub mod alias;
pub mod consistency;
pub mod registry;
pub mod report;
pub mod types;
pub mod validator;

use serde_json::Value;

pub use crate::schema::achievement::{Achievement, Milestone, MilestoneProgress, ProgressField};
pub use crate::schema::consistency::{ConsistencyIssue, check_references};
pub use crate::schema::report::{ValidationReport, build_report};
pub use crate::schema::types::*;
pub use crate::schema::validator::{
    Validation, ValidationOptions, Warning, validate_document, validate_document_with,
};

use crate::error::SchemaResult;

pub fn parse_document_with(text: &str, options: &ValidationOptions) -> SchemaResult<Validation> {
    let value: Value = serde_json::from_str(text)?;
    validate_document_with(&value, options)
}

pub fn parse_document(text: &str) -> SchemaResult<Validation> {
    parse_document_with(text, &ValidationOptions::default())
}

/// Re-encodes a document into the export's JSON shape.
pub fn encode_document(document: &Document) -> SchemaResult<Value> {
    document.to_value()
}

pub fn is_valid_document(text: &str) -> bool {
    parse_document(text).is_ok()
}
