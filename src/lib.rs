pub mod cli;
pub mod commands;
pub mod error;
pub mod schema;
pub mod settings;

pub mod metadata {
    include!(concat!(env!("OUT_DIR"), "/pkg_info.rs"));
}

pub use crate::error::{SchemaError, SchemaResult, ServiceError, ServiceResult};
pub use crate::schema::{
    Document, Validation, ValidationOptions, Warning, encode_document, is_valid_document,
    parse_document, validate_document, validate_document_with,
};
