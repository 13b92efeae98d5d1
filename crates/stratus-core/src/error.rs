//! Error types for the resource model.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResourceError>;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Property '{property}' has unsupported {kind} value")]
    UnsupportedValue {
        property: String,
        kind: &'static str,
    },

    #[error("Resource record is missing '{0}'")]
    MissingField(&'static str),
}
