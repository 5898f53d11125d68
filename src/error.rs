use thiserror::Error;

/// Problems with the schema itself, detected before any row is read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("scope '{scope}' declares no identity columns")]
    MissingIdentity { scope: String },

    #[error("scope '{scope}' contains a property with an empty name")]
    EmptyName { scope: String },

    #[error("column '{name}' in scope '{scope}' reads from an empty source field")]
    EmptyColumn { scope: String, name: String },

    #[error("scope '{scope}' declares '{name}' more than once")]
    DuplicateName { scope: String, name: String },

    #[error("scope '{scope}' is nested deeper than the configured limit of {max_depth}")]
    TooDeep { scope: String, max_depth: usize },
}

/// Errors that abort a hydration run.
#[derive(Debug, Error)]
pub enum HydrateError {
    #[error("row {row}: field '{field}' required by scope '{scope}' is missing")]
    MissingField {
        row: usize,
        scope: String,
        field: String,
    },

    #[error("row {row}: expected an object")]
    NotAnObject { row: usize },

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
