use thiserror::Error;

/// Errors surfaced by the pricing table and the aggregation pipeline.
///
/// Only `InvalidQuantity` aborts an `aggregate` call; `NotFound` and
/// `MissingInput` are folded into the report as flagged line items.
#[derive(Debug, Error)]
pub enum CostError {
    #[error("pricing identifier '{identifier}' not found")]
    NotFound { identifier: String },

    #[error("required field '{field}' not supplied")]
    MissingInput { field: String },

    #[error("'{field}' must be a non-negative finite number (got {value})")]
    InvalidQuantity { field: String, value: f64 },

    #[error("unit price for '{identifier}' must be a non-negative finite number (got {value})")]
    InvalidPrice { identifier: String, value: f64 },

    #[error("pricing entry has an empty identifier")]
    EmptyIdentifier,
}
