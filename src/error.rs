//! Error kinds surfaced by the evaluators and the routing providers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    /// A required column is absent from the trip table after renaming.
    #[error("required column '{canonical}' not found (looked for '{column}')")]
    MissingColumn { canonical: String, column: String },

    #[error("row {row}: column '{column}' has unparseable value '{value}': {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("trip table has no rows")]
    EmptyTable,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure of a single provider query.
///
/// Both kinds are recorded per trip and never abort a batch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Transport failure, non-success HTTP status, or a response body that
    /// does not have the expected shape.
    #[error("{provider} query failed: {message}")]
    Query { provider: String, message: String },

    /// The provider answered but reported that no route is available.
    #[error("{provider} returned no route (code {code}): {message}")]
    Logical {
        provider: String,
        code: String,
        message: String,
    },
}

impl ProviderError {
    pub fn query(provider: &str, message: impl Into<String>) -> Self {
        ProviderError::Query {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn logical(provider: &str, code: impl ToString, message: impl Into<String>) -> Self {
        ProviderError::Logical {
            provider: provider.to_string(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
