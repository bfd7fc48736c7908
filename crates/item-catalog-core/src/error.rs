//! Error taxonomy surfaced by the query reconciler.

use thiserror::Error;

use crate::store::StoreError;

/// The two ways a list query can fail.
///
/// Store failures of every kind collapse into [`QueryError::TransportFailure`];
/// callers decide on messaging and retry policy.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("fetch failed: {0}")]
    TransportFailure(#[source] StoreError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        QueryError::TransportFailure(err)
    }
}

impl QueryError {
    pub fn is_transport(&self) -> bool {
        matches!(self, QueryError::TransportFailure(_))
    }
}
