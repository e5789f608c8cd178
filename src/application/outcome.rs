// Query outcomes delivered to callers
use crate::application::health_store::StoreError;
use crate::domain::data_type::DataTypeIdentifier;
use thiserror::Error;

/// Result of a single query.
///
/// Callers can tell a missing permission apart from a broken store. An empty
/// but successful query is `Success` with an empty collection.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    Success(T),
    Unauthorized,
    TransportFailure(String),
}

impl<T> QueryOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            QueryOutcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> QueryOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            QueryOutcome::Success(value) => QueryOutcome::Success(f(value)),
            QueryOutcome::Unauthorized => QueryOutcome::Unauthorized,
            QueryOutcome::TransportFailure(reason) => QueryOutcome::TransportFailure(reason),
        }
    }
}

/// Why a query produced nothing usable
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryFailure {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("store returned no result")]
    Absent,
    #[error("malformed result: {0}")]
    Malformed(String),
    #[error("{0} does not support sample queries")]
    Unsupported(DataTypeIdentifier),
}

impl QueryFailure {
    pub fn into_outcome<T>(self) -> QueryOutcome<T> {
        match self {
            QueryFailure::Store(StoreError::AuthorizationDenied)
            | QueryFailure::Store(StoreError::AuthorizationNotDetermined)
            | QueryFailure::Absent => QueryOutcome::Unauthorized,
            other => QueryOutcome::TransportFailure(other.to_string()),
        }
    }
}

/// Turn a raw query result into an outcome, logging exactly once on failure
pub(crate) fn settle<T>(
    data_type: DataTypeIdentifier,
    result: Result<T, QueryFailure>,
) -> QueryOutcome<T> {
    match result {
        Ok(value) => QueryOutcome::Success(value),
        Err(failure) => {
            tracing::warn!(%data_type, error = %failure, "health query produced no result");
            failure.into_outcome()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        assert_eq!(
            QueryFailure::Absent.into_outcome::<()>(),
            QueryOutcome::Unauthorized
        );
        assert_eq!(
            QueryFailure::Store(StoreError::AuthorizationDenied).into_outcome::<()>(),
            QueryOutcome::Unauthorized
        );
        assert_eq!(
            QueryFailure::Store(StoreError::Transport("database locked".into()))
                .into_outcome::<()>(),
            QueryOutcome::TransportFailure("store failure: database locked".to_string())
        );
        assert!(matches!(
            QueryFailure::Malformed("wrong sample kind".into()).into_outcome::<()>(),
            QueryOutcome::TransportFailure(_)
        ));
    }

    #[test]
    fn test_outcome_helpers() {
        let outcome = QueryOutcome::Success(vec![1, 2, 3]).map(|v| v.len());
        assert!(outcome.is_success());
        assert_eq!(outcome.success(), Some(3));
        assert_eq!(QueryOutcome::<u8>::Unauthorized.success(), None);
    }
}
