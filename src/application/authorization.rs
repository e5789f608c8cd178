// Authorization gate - Runs the store's permission flow
use crate::application::health_store::{AuthorizationStatus, HealthStore, StoreError};
use crate::domain::data_type::{DataTypeIdentifier, TypeRegistry};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// The permission flow itself could not run. Not recoverable at runtime.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("authorization request failed: {source}")]
pub struct FatalAuthorizationError {
    #[from]
    source: StoreError,
}

impl FatalAuthorizationError {
    pub fn store_error(&self) -> &StoreError {
        &self.source
    }
}

#[derive(Clone)]
pub struct AuthorizationGate {
    store: Arc<dyn HealthStore>,
    registry: Arc<TypeRegistry>,
}

impl AuthorizationGate {
    pub fn new(store: Arc<dyn HealthStore>, registry: Arc<TypeRegistry>) -> Self {
        Self { store, registry }
    }

    /// Issue one authorization request. Absent sets are treated as empty.
    ///
    /// `Ok(())` only says the flow completed; the user may have denied every
    /// type. Use [`authorization_status`](Self::authorization_status) for
    /// sharing state.
    pub async fn request_authorization(
        &self,
        read: Option<HashSet<DataTypeIdentifier>>,
        write: Option<HashSet<DataTypeIdentifier>>,
    ) -> Result<(), FatalAuthorizationError> {
        let read = self.registry.tokens(read.unwrap_or_default());
        let write = self.registry.tokens(write.unwrap_or_default());

        tracing::debug!(
            read = read.len(),
            write = write.len(),
            "Requesting health data authorization"
        );

        self.store.request_authorization(&read, &write).await?;
        Ok(())
    }

    pub async fn authorization_status(&self, data_type: DataTypeIdentifier) -> AuthorizationStatus {
        self.store
            .authorization_status(self.registry.token(data_type))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{registry, token, StubStore};

    fn gate(store: Arc<StubStore>) -> AuthorizationGate {
        AuthorizationGate::new(store, Arc::new(registry()))
    }

    #[tokio::test]
    async fn test_absent_sets_are_sent_empty() {
        let store = StubStore::new().into_shared();
        gate(store.clone())
            .request_authorization(None, None)
            .await
            .unwrap();

        let requests = store.authorization_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].0.is_empty());
        assert!(requests[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_identifiers_are_mapped_to_tokens() {
        let store = StubStore::new().into_shared();
        let read = HashSet::from([DataTypeIdentifier::HeartRate, DataTypeIdentifier::Workout]);
        let write = HashSet::from([DataTypeIdentifier::Workout]);

        gate(store.clone())
            .request_authorization(Some(read), Some(write))
            .await
            .unwrap();

        let requests = store.authorization_requests.lock().unwrap();
        assert_eq!(
            requests[0].0,
            HashSet::from([
                token(DataTypeIdentifier::HeartRate),
                token(DataTypeIdentifier::Workout)
            ])
        );
        assert_eq!(requests[0].1, HashSet::from([token(DataTypeIdentifier::Workout)]));
    }

    #[tokio::test]
    async fn test_store_failure_is_fatal() {
        let store = StubStore::new()
            .with_authorization(Err(StoreError::Unavailable))
            .into_shared();

        let err = gate(store)
            .request_authorization(Some(HashSet::from([DataTypeIdentifier::StepCount])), None)
            .await
            .unwrap_err();
        assert_eq!(err.store_error(), &StoreError::Unavailable);
    }

    #[tokio::test]
    async fn test_status_passes_through() {
        let store = StubStore::new().into_shared();
        *store.status.lock().unwrap() = AuthorizationStatus::SharingDenied;

        let status = gate(store)
            .authorization_status(DataTypeIdentifier::Workout)
            .await;
        assert_eq!(status, AuthorizationStatus::SharingDenied);
    }
}
