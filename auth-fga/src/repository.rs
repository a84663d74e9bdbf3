use crate::{client::TupleStoreClient, error::FgaError, models::*};
use async_trait::async_trait;
use dashmap::DashSet;
use std::sync::Arc;

/// In-memory tuple store for testing and development.
///
/// `check` is an exact tuple lookup: there is no relation rewriting, so the
/// answer is `true` only for tuples that were written directly.
#[derive(Clone)]
pub struct InMemoryTupleStore {
    tuples: Arc<DashSet<Tuple>>,
}

impl InMemoryTupleStore {
    pub fn new() -> Self {
        Self {
            tuples: Arc::new(DashSet::new()),
        }
    }

    /// Create a store pre-populated with `tuples`
    pub fn with_tuples(tuples: impl IntoIterator<Item = Tuple>) -> Self {
        let store = Self::new();
        for tuple in tuples {
            store.tuples.insert(tuple);
        }
        store
    }

    pub fn contains(&self, tuple: &Tuple) -> bool {
        self.tuples.contains(tuple)
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Tuples whose object is `object`
    pub fn tuples_for(&self, object: &Object) -> Vec<Tuple> {
        self.tuples
            .iter()
            .filter(|entry| entry.key().object == *object)
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl Default for InMemoryTupleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TupleStoreClient for InMemoryTupleStore {
    async fn check(&self, tuple: &Tuple) -> Result<bool, FgaError> {
        Ok(self.tuples.contains(tuple))
    }

    async fn write_tuple(&self, tuple: &Tuple) -> Result<(), FgaError> {
        if self.tuples.insert(tuple.clone()) {
            Ok(())
        } else {
            Err(FgaError::TupleAlreadyExists(tuple.to_string()))
        }
    }

    async fn delete_tuple(&self, tuple: &Tuple) -> Result<(), FgaError> {
        match self.tuples.remove(tuple) {
            Some(_) => Ok(()),
            None => Err(FgaError::TupleNotFound(tuple.to_string())),
        }
    }

    async fn read_authorization_models(&self) -> Result<Vec<String>, FgaError> {
        Ok(vec!["in-memory".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TupleOutcome;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryTupleStore::new();

        let tuple = Tuple::new(Subject::user("alice"), Relation::CanRead, Object::user("bob"));

        // Write tuple
        store.write_tuple(&tuple).await.unwrap();

        // Check it exists
        assert!(store.check(&tuple).await.unwrap());

        // Duplicate write is distinguished from failure
        assert!(matches!(
            store.write_tuple(&tuple).await,
            Err(FgaError::TupleAlreadyExists(_))
        ));

        // Delete tuple
        store.delete_tuple(&tuple).await.unwrap();
        assert!(!store.check(&tuple).await.unwrap());
        assert!(matches!(
            store.delete_tuple(&tuple).await,
            Err(FgaError::TupleNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_batch_outcomes() {
        let existing = Tuple::new(Subject::admin(), Relation::CanRead, Object::user("1"));
        let fresh = Tuple::new(Subject::admin(), Relation::CanWrite, Object::user("1"));
        let store = InMemoryTupleStore::with_tuples([existing.clone()]);

        let summary = store.write_tuples(&[existing.clone(), fresh.clone()]).await;
        assert_eq!(summary.attempted(), 2);
        assert_eq!(summary.count(TupleOutcome::AlreadyExists), 1);
        assert_eq!(summary.count(TupleOutcome::Written), 1);
        assert_eq!(summary.failed(), 0);

        let summary = store.delete_tuples(&[fresh.clone(), fresh]).await;
        assert_eq!(summary.count(TupleOutcome::Deleted), 1);
        assert_eq!(summary.count(TupleOutcome::Missing), 1);
        assert_eq!(store.tuples_for(&Object::user("1")), vec![existing]);
    }
}
