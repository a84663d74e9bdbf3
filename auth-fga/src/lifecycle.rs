//! Keeps relationship tuples in step with user records
//!
//! Hooks are called by the resource store after a record is committed or
//! removed. They never fail the caller: an unavailable service, a blank id or
//! a rejected tuple only shows up in the logs and in the returned summary.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    client::BatchSummary,
    handle::{FgaClientHandle, SharedClient},
    models::*,
};

/// Translates record lifecycle events into tuple writes and deletes
#[derive(Clone)]
pub struct TupleLifecycleManager {
    handle: Arc<FgaClientHandle>,
}

impl TupleLifecycleManager {
    pub fn new(handle: Arc<FgaClientHandle>) -> Self {
        Self { handle }
    }

    /// Tuples written when user record `resource_id` is created.
    ///
    /// The record's own principal gets ownership and full access, and the
    /// admin gets read/write/delete on it.
    pub fn creation_tuples(resource_id: &str) -> Vec<Tuple> {
        let object = Object::user(resource_id);
        let owner = Subject::user(resource_id);
        let admin = Subject::admin();

        vec![
            Tuple::new(owner.clone(), Relation::Owner, object.clone()),
            Tuple::new(owner.clone(), Relation::CanRead, object.clone()),
            Tuple::new(owner.clone(), Relation::CanWrite, object.clone()),
            Tuple::new(owner, Relation::CanDelete, object.clone()),
            Tuple::new(admin.clone(), Relation::CanRead, object.clone()),
            Tuple::new(admin.clone(), Relation::CanWrite, object.clone()),
            Tuple::new(admin, Relation::CanDelete, object),
        ]
    }

    /// Tuples removed when user record `resource_id` is deleted.
    ///
    /// Only the ownership tuple goes; the remaining grants reference an object
    /// id that is never reused.
    pub fn deletion_tuples(resource_id: &str) -> Vec<Tuple> {
        vec![Tuple::new(
            Subject::user(resource_id),
            Relation::Owner,
            Object::user(resource_id),
        )]
    }

    /// Record `resource_id` was created by `creator_id`.
    ///
    /// Returns `None` when nothing was attempted.
    pub async fn on_resource_created(
        &self,
        resource_id: &str,
        creator_id: &str,
    ) -> Option<BatchSummary> {
        let (Some(resource_id), Some(creator_id)) =
            (normalize_id(resource_id), normalize_id(creator_id))
        else {
            warn!("Skipping relationship creation for a blank user or creator id");
            return None;
        };

        let client = self.client("creation", resource_id).await?;
        let summary = client.write_tuples(&Self::creation_tuples(resource_id)).await;

        if summary.failed() > 0 {
            error!(
                user_id = resource_id,
                created_by = creator_id,
                written = summary.succeeded(),
                already_existed = summary.skipped(),
                failed = summary.failed(),
                "Some OpenFGA relationships could not be created"
            );
        } else {
            info!(
                user_id = resource_id,
                created_by = creator_id,
                written = summary.succeeded(),
                already_existed = summary.skipped(),
                "Created OpenFGA relationships"
            );
        }
        Some(summary)
    }

    /// Record `resource_id` was deleted.
    ///
    /// Returns `None` when nothing was attempted.
    pub async fn on_resource_deleted(&self, resource_id: &str) -> Option<BatchSummary> {
        let Some(resource_id) = normalize_id(resource_id) else {
            warn!("Skipping relationship removal for a blank user id");
            return None;
        };

        let client = self.client("removal", resource_id).await?;
        let summary = client.delete_tuples(&Self::deletion_tuples(resource_id)).await;

        if summary.failed() > 0 {
            error!(user_id = resource_id, "Failed to remove OpenFGA relationships");
        } else {
            info!(
                user_id = resource_id,
                deleted = summary.succeeded(),
                already_absent = summary.skipped(),
                "Removed OpenFGA relationships"
            );
        }
        Some(summary)
    }

    async fn client(&self, what: &str, resource_id: &str) -> Option<SharedClient> {
        match self.handle.get().await {
            Ok(Some(client)) => Some(client),
            Ok(None) => {
                debug!(
                    user_id = resource_id,
                    "OpenFGA not available, skipping relationship {}", what
                );
                None
            }
            Err(e) => {
                error!(
                    user_id = resource_id,
                    error = %e,
                    "OpenFGA misconfigured, skipping relationship {}", what
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_tuples() {
        let tuples = TupleLifecycleManager::creation_tuples("42");
        assert_eq!(tuples.len(), 7);
        assert!(tuples.iter().all(|t| t.object == Object::user("42")));
        assert_eq!(tuples.iter().filter(|t| t.subject == Subject::user("42")).count(), 4);
        assert_eq!(tuples.iter().filter(|t| t.subject == Subject::admin()).count(), 3);
    }

    #[tokio::test]
    async fn test_unavailable_is_a_no_op() {
        let manager = TupleLifecycleManager::new(Arc::new(FgaClientHandle::unavailable()));
        assert!(manager.on_resource_created("42", "7").await.is_none());
        assert!(manager.on_resource_deleted("42").await.is_none());
    }
}
