//! Startup diagnostics and baseline relationship seeding

use tracing::{info, warn};

use crate::{client::BatchSummary, handle::FgaClientHandle, models::*};

/// Baseline relationships every deployment starts from: the admin can list
/// and create users, and the seeded user `1` owns its own record.
pub fn baseline_tuples() -> Vec<Tuple> {
    let collection = Object::users_collection();
    let admin = Subject::admin();
    let first = Subject::user("1");
    let first_record = Object::user("1");

    vec![
        Tuple::new(admin.clone(), Relation::CanReadAll, collection.clone()),
        Tuple::new(admin, Relation::CanCreate, collection),
        Tuple::new(first.clone(), Relation::Owner, first_record.clone()),
        Tuple::new(first.clone(), Relation::CanRead, first_record.clone()),
        Tuple::new(first.clone(), Relation::CanWrite, first_record.clone()),
        Tuple::new(first, Relation::CanDelete, first_record),
    ]
}

/// Check that the authorization service answers. Never fails.
pub async fn probe_connectivity(handle: &FgaClientHandle) -> bool {
    match handle.get().await {
        Ok(Some(client)) => {
            let reachable = client.probe_connectivity().await;
            if reachable {
                info!("OpenFGA connectivity check passed");
            } else {
                warn!(
                    "OpenFGA is configured but not reachable, \
                     decisions will use fallback authorization"
                );
            }
            reachable
        }
        Ok(None) => {
            info!("OpenFGA not configured, skipping connectivity check");
            false
        }
        Err(e) => {
            warn!(error = %e, "OpenFGA configuration is invalid, skipping connectivity check");
            false
        }
    }
}

/// Write [`baseline_tuples`], tolerating duplicates.
///
/// Returns `None` when no client is available.
pub async fn seed_relationships(handle: &FgaClientHandle) -> Option<BatchSummary> {
    let client = match handle.get().await {
        Ok(Some(client)) => client,
        Ok(None) => {
            info!("OpenFGA not configured, skipping relationship seeding");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "OpenFGA configuration is invalid, skipping relationship seeding");
            return None;
        }
    };

    let summary = client.write_tuples(&baseline_tuples()).await;
    info!(
        written = summary.succeeded(),
        already_existed = summary.skipped(),
        failed = summary.failed(),
        "Seeded baseline OpenFGA relationships"
    );
    Some(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryTupleStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_twice() {
        let store = Arc::new(InMemoryTupleStore::new());
        let handle = FgaClientHandle::with_client(store.clone());

        let first = seed_relationships(&handle).await.unwrap();
        assert_eq!(first.succeeded(), 6);

        let second = seed_relationships(&handle).await.unwrap();
        assert_eq!(second.skipped(), 6);
        assert_eq!(second.failed(), 0);
        assert_eq!(store.len(), 6);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let handle = FgaClientHandle::unavailable();
        assert!(!probe_connectivity(&handle).await);
        assert!(seed_relationships(&handle).await.is_none());
    }
}
