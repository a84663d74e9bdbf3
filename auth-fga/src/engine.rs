use crate::{
    error::{FgaError, Result},
    handle::FgaClientHandle,
    models::*,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authorization decisions for the users collection.
///
/// Every question is answered by exactly one live relationship check. When no
/// client is configured, or the check fails in any recoverable way, the answer
/// comes from [`fallback_allows`] instead. Both of those cases are mapped by
/// the same resolution step, so they cannot drift apart.
#[derive(Clone)]
pub struct AuthorizationService {
    handle: Arc<FgaClientHandle>,
}

impl AuthorizationService {
    pub fn new(handle: Arc<FgaClientHandle>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &Arc<FgaClientHandle> {
        &self.handle
    }

    // =============================================================================
    // Permission questions
    // =============================================================================

    pub async fn can_read_user(&self, resource_id: &str, actor: &str) -> Result<bool> {
        self.allowed(Permission::CanRead, actor, Some(resource_id)).await
    }

    pub async fn can_write_user(&self, resource_id: &str, actor: &str) -> Result<bool> {
        self.allowed(Permission::CanWrite, actor, Some(resource_id)).await
    }

    pub async fn can_delete_user(&self, resource_id: &str, actor: &str) -> Result<bool> {
        self.allowed(Permission::CanDelete, actor, Some(resource_id)).await
    }

    pub async fn can_read_all_users(&self, actor: &str) -> Result<bool> {
        self.allowed(Permission::CanReadAll, actor, None).await
    }

    pub async fn can_create_users(&self, actor: &str) -> Result<bool> {
        self.allowed(Permission::CanCreate, actor, None).await
    }

    pub async fn allowed(
        &self,
        permission: Permission,
        actor: &str,
        resource_id: Option<&str>,
    ) -> Result<bool> {
        Ok(self.decide(permission, actor, resource_id).await?.allowed)
    }

    /// Decide `permission` for `actor`, on `resource_id` for per-resource
    /// questions (ignored for collection questions).
    ///
    /// Only configuration and internal faults are returned as errors.
    pub async fn decide(
        &self,
        permission: Permission,
        actor: &str,
        resource_id: Option<&str>,
    ) -> Result<Decision> {
        let question = match Question::new(permission, actor, resource_id) {
            Ok(question) => question,
            Err(e) => {
                debug!(permission = %permission, error = %e, "Denying without a remote check");
                return Ok(Decision::rejected());
            }
        };

        let outcome = self.remote_check(&question).await;
        self.resolve(&question, outcome)
    }

    /// Run the single remote check for a question
    async fn remote_check(&self, question: &Question<'_>) -> Result<bool> {
        let client = self
            .handle
            .get()
            .await?
            .ok_or_else(|| FgaError::Unavailable("OpenFGA client not configured".to_string()))?;

        let timeout = self.handle.timeout();
        match tokio::time::timeout(timeout, client.check(&question.tuple())).await {
            Ok(result) => result,
            Err(_) => Err(FgaError::Timeout(timeout)),
        }
    }

    /// Map the remote outcome to a decision
    fn resolve(&self, question: &Question<'_>, outcome: Result<bool>) -> Result<Decision> {
        match outcome {
            Ok(allowed) => Ok(Decision::remote(allowed)),
            Err(e) if e.is_recoverable() => {
                let allowed =
                    fallback_allows(question.permission, question.actor, question.resource_id);
                match &e {
                    FgaError::Unavailable(_) => debug!(
                        permission = %question.permission,
                        actor = question.actor,
                        allowed,
                        "Using fallback authorization"
                    ),
                    _ => warn!(
                        permission = %question.permission,
                        actor = question.actor,
                        error = %e,
                        error_kind = e.kind(),
                        allowed,
                        "OpenFGA check failed, using fallback authorization"
                    ),
                }
                Ok(Decision::fallback(allowed))
            }
            Err(e) => Err(e),
        }
    }
}

/// A validated question: identifiers are trimmed and non-blank
struct Question<'a> {
    permission: Permission,
    actor: &'a str,
    resource_id: Option<&'a str>,
}

impl<'a> Question<'a> {
    fn new(permission: Permission, actor: &'a str, resource_id: Option<&'a str>) -> Result<Self> {
        let actor = normalize_id(actor).ok_or(FgaError::InvalidIdentifier("actor id"))?;
        let resource_id = if permission.is_per_resource() {
            let id = resource_id
                .and_then(normalize_id)
                .ok_or(FgaError::InvalidIdentifier("resource id"))?;
            Some(id)
        } else {
            None
        };
        Ok(Self {
            permission,
            actor,
            resource_id,
        })
    }

    fn tuple(&self) -> Tuple {
        let object = match self.resource_id {
            Some(id) => Object::user(id),
            None => Object::users_collection(),
        };
        Tuple::new(Subject::user(self.actor), self.permission.relation(), object)
    }
}

/// The local rule used when the relationship check cannot be completed.
///
/// Per-resource questions allow the record's own principal and the admin;
/// collection questions allow only the admin. Blank identifiers never allow.
pub fn fallback_allows(permission: Permission, actor: &str, resource_id: Option<&str>) -> bool {
    let Some(actor) = normalize_id(actor) else {
        return false;
    };
    let is_admin = actor == ADMIN_PRINCIPAL;

    if permission.is_per_resource() {
        match resource_id.and_then(normalize_id) {
            Some(resource_id) => is_admin || actor == resource_id,
            None => false,
        }
    } else {
        is_admin
    }
}
