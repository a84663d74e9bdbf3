//! Authorization gate placed ahead of each users route
//!
//! The gate resolves the caller, takes the record id from the route path (when
//! the route has one) and asks the decision engine the question configured for
//! that route. A denial ends the request with 403; a fault the engine could
//! not recover from ends it with 500. An allowed request continues unchanged,
//! with the resolved [`Actor`] stored in its extensions.

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use auth_fga::{AuthorizationService, Decision, Permission};

use crate::{actor::Actor, error::GateError};

/// The question a route asks before its handler runs
#[derive(Clone)]
pub struct PermissionGate {
    service: AuthorizationService,
    permission: Permission,
}

impl PermissionGate {
    pub fn new(service: AuthorizationService, permission: Permission) -> Self {
        Self {
            service,
            permission,
        }
    }

    /// Ask the configured question for `actor`, on `resource_id` when the
    /// question is about a single record.
    pub async fn authorize(
        &self,
        actor: &Actor,
        resource_id: Option<&str>,
    ) -> Result<Decision, GateError> {
        let decision = self
            .service
            .decide(self.permission, actor.id(), resource_id)
            .await?;

        if decision.allowed {
            debug!(
                actor = %actor,
                permission = %self.permission,
                resource_id,
                source = ?decision.source,
                "Access granted"
            );
            Ok(decision)
        } else {
            warn!(
                actor = %actor,
                permission = %self.permission,
                resource_id,
                source = ?decision.source,
                "Access denied"
            );
            Err(GateError::Forbidden {
                permission: self.permission,
            })
        }
    }
}

/// Middleware enforcing a [`PermissionGate`].
///
/// Use with `axum::middleware::from_fn_with_state(gate, enforce_permission)`.
pub async fn enforce_permission(
    State(gate): State<PermissionGate>,
    actor: Actor,
    path: Option<Path<String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let resource_id = path.as_ref().map(|Path(id)| id.as_str());
    gate.authorize(&actor, resource_id).await?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
