//! Caller identity extraction
//!
//! The actor is taken from `X-User-ID` when present, otherwise from
//! `Authorization` with an optional `Bearer ` prefix removed. Requests without
//! a usable identity are rejected; there is no implicit default principal.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use crate::error::GateError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity of the principal making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(String);

impl Actor {
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Resolve the actor from request headers
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        if let Some(id) = header_value(headers, USER_ID_HEADER) {
            return Self::new(id);
        }

        let authorization = header_value(headers, AUTHORIZATION.as_str())?;
        let id = match authorization.strip_prefix("Bearer") {
            Some(token) if token.is_empty() || token.starts_with(' ') => token,
            _ => authorization,
        };
        Self::new(id)
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // the gate stores the actor it resolved
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(actor.clone());
        }
        Self::from_headers(&parts.headers).ok_or(GateError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_user_id_header_wins() {
        let actor =
            Actor::from_headers(&headers(&[("x-user-id", "5"), ("authorization", "Bearer 7")]));
        assert_eq!(actor, Actor::new("5"));
    }

    #[test]
    fn test_bearer_prefix_is_stripped() {
        assert_eq!(
            Actor::from_headers(&headers(&[("authorization", "Bearer admin")])),
            Actor::new("admin")
        );
        assert_eq!(Actor::from_headers(&headers(&[("authorization", "42")])), Actor::new("42"));
    }

    #[test]
    fn test_missing_or_blank_identity() {
        assert!(Actor::from_headers(&HeaderMap::new()).is_none());
        assert!(Actor::from_headers(&headers(&[("x-user-id", "   ")])).is_none());
        assert!(Actor::from_headers(&headers(&[("authorization", "Bearer ")])).is_none());
    }
}
