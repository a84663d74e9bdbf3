use serde::{Deserialize, Serialize};
use std::fmt;

/// Principal that the fallback policy and the creation tuples treat as the
/// administrator of the users collection.
pub const ADMIN_PRINCIPAL: &str = "admin";

/// Object every collection-level question is asked against.
pub const USERS_COLLECTION_OBJECT: &str = "users_collection:all";

const USER_TYPE: &str = "user";

/// Represents a subject in the authorization system (`user:<id>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn user(user_id: &str) -> Self {
        Self(format!("{}:{}", USER_TYPE, user_id))
    }

    pub fn admin() -> Self {
        Self::user(ADMIN_PRINCIPAL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents an object (resource) in the authorization system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object(String);

impl Object {
    /// A single user record
    pub fn user(resource_id: &str) -> Self {
        Self(format!("{}:{}", USER_TYPE, resource_id))
    }

    /// The sentinel object standing for the whole users collection
    pub fn users_collection() -> Self {
        Self(USERS_COLLECTION_OBJECT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relations defined on `user` and `users_collection` objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Owner,
    CanRead,
    CanWrite,
    CanDelete,
    CanReadAll,
    CanCreate,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Owner => "owner",
            Relation::CanRead => "can_read",
            Relation::CanWrite => "can_write",
            Relation::CanDelete => "can_delete",
            Relation::CanReadAll => "can_read_all",
            Relation::CanCreate => "can_create",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a relationship tuple: subject has relation to object.
///
/// Serializes to the wire shape of a tuple key:
/// `{"user": "...", "relation": "...", "object": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tuple {
    #[serde(rename = "user")]
    pub subject: Subject,
    pub relation: Relation,
    pub object: Object,
}

impl Tuple {
    pub fn new(subject: Subject, relation: Relation, object: Object) -> Self {
        Self {
            subject,
            relation,
            object,
        }
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.relation, self.object)
    }
}

/// The five questions the users API asks before touching a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    CanRead,
    CanWrite,
    CanDelete,
    CanReadAll,
    CanCreate,
}

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::CanRead,
        Permission::CanWrite,
        Permission::CanDelete,
        Permission::CanReadAll,
        Permission::CanCreate,
    ];

    pub fn relation(&self) -> Relation {
        match self {
            Permission::CanRead => Relation::CanRead,
            Permission::CanWrite => Relation::CanWrite,
            Permission::CanDelete => Relation::CanDelete,
            Permission::CanReadAll => Relation::CanReadAll,
            Permission::CanCreate => Relation::CanCreate,
        }
    }

    /// Per-resource questions are asked against `user:<id>`; the rest against
    /// the collection sentinel.
    pub fn is_per_resource(&self) -> bool {
        matches!(
            self,
            Permission::CanRead | Permission::CanWrite | Permission::CanDelete
        )
    }

    /// Human-readable action, used in denial messages.
    pub fn action(&self) -> &'static str {
        match self {
            Permission::CanRead => "read this user",
            Permission::CanWrite => "modify this user",
            Permission::CanDelete => "delete this user",
            Permission::CanReadAll => "read all users",
            Permission::CanCreate => "create users",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.relation().as_str())
    }
}

/// Where a decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The live relationship check answered
    Remote,
    /// The local deterministic rule answered
    Fallback,
    /// An identifier was blank; nothing was consulted
    Rejected,
}

/// Authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub source: DecisionSource,
}

impl Decision {
    pub fn remote(allowed: bool) -> Self {
        Self {
            allowed,
            source: DecisionSource::Remote,
        }
    }

    pub fn fallback(allowed: bool) -> Self {
        Self {
            allowed,
            source: DecisionSource::Fallback,
        }
    }

    pub fn rejected() -> Self {
        Self {
            allowed: false,
            source: DecisionSource::Rejected,
        }
    }
}

/// Returns the trimmed identifier, or `None` when nothing is left.
pub fn normalize_id(id: &str) -> Option<&str> {
    let trimmed = id.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_wire_shape() {
        let tuple = Tuple::new(Subject::user("7"), Relation::CanRead, Object::user("42"));
        let json = serde_json::to_value(&tuple).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"user": "user:7", "relation": "can_read", "object": "user:42"})
        );
    }

    #[test]
    fn test_permission_objects() {
        assert!(Permission::CanDelete.is_per_resource());
        assert!(!Permission::CanCreate.is_per_resource());
        assert_eq!(Permission::CanReadAll.relation(), Relation::CanReadAll);
        assert_eq!(Object::users_collection().as_str(), "users_collection:all");
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("  5 "), Some("5"));
        assert_eq!(normalize_id(" \t "), None);
        assert_eq!(normalize_id(""), None);
    }
}
