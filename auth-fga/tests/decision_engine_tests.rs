//! Decision engine behavior against a scripted tuple store

mod common;

use std::sync::Arc;
use std::time::Duration;

use auth_fga::*;
use common::{service_with, CheckBehavior, ScriptedClient};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn permission() -> impl Strategy<Value = Permission> {
    prop::sample::select(Permission::ALL.to_vec())
}

fn identifier() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("admin".to_string()),
        Just("".to_string()),
        Just("  ".to_string()),
        "[1-9][0-9]{0,2}",
    ]
}

proptest! {
    /// Without a client every question is answered by the local rule
    #[test]
    fn unavailable_client_matches_fallback(
        permission in permission(),
        actor in identifier(),
        resource in identifier(),
    ) {
        let service = AuthorizationService::new(Arc::new(FgaClientHandle::unavailable()));
        let allowed = runtime()
            .block_on(service.allowed(permission, &actor, Some(&resource)))
            .unwrap();
        prop_assert_eq!(allowed, fallback_allows(permission, &actor, Some(&resource)));
    }

    /// A failing check gives the same answer as having no client at all
    #[test]
    fn recoverable_error_matches_unavailable(
        permission in permission(),
        actor in identifier(),
        resource in identifier(),
        status in prop::sample::select(vec![400u16, 404, 429, 500, 503]),
    ) {
        let rt = runtime();
        let failing = service_with(Arc::new(ScriptedClient::new(CheckBehavior::Remote(status))));
        let unavailable = AuthorizationService::new(Arc::new(FgaClientHandle::unavailable()));

        let a = rt.block_on(failing.allowed(permission, &actor, Some(&resource))).unwrap();
        let b = rt.block_on(unavailable.allowed(permission, &actor, Some(&resource))).unwrap();
        prop_assert_eq!(a, b);
    }

    /// A successful remote answer is returned as is
    #[test]
    fn remote_answer_is_verbatim(
        permission in permission(),
        actor in "[1-9][0-9]{0,2}|admin",
        resource in "[1-9][0-9]{0,2}",
        answer in any::<bool>(),
    ) {
        let client = Arc::new(ScriptedClient::new(CheckBehavior::Answer(answer)));
        let service = service_with(client.clone());
        let decision = runtime()
            .block_on(service.decide(permission, &actor, Some(&resource)))
            .unwrap();
        prop_assert_eq!(decision, Decision::remote(answer));
        prop_assert_eq!(client.checks(), 1);
    }
}

#[tokio::test]
async fn test_blank_identifiers_deny_without_remote_call() {
    let client = Arc::new(ScriptedClient::new(CheckBehavior::Answer(true)));
    let service = service_with(client.clone());

    assert!(!service.can_read_user("", "admin").await.unwrap());
    assert!(!service.can_write_user("5", "   ").await.unwrap());
    assert!(!service.can_delete_user("\t", "5").await.unwrap());
    assert!(!service.can_read_all_users("").await.unwrap());
    assert!(!service.can_create_users(" ").await.unwrap());

    let decision = service.decide(Permission::CanRead, "5", None).await.unwrap();
    assert_eq!(decision, Decision::rejected());
    assert_eq!(client.checks(), 0);
}

#[tokio::test]
async fn test_other_user_is_denied_when_service_is_down() {
    let client = Arc::new(ScriptedClient::new(CheckBehavior::Network));
    let service = service_with(client.clone());

    let decision = service.decide(Permission::CanRead, "3", Some("5")).await.unwrap();
    assert_eq!(decision, Decision::fallback(false));

    assert!(service.can_read_user("5", "5").await.unwrap());
    assert!(service.can_read_user("5", "admin").await.unwrap());
    assert!(!service.can_read_all_users("5").await.unwrap());
    assert!(service.can_create_users("admin").await.unwrap());
    assert_eq!(client.checks(), 5);
}

#[tokio::test]
async fn test_remote_answer_overrides_local_rule() {
    let denying = Arc::new(ScriptedClient::new(CheckBehavior::Answer(false)));
    let service = service_with(denying);
    assert!(!service.can_read_user("5", "admin").await.unwrap());
    assert!(!service.can_delete_user("5", "5").await.unwrap());

    let allowing = Arc::new(ScriptedClient::new(CheckBehavior::Answer(true)));
    let service = service_with(allowing);
    assert!(service.can_write_user("5", "3").await.unwrap());
    assert!(service.can_read_all_users("3").await.unwrap());
}

#[tokio::test]
async fn test_checked_tuples() {
    let client = Arc::new(ScriptedClient::new(CheckBehavior::Answer(true)));
    let service = service_with(client.clone());

    service.can_write_user(" 42 ", "7").await.unwrap();
    service.can_create_users("admin").await.unwrap();

    let checked = client.checked.lock().clone();
    assert_eq!(
        checked,
        vec![
            Tuple::new(Subject::user("7"), Relation::CanWrite, Object::user("42")),
            Tuple::new(Subject::admin(), Relation::CanCreate, Object::users_collection()),
        ]
    );
}

#[tokio::test]
async fn test_slow_check_falls_back() {
    let client = Arc::new(ScriptedClient::new(CheckBehavior::Hang(Duration::from_secs(5))));
    let handle =
        FgaClientHandle::with_client(client.clone()).with_timeout(Duration::from_millis(20));
    let service = AuthorizationService::new(Arc::new(handle));

    let decision = service.decide(Permission::CanDelete, "admin", Some("9")).await.unwrap();
    assert_eq!(decision, Decision::fallback(true));

    let decision = service.decide(Permission::CanDelete, "3", Some("9")).await.unwrap();
    assert_eq!(decision, Decision::fallback(false));
}

#[tokio::test]
async fn test_internal_fault_is_an_error() {
    let client = Arc::new(ScriptedClient::new(CheckBehavior::Internal));
    let service = service_with(client);

    let err = service.can_read_user("5", "5").await.unwrap_err();
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_misconfigured_client_is_an_error() {
    let handle = FgaClientHandle::from_config(FgaConfig::new("not a url", "store", "id", "secret"));
    let service = AuthorizationService::new(Arc::new(handle));

    let err = service.can_read_user("5", "admin").await.unwrap_err();
    assert!(matches!(err, FgaError::Configuration(_)));
}

#[tokio::test]
async fn test_missing_configuration_uses_fallback() {
    let handle = FgaClientHandle::from_config(FgaConfig::default());
    let service = AuthorizationService::new(Arc::new(handle));

    let decision = service.decide(Permission::CanReadAll, "admin", None).await.unwrap();
    assert_eq!(decision, Decision::fallback(true));
    let decision = service.decide(Permission::CanWrite, "3", Some("5")).await.unwrap();
    assert_eq!(decision, Decision::fallback(false));
}
