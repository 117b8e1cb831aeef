//! Lifecycle tests for the session manager backed by the file store.
//!
//! Each test drives one or more managers against a real session directory,
//! the way consecutive runs of the client would.
use std::sync::Arc;

use async_trait::async_trait;
use remiseria_client::domain::ports::{
    FixtureTokenAuthority, SessionKey, SessionStore, TokenAuthority, TokenAuthorityError,
};
use remiseria_client::domain::{
    AccessToken, GateAction, LOGIN_ROUTE, LoginCredentials, LoginGrant, RestoreOutcome, Role,
    RouteGate, SessionError, SessionManager, TokenValidation,
};
use remiseria_client::outbound::store::FileSessionStore;
use remiseria_client::test_support::session_dir::SessionDir;
use rstest::{fixture, rstest};
use serde_json::json;

/// Authority answering every validation with a fixed verdict.
struct VerdictAuthority(Result<TokenValidation, TokenAuthorityError>);

#[async_trait]
impl TokenAuthority for VerdictAuthority {
    async fn validate_token(
        &self,
        _access_token: &AccessToken,
    ) -> Result<TokenValidation, TokenAuthorityError> {
        self.0.clone()
    }

    async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<LoginGrant, TokenAuthorityError> {
        FixtureTokenAuthority.login(credentials).await
    }
}

#[fixture]
fn session_dir() -> SessionDir {
    SessionDir::new().expect("session dir")
}

fn manager<A: TokenAuthority>(
    dir: &SessionDir,
    authority: A,
) -> SessionManager<FileSessionStore, A> {
    SessionManager::new(
        Arc::new(dir.open_store().expect("open store")),
        Arc::new(authority),
    )
}

fn stored_keys(dir: &SessionDir) -> Vec<SessionKey> {
    let store = dir.open_store().expect("open store");
    SessionKey::ALL
        .into_iter()
        .filter(|key| store.get(*key).expect("read key").is_some())
        .collect()
}

async fn log_in(dir: &SessionDir, email: &str) {
    let first = manager(dir, FixtureTokenAuthority);
    assert_eq!(first.initialize().await, RestoreOutcome::NoStoredSession);
    let credentials = LoginCredentials::try_from_parts(email, "password").expect("credentials");
    first.authenticate(&credentials).await.expect("login");
}

#[rstest]
#[tokio::test]
async fn session_survives_a_restart(session_dir: SessionDir) {
    log_in(&session_dir, "duenio@remis.test").await;

    let second = manager(&session_dir, FixtureTokenAuthority);
    assert!(second.is_loading());
    assert_eq!(second.initialize().await, RestoreOutcome::Restored);

    let identity = second.current_identity().expect("restored identity");
    assert_eq!(identity.email(), "duenio@remis.test");
    assert_eq!(identity.role(), Role::Duenio);
    assert!(!second.is_loading());
    assert_eq!(stored_keys(&session_dir), SessionKey::ALL.to_vec());
}

#[rstest]
#[case::rejected(Ok(TokenValidation::invalid()))]
#[case::unreachable(Err(TokenAuthorityError::transport("connection refused")))]
#[case::timed_out(Err(TokenAuthorityError::timeout("deadline elapsed")))]
#[tokio::test]
async fn unconfirmed_session_is_removed_from_disk(
    session_dir: SessionDir,
    #[case] verdict: Result<TokenValidation, TokenAuthorityError>,
) {
    log_in(&session_dir, "admin@remis.test").await;

    let second = manager(&session_dir, VerdictAuthority(verdict));
    let outcome = second.initialize().await;

    let RestoreOutcome::Discarded(reason) = outcome else {
        panic!("unconfirmed session must be discarded");
    };
    assert!(reason.is_restore_failure(), "{reason:?}");
    assert_eq!(second.current_identity(), None);
    assert!(stored_keys(&session_dir).is_empty());
    assert_eq!(session_dir.read_document().expect("read"), None);
}

#[rstest]
#[case::missing_id(r#"{"email":"a@remis.test","role":"ADMIN"}"#)]
#[case::missing_role(r#"{"id":1,"email":"a@remis.test"}"#)]
#[case::unknown_role(r#"{"id":1,"email":"a@remis.test","role":"CHOFER"}"#)]
#[case::invalid_json("{\"id\":")]
#[tokio::test]
async fn hand_edited_user_record_fails_closed(session_dir: SessionDir, #[case] user: &str) {
    let document = json!({
        "user": user,
        "accessToken": "fixture-access-admin",
        "refreshToken": "fixture-refresh-1",
    });
    session_dir
        .write_document(document.to_string().as_bytes())
        .expect("seed document");

    let manager = manager(&session_dir, FixtureTokenAuthority);
    let outcome = manager.initialize().await;

    assert!(matches!(outcome, RestoreOutcome::Discarded(_)));
    assert!(!manager.is_authenticated());
    assert!(stored_keys(&session_dir).is_empty());
}

#[rstest]
#[tokio::test]
async fn corrupt_document_fails_closed(session_dir: SessionDir) {
    session_dir
        .write_document(b"not json at all")
        .expect("seed");

    let manager = manager(&session_dir, FixtureTokenAuthority);
    let outcome = manager.initialize().await;

    assert!(matches!(
        outcome,
        RestoreOutcome::Discarded(SessionError::Store(_))
    ));
    assert_eq!(session_dir.read_document().expect("read"), None);
}

#[rstest]
#[tokio::test]
async fn logout_is_idempotent_across_restarts(session_dir: SessionDir) {
    log_in(&session_dir, "coordinador@remis.test").await;

    let second = manager(&session_dir, FixtureTokenAuthority);
    second.initialize().await;
    second.logout().expect("first logout");
    second.logout().expect("second logout");
    assert!(stored_keys(&session_dir).is_empty());

    let third = manager(&session_dir, FixtureTokenAuthority);
    assert_eq!(third.initialize().await, RestoreOutcome::NoStoredSession);
    third.logout().expect("logout with nothing stored");
    assert_eq!(
        session_dir.entries().expect("entries"),
        Vec::<String>::new()
    );
}

#[rstest]
#[tokio::test]
async fn profile_updates_are_restored(session_dir: SessionDir) {
    log_in(&session_dir, "duenio@remis.test").await;

    let second = manager(&session_dir, FixtureTokenAuthority);
    second.initialize().await;
    let fields = json!({ "nombre": "Marta", "telefono": "555-0101" });
    let serde_json::Value::Object(fields) = fields else {
        panic!("profile fields must be an object");
    };
    second.update_profile(fields).expect("update profile");

    let third = manager(&session_dir, FixtureTokenAuthority);
    assert_eq!(third.initialize().await, RestoreOutcome::Restored);
    let identity = third.current_identity().expect("identity");
    let profile = identity.profile().expect("profile stored");
    assert_eq!(profile.get("nombre"), Some(&json!("Marta")));
    assert_eq!(stored_keys(&session_dir), SessionKey::ALL.to_vec());
}

#[rstest]
#[tokio::test]
async fn owner_is_redirected_from_admin_dashboard_once(session_dir: SessionDir) {
    log_in(&session_dir, "duenio@remis.test").await;

    let manager = manager(&session_dir, FixtureTokenAuthority);
    let mut gate = RouteGate::new(&[Role::Admin], manager.subscribe());
    assert_eq!(gate.observe(), GateAction::Wait);

    manager.initialize().await;
    assert_eq!(
        gate.settled().await,
        Some(GateAction::Redirect { to: LOGIN_ROUTE })
    );

    manager.logout().expect("logout");
    assert_eq!(gate.next_action().await, Some(GateAction::Hold));
}

#[rstest]
#[tokio::test]
async fn admin_renders_until_logged_out_elsewhere(session_dir: SessionDir) {
    log_in(&session_dir, "admin@remis.test").await;

    let manager = manager(&session_dir, FixtureTokenAuthority);
    manager.initialize().await;
    let mut gate = RouteGate::new(&[Role::Admin], manager.subscribe());
    assert_eq!(gate.settled().await, Some(GateAction::Render));

    manager.logout().expect("logout");
    assert_eq!(
        gate.next_action().await,
        Some(GateAction::Redirect { to: LOGIN_ROUTE })
    );
}
