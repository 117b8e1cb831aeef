//! Session manager: the single owner of "who is logged in".
//!
//! State is published through a [`tokio::sync::watch`] channel so route gates
//! re-evaluate whenever the identity or the loading flag changes. Every write
//! to the durable store goes through one [`WriteBatch`], which keeps the three
//! session keys all-present or all-absent.
//!
//! `initialize` is the only operation that suspends (on the authority round
//! trip). `login`, `logout` and `update_identity` are synchronous. When they
//! run while `initialize` is suspended, whichever completes last wins on both
//! the in-memory state and the persisted keys.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::auth::{AccessToken, LoginCredentials, LoginGrant, RefreshToken};
use super::error::SessionError;
use super::identity::{Identity, IdentityRecord, Profile};
use super::ports::{SessionKey, SessionStore, SessionStoreError, TokenAuthority, WriteBatch};
use super::stored_session::{StoredSession, parse_stored_identity};

/// Observable session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    identity: Option<Identity>,
    is_loading: bool,
}

impl SessionState {
    /// State before `initialize` has settled.
    pub const fn loading() -> Self {
        Self {
            identity: None,
            is_loading: true,
        }
    }

    /// Settled state with the given identity.
    pub const fn settled(identity: Option<Identity>) -> Self {
        Self {
            identity,
            is_loading: false,
        }
    }

    /// Current identity, if logged in.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// True until startup validation settles.
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// True iff an identity is present.
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// How `initialize` settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Stored session was valid; the identity is now current.
    Restored,
    /// Nothing usable was stored; normal logged-out start.
    NoStoredSession,
    /// A stored session existed but was discarded for the given reason.
    Discarded(SessionError),
    /// `initialize` had already run on this manager.
    AlreadyInitialized,
}

/// Owned session state machine injected into every consumer.
pub struct SessionManager<S: ?Sized, A: ?Sized> {
    store: Arc<S>,
    authority: Arc<A>,
    state: watch::Sender<SessionState>,
    initialized: AtomicBool,
}

impl<S: ?Sized, A: ?Sized> SessionManager<S, A> {
    /// Create a manager in the loading state.
    pub fn new(store: Arc<S>, authority: Arc<A>) -> Self {
        let (state, _) = watch::channel(SessionState::loading());
        Self {
            store,
            authority,
            state,
            initialized: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Current identity, if logged in.
    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    /// True until startup validation settles.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// True iff an identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn set_identity(&self, identity: Option<Identity>) {
        self.state.send_modify(|state| state.identity = identity);
    }

    fn settle(&self, identity: Option<Identity>) {
        self.state.send_replace(SessionState::settled(identity));
    }
}

impl<S, A> SessionManager<S, A>
where
    S: SessionStore + ?Sized,
    A: TokenAuthority + ?Sized,
{
    /// Restore and validate the persisted session.
    ///
    /// Runs once per manager. Every failure collapses to the logged-out state
    /// with all three keys removed; the returned outcome says which branch
    /// was taken. `is_loading` flips to false exactly once, after the outcome
    /// is settled.
    pub async fn initialize(&self) -> RestoreOutcome {
        if self.initialized.swap(true, Ordering::AcqRel) {
            warn!("session manager already initialised; ignoring repeat call");
            return RestoreOutcome::AlreadyInitialized;
        }

        let outcome = self.restore().await;
        match &outcome {
            RestoreOutcome::Restored => info!("stored session restored"),
            RestoreOutcome::NoStoredSession => debug!("no stored session"),
            RestoreOutcome::Discarded(reason) => {
                warn!(%reason, "stored session discarded");
            }
            RestoreOutcome::AlreadyInitialized => {}
        }
        outcome
    }

    async fn restore(&self) -> RestoreOutcome {
        let stored = match StoredSession::read(self.store.as_ref()) {
            Ok(stored) => stored,
            Err(err) => return self.discard(SessionError::Store(err)),
        };

        let (Some(raw_user), Some(raw_access)) = (&stored.user, &stored.access_token) else {
            if !stored.is_empty() {
                debug!("clearing partial session left by an interrupted write");
                self.clear_store();
            }
            self.settle(None);
            return RestoreOutcome::NoStoredSession;
        };

        let identity = match parse_stored_identity(raw_user) {
            Ok(identity) => identity,
            Err(err) => return self.discard(err),
        };
        if stored.refresh_token.is_none() {
            return self.discard(SessionError::InvalidSessionShape {
                message: format!("{} is missing", SessionKey::RefreshToken),
            });
        }
        let access_token = match AccessToken::new(raw_access.as_str()) {
            Ok(token) => token,
            Err(err) => {
                return self.discard(SessionError::InvalidSessionShape {
                    message: err.to_string(),
                });
            }
        };

        debug!(role = %identity.role(), "validating stored access token");
        match self.authority.validate_token(&access_token).await {
            Ok(validation) if validation.valid => {
                self.settle(Some(identity));
                RestoreOutcome::Restored
            }
            Ok(_) => self.discard(SessionError::AuthorityRejected),
            Err(err) => self.discard(SessionError::AuthorityUnreachable(err)),
        }
    }

    fn discard(&self, reason: SessionError) -> RestoreOutcome {
        self.clear_store();
        self.settle(None);
        RestoreOutcome::Discarded(reason)
    }

    fn clear_store(&self) {
        if let Err(err) = self.store.apply(WriteBatch::clear_all()) {
            warn!(error = %err, "failed to clear stored session");
        }
    }

    /// Record a successful login.
    ///
    /// Fails with [`SessionError::InvalidIdentity`] when the record lacks an
    /// `id`, `email` or valid `role`; nothing is written in that case. The
    /// three keys are written in one batch before the in-memory identity is
    /// replaced, so a store failure leaves the previous state intact.
    pub fn login(
        &self,
        record: IdentityRecord,
        access_token: AccessToken,
        refresh_token: RefreshToken,
    ) -> Result<Identity, SessionError> {
        let identity = Identity::try_from(record)?;
        let serialized = serialize_identity(&identity)?;

        let batch = WriteBatch::new()
            .put(SessionKey::User, serialized)
            .put(SessionKey::AccessToken, access_token.expose())
            .put(SessionKey::RefreshToken, refresh_token.expose());
        self.store.apply(batch)?;

        self.set_identity(Some(identity.clone()));
        info!(id = %identity.id(), role = %identity.role(), "logged in");
        Ok(identity)
    }

    /// [`login`](Self::login) taking the authority's grant.
    pub fn login_with_grant(&self, grant: LoginGrant) -> Result<Identity, SessionError> {
        let LoginGrant {
            user,
            access_token,
            refresh_token,
        } = grant;
        self.login(user, access_token, refresh_token)
    }

    /// Exchange credentials with the authority and record the session.
    pub async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Identity, SessionError> {
        let grant = self
            .authority
            .login(credentials)
            .await
            .map_err(SessionError::Authority)?;
        self.login_with_grant(grant)
    }

    /// Forget the session in memory and in the store.
    ///
    /// Idempotent. The in-memory identity is cleared before the store is
    /// touched, so a store failure still leaves the process logged out.
    pub fn logout(&self) -> Result<(), SessionError> {
        let was_authenticated = self.is_authenticated();
        self.set_identity(None);
        self.store.apply(WriteBatch::clear_all())?;
        if was_authenticated {
            info!("logged out");
        }
        Ok(())
    }

    /// Replace the current identity and rewrite only the `user` key.
    ///
    /// Only structural completeness is checked; callers supply a coherent
    /// merged record. Requires an active session so the stored keys never
    /// hold an identity without credentials.
    pub fn update_identity(&self, record: IdentityRecord) -> Result<Identity, SessionError> {
        let identity = Identity::try_from(record)?;
        if !self.is_authenticated() {
            return Err(SessionError::NoActiveSession);
        }

        let serialized = serialize_identity(&identity)?;
        self.store
            .apply(WriteBatch::new().put(SessionKey::User, serialized))?;
        self.set_identity(Some(identity.clone()));
        debug!(id = %identity.id(), "identity updated");
        Ok(identity)
    }

    /// Merge `fields` into the current profile and persist the result.
    pub fn update_profile(&self, fields: Profile) -> Result<Identity, SessionError> {
        let current = self
            .current_identity()
            .ok_or(SessionError::NoActiveSession)?;
        self.update_identity(current.merged_profile_record(fields))
    }
}

fn serialize_identity(identity: &Identity) -> Result<String, SessionError> {
    serde_json::to_string(identity).map_err(|err| {
        SessionError::Store(SessionStoreError::corrupt(format!(
            "failed to serialise identity: {err}"
        )))
    })
}

#[cfg(test)]
#[path = "session_manager_tests.rs"]
mod tests;
