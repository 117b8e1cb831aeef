//! Role-gated route access.
//!
//! [`evaluate`] is the single decision function every protected page uses.
//! [`RouteGate`] wraps it with the page lifecycle: it waits while the session
//! is loading, re-evaluates on every state change, and issues at most one
//! redirect. Once it has redirected it never reports the page as renderable.

use tokio::sync::watch;
use tracing::debug;

use super::role::Role;
use super::session_manager::SessionState;

/// Login entry point every rejected visitor is sent to.
pub const LOGIN_ROUTE: &str = "/login";

/// Outcome of checking a session against a page's role requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Session still loading; render a placeholder and do nothing else.
    Pending,
    /// Identity holds one of the required roles.
    Allow,
    /// No identity or wrong role; send the visitor to `to`.
    Redirect { to: &'static str },
}

/// Decide whether a page requiring `required` may render for `state`.
///
/// # Examples
/// ```
/// use remiseria_client::domain::{
///     evaluate, AccessDecision, Identity, Role, SessionState, LOGIN_ROUTE,
/// };
///
/// let owner = Identity::new(2_u64, "duenio@remis.test", Role::Duenio);
/// let state = SessionState::settled(Some(owner));
/// assert_eq!(evaluate(&state, &[Role::Duenio]), AccessDecision::Allow);
/// assert_eq!(
///     evaluate(&state, &[Role::Admin]),
///     AccessDecision::Redirect { to: LOGIN_ROUTE }
/// );
/// assert_eq!(evaluate(&SessionState::loading(), &[Role::Admin]), AccessDecision::Pending);
/// ```
pub fn evaluate(state: &SessionState, required: &[Role]) -> AccessDecision {
    if state.is_loading() {
        return AccessDecision::Pending;
    }
    match state.identity() {
        Some(identity) if required.contains(&identity.role()) => AccessDecision::Allow,
        _ => AccessDecision::Redirect { to: LOGIN_ROUTE },
    }
}

/// What a mounted page should do after observing the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Show the neutral placeholder.
    Wait,
    /// Show the protected content.
    Render,
    /// Navigate away. Emitted at most once per gate.
    Redirect { to: &'static str },
    /// A redirect was already issued; show nothing.
    Hold,
}

/// Per-page access gate bound to a session state stream.
pub struct RouteGate {
    required: &'static [Role],
    receiver: watch::Receiver<SessionState>,
    redirected: bool,
}

impl RouteGate {
    /// Mount a gate for a page requiring any of `required`.
    pub fn new(required: &'static [Role], receiver: watch::Receiver<SessionState>) -> Self {
        Self {
            required,
            receiver,
            redirected: false,
        }
    }

    /// Evaluate the latest state and mark it seen.
    pub fn observe(&mut self) -> GateAction {
        let decision = evaluate(&self.receiver.borrow_and_update(), self.required);
        self.apply(decision)
    }

    fn apply(&mut self, decision: AccessDecision) -> GateAction {
        if self.redirected {
            return GateAction::Hold;
        }
        match decision {
            AccessDecision::Pending => GateAction::Wait,
            AccessDecision::Allow => GateAction::Render,
            AccessDecision::Redirect { to } => {
                self.redirected = true;
                debug!(to, "route gate redirecting");
                GateAction::Redirect { to }
            }
        }
    }

    /// Wait for the next state change and evaluate it.
    ///
    /// Returns `None` once the session manager has been dropped.
    pub async fn next_action(&mut self) -> Option<GateAction> {
        self.receiver.changed().await.ok()?;
        Some(self.observe())
    }

    /// Wait until loading ends and return the settled action.
    ///
    /// Returns `None` if the session manager is dropped while still loading.
    pub async fn settled(&mut self) -> Option<GateAction> {
        self.receiver
            .wait_for(|state| !state.is_loading())
            .await
            .ok()?;
        Some(self.observe())
    }

    /// Whether this gate has already redirected.
    pub fn has_redirected(&self) -> bool {
        self.redirected
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::Identity;
    use rstest::rstest;

    fn state_for(role: Option<Role>) -> SessionState {
        SessionState::settled(role.map(|role| Identity::new(1_u64, "u@remis.test", role)))
    }

    #[rstest]
    #[case(Some(Role::Admin), &[Role::Admin], AccessDecision::Allow)]
    #[case(Some(Role::Duenio), &[Role::Admin], AccessDecision::Redirect { to: LOGIN_ROUTE })]
    #[case(Some(Role::Coordinador), &[Role::Duenio, Role::Coordinador], AccessDecision::Allow)]
    #[case(None, &[Role::Admin], AccessDecision::Redirect { to: LOGIN_ROUTE })]
    #[case(Some(Role::Cliente), &[], AccessDecision::Redirect { to: LOGIN_ROUTE })]
    fn evaluate_checks_role_membership(
        #[case] role: Option<Role>,
        #[case] required: &[Role],
        #[case] expected: AccessDecision,
    ) {
        assert_eq!(evaluate(&state_for(role), required), expected);
    }

    #[test]
    fn loading_state_is_pending_even_with_identity() {
        let mut state = state_for(Some(Role::Admin));
        assert_eq!(evaluate(&state, &[Role::Admin]), AccessDecision::Allow);
        state = SessionState::loading();
        assert_eq!(evaluate(&state, &[Role::Admin]), AccessDecision::Pending);
    }

    #[tokio::test]
    async fn wrong_role_redirects_exactly_once_and_never_renders() {
        let (sender, receiver) = watch::channel(SessionState::loading());
        let mut gate = RouteGate::new(&[Role::Admin], receiver);
        let mut actions = vec![gate.observe()];

        sender.send_replace(state_for(Some(Role::Duenio)));
        actions.push(gate.next_action().await.expect("sender alive"));
        sender.send_replace(state_for(Some(Role::Duenio)));
        actions.push(gate.next_action().await.expect("sender alive"));

        assert_eq!(
            actions,
            vec![
                GateAction::Wait,
                GateAction::Redirect { to: LOGIN_ROUTE },
                GateAction::Hold,
            ]
        );
        assert!(gate.has_redirected());
    }

    #[tokio::test]
    async fn logout_elsewhere_triggers_redirect() {
        let (sender, receiver) = watch::channel(state_for(Some(Role::Admin)));
        let mut gate = RouteGate::new(&[Role::Admin], receiver);
        assert_eq!(gate.settled().await, Some(GateAction::Render));

        sender.send_replace(state_for(None));

        assert_eq!(
            gate.next_action().await,
            Some(GateAction::Redirect { to: LOGIN_ROUTE })
        );
    }

    #[tokio::test]
    async fn dropped_manager_ends_the_stream() {
        let (sender, receiver) = watch::channel(SessionState::loading());
        let mut gate = RouteGate::new(&[Role::Admin], receiver);
        drop(sender);
        assert_eq!(gate.settled().await, None);
    }
}
