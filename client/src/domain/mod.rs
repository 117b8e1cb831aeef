//! Domain primitives and the session core.
//!
//! Purpose: define the identity model, the session state machine and the
//! route-access contract independently of storage and transport. Adapters
//! live under `outbound` and `inbound` and reach the core through
//! [`ports`].
//!
//! Public surface:
//! - [`SessionManager`] - owns the current identity and the loading flag.
//! - [`evaluate`] / [`RouteGate`] - role-gated access decisions.
//! - [`Identity`] / [`IdentityRecord`] - validated and raw identity shapes.
//! - [`SessionError`] - session error taxonomy.

pub mod auth;
pub mod error;
pub mod identity;
pub mod pages;
pub mod ports;
pub mod role;
pub mod route_gate;
pub mod session_manager;
pub mod stored_session;

pub use self::auth::{
    AccessToken, CredentialsValidationError, LoginCredentials, LoginGrant, RefreshToken,
    TokenValidation, TokenValidationError,
};
pub use self::error::SessionError;
pub use self::identity::{Identity, IdentityId, IdentityRecord, IdentityValidationError, Profile};
pub use self::pages::{PAGES, Page, find_page, pages_for};
pub use self::role::{Role, UnknownRole};
pub use self::route_gate::{AccessDecision, GateAction, LOGIN_ROUTE, RouteGate, evaluate};
pub use self::session_manager::{RestoreOutcome, SessionManager, SessionState};
pub use self::stored_session::{StoredSession, parse_stored_identity};
