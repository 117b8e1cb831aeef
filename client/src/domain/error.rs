//! Session-level error taxonomy.
//!
//! The first four variants describe why a persisted session was discarded
//! during startup; they are recovered inside
//! [`SessionManager::initialize`](crate::domain::SessionManager::initialize)
//! and only ever surface through [`RestoreOutcome`](crate::domain::RestoreOutcome).
//! The remaining variants are returned to callers.

use thiserror::Error;

use super::identity::IdentityValidationError;
use super::ports::{SessionStoreError, TokenAuthorityError};

/// Failures produced by the session manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The stored identity record is not valid JSON.
    #[error("stored identity could not be parsed: {message}")]
    Deserialization { message: String },
    /// The stored identity parsed but lacks required fields or has an
    /// unknown role.
    #[error("stored identity has an invalid shape: {message}")]
    InvalidSessionShape { message: String },
    /// The authority explicitly reported the access token as invalid.
    #[error("authority rejected the stored access token")]
    AuthorityRejected,
    /// The validation call failed before the authority could answer.
    #[error("authority unreachable during token validation: {0}")]
    AuthorityUnreachable(TokenAuthorityError),
    /// A caller supplied an incomplete identity.
    #[error("invalid identity: {0}")]
    InvalidIdentity(#[from] IdentityValidationError),
    /// An identity update was attempted without an active session.
    #[error("no active session to update")]
    NoActiveSession,
    /// The durable store failed.
    #[error(transparent)]
    Store(#[from] SessionStoreError),
    /// The authority failed during an explicit login exchange.
    #[error(transparent)]
    Authority(TokenAuthorityError),
}

impl SessionError {
    /// Whether this error is one the startup restore recovers from locally.
    pub fn is_restore_failure(&self) -> bool {
        matches!(
            self,
            Self::Deserialization { .. }
                | Self::InvalidSessionShape { .. }
                | Self::AuthorityRejected
                | Self::AuthorityUnreachable(_)
        )
    }
}
