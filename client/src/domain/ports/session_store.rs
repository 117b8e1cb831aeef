//! Port for the durable client-side key-value store holding the session.
//!
//! The store only ever sees the three fixed [`SessionKey`]s. Writes are
//! expressed as a [`WriteBatch`] that adapters must apply atomically: after
//! `apply` returns, either every operation in the batch is visible or none is.

use std::fmt;

use thiserror::Error;

/// Fixed keys under which the session is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    /// Serialised identity record.
    User,
    /// Opaque access credential.
    AccessToken,
    /// Opaque refresh credential.
    RefreshToken,
}

impl SessionKey {
    /// Every session key.
    pub const ALL: [Self; 3] = [Self::User, Self::AccessToken, Self::RefreshToken];

    /// Storage name of the key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::AccessToken => "accessToken",
            Self::RefreshToken => "refreshToken",
        }
    }

    /// Look a key up by its storage name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single mutation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Set `key` to the given value.
    Put(SessionKey, String),
    /// Remove `key`; removing an absent key is not an error.
    Delete(SessionKey),
}

/// Ordered group of mutations applied atomically.
///
/// # Examples
/// ```
/// use remiseria_client::domain::ports::{SessionKey, StoreOp, WriteBatch};
///
/// let batch = WriteBatch::new()
///     .put(SessionKey::User, "{}")
///     .delete(SessionKey::RefreshToken);
/// assert_eq!(batch.ops().len(), 2);
/// assert_eq!(batch.ops()[1], StoreOp::Delete(SessionKey::RefreshToken));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<StoreOp>,
}

impl WriteBatch {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch removing every session key.
    pub fn clear_all() -> Self {
        SessionKey::ALL
            .into_iter()
            .fold(Self::new(), |batch, key| batch.delete(key))
    }

    /// Append a put.
    #[must_use]
    pub fn put(mut self, key: SessionKey, value: impl Into<String>) -> Self {
        self.ops.push(StoreOp::Put(key, value.into()));
        self
    }

    /// Append a delete.
    #[must_use]
    pub fn delete(mut self, key: SessionKey) -> Self {
        self.ops.push(StoreOp::Delete(key));
        self
    }

    /// Operations in application order.
    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    /// Consume the batch, yielding its operations.
    pub fn into_ops(self) -> Vec<StoreOp> {
        self.ops
    }

    /// Whether the batch has no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Errors raised by session store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionStoreError {
    /// Underlying storage could not be read or written.
    #[error("session store I/O failed: {message}")]
    Io { message: String },
    /// Stored document exists but cannot be decoded.
    #[error("session store is corrupt: {message}")]
    Corrupt { message: String },
}

impl SessionStoreError {
    /// Build an [`SessionStoreError::Io`].
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Build a [`SessionStoreError::Corrupt`].
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

/// Port for reading and atomically updating the persisted session keys.
///
/// Calls are synchronous: the session manager relies on `login`, `logout`
/// and `update_identity` completing without yielding.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionStoreError>;

    /// Apply every operation in `batch`, all or nothing.
    fn apply(&self, batch: WriteBatch) -> Result<(), SessionStoreError>;
}
