//! Snapshot of the persisted session keys and the schema check applied to
//! the stored identity before it is trusted.

use serde_json::Value;

use super::error::SessionError;
use super::identity::{Identity, IdentityRecord};
use super::ports::{SessionKey, SessionStore, SessionStoreError};

/// Raw values of the three session keys as read from the store.
///
/// Empty strings are normalised to `None`: a blank `user` or `accessToken`
/// is indistinguishable from a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSession {
    /// Serialised identity record.
    pub user: Option<String>,
    /// Access credential.
    pub access_token: Option<String>,
    /// Refresh credential.
    pub refresh_token: Option<String>,
}

impl StoredSession {
    /// Read all three keys from `store`.
    pub fn read<S>(store: &S) -> Result<Self, SessionStoreError>
    where
        S: SessionStore + ?Sized,
    {
        let fetch = |key| {
            store
                .get(key)
                .map(|value| value.filter(|value: &String| !value.is_empty()))
        };
        Ok(Self {
            user: fetch(SessionKey::User)?,
            access_token: fetch(SessionKey::AccessToken)?,
            refresh_token: fetch(SessionKey::RefreshToken)?,
        })
    }

    /// Whether no key holds a value.
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Parse and structurally validate a stored identity record.
///
/// Invalid JSON yields [`SessionError::Deserialization`]; JSON that is not
/// an object, has mistyped fields, lacks `id`/`email`/`role`, or carries an
/// unknown role yields [`SessionError::InvalidSessionShape`].
///
/// # Examples
/// ```
/// use remiseria_client::domain::{parse_stored_identity, Role, SessionError};
///
/// let identity =
///     parse_stored_identity(r#"{"id":1,"email":"admin@remis.test","role":"ADMIN"}"#).unwrap();
/// assert_eq!(identity.role(), Role::Admin);
///
/// let err = parse_stored_identity("{not json").unwrap_err();
/// assert!(matches!(err, SessionError::Deserialization { .. }));
/// ```
pub fn parse_stored_identity(raw: &str) -> Result<Identity, SessionError> {
    let value: Value = serde_json::from_str(raw).map_err(|err| SessionError::Deserialization {
        message: err.to_string(),
    })?;
    let record: IdentityRecord =
        serde_json::from_value(value).map_err(|err| SessionError::InvalidSessionShape {
            message: err.to_string(),
        })?;
    Identity::try_from(record).map_err(|err| SessionError::InvalidSessionShape {
        message: err.to_string(),
    })
}
