//! Identity data model.
//!
//! [`IdentityRecord`] is the unchecked shape exchanged with the authority and
//! written to the durable store; [`Identity`] is the validated form the
//! session manager holds. Converting between the two is the only place the
//! identity invariants are enforced.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::role::{Role, UnknownRole};

/// Role-specific profile attached to an identity (e.g. owner name/phone).
pub type Profile = Map<String, Value>;

/// Validation errors returned when an [`IdentityRecord`] is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityValidationError {
    /// `id` was missing or blank.
    #[error("identity id must not be empty")]
    MissingId,
    /// `email` was missing or blank.
    #[error("identity email must not be empty")]
    MissingEmail,
    /// `role` was missing or blank.
    #[error("identity role must not be empty")]
    MissingRole,
    /// `role` is not one of the known tags.
    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),
}

/// Opaque identifier assigned by the authority.
///
/// The authority may hand out numeric or textual ids; both are kept in their
/// original JSON form so the stored record round-trips byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentityId {
    /// Numeric identifier, e.g. a database sequence value.
    Number(Number),
    /// Textual identifier, e.g. a UUID.
    Text(String),
}

impl IdentityId {
    fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for IdentityId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<u64> for IdentityId {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

/// Unchecked identity as received from the authority or read from storage.
///
/// Unknown fields are retained in `extra` so that persisting a record never
/// drops data the authority attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    /// Authority-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IdentityId>,
    /// Login e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Role-specific profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    /// Any other fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authenticated user's identity.
///
/// ## Invariants
/// - `id` is present and not blank.
/// - `email` is present and not blank.
/// - `role` is one of [`Role::ALL`].
///
/// # Examples
/// ```
/// use remiseria_client::domain::{Identity, IdentityRecord, Role};
///
/// let record = IdentityRecord {
///     id: Some("7".into()),
///     email: Some("duenio@remis.test".to_owned()),
///     role: Some("DUENIO".to_owned()),
///     ..IdentityRecord::default()
/// };
/// let identity = Identity::try_from(record).unwrap();
/// assert_eq!(identity.role(), Role::Duenio);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IdentityRecord", into = "IdentityRecord")]
pub struct Identity {
    id: IdentityId,
    email: String,
    role: Role,
    profile: Option<Profile>,
    extra: Map<String, Value>,
}

impl Identity {
    /// Build an identity from already validated parts.
    pub fn new(id: impl Into<IdentityId>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
            profile: None,
            extra: Map::new(),
        }
    }

    /// Attach a profile record.
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Authority-assigned identifier.
    pub fn id(&self) -> &IdentityId {
        &self.id
    }

    /// Login e-mail.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Assigned role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Role-specific profile, if any.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Unchecked record carrying the same data.
    pub fn to_record(&self) -> IdentityRecord {
        IdentityRecord::from(self.clone())
    }

    /// Record with `fields` merged over the current profile.
    ///
    /// Fields not mentioned keep their current values; a `null` value is
    /// stored as `null` rather than removing the field.
    pub fn merged_profile_record(&self, fields: Profile) -> IdentityRecord {
        let mut record = self.to_record();
        let profile = record.profile.get_or_insert_with(Map::new);
        profile.extend(fields);
        record
    }
}

impl TryFrom<IdentityRecord> for Identity {
    type Error = IdentityValidationError;

    fn try_from(record: IdentityRecord) -> Result<Self, Self::Error> {
        let IdentityRecord {
            id,
            email,
            role,
            profile,
            extra,
        } = record;

        let id = id
            .filter(|id| !id.is_blank())
            .ok_or(IdentityValidationError::MissingId)?;
        let email = email
            .filter(|email| !email.trim().is_empty())
            .ok_or(IdentityValidationError::MissingEmail)?;
        let role = role
            .filter(|role| !role.trim().is_empty())
            .ok_or(IdentityValidationError::MissingRole)?
            .parse::<Role>()?;

        Ok(Self {
            id,
            email,
            role,
            profile,
            extra,
        })
    }
}

impl From<Identity> for IdentityRecord {
    fn from(identity: Identity) -> Self {
        Self {
            id: Some(identity.id),
            email: Some(identity.email),
            role: Some(identity.role.as_str().to_owned()),
            profile: identity.profile,
            extra: identity.extra,
        }
    }
}
