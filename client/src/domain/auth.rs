//! Authentication primitives: login credentials, bearer tokens and grants.
//!
//! Secrets are wrapped in [`Zeroizing`] so they are wiped when dropped, and
//! their `Debug` output is redacted so they never reach the logs.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use super::identity::IdentityRecord;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsValidationError {
    /// E-mail was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials sent to the authority.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use remiseria_client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin@remis.test ", "secreto").unwrap();
/// assert_eq!(creds.email(), "admin@remis.test");
/// assert_eq!(creds.password(), "secreto");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw e-mail/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(CredentialsValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// E-mail used as the login key.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Error returned when a bearer token is empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} must not be empty")]
pub struct TokenValidationError {
    kind: &'static str,
}

macro_rules! bearer_token {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Zeroizing<String>);

        impl $name {
            /// Wrap a non-empty token string.
            pub fn new(value: impl Into<String>) -> Result<Self, TokenValidationError> {
                let value = value.into();
                if value.is_empty() {
                    return Err(TokenValidationError { kind: $kind });
                }
                Ok(Self(Zeroizing::new(value)))
            }

            /// Raw token for transport headers and storage.
            pub fn expose(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "(<redacted>)"))
            }
        }

        impl TryFrom<String> for $name {
            type Error = TokenValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.as_str().to_owned()
            }
        }
    };
}

bearer_token!(
    /// Short-lived bearer credential presented on every authority call.
    AccessToken,
    "access token"
);

bearer_token!(
    /// Long-lived credential used to obtain fresh access tokens.
    RefreshToken,
    "refresh token"
);

/// Result of the authority's token validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValidation {
    /// Whether the authority still accepts the access token.
    pub valid: bool,
}

impl TokenValidation {
    /// Authority accepted the token.
    pub const fn valid() -> Self {
        Self { valid: true }
    }

    /// Authority rejected the token.
    pub const fn invalid() -> Self {
        Self { valid: false }
    }
}

/// Successful login exchange: identity plus both credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginGrant {
    /// Identity as reported by the authority; validated on login.
    pub user: IdentityRecord,
    /// Access credential.
    pub access_token: AccessToken,
    /// Refresh credential.
    pub refresh_token: RefreshToken,
}
