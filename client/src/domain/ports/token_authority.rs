//! Driven port for the authority that issues and validates credentials.
//!
//! The session manager only needs two calls: the login exchange and the
//! startup token validation. Adapters map transport failures into
//! [`TokenAuthorityError`]; an explicit "token no longer valid" answer is a
//! successful [`TokenValidation`] with `valid == false`, not an error.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    AccessToken, IdentityRecord, LoginCredentials, LoginGrant, RefreshToken, TokenValidation,
};

/// Errors surfaced by authority adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenAuthorityError {
    /// Network or connection failure.
    #[error("authority transport failed: {message}")]
    Transport { message: String },
    /// The request did not complete in time.
    #[error("authority request timed out: {message}")]
    Timeout { message: String },
    /// Login credentials were refused.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Unexpected HTTP status.
    #[error("authority responded with status {status}: {message}")]
    Status { status: u16, message: String },
    /// Response body could not be decoded.
    #[error("authority response could not be decoded: {message}")]
    Decode { message: String },
}

impl TokenAuthorityError {
    /// Build a [`TokenAuthorityError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a [`TokenAuthorityError::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Build a [`TokenAuthorityError::Status`].
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Build a [`TokenAuthorityError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port for the credential authority.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenAuthority: Send + Sync {
    /// Ask the authority whether `access_token` is still accepted.
    async fn validate_token(
        &self,
        access_token: &AccessToken,
    ) -> Result<TokenValidation, TokenAuthorityError>;

    /// Exchange credentials for an identity and a token pair.
    async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<LoginGrant, TokenAuthorityError>;
}

/// In-memory authority used by tests and offline demos.
///
/// `admin@remis.test` / `password` logs in as an administrator and
/// `duenio@remis.test` / `password` as an owner. Validation accepts exactly
/// the access tokens this fixture hands out.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenAuthority;

const FIXTURE_PASSWORD: &str = "password";

impl FixtureTokenAuthority {
    fn grant_for(email: &str) -> Option<(u64, &'static str, &'static str)> {
        match email {
            "admin@remis.test" => Some((1, "ADMIN", "fixture-access-admin")),
            "duenio@remis.test" => Some((2, "DUENIO", "fixture-access-duenio")),
            "coordinador@remis.test" => Some((3, "COORDINADOR", "fixture-access-coordinador")),
            _ => None,
        }
    }
}

#[async_trait]
impl TokenAuthority for FixtureTokenAuthority {
    async fn validate_token(
        &self,
        access_token: &AccessToken,
    ) -> Result<TokenValidation, TokenAuthorityError> {
        let valid = access_token.expose().starts_with("fixture-access-");
        Ok(TokenValidation { valid })
    }

    async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<LoginGrant, TokenAuthorityError> {
        let Some((id, role, access)) = Self::grant_for(credentials.email()) else {
            return Err(TokenAuthorityError::InvalidCredentials);
        };
        if credentials.password() != FIXTURE_PASSWORD {
            return Err(TokenAuthorityError::InvalidCredentials);
        }

        let access_token = AccessToken::new(access)
            .map_err(|err| TokenAuthorityError::decode(format!("fixture access token: {err}")))?;
        let refresh_token = RefreshToken::new(format!("fixture-refresh-{id}"))
            .map_err(|err| TokenAuthorityError::decode(format!("fixture refresh token: {err}")))?;

        Ok(LoginGrant {
            user: IdentityRecord {
                id: Some(id.into()),
                email: Some(credentials.email().to_owned()),
                role: Some(role.to_owned()),
                ..IdentityRecord::default()
            },
            access_token,
            refresh_token,
        })
    }
}
