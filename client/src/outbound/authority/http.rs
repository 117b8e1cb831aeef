//! Reqwest-backed credential authority adapter.
//!
//! This adapter owns transport details only: endpoint resolution, request
//! serialisation, HTTP status mapping and JSON decoding. An explicit
//! rejection of the access token (`401`/`403` on validation) is reported as
//! an invalid [`TokenValidation`], not as an error, so the session core can
//! tell "the authority said no" apart from "the authority was unreachable".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::debug;

use super::dto::{LoginRequestDto, ValidateResponseDto};
use crate::domain::ports::{TokenAuthority, TokenAuthorityError};
use crate::domain::{AccessToken, LoginCredentials, LoginGrant, TokenValidation};

const LOGIN_PATH: &str = "auth/login";
const VALIDATE_PATH: &str = "auth/validate";
const USER_AGENT: &str = concat!("remiseria-client/", env!("CARGO_PKG_VERSION"));

/// Errors raised while constructing [`HttpTokenAuthority`].
#[derive(Debug, Error)]
pub enum AuthorityBuildError {
    /// The reqwest client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    /// An endpoint could not be resolved against the base URL.
    #[error("invalid authority endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Authority adapter calling the remisería REST API under one base URL.
pub struct HttpTokenAuthority {
    client: Client,
    login_url: Url,
    validate_url: Url,
}

impl HttpTokenAuthority {
    /// Build an adapter for the API rooted at `base`.
    ///
    /// `base` may or may not end in a slash; `http://host/api` and
    /// `http://host/api/` resolve to the same endpoints. Without a `timeout`
    /// requests wait for as long as the transport allows.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// endpoints cannot be joined onto `base`.
    pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self, AuthorityBuildError> {
        let base = with_trailing_slash(base);
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            login_url: base.join(LOGIN_PATH)?,
            validate_url: base.join(VALIDATE_PATH)?,
        })
    }

    /// Resolved login endpoint.
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// Resolved validation endpoint.
    pub fn validate_url(&self) -> &Url {
        &self.validate_url
    }
}

#[async_trait]
impl TokenAuthority for HttpTokenAuthority {
    async fn validate_token(
        &self,
        access_token: &AccessToken,
    ) -> Result<TokenValidation, TokenAuthorityError> {
        let response = self
            .client
            .get(self.validate_url.clone())
            .bearer_auth(access_token.expose())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            debug!(status = status.as_u16(), "authority rejected access token");
            return Ok(TokenValidation::invalid());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_validation(body.as_ref())
    }

    async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<LoginGrant, TokenAuthorityError> {
        let response = self
            .client
            .post(self.login_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&LoginRequestDto::from(credentials))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TokenAuthorityError::InvalidCredentials);
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_grant(body.as_ref())
    }
}

fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn parse_validation(body: &[u8]) -> Result<TokenValidation, TokenAuthorityError> {
    let decoded: ValidateResponseDto = serde_json::from_slice(body).map_err(|error| {
        TokenAuthorityError::decode(format!("invalid validation payload: {error}"))
    })?;
    Ok(decoded.into())
}

fn parse_grant(body: &[u8]) -> Result<LoginGrant, TokenAuthorityError> {
    serde_json::from_slice(body)
        .map_err(|error| TokenAuthorityError::decode(format!("invalid login payload: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> TokenAuthorityError {
    if error.is_timeout() {
        TokenAuthorityError::timeout(error.to_string())
    } else {
        TokenAuthorityError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TokenAuthorityError {
    let preview = body_preview(body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TokenAuthorityError::timeout(format!("status {}", status.as_u16()))
        }
        _ => TokenAuthorityError::status(status.as_u16(), preview),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
