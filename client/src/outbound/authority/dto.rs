//! Wire DTOs for the authority's auth endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::{LoginCredentials, TokenValidation};

/// Body of `POST auth/login`.
#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

impl<'a> From<&'a LoginCredentials> for LoginRequestDto<'a> {
    fn from(credentials: &'a LoginCredentials) -> Self {
        Self {
            email: credentials.email(),
            password: credentials.password(),
        }
    }
}

/// Body of a successful `GET auth/validate`.
#[derive(Debug, Deserialize)]
pub(super) struct ValidateResponseDto {
    pub(super) valid: bool,
}

impl From<ValidateResponseDto> for TokenValidation {
    fn from(dto: ValidateResponseDto) -> Self {
        Self { valid: dto.valid }
    }
}
