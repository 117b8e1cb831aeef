//! Credential authority adapters.
//!
//! This module provides a thin HTTP implementation of the `TokenAuthority`
//! port against the remisería REST API.

mod dto;
mod http;

pub use http::{AuthorityBuildError, HttpTokenAuthority};
