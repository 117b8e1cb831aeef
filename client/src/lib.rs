//! Client-side session core for the remisería administration API.
//!
//! - [`domain`]: identity model, session manager, route gate, ports
//! - [`outbound`]: file/in-memory stores and the HTTP authority
//! - [`inbound`]: the `remiseria` command-line adapter
//! - [`config`]: layered settings

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
