//! Outbound adapters implementing domain ports.
//!
//! - **store**: durable and in-memory [`crate::domain::ports::SessionStore`]s
//! - **authority**: reqwest-backed [`crate::domain::ports::TokenAuthority`]
//!
//! Adapters translate between domain types and their transport or storage
//! representation. They contain no session logic.

pub mod authority;
pub mod store;
