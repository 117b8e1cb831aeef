//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the session core expects to interact with driven
//! adapters (durable storage, the credential authority). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants.

mod session_store;
mod token_authority;

#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{SessionKey, SessionStore, SessionStoreError, StoreOp, WriteBatch};
#[cfg(test)]
pub use token_authority::MockTokenAuthority;
pub use token_authority::{FixtureTokenAuthority, TokenAuthority, TokenAuthorityError};
