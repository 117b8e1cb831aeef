//! Session store adapters.
//!
//! - [`FileSessionStore`] persists the three session keys to disk.
//! - [`InMemorySessionStore`] keeps them for the lifetime of the process.

mod file;
mod memory;

pub use file::{FileSessionStore, SESSION_FILE};
pub use memory::InMemorySessionStore;
