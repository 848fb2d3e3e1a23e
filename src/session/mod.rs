//! Conversation session store
//!
//! Persists multi-turn conversations as one JSON file per session, plus a
//! rebuildable index and a last-session pointer, all written atomically.

pub mod atomic;
pub mod identity;
pub mod index;
mod retention;
mod store;
pub mod summary;
pub mod types;

pub use identity::{
    generate_id, is_reserved_id, sanitize_name, validate_id, validate_name, validate_writable_id,
    RESERVED_NAMES,
};
pub use index::IndexManager;
pub use store::SessionStore;
pub use types::{
    RestoredSession, SaveOptions, SessionIndex, SessionMetadata, StoredSession, INDEX_VERSION,
};
