mod manager;
mod store;

pub use manager::{Session, SessionError, SessionManager, SessionState};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError, StoredSession};
