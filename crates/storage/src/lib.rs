#![forbid(unsafe_code)]

pub mod repository;
pub mod session_store;
pub mod sqlite;

pub use repository::{InMemoryStore, KeyValueStore, StorageError};
pub use session_store::{CredentialStore, Identity, SessionStore, keys};
pub use sqlite::{SqliteInitError, SqliteStore, Stores};
