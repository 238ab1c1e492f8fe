/*
[INPUT]:  Sessions to persist and storage locations
[OUTPUT]: Durable key-value storage and the session store
[POS]:    Storage layer - client-side persistence
[UPDATE]: When adding storage backends or persisted keys
*/

pub mod kv;
pub mod session;

pub use kv::{FileStore, KeyValueStore, KvWrite, MemoryStore, StoreError};
pub use session::{SAVED_AT_KEY, SessionStore, TOKEN_KEY, USER_KEY};
