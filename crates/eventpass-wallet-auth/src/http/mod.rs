/*
[INPUT]:  Backend base URL, endpoint paths, request bodies
[OUTPUT]: Normalized JSON responses and backend errors
[POS]:    HTTP layer - REST communication with the auth backend
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;

pub use client::{BackendClient, ClientConfig, Endpoints, NonceMethod};
pub use envelope::normalize_response;
pub use error::{BackendError, Result};
