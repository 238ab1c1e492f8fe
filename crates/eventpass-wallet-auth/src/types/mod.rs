/*
[INPUT]:  Backend schema and wallet handshake payloads
[OUTPUT]: Typed Rust structs/enums with serialization support
[POS]:    Data layer - type definitions for wallet auth
[UPDATE]: When backend schema changes or new types added
*/

pub mod enums;
pub mod models;
pub mod requests;
pub mod responses;

pub use enums::*;
pub use models::*;
pub use requests::*;
pub use responses::{parse_challenge, parse_exchange, parse_profile};
