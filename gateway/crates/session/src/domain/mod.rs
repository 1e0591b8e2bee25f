//! Domain Layer
//!
//! The backend interface the relay consumes, and the identity record it
//! resolves. The identity record is the backend's `User` as-is; the relay
//! holds it for one request/response cycle and discards it.

pub mod backend;

pub use platform::contract::User;
