//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cookie parsing, merging and serialization
//! - The backend wire contract (route paths, DTOs, error body shapes)
//!
//! Both the server-side session relay and the browser-side API client
//! depend on this crate and nothing else in the workspace.

pub mod contract;
pub mod cookie;
pub mod routes;
