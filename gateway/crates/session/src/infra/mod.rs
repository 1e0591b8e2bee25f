//! Infrastructure Layer
//!
//! HTTP implementation of the domain's backend interface.

pub mod http;
