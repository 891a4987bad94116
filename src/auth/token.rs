//! Token models for both legs of the handshake.

pub mod access;
pub mod request;
pub mod secret;
