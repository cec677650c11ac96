//! Outbound adapters implementing the domain's driven ports.

pub mod metadata;
pub mod persistence;
pub mod security;
