//! Outbound adapter for the external book metadata lookup.

mod dto;
mod http_source;

pub use http_source::HttpBookMetadataSource;
