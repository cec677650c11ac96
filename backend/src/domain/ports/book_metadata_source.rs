//! Port for the external book metadata lookup.
//!
//! The catalog can prefill a listing from a volumes-by-ISBN web API. Lookup
//! failures must never block listing a book manually, so the port reports
//! them as errors the caller maps to a service-unavailable response rather
//! than a hard failure of the catalog itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::define_port_error;

define_port_error! {
    /// Errors raised by book metadata source adapters.
    pub enum BookMetadataSourceError {
        /// The request never produced an HTTP response.
        Transport { message: String } =>
            "metadata lookup transport failed: {message}",
        /// The API answered with a non-success status.
        Status { message: String } =>
            "metadata lookup failed: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "metadata lookup returned an invalid payload: {message}",
    }
}

/// Bibliographic data returned by the lookup, ready to prefill a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    /// Volume title.
    pub title: String,
    /// Author names joined with ", ".
    pub authors: Option<String>,
    /// Category names joined with ", ".
    pub categories: Option<String>,
    /// Volume description.
    pub description: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Year extracted from the published date.
    pub publication_year: Option<i32>,
    /// Page count.
    pub page_count: Option<i32>,
    /// Language code.
    pub language: Option<String>,
    /// Thumbnail cover URL.
    pub cover_image_url: Option<String>,
}

/// Port for looking up bibliographic data by ISBN.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookMetadataSource: Send + Sync {
    /// Look up a volume by ISBN; `None` when the API knows no such volume.
    async fn lookup_isbn(
        &self,
        isbn: &str,
    ) -> Result<Option<BookMetadata>, BookMetadataSourceError>;
}

/// Fixture source for tests: knows no books.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookMetadataSource;

#[async_trait]
impl BookMetadataSource for FixtureBookMetadataSource {
    async fn lookup_isbn(
        &self,
        _isbn: &str,
    ) -> Result<Option<BookMetadata>, BookMetadataSourceError> {
        Ok(None)
    }
}
