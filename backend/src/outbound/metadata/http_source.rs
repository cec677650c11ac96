//! Reqwest-backed book metadata source adapter.
//!
//! Owns transport details only: request construction, timeout, HTTP error
//! mapping, and JSON decoding into the port's metadata value.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{BookMetadata, BookMetadataSource, BookMetadataSourceError};

use super::dto::VolumesResponseDto;

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Metadata source adapter performing GET requests against one volumes API
/// endpoint.
pub struct HttpBookMetadataSource {
    client: Client,
    endpoint: Url,
}

impl HttpBookMetadataSource {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, DEFAULT_LOOKUP_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

fn map_transport_error(error: reqwest::Error) -> BookMetadataSourceError {
    BookMetadataSourceError::transport(error.to_string())
}

fn map_status_error(status: StatusCode) -> BookMetadataSourceError {
    BookMetadataSourceError::status(format!("volumes API answered {status}"))
}

#[async_trait]
impl BookMetadataSource for HttpBookMetadataSource {
    async fn lookup_isbn(
        &self,
        isbn: &str,
    ) -> Result<Option<BookMetadata>, BookMetadataSourceError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("isbn:{isbn}"));

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        let decoded: VolumesResponseDto = serde_json::from_slice(body.as_ref())
            .map_err(|error| BookMetadataSourceError::decode(error.to_string()))?;
        Ok(decoded.into_metadata())
    }
}
