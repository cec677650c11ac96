//! Wire DTOs for the volumes-by-ISBN metadata API.
//!
//! The response shape follows the Google Books volumes endpoint: a top-level
//! `items` array of volumes, each with a `volumeInfo` object. Only the
//! fields the catalog can prefill are decoded; everything else is ignored.

use serde::Deserialize;

use crate::domain::ports::BookMetadata;

#[derive(Debug, Deserialize)]
pub(super) struct VolumesResponseDto {
    #[serde(default)]
    pub items: Vec<VolumeDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct VolumeDto {
    #[serde(rename = "volumeInfo")]
    pub volume_info: VolumeInfoDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct VolumeInfoDto {
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
    #[serde(rename = "pageCount")]
    pub page_count: Option<i32>,
    pub language: Option<String>,
    #[serde(rename = "imageLinks")]
    pub image_links: Option<ImageLinksDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ImageLinksDto {
    pub thumbnail: Option<String>,
}

fn join_names(names: Vec<String>) -> Option<String> {
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// Year prefix of a published date such as "1967-05-12" or "1967".
fn year_of(published_date: Option<&str>) -> Option<i32> {
    let date = published_date?;
    let year: String = date.chars().take_while(char::is_ascii_digit).collect();
    year.parse().ok()
}

impl VolumesResponseDto {
    /// First volume mapped into catalog-ready metadata, if any was returned.
    pub(super) fn into_metadata(self) -> Option<BookMetadata> {
        let info = self.items.into_iter().next()?.volume_info;
        Some(BookMetadata {
            title: info.title.unwrap_or_default(),
            authors: join_names(info.authors),
            categories: join_names(info.categories),
            description: info.description,
            publisher: info.publisher,
            publication_year: year_of(info.published_date.as_deref()),
            page_count: info.page_count,
            language: info.language,
            cover_image_url: info.image_links.and_then(|links| links.thumbnail),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[test]
    fn first_volume_wins_and_names_are_joined() {
        let raw = serde_json::json!({
            "items": [
                {
                    "volumeInfo": {
                        "title": "The Master and Margarita",
                        "authors": ["Mikhail Bulgakov", "Diana Burgin"],
                        "categories": ["Fiction"],
                        "publishedDate": "1967-01-01",
                        "pageCount": 384,
                        "language": "en",
                        "imageLinks": { "thumbnail": "http://covers.example/1.jpg" }
                    }
                },
                { "volumeInfo": { "title": "Second volume ignored" } }
            ]
        });
        let decoded: VolumesResponseDto = serde_json::from_value(raw).expect("valid payload");
        let metadata = decoded.into_metadata().expect("one item");

        assert_eq!(metadata.title, "The Master and Margarita");
        assert_eq!(
            metadata.authors.as_deref(),
            Some("Mikhail Bulgakov, Diana Burgin")
        );
        assert_eq!(metadata.publication_year, Some(1967));
        assert_eq!(
            metadata.cover_image_url.as_deref(),
            Some("http://covers.example/1.jpg")
        );
    }

    #[test]
    fn empty_items_means_no_metadata() {
        let decoded: VolumesResponseDto =
            serde_json::from_value(serde_json::json!({})).expect("valid payload");
        assert!(decoded.into_metadata().is_none());
    }

    #[test]
    fn year_parses_bare_and_dashed_dates() {
        assert_eq!(year_of(Some("1967")), Some(1967));
        assert_eq!(year_of(Some("1967-05-12")), Some(1967));
        assert_eq!(year_of(Some("unknown")), None);
        assert_eq!(year_of(None), None);
    }
}
