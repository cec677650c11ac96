//! Shared validation helpers for inbound HTTP adapters.

use pagination::{PageRequest, SortDirection};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, Username};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidUsername,
    InvalidPageParams,
    InvalidSort,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidUsername => "invalid_username",
            ErrorCode::InvalidPageParams => "invalid_page_params",
            ErrorCode::InvalidSort => "invalid_sort",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(
    field: FieldName,
    message: String,
    code: ErrorCode,
    value: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn parse_username(value: String, field: FieldName) -> Result<Username, Error> {
    Username::new(value.as_str()).map_err(|err| {
        field_error(
            field,
            format!("{}: {err}", field.as_str()),
            ErrorCode::InvalidUsername,
            value,
        )
    })
}

pub(crate) fn parse_page_request(
    page: Option<u32>,
    per_page: Option<u32>,
) -> Result<PageRequest, Error> {
    PageRequest::from_query(page, per_page).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "page",
            "code": ErrorCode::InvalidPageParams.as_str(),
        }))
    })
}

pub(crate) fn parse_sort(value: Option<&str>) -> Result<SortDirection, Error> {
    match value {
        None => Ok(SortDirection::Desc),
        Some("asc") => Ok(SortDirection::Asc),
        Some("desc") => Ok(SortDirection::Desc),
        Some(other) => Err(field_error(
            FieldName::new("sort"),
            "sort must be asc or desc".to_owned(),
            ErrorCode::InvalidSort,
            other,
        )),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn uuid_errors_carry_field_details() {
        let error = parse_uuid("not-a-uuid", FieldName::new("bookId")).expect_err("bad uuid");
        let details = error.details().expect("details attached");
        assert_eq!(details["field"], "bookId");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    fn sort_defaults_to_descending() {
        assert_eq!(parse_sort(None).expect("default"), SortDirection::Desc);
        assert_eq!(parse_sort(Some("asc")).expect("asc"), SortDirection::Asc);
        assert!(parse_sort(Some("sideways")).is_err());
    }

    #[rstest]
    fn page_params_are_validated() {
        assert!(parse_page_request(Some(0), None).is_err());
        let page = parse_page_request(Some(2), Some(10)).expect("valid");
        assert_eq!(page.offset(), 10);
    }
}
