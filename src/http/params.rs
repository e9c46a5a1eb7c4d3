//! Path and query-string parameter parsing.
//!
//! Parameters arrive as raw strings so a malformed number becomes a JSON 400
//! instead of a framework rejection. Empty values count as absent.
//! [`ApiPath`] and [`ApiQuery`] cover what is left: undecodable paths and
//! query strings that fail to deserialize (e.g. a repeated key).

use std::str::FromStr;

use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::http::response::ApiError;
use crate::university::PageRequest;

/// [`Path`] whose rejection is an [`ApiError`].
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// [`Query`] whose rejection is an [`ApiError`].
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Treat `Some("")` (e.g. `?region=`) as not supplied.
pub fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|v| !v.trim().is_empty())
}

/// Parse an optional parameter, naming it in the error.
pub fn parse_param<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::invalid(format!("Invalid value for '{}': '{}'", name, value))),
    }
}

/// Build a page request from raw `page`/`limit`, applying defaults and the cap.
pub fn page_request(
    page: Option<&str>,
    limit: Option<&str>,
    default_limit: usize,
    max_limit: usize,
) -> Result<PageRequest, ApiError> {
    let page = parse_param("page", page)?.unwrap_or(1);
    let limit = checked_limit(limit, default_limit, max_limit)?;
    Ok(PageRequest::new(page, limit)?)
}

/// Parse `limit`, rejecting values above `max_limit`.
pub fn checked_limit(raw: Option<&str>, default_limit: usize, max_limit: usize) -> Result<usize, ApiError> {
    let limit = parse_param("limit", raw)?.unwrap_or(default_limit);
    if limit > max_limit {
        return Err(ApiError::invalid(format!(
            "limit must not exceed {}",
            max_limit
        )));
    }
    Ok(limit)
}
