//! University ranking handlers.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::params::{checked_limit, non_empty, page_request, parse_param, ApiPath, ApiQuery};
use crate::http::response::{ApiError, Traced};
use crate::http::server::AppState;
use crate::university::flags::flag_for;
use crate::university::{
    CountrySummary, Filters, SearchRequest, SortField, SortOrder, SortSpec, TopRequest, University,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryWithFlag {
    #[serde(flatten)]
    pub summary: CountrySummary,
    pub flag: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountriesResponse {
    pub total_countries: usize,
    pub total_universities: usize,
    pub countries: Vec<CountryWithFlag>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryResponse {
    pub country: String,
    pub total_universities: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub universities: Vec<University>,
    pub flag: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub max_rank: Option<String>,
    pub min_score: Option<String>,
    pub max_tuition: Option<String>,
    pub max_application_fee: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: Option<String>,
    pub total_results: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub universities: Vec<University>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    pub limit: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopResponse {
    pub limit: usize,
    pub total_found: usize,
    pub universities: Vec<University>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RegionsResponse {
    pub regions: Vec<String>,
}

/// `GET /api/university/countries`
#[tracing::instrument(skip(state))]
pub async fn get_countries(State(state): State<AppState>) -> Result<Json<CountriesResponse>, ApiError> {
    let result = state.catalog.countries().map_err(ApiError::from).map(|summary| {
        Json(CountriesResponse {
            total_countries: summary.total_countries,
            total_universities: summary.total_universities,
            countries: summary
                .countries
                .into_iter()
                .map(|summary| CountryWithFlag {
                    flag: flag_for(&summary.name),
                    summary,
                })
                .collect(),
        })
    });
    result.traced("get_countries")
}

/// `GET /api/university/country/{country_name}`
#[tracing::instrument(skip(state))]
pub async fn get_country(
    State(state): State<AppState>,
    ApiPath(country_name): ApiPath<String>,
    ApiQuery(params): ApiQuery<CountryQuery>,
) -> Result<Json<CountryResponse>, ApiError> {
    country(&state, &country_name, params).traced("get_country")
}

fn country(state: &AppState, country_name: &str, params: CountryQuery) -> Result<Json<CountryResponse>, ApiError> {
    let pagination = &state.config.pagination;
    let page = page_request(
        params.page.as_deref(),
        params.limit.as_deref(),
        pagination.default_limit,
        pagination.max_limit,
    )?;

    let sort = SortSpec {
        field: match non_empty(params.sort_by) {
            Some(raw) => raw.parse::<SortField>().map_err(|e| {
                ApiError::from(e).with_context("valid_fields", SortField::valid_names())
            })?,
            None => SortField::Rank,
        },
        order: match non_empty(params.sort_order) {
            Some(raw) => raw.parse::<SortOrder>()?,
            None => SortOrder::Asc,
        },
    };

    let listing = state.catalog.country_listing(country_name, sort, page)?;
    let flag = flag_for(&listing.country);

    Ok(Json(CountryResponse {
        total_universities: listing.page.total,
        page: listing.page.page,
        limit: listing.page.limit,
        total_pages: listing.page.total_pages,
        universities: listing.page.items,
        country: listing.country,
        flag,
    }))
}

/// `GET /api/university/search`
#[tracing::instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, params).traced("search")
}

fn run_search(state: &AppState, params: SearchQuery) -> Result<Json<SearchResponse>, ApiError> {
    let filters = Filters {
        query: non_empty(params.query),
        region: non_empty(params.region),
        max_rank: parse_param("maxRank", params.max_rank.as_deref())?,
        min_score: parse_param("minScore", params.min_score.as_deref())?,
        max_tuition: parse_param("maxTuition", params.max_tuition.as_deref())?,
        max_application_fee: parse_param(
            "maxApplicationFee",
            params.max_application_fee.as_deref(),
        )?,
    };
    let pagination = &state.config.pagination;
    let request = SearchRequest {
        country: non_empty(params.country),
        page: page_request(
            params.page.as_deref(),
            params.limit.as_deref(),
            pagination.default_limit,
            pagination.max_limit,
        )?,
        filters,
    };

    let results = state.catalog.search(&request)?;

    Ok(Json(SearchResponse {
        query: request.filters.query,
        total_results: results.page.total,
        page: results.page.page,
        limit: results.page.limit,
        total_pages: results.page.total_pages,
        universities: results.page.items,
        skipped_files: results.skipped,
    }))
}

/// `GET /api/university/top`
#[tracing::instrument(skip(state))]
pub async fn top(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TopQuery>,
) -> Result<Json<TopResponse>, ApiError> {
    run_top(&state, params).traced("top")
}

fn run_top(state: &AppState, params: TopQuery) -> Result<Json<TopResponse>, ApiError> {
    let pagination = &state.config.pagination;
    let request = TopRequest {
        limit: checked_limit(
            params.limit.as_deref(),
            pagination.top_default_limit,
            pagination.max_limit,
        )?,
        country: non_empty(params.country),
        region: non_empty(params.region),
    };

    let results = state.catalog.top(&request)?;

    Ok(Json(TopResponse {
        limit: request.limit,
        total_found: results.total_found,
        universities: results.universities,
        skipped_files: results.skipped,
    }))
}

/// `GET /api/university/regions`
#[tracing::instrument(skip(state))]
pub async fn get_regions(State(state): State<AppState>) -> Result<Json<RegionsResponse>, ApiError> {
    state
        .catalog
        .regions()
        .map(|regions| Json(RegionsResponse { regions }))
        .map_err(ApiError::from)
        .traced("get_regions")
}
