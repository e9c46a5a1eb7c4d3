//! Visa requirement handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::http::params::ApiPath;
use crate::http::response::{ApiError, Traced};
use crate::http::server::AppState;
use crate::visa::{normalize_country_key, CountryVisaInfo, VisaType, VisaTypeDescriptor};

#[derive(Debug, Serialize)]
pub struct VisaTypesResponse {
    pub success: bool,
    pub visa_types: Vec<VisaTypeDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct AdditionalInfo {
    pub work_rights: Option<Value>,
    pub medical_categories: Option<Value>,
    pub popular_treatments: Option<Value>,
    pub insurance_requirements: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct VisaInfoResponse {
    pub success: bool,
    pub visa_type: VisaType,
    pub country: CountryVisaInfo,
    pub general_requirements: Value,
    pub common_fees: Value,
    pub processing_times: Value,
    pub additional_info: AdditionalInfo,
}

#[derive(Debug, Serialize)]
pub struct CountryKey {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct VisaCountry {
    pub key: String,
    pub name: String,
    pub flag: String,
    pub processing_time: Value,
    pub fees: Value,
}

#[derive(Debug, Serialize)]
pub struct VisaCountriesResponse {
    pub success: bool,
    pub visa_type: VisaType,
    pub countries: Vec<VisaCountry>,
}

/// `GET /api/visa/types`
pub async fn get_visa_types() -> Json<VisaTypesResponse> {
    Json(VisaTypesResponse {
        success: true,
        visa_types: VisaType::ALL.iter().map(|t| t.descriptor()).collect(),
    })
}

/// `GET /api/visa/{visa_type}/{country}`
///
/// An unknown country answers 404 with every available country of the type.
#[tracing::instrument(skip(state))]
pub async fn get_visa_info(
    State(state): State<AppState>,
    ApiPath((visa_type, country)): ApiPath<(String, String)>,
) -> Result<Json<VisaInfoResponse>, ApiError> {
    visa_info(&state, &visa_type, &country).traced("get_visa_info")
}

fn visa_info(state: &AppState, visa_type: &str, country: &str) -> Result<Json<VisaInfoResponse>, ApiError> {
    let visa_type: VisaType = visa_type.parse()?;
    let document = state.visa.load(visa_type)?;

    let key = normalize_country_key(country);
    let Some(info) = document.countries.get(&key) else {
        let available: Vec<CountryKey> = document
            .countries
            .iter()
            .map(|(key, info)| CountryKey {
                key: key.clone(),
                name: info.name.clone(),
            })
            .collect();
        return Err(ApiError::not_found(format!(
            "Country '{}' not found for {} visa type.",
            country, visa_type
        ))
        .with_context("available_countries", available));
    };

    Ok(Json(VisaInfoResponse {
        success: true,
        visa_type,
        country: info.clone(),
        general_requirements: document.general_requirements.clone(),
        common_fees: document.common_fees.clone(),
        processing_times: document.processing_times.clone(),
        additional_info: AdditionalInfo {
            work_rights: document.work_rights.clone(),
            medical_categories: document.medical_categories.clone(),
            popular_treatments: document.popular_treatments.clone(),
            insurance_requirements: document.insurance_requirements.clone(),
        },
    }))
}

/// `GET /api/visa/{visa_type}/countries`
#[tracing::instrument(skip(state))]
pub async fn get_visa_countries(
    State(state): State<AppState>,
    ApiPath(visa_type): ApiPath<String>,
) -> Result<Json<VisaCountriesResponse>, ApiError> {
    visa_countries(&state, &visa_type).traced("get_visa_countries")
}

fn visa_countries(state: &AppState, visa_type: &str) -> Result<Json<VisaCountriesResponse>, ApiError> {
    let visa_type: VisaType = visa_type.parse()?;
    let document = state.visa.load(visa_type)?;

    let countries = document
        .countries
        .iter()
        .map(|(key, info)| VisaCountry {
            key: key.clone(),
            name: info.name.clone(),
            flag: info.flag.clone(),
            processing_time: info.processing_time.clone(),
            fees: info.fees.clone(),
        })
        .collect();

    Ok(Json(VisaCountriesResponse {
        success: true,
        visa_type,
        countries,
    }))
}
