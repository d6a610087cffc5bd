//! HTTP request handlers for the API

use axum::{
    body::Bytes,
    extract::{
        rejection::{
            BytesRejection,
            QueryRejection,
        },
        Path,
        Query,
        State,
    },
    http::StatusCode,
    response::Json,
};
use tracing::{
    debug,
    info,
};
use uuid::Uuid;

use crate::{
    errors::{
        ApiError,
        ApiResult,
    },
    ingest::{
        parse_payload,
        prepare_batch,
        MAX_BODY_BYTES,
    },
    models::{
        DashboardResponse,
        IngestResponse,
        Measurement,
        MeasurementsQuery,
    },
    state::AppState,
    utils::non_blank,
};

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Accept one measurement or a batch of them
///
/// # Errors
/// Returns `BAD_REQUEST` if the body is not a measurement object or a
/// non-empty array of them
/// Returns `PAYLOAD_TOO_LARGE` if the body exceeds the size limit
/// Returns `INTERNAL_SERVER_ERROR` if the batch cannot be stored; nothing
/// from the batch is kept in that case
pub async fn receive_data(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<IngestResponse>> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::payload_too_large(MAX_BODY_BYTES)
        } else {
            ApiError::bad_request("failed to read body")
        }
    })?;

    let batch = parse_payload(&body)?;
    info!("Received batch of {} measurements", batch.len());

    let prepared = prepare_batch(batch, &state.geocoder).await;
    let received = state.store.insert_batch(&prepared).await?;

    debug!("Stored {} measurements", received);
    Ok(Json(IngestResponse::success(received)))
}

/// Dashboard summary: count, most recent reading and the full list
///
/// # Errors
/// Returns `INTERNAL_SERVER_ERROR` if database query fails
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardResponse>> {
    let list = fetch_measurements(&state, None).await?;
    Ok(Json(DashboardResponse::from_list(list)))
}

/// All measurements, newest first, optionally for one project
///
/// # Errors
/// Returns `BAD_REQUEST` if the query string cannot be decoded
/// Returns `INTERNAL_SERVER_ERROR` if database query fails
pub async fn get_measurements(
    State(state): State<AppState>,
    query: Result<Query<MeasurementsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Measurement>>> {
    let Query(params) = query.map_err(|rejection| {
        debug!("Rejected query string: {}", rejection.body_text());
        ApiError::bad_request(&rejection.body_text())
    })?;
    let project = non_blank(params.project.as_deref());
    let list = fetch_measurements(&state, project.as_deref()).await?;
    Ok(Json(list))
}

/// A single measurement by id
///
/// # Errors
/// Returns `NOT_FOUND` if no measurement has this id
/// Returns `INTERNAL_SERVER_ERROR` if database query fails
pub async fn get_measurement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Measurement>> {
    // Ids are UUIDs; anything else cannot match a row
    let Ok(id) = Uuid::parse_str(id.trim()) else {
        debug!("Rejected malformed measurement id: {}", id);
        return Err(ApiError::measurement_not_found());
    };

    match state.store.get_measurement(id).await? {
        Some(record) => Ok(Json(Measurement::from(record))),
        None => Err(ApiError::measurement_not_found()),
    }
}

async fn fetch_measurements(
    state: &AppState,
    project: Option<&str>,
) -> ApiResult<Vec<Measurement>> {
    let records = state.store.list_measurements(project).await?;
    debug!("Retrieved {} measurements", records.len());
    Ok(records.into_iter().map(Measurement::from).collect())
}
