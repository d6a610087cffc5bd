//! Decoding and normalization of posted measurements

use geocoder::ReverseGeocoder;
use postgres_store::NewMeasurement;
use tracing::warn;

use crate::{
    errors::{
        ApiError,
        ApiResult,
    },
    models::MeasurementInput,
    utils::{
        non_blank,
        parse_timestamp,
    },
};

/// Maximum accepted request body for `POST /api/data`
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Decode a body holding either one measurement object or an array of them.
///
/// # Errors
/// `BadRequest` when the body is neither shape, or is an empty array.
pub fn parse_payload(body: &[u8]) -> ApiResult<Vec<MeasurementInput>> {
    // Decided by the first token so a struct is never decoded from a JSON array
    let is_array = body
        .iter()
        .find(|byte| !byte.is_ascii_whitespace())
        .is_some_and(|byte| *byte == b'[');

    let decoded = if is_array {
        serde_json::from_slice::<Vec<MeasurementInput>>(body)
    } else {
        serde_json::from_slice::<MeasurementInput>(body).map(|single| vec![single])
    };
    let batch = decoded.map_err(|error| ApiError::invalid_payload(&error.to_string()))?;

    if batch.is_empty() {
        return Err(ApiError::empty_payload());
    }

    Ok(batch)
}

/// Fields that need no outside lookups.
pub fn normalize(input: MeasurementInput) -> NewMeasurement {
    let user_name =
        non_blank(input.user.as_deref()).or_else(|| non_blank(input.username.as_deref()));
    let timestamp_text = non_blank(input.timestamp.as_deref());
    let timestamp_ts = timestamp_text.as_deref().and_then(parse_timestamp);
    let location = input.location.unwrap_or_default();

    NewMeasurement {
        user_name,
        timestamp_text,
        timestamp_ts,
        n: input.n,
        p: input.p,
        k: input.k,
        ph: input.ph,
        ec: input.ec,
        temp: input.temp,
        hum: input.hum,
        latitude: location.latitude,
        longitude: location.longitude,
        location_name: non_blank(input.location_name.as_deref()),
        note: non_blank(input.note.as_deref()),
        project_name: non_blank(input.project_name.as_deref()),
    }
}

/// Fill in a missing place name from the coordinates.
///
/// Lookup failures leave the name unset; they never fail ingestion.
pub async fn enrich_location(measurement: &mut NewMeasurement, geocoder: &ReverseGeocoder) {
    if measurement.location_name.is_some() {
        return;
    }
    let Some((latitude, longitude)) = measurement.latitude.zip(measurement.longitude) else {
        return;
    };

    match geocoder.place_name(latitude, longitude).await {
        Ok(name) => measurement.location_name = name,
        Err(error) => warn!(
            latitude,
            longitude,
            "Reverse geocoding failed, storing without place name: {}",
            error
        ),
    }
}

/// Normalize a whole batch, resolving place names in order.
pub async fn prepare_batch(
    batch: Vec<MeasurementInput>,
    geocoder: &ReverseGeocoder,
) -> Vec<NewMeasurement> {
    let mut prepared = Vec::with_capacity(batch.len());
    for input in batch {
        let mut measurement = normalize(input);
        enrich_location(&mut measurement, geocoder).await;
        prepared.push(measurement);
    }
    prepared
}
