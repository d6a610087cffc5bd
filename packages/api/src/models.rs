//! Request and response bodies

use chrono::{
    DateTime,
    Utc,
};
use postgres_store::MeasurementRecord;
use serde::{
    Deserialize,
    Serialize,
};

use crate::utils::{
    display_timestamp,
    non_blank,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// One reading as posted by a device
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeasurementInput {
    pub username: Option<String>,
    pub user: Option<String>,
    pub timestamp: Option<String>,
    pub n: Option<f64>,
    pub p: Option<f64>,
    pub k: Option<f64>,
    pub ph: Option<f64>,
    pub ec: Option<f64>,
    pub temp: Option<f64>,
    pub hum: Option<f64>,
    pub location_name: Option<String>,
    pub location: Option<Location>,
    pub note: Option<String>,
    pub project_name: Option<String>,
}

/// One reading as returned to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hum: Option<f64>,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MeasurementRecord> for Measurement {
    fn from(record: MeasurementRecord) -> Self {
        let timestamp = display_timestamp(
            record.timestamp_text.as_deref(),
            record.timestamp_ts.as_ref(),
            &record.created_at,
        );

        Self {
            id: record.id.to_string(),
            user: non_blank(record.user_name.as_deref()),
            timestamp,
            n: record.n,
            p: record.p,
            k: record.k,
            ph: record.ph,
            ec: record.ec,
            temp: record.temp,
            hum: record.hum,
            location: Location {
                latitude: record.latitude,
                longitude: record.longitude,
            },
            location_name: non_blank(record.location_name.as_deref()),
            note: non_blank(record.note.as_deref()),
            project_name: non_blank(record.project_name.as_deref()),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<Measurement>,
    pub data_list: Vec<Measurement>,
}

impl DashboardResponse {
    /// `data_list` must already be ordered newest first
    pub fn from_list(data_list: Vec<Measurement>) -> Self {
        Self {
            total_count: data_list.len(),
            latest: data_list.first().cloned(),
            data_list,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub received: u64,
}

impl IngestResponse {
    pub fn success(received: u64) -> Self {
        Self {
            status: "success".to_string(),
            received,
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct MeasurementsQuery {
    pub project: Option<String>,
}
