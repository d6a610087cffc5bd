//! Application state management

use std::sync::Arc;

use anyhow::Result;
use geocoder::ReverseGeocoder;
use postgres_store::MeasurementStore;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MeasurementStore>,
    pub geocoder: Arc<ReverseGeocoder>,
}

impl AppState {
    /// Create a new `AppState` from a Config
    ///
    /// # Errors
    /// Returns an error if the database connection fails or the geocoding
    /// client cannot be built
    pub async fn new(config: &Config) -> Result<Self> {
        let store = Arc::new(MeasurementStore::new(&config.database_url).await?);
        let geocoder = Arc::new(ReverseGeocoder::new(&config.geocoder)?);
        Ok(Self { store, geocoder })
    }

    /// Create a new `AppState` from already built parts (for testing)
    pub fn with_parts(store: Arc<MeasurementStore>, geocoder: Arc<ReverseGeocoder>) -> Self {
        Self { store, geocoder }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("store", &"MeasurementStore")
            .field("geocoder", &self.geocoder)
            .finish()
    }
}
