use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use sqlx::{
    FromRow,
    PgPool,
};
use tracing::{
    debug,
    error,
};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A normalized measurement ready to be written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMeasurement {
    pub user_name: Option<String>,
    /// Timestamp exactly as the device sent it (trimmed)
    pub timestamp_text: Option<String>,
    /// Parsed form of `timestamp_text`, only used for ordering
    pub timestamp_ts: Option<DateTime<Utc>>,
    pub n: Option<f64>,
    pub p: Option<f64>,
    pub k: Option<f64>,
    pub ph: Option<f64>,
    pub ec: Option<f64>,
    pub temp: Option<f64>,
    pub hum: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
    pub note: Option<String>,
    pub project_name: Option<String>,
}

/// A stored measurement row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MeasurementRecord {
    pub id: Uuid,
    pub user_name: Option<String>,
    pub timestamp_text: Option<String>,
    pub timestamp_ts: Option<DateTime<Utc>>,
    pub n: Option<f64>,
    pub p: Option<f64>,
    pub k: Option<f64>,
    pub ph: Option<f64>,
    pub ec: Option<f64>,
    pub temp: Option<f64>,
    pub hum: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
    pub note: Option<String>,
    pub project_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MeasurementStore {
    pub pool: PgPool,
}

impl MeasurementStore {
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Insert every measurement inside a single transaction.
    ///
    /// The first failing row aborts the batch; the transaction is rolled back
    /// when it is dropped without a commit.
    pub async fn insert_batch(&self, batch: &[NewMeasurement]) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted: u64 = 0;

        for (index, measurement) in batch.iter().enumerate() {
            let result = sqlx::query(
                r#"
                INSERT INTO measurements (
                    id, user_name, timestamp_text, timestamp_ts,
                    n, p, k, ph, ec, temp, hum,
                    latitude, longitude, location_name, note, project_name
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&measurement.user_name)
            .bind(&measurement.timestamp_text)
            .bind(measurement.timestamp_ts)
            .bind(measurement.n)
            .bind(measurement.p)
            .bind(measurement.k)
            .bind(measurement.ph)
            .bind(measurement.ec)
            .bind(measurement.temp)
            .bind(measurement.hum)
            .bind(measurement.latitude)
            .bind(measurement.longitude)
            .bind(&measurement.location_name)
            .bind(&measurement.note)
            .bind(&measurement.project_name)
            .execute(&mut *tx)
            .await;

            if let Err(e) = result {
                error!("Insert failed at batch row {}, rolling back: {}", index, e);
                return Err(e.into());
            }
            inserted = inserted.saturating_add(1);
        }

        tx.commit().await?;
        debug!("Committed {} measurements", inserted);

        Ok(inserted)
    }

    /// All measurements, newest first by parsed timestamp, falling back to
    /// the creation time. `project` restricts the list to one project.
    pub async fn list_measurements(
        &self,
        project: Option<&str>,
    ) -> StoreResult<Vec<MeasurementRecord>> {
        let rows = sqlx::query_as::<_, MeasurementRecord>(
            r#"
            SELECT id, user_name, timestamp_text, timestamp_ts,
                   n, p, k, ph, ec, temp, hum,
                   latitude, longitude, location_name, note, project_name,
                   created_at
            FROM measurements
            WHERE $1::TEXT IS NULL OR BTRIM(project_name) = $1
            ORDER BY COALESCE(timestamp_ts, created_at) DESC, created_at DESC
            "#,
        )
        .bind(project)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_measurement(&self, id: Uuid) -> StoreResult<Option<MeasurementRecord>> {
        let row = sqlx::query_as::<_, MeasurementRecord>(
            r#"
            SELECT id, user_name, timestamp_text, timestamp_ts,
                   n, p, k, ph, ec, temp, hum,
                   latitude, longitude, location_name, note, project_name,
                   created_at
            FROM measurements
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn count_measurements(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM measurements")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
