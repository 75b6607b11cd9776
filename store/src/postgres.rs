use crate::{RecordStore, StoreError};
use async_trait::async_trait;
use shared::Airport;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};

const CREATE_TABLE_SQL: &str = "
CREATE TABLE IF NOT EXISTS airport (
    faa             TEXT PRIMARY KEY,
    site_number     TEXT NOT NULL DEFAULT '',
    facility_name   TEXT NOT NULL DEFAULT '',
    icao            TEXT NOT NULL DEFAULT '',
    state_code      TEXT NOT NULL DEFAULT '',
    state_full      TEXT NOT NULL DEFAULT '',
    county          TEXT NOT NULL DEFAULT '',
    city            TEXT NOT NULL DEFAULT '',
    ownership_type  TEXT NOT NULL DEFAULT '',
    use_type        TEXT NOT NULL DEFAULT '',
    manager         TEXT NOT NULL DEFAULT '',
    manager_phone   TEXT NOT NULL DEFAULT '',
    latitude        TEXT NOT NULL DEFAULT '',
    longitude       TEXT NOT NULL DEFAULT '',
    airport_status  TEXT NOT NULL DEFAULT '',
    weather         TEXT NOT NULL DEFAULT ''
)";

const DROP_TABLE_SQL: &str = "DROP TABLE IF EXISTS airport";

const SELECT_COLUMNS: &str = "
    SELECT site_number, facility_name, faa, icao, state_code, state_full, county,
           city, ownership_type, use_type, manager, manager_phone,
           latitude, longitude, airport_status, weather
    FROM airport";

/// Busiest US airports by FAA code, seeded as bare identifiers so the first
/// bulk sync pulls their directory data.
pub const TOP_US_AIRPORTS: &[&str] = &[
    "ATL", "DFW", "DEN", "ORD", "LAX", "CLT", "MCO", "LAS", "PHX", "MIA", "SEA", "IAH", "JFK",
    "EWR", "FLL", "MSP", "SFO", "DTW", "BOS", "SLC", "PHL", "BWI", "TPA", "SAN", "LGA",
];

/// Postgres-backed [`RecordStore`].
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().max_connections(5).connect(dsn).await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the airport table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        tracing::info!("airport schema is in place");
        Ok(())
    }

    /// Drop the airport table.
    pub async fn drop_schema(&self) -> Result<(), StoreError> {
        sqlx::query(DROP_TABLE_SQL).execute(&self.pool).await?;
        tracing::info!("airport schema dropped");
        Ok(())
    }

    /// Seed the table with well-known FAA codes. Existing rows are left
    /// untouched.
    pub async fn seed_top_airports(&self) -> Result<usize, StoreError> {
        let mut inserted = 0;
        for faa in TOP_US_AIRPORTS {
            match self.create(&Airport::stub(*faa)).await {
                Ok(()) => inserted += 1,
                Err(StoreError::AlreadyExists(_)) => {}
                Err(e) => return Err(e),
            }
        }
        tracing::info!(inserted, "seeded airport table");
        Ok(inserted)
    }
}

fn airport_from_row(row: &PgRow) -> Result<Airport, sqlx::Error> {
    Ok(Airport {
        site_number: row.try_get("site_number")?,
        facility_name: row.try_get("facility_name")?,
        faa: row.try_get("faa")?,
        icao: row.try_get("icao")?,
        state_code: row.try_get("state_code")?,
        state_full: row.try_get("state_full")?,
        county: row.try_get("county")?,
        city: row.try_get("city")?,
        ownership_type: row.try_get("ownership_type")?,
        use_type: row.try_get("use_type")?,
        manager: row.try_get("manager")?,
        manager_phone: row.try_get("manager_phone")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        airport_status: row.try_get("airport_status")?,
        weather: row.try_get("weather")?,
    })
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get(&self, faa: &str) -> Result<Airport, StoreError> {
        let query = format!("{SELECT_COLUMNS} WHERE faa = $1");
        let row = sqlx::query(&query)
            .bind(faa)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(airport_from_row(&row)?),
            None => Err(StoreError::NotFound(faa.to_string())),
        }
    }

    async fn get_all(&self) -> Result<Vec<Airport>, StoreError> {
        let query = format!("{SELECT_COLUMNS} ORDER BY faa");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut airports = Vec::with_capacity(rows.len());
        for row in &rows {
            airports.push(airport_from_row(row)?);
        }
        Ok(airports)
    }

    async fn create(&self, airport: &Airport) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO airport (
                faa, site_number, facility_name, icao, state_code, state_full, county,
                city, ownership_type, use_type, manager, manager_phone,
                latitude, longitude, airport_status, weather
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (faa) DO NOTHING",
        )
        .bind(&airport.faa)
        .bind(&airport.site_number)
        .bind(&airport.facility_name)
        .bind(&airport.icao)
        .bind(&airport.state_code)
        .bind(&airport.state_full)
        .bind(&airport.county)
        .bind(&airport.city)
        .bind(&airport.ownership_type)
        .bind(&airport.use_type)
        .bind(&airport.manager)
        .bind(&airport.manager_phone)
        .bind(&airport.latitude)
        .bind(&airport.longitude)
        .bind(&airport.airport_status)
        .bind(&airport.weather)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(airport.faa.clone()));
        }
        Ok(())
    }

    async fn update(&self, airport: &Airport) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE airport
             SET site_number = $2, facility_name = $3, icao = $4, state_code = $5,
                 state_full = $6, county = $7, city = $8, ownership_type = $9,
                 use_type = $10, manager = $11, manager_phone = $12, latitude = $13,
                 longitude = $14, airport_status = $15, weather = $16
             WHERE faa = $1",
        )
        .bind(&airport.faa)
        .bind(&airport.site_number)
        .bind(&airport.facility_name)
        .bind(&airport.icao)
        .bind(&airport.state_code)
        .bind(&airport.state_full)
        .bind(&airport.county)
        .bind(&airport.city)
        .bind(&airport.ownership_type)
        .bind(&airport.use_type)
        .bind(&airport.manager)
        .bind(&airport.manager_phone)
        .bind(&airport.latitude)
        .bind(&airport.longitude)
        .bind(&airport.airport_status)
        .bind(&airport.weather)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(airport.faa.clone()));
        }
        Ok(())
    }

    async fn delete(&self, faa: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM airport WHERE faa = $1")
            .bind(faa)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(faa.to_string()));
        }
        Ok(())
    }
}
