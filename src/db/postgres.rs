//! PostgreSQL store for the indicator catalog and fact table.

use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};

use crate::config::StoreConfig;
use crate::db::store::{DeleteFilter, IndicatorStore, ValueFilter};
use crate::error::StoreError;
use crate::models::{CountryRecord, IndicatorDefinition, ObservedValue};

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut pg_config: tokio_postgres::Config = config
            .database_url
            .parse()
            .map_err(|e| StoreError::Connection(format!("Invalid DATABASE_URL: {}", e)))?;
        pg_config.password(config.database_password.as_str());

        let (client, connection) = pg_config
            .connect(NoTls)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to connect to database: {}", e)))?;

        // Spawn connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "Database connection error");
            }
        });

        let store = Self { client };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS countries (
                    iso3 TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    region TEXT NOT NULL DEFAULT ''
                );
                CREATE TABLE IF NOT EXISTS indicators (
                    code TEXT PRIMARY KEY,
                    name TEXT NOT NULL DEFAULT '',
                    unit TEXT NOT NULL DEFAULT '',
                    source TEXT NOT NULL DEFAULT '',
                    category TEXT NOT NULL DEFAULT ''
                );
                CREATE TABLE IF NOT EXISTS indicator_values (
                    country_iso3 TEXT NOT NULL,
                    indicator_code TEXT NOT NULL,
                    year INTEGER NOT NULL,
                    value DOUBLE PRECISION NOT NULL,
                    source TEXT NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    UNIQUE (country_iso3, indicator_code, year)
                );
                CREATE INDEX IF NOT EXISTS indicator_values_code_year
                    ON indicator_values (indicator_code, year);",
            )
            .await?;
        Ok(())
    }
}

fn value_from_row(row: &Row) -> Result<ObservedValue, StoreError> {
    Ok(ObservedValue {
        country_iso3: row.try_get(0)?,
        indicator_code: row.try_get(1)?,
        year: row.try_get(2)?,
        value: row.try_get(3)?,
        source: row.try_get(4)?,
    })
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

#[async_trait]
impl IndicatorStore for PostgresStore {
    async fn list_countries(&self) -> Result<Vec<CountryRecord>, StoreError> {
        let rows = self
            .client
            .query("SELECT iso3, name, region FROM countries ORDER BY iso3", &[])
            .await?;

        rows.iter()
            .map(|row| {
                Ok(CountryRecord {
                    iso3: row.try_get(0)?,
                    name: row.try_get(1)?,
                    region: row.try_get(2)?,
                })
            })
            .collect()
    }

    async fn list_indicators(&self) -> Result<Vec<IndicatorDefinition>, StoreError> {
        let rows = self
            .client
            .query(
                "SELECT code, name, unit, source, category FROM indicators ORDER BY code",
                &[],
            )
            .await?;

        rows.iter()
            .map(|row| {
                Ok(IndicatorDefinition {
                    code: row.try_get(0)?,
                    name: row.try_get(1)?,
                    unit: row.try_get(2)?,
                    source: row.try_get(3)?,
                    category: row.try_get(4)?,
                })
            })
            .collect()
    }

    async fn upsert_indicator(&self, definition: &IndicatorDefinition) -> Result<bool, StoreError> {
        // Only empty columns are filled in; populated metadata is never overwritten.
        let affected = self
            .client
            .execute(
                "INSERT INTO indicators (code, name, unit, source, category)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (code) DO UPDATE SET
                    name = CASE WHEN indicators.name = '' THEN EXCLUDED.name ELSE indicators.name END,
                    unit = CASE WHEN indicators.unit = '' THEN EXCLUDED.unit ELSE indicators.unit END,
                    source = CASE WHEN indicators.source = '' THEN EXCLUDED.source ELSE indicators.source END,
                    category = CASE WHEN indicators.category = '' THEN EXCLUDED.category ELSE indicators.category END
                 WHERE (indicators.name = '' AND EXCLUDED.name <> '')
                    OR (indicators.unit = '' AND EXCLUDED.unit <> '')
                    OR (indicators.source = '' AND EXCLUDED.source <> '')
                    OR (indicators.category = '' AND EXCLUDED.category <> '')",
                &[
                    &definition.code,
                    &definition.name,
                    &definition.unit,
                    &definition.source,
                    &definition.category,
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn upsert_values(&self, batch: &[ObservedValue]) -> Result<u64, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let countries: Vec<&str> = batch.iter().map(|r| r.country_iso3.as_str()).collect();
        let codes: Vec<&str> = batch.iter().map(|r| r.indicator_code.as_str()).collect();
        let years: Vec<i32> = batch.iter().map(|r| r.year).collect();
        let values: Vec<f64> = batch.iter().map(|r| r.value).collect();
        let sources: Vec<&str> = batch.iter().map(|r| r.source.as_str()).collect();

        let params: [&(dyn ToSql + Sync); 5] = [&countries, &codes, &years, &values, &sources];
        let affected = self
            .client
            .execute(
                "INSERT INTO indicator_values (country_iso3, indicator_code, year, value, source)
                 SELECT * FROM UNNEST($1::text[], $2::text[], $3::int4[], $4::float8[], $5::text[])
                 ON CONFLICT (country_iso3, indicator_code, year) DO UPDATE SET
                    value = EXCLUDED.value,
                    source = EXCLUDED.source,
                    updated_at = now()",
                &params,
            )
            .await?;
        Ok(affected)
    }

    async fn delete_values(&self, filter: &DeleteFilter) -> Result<u64, StoreError> {
        let affected = self
            .client
            .execute(
                "DELETE FROM indicator_values
                 WHERE indicator_code = $1 AND ($2::int4 IS NULL OR year = $2)",
                &[&filter.indicator_code, &filter.year],
            )
            .await?;
        Ok(affected)
    }

    async fn select_values(&self, filter: &ValueFilter) -> Result<Vec<ObservedValue>, StoreError> {
        let codes = non_empty(&filter.indicator_codes);
        let countries = non_empty(&filter.countries);
        let start = filter.years.map(|y| y.start);
        let end = filter.years.map(|y| y.end);

        let rows = self
            .client
            .query(
                "SELECT country_iso3, indicator_code, year, value, source
                 FROM indicator_values
                 WHERE ($1::text[] IS NULL OR indicator_code = ANY($1))
                   AND ($2::text[] IS NULL OR country_iso3 = ANY($2))
                   AND ($3::int4 IS NULL OR year >= $3)
                   AND ($4::int4 IS NULL OR year <= $4)
                 ORDER BY country_iso3, indicator_code, year",
                &[&codes, &countries, &start, &end],
            )
            .await?;

        rows.iter().map(value_from_row).collect()
    }
}
