//! PostgreSQL 지표 저장소.
//!
//! 연결은 쿼리마다 풀에서 빌려 쓰고 즉시 반환합니다. 장시간 실행되는 갱신 작업이
//! 요청 처리용 연결을 붙잡지 않습니다.

use std::time::Duration;

use async_trait::async_trait;
use breconomy_core::{DatabaseConfig, IndicatorRecord, IndicatorUpdate};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};
use uuid::Uuid;

use super::IndicatorStore;
use crate::error::{DataError, Result};

/// 데이터베이스 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 새로운 데이터베이스 연결 풀을 생성합니다.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DataError::MigrationError(e.to_string()))?;

        info!("Migrations completed successfully");
        Ok(())
    }
}

/// `economic_indicators` 테이블 기반 저장소.
#[derive(Clone)]
pub struct PgIndicatorStore {
    db: Database,
}

impl PgIndicatorStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IndicatorStore for PgIndicatorStore {
    async fn upsert(
        &self,
        update: &IndicatorUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<IndicatorRecord> {
        let record = sqlx::query_as::<_, IndicatorRecord>(
            r#"
            INSERT INTO economic_indicators (id, name, value, reference_date, last_updated)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO UPDATE SET
                value = EXCLUDED.value,
                reference_date = EXCLUDED.reference_date,
                last_updated = EXCLUDED.last_updated
            RETURNING id, name, value, reference_date, last_updated
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&update.name)
        .bind(update.value)
        .bind(update.reference_date)
        .bind(updated_at)
        .fetch_one(self.db.pool())
        .await?;

        debug!(indicator = %record.name, id = %record.id, "Indicator upserted");
        Ok(record)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<IndicatorRecord>> {
        let record = sqlx::query_as::<_, IndicatorRecord>(
            r#"
            SELECT id, name, value, reference_date, last_updated
            FROM economic_indicators
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(record)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM economic_indicators")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(self.db.pool())
            .await
            .map_err(|e| DataError::QueryError(e.to_string()))?;
        Ok(())
    }
}
