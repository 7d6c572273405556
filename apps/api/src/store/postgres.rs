use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{Education, Experience, NewResume, ResumePatch, ResumeRecord};
use crate::store::ResumeStore;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS resumes (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        email       TEXT,
        phone       TEXT,
        summary     TEXT,
        education   JSONB NOT NULL DEFAULT '[]'::jsonb,
        experience  JSONB NOT NULL DEFAULT '[]'::jsonb,
        skills      TEXT[] NOT NULL DEFAULT '{}',
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
"#;

#[derive(Debug, FromRow)]
struct ResumeRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    summary: Option<String>,
    education: Json<Vec<Education>>,
    experience: Json<Vec<Experience>>,
    skills: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for ResumeRecord {
    fn from(row: ResumeRow) -> Self {
        ResumeRecord {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            summary: row.summary,
            education: row.education.0,
            experience: row.experience.0,
            skills: row.skills,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed store. Entries are JSONB so their order is kept verbatim.
#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    /// Opens a connection pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Creates the `resumes` table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        info!("resumes table ready");
        Ok(())
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn list(&self) -> Result<Vec<ResumeRecord>, AppError> {
        let rows: Vec<ResumeRow> =
            sqlx::query_as("SELECT * FROM resumes ORDER BY created_at ASC, id ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(ResumeRecord::from).collect())
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<ResumeRecord>, AppError> {
        let row: Option<ResumeRow> = sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ResumeRecord::from))
    }

    async fn create(&self, new: NewResume) -> Result<ResumeRecord, AppError> {
        let record = ResumeRecord::from_new(new, Utc::now());
        let row: ResumeRow = sqlx::query_as(
            r#"
            INSERT INTO resumes
                (id, name, email, phone, summary, education, experience, skills,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.summary)
        .bind(Json(&record.education))
        .bind(Json(&record.experience))
        .bind(&record.skills)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, patch: ResumePatch) -> Result<Option<ResumeRecord>, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<ResumeRow> =
            sqlx::query_as("SELECT * FROM resumes WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut record = ResumeRecord::from(existing);
        record.apply(patch, Utc::now());

        let row: ResumeRow = sqlx::query_as(
            r#"
            UPDATE resumes
            SET name = $2, email = $3, phone = $4, summary = $5,
                education = $6, experience = $7, skills = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.summary)
        .bind(Json(&record.education))
        .bind(Json(&record.experience))
        .bind(&record.skills)
        .bind(record.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.into()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<ResumeRecord>, AppError> {
        let row: Option<ResumeRow> = sqlx::query_as("DELETE FROM resumes WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ResumeRecord::from))
    }
}
