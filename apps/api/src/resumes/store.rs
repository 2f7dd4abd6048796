use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::resume::{NewResume, ResumeRecord};

/// Persistence for resume records. Rows are insert-only.
///
/// Carried in `AppState` as `Arc<dyn ResumeStore>`.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Inserts one row and returns it with its assigned id.
    async fn insert(&self, resume: NewResume) -> Result<ResumeRecord, sqlx::Error>;

    /// All rows, newest upload first.
    async fn list(&self) -> Result<Vec<ResumeRecord>, sqlx::Error>;

    async fn get(&self, id: i32) -> Result<Option<ResumeRecord>, sqlx::Error>;
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn insert(&self, resume: NewResume) -> Result<ResumeRecord, sqlx::Error> {
        sqlx::query_as::<_, ResumeRecord>(
            r#"
            INSERT INTO resumes
                (filename, original_name, file_size, file_type,
                 candidate_name, position, file_path, upload_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, filename, original_name, file_size, file_type,
                      candidate_name, position, file_path, upload_date
            "#,
        )
        .bind(&resume.filename)
        .bind(&resume.original_name)
        .bind(resume.file_size)
        .bind(resume.file_type.as_str())
        .bind(&resume.candidate_name)
        .bind(&resume.position)
        .bind(&resume.file_path)
        .bind(resume.upload_date)
        .fetch_one(&self.pool)
        .await
    }

    async fn list(&self) -> Result<Vec<ResumeRecord>, sqlx::Error> {
        sqlx::query_as::<_, ResumeRecord>(
            r#"
            SELECT id, filename, original_name, file_size, file_type,
                   candidate_name, position, file_path, upload_date
            FROM resumes
            ORDER BY upload_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get(&self, id: i32) -> Result<Option<ResumeRecord>, sqlx::Error> {
        sqlx::query_as::<_, ResumeRecord>(
            r#"
            SELECT id, filename, original_name, file_size, file_type,
                   candidate_name, position, file_path, upload_date
            FROM resumes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
