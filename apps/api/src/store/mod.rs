//! Resume storage: pluggable, trait-based persistence for resume records.
//!
//! `PgResumeStore` backs production; `MemoryResumeStore` is used when no
//! `DATABASE_URL` is configured and by tests.
//!
//! `AppState` holds an `Arc<dyn ResumeStore>`, chosen at startup from config.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumePatch, ResumeRecord};

pub use memory::MemoryResumeStore;
pub use postgres::PgResumeStore;

/// CRUD over resume records keyed by id.
///
/// Inputs are validated by the HTTP layer; stores only persist. Lookups by an
/// unknown id return `Ok(None)` and never an error.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// All records in creation order.
    async fn list(&self) -> Result<Vec<ResumeRecord>, AppError>;

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<ResumeRecord>, AppError>;

    async fn create(&self, new: NewResume) -> Result<ResumeRecord, AppError>;

    /// Merges the patch into the stored record; `None` if the id is unknown.
    async fn update(&self, id: Uuid, patch: ResumePatch) -> Result<Option<ResumeRecord>, AppError>;

    /// Removes the record, returning it; `None` if the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<Option<ResumeRecord>, AppError>;
}
