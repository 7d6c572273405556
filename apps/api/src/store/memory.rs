use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumePatch, ResumeRecord};
use crate::store::ResumeStore;

/// In-process store. Records live for the lifetime of the process.
#[derive(Default)]
pub struct MemoryResumeStore {
    records: RwLock<Vec<ResumeRecord>>,
}

impl MemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn list(&self) -> Result<Vec<ResumeRecord>, AppError> {
        Ok(self.records.read().await.clone())
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<ResumeRecord>, AppError> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, new: NewResume) -> Result<ResumeRecord, AppError> {
        let record = ResumeRecord::from_new(new, Utc::now());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: ResumePatch) -> Result<Option<ResumeRecord>, AppError> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        record.apply(patch, Utc::now());
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<ResumeRecord>, AppError> {
        let mut records = self.records.write().await;
        let removed = records
            .iter()
            .position(|r| r.id == id)
            .map(|idx| records.remove(idx));
        Ok(removed)
    }
}
