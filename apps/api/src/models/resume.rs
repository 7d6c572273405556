use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A stored resume. Storage owns it; the renderer only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub summary: Option<String>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRecord {
    /// Builds a fresh record from a validated create body.
    pub fn from_new(new: NewResume, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            summary: new.summary,
            education: new.education,
            experience: new.experience,
            skills: new.skills,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every field present in the patch and bumps `updated_at`.
    pub fn apply(&mut self, patch: ResumePatch, now: DateTime<Utc>) {
        let ResumePatch {
            name,
            email,
            phone,
            summary,
            education,
            experience,
            skills,
        } = patch;
        if let Some(name) = name {
            self.name = name;
        }
        if email.is_some() {
            self.email = email;
        }
        if phone.is_some() {
            self.phone = phone;
        }
        if summary.is_some() {
            self.summary = summary;
        }
        if let Some(education) = education {
            self.education = education;
        }
        if let Some(experience) = experience {
            self.experience = experience;
        }
        if let Some(skills) = skills {
            self.skills = skills;
        }
        self.updated_at = now;
    }
}

/// Body of `POST /api/resumes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewResume {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl NewResume {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name(&self.name)
    }
}

/// Body of `PUT /api/resumes/:id`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub summary: Option<String>,
    pub education: Option<Vec<Education>>,
    pub experience: Option<Vec<Experience>>,
    pub skills: Option<Vec<String>>,
}

impl ResumePatch {
    pub fn validate(&self) -> Result<(), AppError> {
        match &self.name {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    Ok(())
}
