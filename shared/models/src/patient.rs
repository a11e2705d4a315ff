//! Patient domain models.
//!
//! Covers the enrolled patient itself plus the records hanging off it:
//! uploaded data files and the history of site assignments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timestamp_now;

/// A patient enrolled in a trial at a specific site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalPatient {
    pub id: Uuid,
    pub trial_id: Uuid,
    pub site_id: Uuid,
    /// Pseudonymous subject code assigned by the site.
    pub subject_code: String,
    pub enrolled_at: DateTime<Utc>,
}

impl ClinicalPatient {
    pub fn new(trial_id: Uuid, site_id: Uuid, subject_code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            trial_id,
            site_id,
            subject_code: subject_code.into(),
            enrolled_at: timestamp_now(),
        }
    }
}

/// Metadata for a file uploaded against a patient. The content lives in
/// external storage at `storage_uri`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientDataFile {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub storage_uri: String,
    pub uploaded_at: DateTime<Utc>,
}

impl PatientDataFile {
    pub fn new(
        patient_id: Uuid,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        storage_uri: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            file_name: file_name.into(),
            content_type: content_type.into(),
            storage_uri: storage_uri.into(),
            uploaded_at: timestamp_now(),
        }
    }
}

/// One period during which a patient was assigned to a site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSiteHistory {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub site_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

impl PatientSiteHistory {
    /// Opens a new assignment starting now
    pub fn new(patient_id: Uuid, site_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            site_id,
            started_at: timestamp_now(),
            ended_at: None,
            reason: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}
