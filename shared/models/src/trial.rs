//! Clinical trial domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{timestamp_now, ClinicalPatient, ClinicalSite};

/// A clinical trial run by an organization across one or more sites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalTrial {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub protocol_number: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites: Option<Vec<ClinicalSite>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patients: Option<Vec<ClinicalPatient>>,
}

impl ClinicalTrial {
    pub fn new(
        organization_id: Uuid,
        title: impl Into<String>,
        protocol_number: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            title: title.into(),
            protocol_number: protocol_number.into(),
            created_at: timestamp_now(),
            sites: None,
            patients: None,
        }
    }

    pub fn without_relations(&self) -> Self {
        Self {
            sites: None,
            patients: None,
            ..self.clone()
        }
    }
}
