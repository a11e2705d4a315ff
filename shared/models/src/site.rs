//! Clinical site domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{timestamp_now, ClinicalPatient};

/// A location enrolling patients into a single trial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalSite {
    pub id: Uuid,
    pub trial_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patients: Option<Vec<ClinicalPatient>>,
}

impl ClinicalSite {
    pub fn new(trial_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            trial_id,
            name: name.into(),
            location: None,
            created_at: timestamp_now(),
            patients: None,
        }
    }

    pub fn without_relations(&self) -> Self {
        Self {
            patients: None,
            ..self.clone()
        }
    }
}
