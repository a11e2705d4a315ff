//! Organization domain model.
//!
//! An organization sponsors clinical trials. Its trials are only present when
//! a read explicitly asks for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{timestamp_now, ClinicalTrial};

/// A sponsoring organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// `None` until loaded with an include request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trials: Option<Vec<ClinicalTrial>>,
}

impl Organization {
    /// Creates a new organization with a fresh identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: timestamp_now(),
            trials: None,
        }
    }

    /// Returns a copy carrying only the organization's own columns
    pub fn without_relations(&self) -> Self {
        Self {
            trials: None,
            ..self.clone()
        }
    }
}
