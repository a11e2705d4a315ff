//! Persistence port for trial management records.
//!
//! [`TrialStore`] is the seam between the repository facade and whatever
//! holds the rows. Inserts are units of work: an implementation either
//! commits the row or returns an error and leaves nothing behind.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use trial_models::{
    ClinicalPatient, ClinicalSite, ClinicalTrial, Organization, PatientDataFile,
    PatientSiteHistory,
};

pub mod memory;
pub mod pg;

pub use memory::InMemoryTrialStore;
pub use pg::PgTrialStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate key: {entity} {id} already exists")]
    DuplicateKey { entity: &'static str, id: Uuid },

    #[error("Missing reference: {entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: Uuid },

    #[error("Mismatched reference: {entity} {id} does not belong to {parent} {parent_id}")]
    MismatchedReference {
        entity: &'static str,
        id: Uuid,
        parent: &'static str,
        parent_id: Uuid,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Related collections to load alongside a single entity read.
///
/// Each flag is independent. Flags that do not apply to the entity being
/// read are ignored, so `Include::all()` is always safe to pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Include {
    pub trials: bool,
    pub sites: bool,
    pub patients: bool,
}

impl Include {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            trials: true,
            sites: true,
            patients: true,
        }
    }

    pub fn with_trials(mut self) -> Self {
        self.trials = true;
        self
    }

    pub fn with_sites(mut self) -> Self {
        self.sites = true;
        self
    }

    pub fn with_patients(mut self) -> Self {
        self.patients = true;
        self
    }
}

/// Storage operations backing the repository facade.
#[async_trait]
pub trait TrialStore: Send + Sync {
    async fn insert_organization(&self, organization: &Organization) -> StoreResult<()>;
    async fn insert_clinical_trial(&self, trial: &ClinicalTrial) -> StoreResult<()>;
    async fn insert_clinical_site(&self, site: &ClinicalSite) -> StoreResult<()>;
    async fn insert_clinical_patient(&self, patient: &ClinicalPatient) -> StoreResult<()>;
    async fn insert_patient_data_file(&self, data_file: &PatientDataFile) -> StoreResult<()>;
    async fn insert_patient_site_history(&self, history: &PatientSiteHistory) -> StoreResult<()>;

    /// Honors `include.trials`.
    async fn find_organization(
        &self,
        id: Uuid,
        include: Include,
    ) -> StoreResult<Option<Organization>>;
    /// Honors `include.sites` and `include.patients`.
    async fn find_clinical_trial(
        &self,
        id: Uuid,
        include: Include,
    ) -> StoreResult<Option<ClinicalTrial>>;
    /// Honors `include.patients`.
    async fn find_clinical_site(
        &self,
        id: Uuid,
        include: Include,
    ) -> StoreResult<Option<ClinicalSite>>;
    async fn find_clinical_patient(&self, id: Uuid) -> StoreResult<Option<ClinicalPatient>>;
    async fn find_patient_data_file(&self, id: Uuid) -> StoreResult<Option<PatientDataFile>>;
    async fn find_patient_site_history(&self, id: Uuid) -> StoreResult<Option<PatientSiteHistory>>;

    /// Organizations whose name contains `name_part` (case-sensitive),
    /// ordered by name. An empty `name_part` matches every organization.
    async fn search_organizations(&self, name_part: &str) -> StoreResult<Vec<Organization>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_builders() {
        assert_eq!(Include::none(), Include::default());

        let include = Include::none().with_sites();
        assert!(include.sites);
        assert!(!include.trials);
        assert!(!include.patients);

        assert_eq!(
            Include::none().with_trials().with_sites().with_patients(),
            Include::all()
        );
    }

    #[test]
    fn test_store_error_messages_carry_detail() {
        let id = Uuid::new_v4();
        let err = StoreError::DuplicateKey { entity: "organization", id };
        assert_eq!(err.to_string(), format!("Duplicate key: organization {id} already exists"));

        let err = StoreError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
