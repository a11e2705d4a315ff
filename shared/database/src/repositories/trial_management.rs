//! Trial Management Repository
//!
//! Add and read operations for organizations, trials, sites, patients,
//! patient data files, and patient site history.

use std::sync::Arc;

use thiserror::Error;
use trial_utils::log_error;
use uuid::Uuid;

use trial_models::{
    ClinicalPatient, ClinicalSite, ClinicalTrial, Organization, PatientDataFile,
    PatientSiteHistory,
};

use crate::store::{Include, StoreResult, TrialStore};

/// Text returned to callers for every failed operation.
pub const GENERIC_ERROR_MESSAGE: &str =
    "An Error occured while processing your request. Information has been logged.";

/// The only error surfaced by the facade. The store's own error is logged,
/// never returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{}", GENERIC_ERROR_MESSAGE)]
    StoreOperationFailed,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Clone)]
pub struct TrialManagementRepository {
    store: Arc<dyn TrialStore>,
}

impl TrialManagementRepository {
    pub fn new(store: Arc<dyn TrialStore>) -> Self {
        Self { store }
    }

    pub fn with_store<S: TrialStore + 'static>(store: S) -> Self {
        Self::new(Arc::new(store))
    }

    pub async fn add_organization(
        &self,
        organization: Organization,
    ) -> RepositoryResult<Organization> {
        let outcome = self.store.insert_organization(&organization).await;
        settle(outcome.map(|()| organization), "add_organization")
    }

    pub async fn add_clinical_trial(
        &self,
        trial: ClinicalTrial,
    ) -> RepositoryResult<ClinicalTrial> {
        let outcome = self.store.insert_clinical_trial(&trial).await;
        settle(outcome.map(|()| trial), "add_clinical_trial")
    }

    pub async fn add_clinical_site(&self, site: ClinicalSite) -> RepositoryResult<ClinicalSite> {
        let outcome = self.store.insert_clinical_site(&site).await;
        settle(outcome.map(|()| site), "add_clinical_site")
    }

    pub async fn add_clinical_patient(
        &self,
        patient: ClinicalPatient,
    ) -> RepositoryResult<ClinicalPatient> {
        let outcome = self.store.insert_clinical_patient(&patient).await;
        settle(outcome.map(|()| patient), "add_clinical_patient")
    }

    pub async fn add_patient_data_file(
        &self,
        data_file: PatientDataFile,
    ) -> RepositoryResult<PatientDataFile> {
        let outcome = self.store.insert_patient_data_file(&data_file).await;
        settle(outcome.map(|()| data_file), "add_patient_data_file")
    }

    pub async fn add_patient_site_history(
        &self,
        history: PatientSiteHistory,
    ) -> RepositoryResult<PatientSiteHistory> {
        let outcome = self.store.insert_patient_site_history(&history).await;
        settle(outcome.map(|()| history), "add_patient_site_history")
    }

    /// Loads trials when `include.trials` is set.
    pub async fn get_organization(
        &self,
        id: Uuid,
        include: Include,
    ) -> RepositoryResult<Option<Organization>> {
        settle(self.store.find_organization(id, include).await, "get_organization")
    }

    /// Loads sites and/or patients per `include`.
    pub async fn get_clinical_trial(
        &self,
        id: Uuid,
        include: Include,
    ) -> RepositoryResult<Option<ClinicalTrial>> {
        settle(self.store.find_clinical_trial(id, include).await, "get_clinical_trial")
    }

    /// Loads patients when `include.patients` is set.
    pub async fn get_clinical_site(
        &self,
        id: Uuid,
        include: Include,
    ) -> RepositoryResult<Option<ClinicalSite>> {
        settle(self.store.find_clinical_site(id, include).await, "get_clinical_site")
    }

    pub async fn get_clinical_patient(
        &self,
        id: Uuid,
    ) -> RepositoryResult<Option<ClinicalPatient>> {
        settle(self.store.find_clinical_patient(id).await, "get_clinical_patient")
    }

    pub async fn get_patient_data_file(
        &self,
        id: Uuid,
    ) -> RepositoryResult<Option<PatientDataFile>> {
        settle(self.store.find_patient_data_file(id).await, "get_patient_data_file")
    }

    pub async fn get_patient_site_history(
        &self,
        id: Uuid,
    ) -> RepositoryResult<Option<PatientSiteHistory>> {
        settle(self.store.find_patient_site_history(id).await, "get_patient_site_history")
    }

    /// Organizations whose name contains `name_part`, ordered by name.
    /// An empty `name_part` returns every organization.
    pub async fn search_organizations_by_name(
        &self,
        name_part: &str,
    ) -> RepositoryResult<Vec<Organization>> {
        settle(
            self.store.search_organizations(name_part).await,
            "search_organizations_by_name",
        )
    }
}

fn settle<T>(outcome: StoreResult<T>, operation: &'static str) -> RepositoryResult<T> {
    outcome.map_err(|err| {
        log_error!(err, "Store operation failed", operation = operation);
        RepositoryError::StoreOperationFailed
    })
}
