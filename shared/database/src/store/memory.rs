//! In-memory store
//!
//! Enforces the same primary and foreign key rules as the relational
//! schema so it can stand in for PostgreSQL in tests and local tooling.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use trial_models::{
    ClinicalPatient, ClinicalSite, ClinicalTrial, Organization, PatientDataFile,
    PatientSiteHistory,
};

use super::{Include, StoreError, StoreResult, TrialStore};

#[derive(Debug, Default)]
pub struct InMemoryTrialStore {
    tables: RwLock<Tables>,
}

/// Rows are stored without relationship collections.
#[derive(Debug, Default)]
struct Tables {
    organizations: BTreeMap<Uuid, Organization>,
    trials: BTreeMap<Uuid, ClinicalTrial>,
    sites: BTreeMap<Uuid, ClinicalSite>,
    patients: BTreeMap<Uuid, ClinicalPatient>,
    data_files: BTreeMap<Uuid, PatientDataFile>,
    site_histories: BTreeMap<Uuid, PatientSiteHistory>,
}

impl InMemoryTrialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn trials_for_organization(&self, organization_id: Uuid) -> Vec<ClinicalTrial> {
        let mut trials: Vec<ClinicalTrial> = self
            .trials
            .values()
            .filter(|t| t.organization_id == organization_id)
            .cloned()
            .collect();
        trials.sort_by_key(|t| t.created_at);
        trials
    }

    fn sites_for_trial(&self, trial_id: Uuid) -> Vec<ClinicalSite> {
        let mut sites: Vec<ClinicalSite> = self
            .sites
            .values()
            .filter(|s| s.trial_id == trial_id)
            .cloned()
            .collect();
        sites.sort_by_key(|s| s.created_at);
        sites
    }

    fn patients_matching(
        &self,
        predicate: impl Fn(&ClinicalPatient) -> bool,
    ) -> Vec<ClinicalPatient> {
        let mut patients: Vec<ClinicalPatient> = self
            .patients
            .values()
            .filter(|p| predicate(p))
            .cloned()
            .collect();
        patients.sort_by_key(|p| p.enrolled_at);
        patients
    }
}

fn ensure_absent<T>(table: &BTreeMap<Uuid, T>, entity: &'static str, id: Uuid) -> StoreResult<()> {
    if table.contains_key(&id) {
        return Err(StoreError::DuplicateKey { entity, id });
    }
    Ok(())
}

fn ensure_present<T>(table: &BTreeMap<Uuid, T>, entity: &'static str, id: Uuid) -> StoreResult<()> {
    if !table.contains_key(&id) {
        return Err(StoreError::MissingReference { entity, id });
    }
    Ok(())
}

#[async_trait]
impl TrialStore for InMemoryTrialStore {
    async fn insert_organization(&self, organization: &Organization) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        ensure_absent(&tables.organizations, "organization", organization.id)?;

        tables
            .organizations
            .insert(organization.id, organization.without_relations());
        Ok(())
    }

    async fn insert_clinical_trial(&self, trial: &ClinicalTrial) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        ensure_absent(&tables.trials, "clinical trial", trial.id)?;
        ensure_present(&tables.organizations, "organization", trial.organization_id)?;

        tables.trials.insert(trial.id, trial.without_relations());
        Ok(())
    }

    async fn insert_clinical_site(&self, site: &ClinicalSite) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        ensure_absent(&tables.sites, "clinical site", site.id)?;
        ensure_present(&tables.trials, "clinical trial", site.trial_id)?;

        tables.sites.insert(site.id, site.without_relations());
        Ok(())
    }

    async fn insert_clinical_patient(&self, patient: &ClinicalPatient) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        ensure_absent(&tables.patients, "clinical patient", patient.id)?;
        ensure_present(&tables.trials, "clinical trial", patient.trial_id)?;
        let site = tables
            .sites
            .get(&patient.site_id)
            .ok_or(StoreError::MissingReference {
                entity: "clinical site",
                id: patient.site_id,
            })?;
        if site.trial_id != patient.trial_id {
            return Err(StoreError::MismatchedReference {
                entity: "clinical site",
                id: patient.site_id,
                parent: "clinical trial",
                parent_id: patient.trial_id,
            });
        }

        tables.patients.insert(patient.id, patient.clone());
        Ok(())
    }

    async fn insert_patient_data_file(&self, data_file: &PatientDataFile) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        ensure_absent(&tables.data_files, "patient data file", data_file.id)?;
        ensure_present(&tables.patients, "clinical patient", data_file.patient_id)?;

        tables.data_files.insert(data_file.id, data_file.clone());
        Ok(())
    }

    async fn insert_patient_site_history(&self, history: &PatientSiteHistory) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        ensure_absent(&tables.site_histories, "patient site history", history.id)?;
        ensure_present(&tables.patients, "clinical patient", history.patient_id)?;
        ensure_present(&tables.sites, "clinical site", history.site_id)?;

        tables.site_histories.insert(history.id, history.clone());
        Ok(())
    }

    async fn find_organization(
        &self,
        id: Uuid,
        include: Include,
    ) -> StoreResult<Option<Organization>> {
        let tables = self.tables.read().await;
        let Some(mut organization) = tables.organizations.get(&id).cloned() else {
            return Ok(None);
        };

        if include.trials {
            organization.trials = Some(tables.trials_for_organization(id));
        }
        Ok(Some(organization))
    }

    async fn find_clinical_trial(
        &self,
        id: Uuid,
        include: Include,
    ) -> StoreResult<Option<ClinicalTrial>> {
        let tables = self.tables.read().await;
        let Some(mut trial) = tables.trials.get(&id).cloned() else {
            return Ok(None);
        };

        if include.sites {
            trial.sites = Some(tables.sites_for_trial(id));
        }
        if include.patients {
            trial.patients = Some(tables.patients_matching(|p| p.trial_id == id));
        }
        Ok(Some(trial))
    }

    async fn find_clinical_site(
        &self,
        id: Uuid,
        include: Include,
    ) -> StoreResult<Option<ClinicalSite>> {
        let tables = self.tables.read().await;
        let Some(mut site) = tables.sites.get(&id).cloned() else {
            return Ok(None);
        };

        if include.patients {
            site.patients = Some(tables.patients_matching(|p| p.site_id == id));
        }
        Ok(Some(site))
    }

    async fn find_clinical_patient(&self, id: Uuid) -> StoreResult<Option<ClinicalPatient>> {
        Ok(self.tables.read().await.patients.get(&id).cloned())
    }

    async fn find_patient_data_file(&self, id: Uuid) -> StoreResult<Option<PatientDataFile>> {
        Ok(self.tables.read().await.data_files.get(&id).cloned())
    }

    async fn find_patient_site_history(&self, id: Uuid) -> StoreResult<Option<PatientSiteHistory>> {
        Ok(self.tables.read().await.site_histories.get(&id).cloned())
    }

    async fn search_organizations(&self, name_part: &str) -> StoreResult<Vec<Organization>> {
        let tables = self.tables.read().await;
        let mut matches: Vec<Organization> = tables
            .organizations
            .values()
            .filter(|o| o.name.contains(name_part))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }
}
