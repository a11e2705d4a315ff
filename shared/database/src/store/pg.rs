//! PostgreSQL store
//!
//! Runtime SQL queries (unchecked) so no DATABASE_URL is needed at compile
//! time. Eager loads run as follow-up queries keyed by the parent id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use trial_models::{
    ClinicalPatient, ClinicalSite, ClinicalTrial, Organization, PatientDataFile,
    PatientSiteHistory,
};

use super::{Include, StoreResult, TrialStore};

#[derive(Clone)]
pub struct PgTrialStore {
    pool: PgPool,
}

impl PgTrialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn trials_for_organization(
        &self,
        organization_id: Uuid,
    ) -> StoreResult<Vec<ClinicalTrial>> {
        let rows: Vec<TrialRow> = sqlx::query_as(
            r#"
            SELECT id, organization_id, title, protocol_number, created_at
            FROM clinical_trials
            WHERE organization_id = $1
            ORDER BY created_at
            "#
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn sites_for_trial(&self, trial_id: Uuid) -> StoreResult<Vec<ClinicalSite>> {
        let rows: Vec<SiteRow> = sqlx::query_as(
            r#"
            SELECT id, trial_id, name, location, created_at
            FROM clinical_sites
            WHERE trial_id = $1
            ORDER BY created_at
            "#
        )
        .bind(trial_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn patients_where(
        &self,
        column: PatientParent,
        parent_id: Uuid,
    ) -> StoreResult<Vec<ClinicalPatient>> {
        let sql = match column {
            PatientParent::Trial => {
                r#"
                SELECT id, trial_id, site_id, subject_code, enrolled_at
                FROM clinical_patients
                WHERE trial_id = $1
                ORDER BY enrolled_at
                "#
            }
            PatientParent::Site => {
                r#"
                SELECT id, trial_id, site_id, subject_code, enrolled_at
                FROM clinical_patients
                WHERE site_id = $1
                ORDER BY enrolled_at
                "#
            }
        };

        let rows: Vec<PatientRow> = sqlx::query_as(sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

#[derive(Debug, Clone, Copy)]
enum PatientParent {
    Trial,
    Site,
}

#[async_trait]
impl TrialStore for PgTrialStore {
    async fn insert_organization(&self, organization: &Organization) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, created_at)
            VALUES ($1, $2, $3)
            "#
        )
        .bind(organization.id)
        .bind(&organization.name)
        .bind(organization.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn insert_clinical_trial(&self, trial: &ClinicalTrial) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO clinical_trials (id, organization_id, title, protocol_number, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#
        )
        .bind(trial.id)
        .bind(trial.organization_id)
        .bind(&trial.title)
        .bind(&trial.protocol_number)
        .bind(trial.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn insert_clinical_site(&self, site: &ClinicalSite) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO clinical_sites (id, trial_id, name, location, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#
        )
        .bind(site.id)
        .bind(site.trial_id)
        .bind(&site.name)
        .bind(&site.location)
        .bind(site.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn insert_clinical_patient(&self, patient: &ClinicalPatient) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO clinical_patients (id, trial_id, site_id, subject_code, enrolled_at)
            VALUES ($1, $2, $3, $4, $5)
            "#
        )
        .bind(patient.id)
        .bind(patient.trial_id)
        .bind(patient.site_id)
        .bind(&patient.subject_code)
        .bind(patient.enrolled_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn insert_patient_data_file(&self, data_file: &PatientDataFile) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO patient_data_files
                (id, patient_id, file_name, content_type, storage_uri, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#
        )
        .bind(data_file.id)
        .bind(data_file.patient_id)
        .bind(&data_file.file_name)
        .bind(&data_file.content_type)
        .bind(&data_file.storage_uri)
        .bind(data_file.uploaded_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn insert_patient_site_history(&self, history: &PatientSiteHistory) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO patient_site_histories
                (id, patient_id, site_id, started_at, ended_at, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#
        )
        .bind(history.id)
        .bind(history.patient_id)
        .bind(history.site_id)
        .bind(history.started_at)
        .bind(history.ended_at)
        .bind(&history.reason)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_organization(
        &self,
        id: Uuid,
        include: Include,
    ) -> StoreResult<Option<Organization>> {
        let row: Option<OrganizationRow> = sqlx::query_as(
            r#"
            SELECT id, name, created_at
            FROM organizations
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut organization: Organization = row.into();
        if include.trials {
            organization.trials = Some(self.trials_for_organization(id).await?);
        }

        Ok(Some(organization))
    }

    async fn find_clinical_trial(
        &self,
        id: Uuid,
        include: Include,
    ) -> StoreResult<Option<ClinicalTrial>> {
        let row: Option<TrialRow> = sqlx::query_as(
            r#"
            SELECT id, organization_id, title, protocol_number, created_at
            FROM clinical_trials
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut trial: ClinicalTrial = row.into();
        if include.sites {
            trial.sites = Some(self.sites_for_trial(id).await?);
        }
        if include.patients {
            trial.patients = Some(self.patients_where(PatientParent::Trial, id).await?);
        }

        Ok(Some(trial))
    }

    async fn find_clinical_site(
        &self,
        id: Uuid,
        include: Include,
    ) -> StoreResult<Option<ClinicalSite>> {
        let row: Option<SiteRow> = sqlx::query_as(
            r#"
            SELECT id, trial_id, name, location, created_at
            FROM clinical_sites
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut site: ClinicalSite = row.into();
        if include.patients {
            site.patients = Some(self.patients_where(PatientParent::Site, id).await?);
        }

        Ok(Some(site))
    }

    async fn find_clinical_patient(&self, id: Uuid) -> StoreResult<Option<ClinicalPatient>> {
        let row: Option<PatientRow> = sqlx::query_as(
            r#"
            SELECT id, trial_id, site_id, subject_code, enrolled_at
            FROM clinical_patients
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_patient_data_file(&self, id: Uuid) -> StoreResult<Option<PatientDataFile>> {
        let row: Option<DataFileRow> = sqlx::query_as(
            r#"
            SELECT id, patient_id, file_name, content_type, storage_uri, uploaded_at
            FROM patient_data_files
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_patient_site_history(&self, id: Uuid) -> StoreResult<Option<PatientSiteHistory>> {
        let row: Option<SiteHistoryRow> = sqlx::query_as(
            r#"
            SELECT id, patient_id, site_id, started_at, ended_at, reason
            FROM patient_site_histories
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn search_organizations(&self, name_part: &str) -> StoreResult<Vec<Organization>> {
        // strpos keeps `%` and `_` in the needle literal, unlike LIKE.
        // COLLATE "C" orders by bytes, matching `str` ordering.
        let rows: Vec<OrganizationRow> = sqlx::query_as(
            r#"
            SELECT id, name, created_at
            FROM organizations
            WHERE strpos(name, $1) > 0
            ORDER BY name COLLATE "C"
            "#
        )
        .bind(name_part)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

/// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct OrganizationRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct TrialRow {
    id: Uuid,
    organization_id: Uuid,
    title: String,
    protocol_number: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SiteRow {
    id: Uuid,
    trial_id: Uuid,
    name: String,
    location: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PatientRow {
    id: Uuid,
    trial_id: Uuid,
    site_id: Uuid,
    subject_code: String,
    enrolled_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct DataFileRow {
    id: Uuid,
    patient_id: Uuid,
    file_name: String,
    content_type: String,
    storage_uri: String,
    uploaded_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SiteHistoryRow {
    id: Uuid,
    patient_id: Uuid,
    site_id: Uuid,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    reason: Option<String>,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            trials: None,
        }
    }
}

impl From<TrialRow> for ClinicalTrial {
    fn from(row: TrialRow) -> Self {
        Self {
            id: row.id,
            organization_id: row.organization_id,
            title: row.title,
            protocol_number: row.protocol_number,
            created_at: row.created_at,
            sites: None,
            patients: None,
        }
    }
}

impl From<SiteRow> for ClinicalSite {
    fn from(row: SiteRow) -> Self {
        Self {
            id: row.id,
            trial_id: row.trial_id,
            name: row.name,
            location: row.location,
            created_at: row.created_at,
            patients: None,
        }
    }
}

impl From<PatientRow> for ClinicalPatient {
    fn from(row: PatientRow) -> Self {
        Self {
            id: row.id,
            trial_id: row.trial_id,
            site_id: row.site_id,
            subject_code: row.subject_code,
            enrolled_at: row.enrolled_at,
        }
    }
}

impl From<DataFileRow> for PatientDataFile {
    fn from(row: DataFileRow) -> Self {
        Self {
            id: row.id,
            patient_id: row.patient_id,
            file_name: row.file_name,
            content_type: row.content_type,
            storage_uri: row.storage_uri,
            uploaded_at: row.uploaded_at,
        }
    }
}

impl From<SiteHistoryRow> for PatientSiteHistory {
    fn from(row: SiteHistoryRow) -> Self {
        Self {
            id: row.id,
            patient_id: row.patient_id,
            site_id: row.site_id,
            started_at: row.started_at,
            ended_at: row.ended_at,
            reason: row.reason,
        }
    }
}
