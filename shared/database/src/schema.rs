use anyhow::{Context, Result};
use sqlx::PgPool;

/// Creates the trial management tables and indexes if they are missing.
/// Safe to run on every start.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Creating PostgreSQL schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS organizations (
            id UUID PRIMARY KEY,
            name VARCHAR NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create organizations table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clinical_trials (
            id UUID PRIMARY KEY,
            organization_id UUID NOT NULL REFERENCES organizations(id),
            title VARCHAR NOT NULL,
            protocol_number VARCHAR NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create clinical_trials table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clinical_sites (
            id UUID PRIMARY KEY,
            trial_id UUID NOT NULL REFERENCES clinical_trials(id),
            name VARCHAR NOT NULL,
            location VARCHAR,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (id, trial_id)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create clinical_sites table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clinical_patients (
            id UUID PRIMARY KEY,
            trial_id UUID NOT NULL REFERENCES clinical_trials(id),
            site_id UUID NOT NULL,
            subject_code VARCHAR NOT NULL,
            enrolled_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            -- the site must belong to the patient's trial
            FOREIGN KEY (site_id, trial_id) REFERENCES clinical_sites(id, trial_id)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create clinical_patients table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patient_data_files (
            id UUID PRIMARY KEY,
            patient_id UUID NOT NULL REFERENCES clinical_patients(id),
            file_name VARCHAR NOT NULL,
            content_type VARCHAR NOT NULL,
            storage_uri TEXT NOT NULL,
            uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create patient_data_files table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patient_site_histories (
            id UUID PRIMARY KEY,
            patient_id UUID NOT NULL REFERENCES clinical_patients(id),
            site_id UUID NOT NULL REFERENCES clinical_sites(id),
            started_at TIMESTAMPTZ NOT NULL,
            ended_at TIMESTAMPTZ,
            reason TEXT
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create patient_site_histories table")?;

    // Name search plus the foreign keys behind eager loads
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_organizations_name ON organizations(name)",
        "CREATE INDEX IF NOT EXISTS idx_clinical_trials_organization_id \
         ON clinical_trials(organization_id)",
        "CREATE INDEX IF NOT EXISTS idx_clinical_sites_trial_id ON clinical_sites(trial_id)",
        "CREATE INDEX IF NOT EXISTS idx_clinical_patients_trial_id ON clinical_patients(trial_id)",
        "CREATE INDEX IF NOT EXISTS idx_clinical_patients_site_id ON clinical_patients(site_id)",
        "CREATE INDEX IF NOT EXISTS idx_patient_data_files_patient_id \
         ON patient_data_files(patient_id)",
        "CREATE INDEX IF NOT EXISTS idx_patient_site_histories_patient_id \
         ON patient_site_histories(patient_id)",
        "CREATE INDEX IF NOT EXISTS idx_patient_site_histories_site_id \
         ON patient_site_histories(site_id)",
    ] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to run `{statement}`"))?;
    }

    tracing::info!("PostgreSQL schema ready");
    Ok(())
}
