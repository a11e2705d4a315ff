//! PostgreSQL round trips.
//!
//! Run with a disposable database:
//! `TRIALS_TEST_DATABASE_URL=postgres://... cargo test -p trial-database -- --ignored`

use std::time::Duration;

use uuid::Uuid;

use trial_database::{
    create_postgres_pool, create_schema, postgres_health_check, Include, PgTrialStore,
    RepositoryError, TrialManagementRepository,
};
use trial_models::{ClinicalPatient, ClinicalSite, ClinicalTrial, Organization, PatientSiteHistory};

async fn repository() -> TrialManagementRepository {
    let url = std::env::var("TRIALS_TEST_DATABASE_URL")
        .expect("TRIALS_TEST_DATABASE_URL must point at a test database");
    let pool = create_postgres_pool(&url, 2, Duration::from_secs(10)).await.unwrap();
    postgres_health_check(&pool).await.unwrap();
    create_schema(&pool).await.unwrap();
    TrialManagementRepository::with_store(PgTrialStore::new(pool))
}

#[tokio::test]
#[ignore] // Requires a running PostgreSQL
async fn test_graph_round_trip_with_includes() {
    let repository = repository().await;
    let tag = Uuid::new_v4().simple().to_string();

    let organization = repository
        .add_organization(Organization::new(format!("Acme Health {tag}")))
        .await
        .unwrap();

    let trial = repository
        .add_clinical_trial(ClinicalTrial::new(organization.id, "Phase III", "PRT-300"))
        .await
        .unwrap();

    let mut site = ClinicalSite::new(trial.id, "Central");
    site.location = Some("Copenhagen".to_string());
    let site = repository.add_clinical_site(site).await.unwrap();

    let patient = repository
        .add_clinical_patient(ClinicalPatient::new(trial.id, site.id, "C-001"))
        .await
        .unwrap();

    let found = repository
        .get_organization(organization.id, Include::none())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, organization);

    let with_trials = repository
        .get_organization(organization.id, Include::none().with_trials())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(with_trials.trials, Some(vec![trial.clone()]));

    let full_trial = repository
        .get_clinical_trial(trial.id, Include::all())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(full_trial.sites, Some(vec![site.clone()]));
    assert_eq!(full_trial.patients, Some(vec![patient.clone()]));

    let history = repository
        .add_patient_site_history(PatientSiteHistory::new(patient.id, site.id))
        .await
        .unwrap();
    assert_eq!(
        repository.get_patient_site_history(history.id).await,
        Ok(Some(history))
    );

    let matches = repository.search_organizations_by_name(&tag).await.unwrap();
    assert_eq!(matches, vec![organization]);
}

#[tokio::test]
#[ignore] // Requires a running PostgreSQL
async fn test_added_organization_reads_back_equal() {
    let repository = repository().await;

    let added = repository
        .add_organization(Organization::new("Acme Health"))
        .await
        .unwrap();
    let found = repository
        .get_organization(added.id, Include::none())
        .await
        .unwrap();

    assert_eq!(found, Some(added));
}

#[tokio::test]
#[ignore] // Requires a running PostgreSQL
async fn test_patient_at_another_trials_site_is_rejected() {
    let repository = repository().await;
    let organization = repository
        .add_organization(Organization::new("Cross Trial Co"))
        .await
        .unwrap();
    let trial_a = repository
        .add_clinical_trial(ClinicalTrial::new(organization.id, "A", "PRT-A"))
        .await
        .unwrap();
    let trial_b = repository
        .add_clinical_trial(ClinicalTrial::new(organization.id, "B", "PRT-B"))
        .await
        .unwrap();
    let site_b = repository
        .add_clinical_site(ClinicalSite::new(trial_b.id, "B Site"))
        .await
        .unwrap();

    let misplaced = ClinicalPatient::new(trial_a.id, site_b.id, "X-001");
    assert_eq!(
        repository.add_clinical_patient(misplaced.clone()).await,
        Err(RepositoryError::StoreOperationFailed)
    );
    assert_eq!(repository.get_clinical_patient(misplaced.id).await, Ok(None));
}

#[tokio::test]
#[ignore] // Requires a running PostgreSQL
async fn test_constraint_violations_collapse_to_generic_error() {
    let repository = repository().await;
    let organization = repository
        .add_organization(Organization::new("Duplicate Co"))
        .await
        .unwrap();

    assert_eq!(
        repository.add_organization(organization).await,
        Err(RepositoryError::StoreOperationFailed)
    );

    let orphan = ClinicalTrial::new(Uuid::new_v4(), "Orphan", "PRT-404");
    assert_eq!(
        repository.add_clinical_trial(orphan).await,
        Err(RepositoryError::StoreOperationFailed)
    );
}

#[tokio::test]
#[ignore] // Requires a running PostgreSQL
async fn test_search_treats_wildcards_literally() {
    let repository = repository().await;
    let tag = Uuid::new_v4().simple().to_string();
    let literal = repository
        .add_organization(Organization::new(format!("100% Care {tag}")))
        .await
        .unwrap();
    repository
        .add_organization(Organization::new(format!("1000 Care {tag}")))
        .await
        .unwrap();

    let matches = repository
        .search_organizations_by_name(&format!("100% Care {tag}"))
        .await
        .unwrap();
    assert_eq!(matches, vec![literal]);
}
