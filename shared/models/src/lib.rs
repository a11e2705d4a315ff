//! # Trial Management Domain Models
//!
//! Records persisted by the trial management data-access layer.
//!
//! ## Key Models
//!
//! - **Organization**: a trial sponsor, owning many clinical trials
//! - **ClinicalTrial**: a trial, owning sites and enrolled patients
//! - **ClinicalSite**: a site within a trial, owning its patients
//! - **ClinicalPatient**: an enrolled patient
//! - **PatientDataFile**: metadata for a file uploaded against a patient
//! - **PatientSiteHistory**: a patient's assignment to a site over time
//!
//! Relationship collections are `Option<Vec<_>>`. `None` means the
//! collection was not loaded, which is different from a loaded empty list.

pub mod organization;
pub mod trial;
pub mod site;
pub mod patient;

pub use organization::*;
pub use trial::*;
pub use site::*;
pub use patient::*;

use chrono::{DateTime, SubsecRound, Utc};

/// The current time at the microsecond precision PostgreSQL `TIMESTAMPTZ`
/// stores, so a record reads back equal to what was written.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_organization_new() {
        let organization = Organization::new("Acme Health");

        assert_eq!(organization.name, "Acme Health");
        assert!(!organization.id.is_nil());
        assert!(organization.trials.is_none());
    }

    #[test]
    fn test_without_relations_drops_loaded_collections() {
        let mut trial = ClinicalTrial::new(Uuid::new_v4(), "Phase II", "PRT-002");
        let site = ClinicalSite::new(trial.id, "North Clinic");
        trial.sites = Some(vec![site.clone()]);
        trial.patients = Some(Vec::new());

        let bare = trial.without_relations();
        assert_eq!(bare.id, trial.id);
        assert_eq!(bare.title, trial.title);
        assert!(bare.sites.is_none());
        assert!(bare.patients.is_none());
    }

    #[test]
    fn test_unloaded_collections_are_omitted_from_json() {
        let organization = Organization::new("Acme Health");
        let json = serde_json::to_value(&organization).unwrap();
        assert!(json.get("trials").is_none());

        let mut loaded = organization.clone();
        loaded.trials = Some(Vec::new());
        let json = serde_json::to_value(&loaded).unwrap();
        assert_eq!(json["trials"], serde_json::json!([]));
    }

    #[test]
    fn test_missing_collections_deserialize_as_unloaded() {
        let id = Uuid::new_v4();
        let json = serde_json::json!({
            "id": id,
            "trial_id": Uuid::new_v4(),
            "name": "West Wing",
            "location": null,
            "created_at": "2024-01-01T00:00:00Z"
        });

        let site: ClinicalSite = serde_json::from_value(json).unwrap();
        assert_eq!(site.id, id);
        assert!(site.patients.is_none());
    }

    #[test]
    fn test_constructors_stamp_microsecond_timestamps() {
        use chrono::Timelike;

        let id = Uuid::new_v4();
        let stamps = [
            Organization::new("Acme Health").created_at,
            ClinicalTrial::new(id, "Phase I", "PRT-001").created_at,
            ClinicalSite::new(id, "North").created_at,
            ClinicalPatient::new(id, id, "N-001").enrolled_at,
            PatientDataFile::new(id, "a.csv", "text/csv", "file:///a.csv").uploaded_at,
            PatientSiteHistory::new(id, id).started_at,
            timestamp_now(),
        ];

        for stamp in stamps {
            assert_eq!(stamp.nanosecond() % 1_000, 0, "{stamp}");
        }
    }

    #[test]
    fn test_site_history_open_until_ended() {
        let mut history = PatientSiteHistory::new(Uuid::new_v4(), Uuid::new_v4());
        assert!(history.is_open());

        history.ended_at = Some(timestamp_now());
        history.reason = Some("Transferred".to_string());
        assert!(!history.is_open());
    }
}
