//! Repository facade over the trial management store.
//!
//! Every public method returns a [`RepositoryResult`]; store failures are
//! logged and collapsed into one generic error before reaching the caller.

pub mod trial_management;

pub use trial_management::{
    RepositoryError, RepositoryResult, TrialManagementRepository, GENERIC_ERROR_MESSAGE,
};
