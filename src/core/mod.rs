// src/core/mod.rs
//! Client components: credential storage, service access, the access gate,
//! the submission lifecycle and result export.

pub mod access;
pub mod credential_store;
pub mod presenter;
pub mod service_client;
pub mod submission;

pub use access::{AccessController, AccessState};
pub use credential_store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use presenter::{ExportArtifact, ExportField, ResultPresenter};
pub use service_client::{AnalysisApi, ServiceClient};
pub use submission::{SubmissionController, SubmissionState};
