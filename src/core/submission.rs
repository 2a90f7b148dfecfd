// src/core/submission.rs
//! Lifecycle of one analysis request.
//!
//! `Idle -> Validating -> Submitting -> {Succeeded, Failed, AuthRejected}`.
//! A terminal state is left again by the next `submit` or by `reset`. Only
//! one submission may be in flight; a second attempt gets `Busy`.

use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::access::AccessController;
use crate::core::presenter::ResultPresenter;
use crate::core::service_client::AnalysisApi;
use crate::error::{ClientError, Result};
use crate::types::{AnalysisRequest, AnalysisResult, ResumeFile, RewriteResult};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Succeeded(Arc<AnalysisResult>),
    Failed(ClientError),
    AuthRejected,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded(_)
                | SubmissionState::Failed(_)
                | SubmissionState::AuthRejected
        )
    }

    fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Succeeded(_) => "succeeded",
            SubmissionState::Failed(_) => "failed",
            SubmissionState::AuthRejected => "auth_rejected",
        }
    }
}

pub struct SubmissionController {
    api: Arc<dyn AnalysisApi>,
    access: Arc<AccessController>,
    state: Mutex<SubmissionState>,
}

impl SubmissionController {
    pub fn new(api: Arc<dyn AnalysisApi>, access: Arc<AccessController>) -> Self {
        Self {
            api,
            access,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or(SubmissionState::Idle)
    }

    /// Last successful result, if the latest submission succeeded.
    pub fn result(&self) -> Option<Arc<AnalysisResult>> {
        match self.state() {
            SubmissionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    /// Exporter for the current result; `None` until a submission succeeds.
    pub fn presenter(&self) -> Option<ResultPresenter> {
        self.result().map(ResultPresenter::new)
    }

    pub fn reset(&self) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ClientError::Analysis("submission state poisoned".to_string()))?;
        if !state.is_terminal() && *state != SubmissionState::Idle {
            return Err(ClientError::Busy);
        }
        *state = SubmissionState::Idle;
        Ok(())
    }

    /// Validate the inputs and, if they pass, run one analysis.
    pub async fn submit(
        &self,
        resume: Option<ResumeFile>,
        jd_text: &str,
    ) -> Result<Arc<AnalysisResult>> {
        {
            let mut state = self
                .state
                .lock()
                .map_err(|_| ClientError::Analysis("submission state poisoned".to_string()))?;
            if *state == SubmissionState::Submitting {
                warn!("Rejected submission while another is in flight");
                return Err(ClientError::Busy);
            }
            if !self.access.is_unlocked() {
                return Err(ClientError::Locked);
            }
            *state = SubmissionState::Validating;
        }

        let request = match AnalysisRequest::validate(resume, jd_text) {
            Ok(request) => request,
            Err(e) => {
                debug!("Submission failed validation: {}", e);
                self.transition(SubmissionState::Failed(e.clone()));
                return Err(e);
            }
        };

        let submission_id = Uuid::new_v4();
        self.transition(SubmissionState::Submitting);
        info!(
            "Submission {} started: {} ({} bytes)",
            submission_id,
            request.resume.file_name,
            request.resume.bytes.len()
        );

        let outcome = self.api.analyze(&request).await;
        drop(request);

        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                self.transition(SubmissionState::Succeeded(result.clone()));
                info!("Submission {} succeeded", submission_id);
                Ok(result)
            }
            Err(ClientError::Auth) => {
                self.access.revoke();
                self.transition(SubmissionState::AuthRejected);
                warn!("Submission {} rejected: access code invalid", submission_id);
                Err(ClientError::Auth)
            }
            Err(e) => {
                error!("Submission {} failed: {}", submission_id, e);
                self.transition(SubmissionState::Failed(e.clone()));
                Err(e)
            }
        }
    }

    /// Regenerate bullet points against a job description.
    pub async fn rewrite(&self, bullets: &[String], jd_text: &str) -> Result<RewriteResult> {
        if !self.access.is_unlocked() {
            return Err(ClientError::Locked);
        }

        let bullets: Vec<String> = bullets
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        if bullets.is_empty() {
            return Ok(RewriteResult {
                rewritten_bullets: Vec::new(),
            });
        }

        self.access
            .observe(self.api.rewrite(&bullets, jd_text).await)
    }

    fn transition(&self, next: SubmissionState) {
        if let Ok(mut state) = self.state.lock() {
            debug!("Submission state {} -> {}", state.name(), next.name());
            *state = next;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::access::AccessState;
    use crate::core::credential_store::{CredentialStore, MemoryCredentialStore};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted stand-in for the remote service.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub analyze_calls: AtomicUsize,
        pub rewrite_calls: AtomicUsize,
        pub export_calls: AtomicUsize,
        analyze_replies: Mutex<VecDeque<Result<AnalysisResult>>>,
        rewrite_reply: Mutex<Option<Result<RewriteResult>>>,
        export_reply: Mutex<Option<Result<Vec<u8>>>>,
        yield_in_analyze: bool,
    }

    impl FakeApi {
        pub fn with_analysis(reply: Result<AnalysisResult>) -> Self {
            let api = Self::default();
            api.push_analysis(reply);
            api
        }

        pub fn push_analysis(&self, reply: Result<AnalysisResult>) {
            self.analyze_replies.lock().unwrap().push_back(reply);
        }

        pub fn set_rewrite(&self, reply: Result<RewriteResult>) {
            *self.rewrite_reply.lock().unwrap() = Some(reply);
        }

        pub fn set_export(&self, reply: Result<Vec<u8>>) {
            *self.export_reply.lock().unwrap() = Some(reply);
        }
    }

    #[async_trait]
    impl AnalysisApi for FakeApi {
        async fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalysisResult> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            if self.yield_in_analyze {
                tokio::task::yield_now().await;
            }
            self.analyze_replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Analysis("no scripted reply".to_string())))
        }

        async fn rewrite(&self, _bullets: &[String], _jd_text: &str) -> Result<RewriteResult> {
            self.rewrite_calls.fetch_add(1, Ordering::SeqCst);
            self.rewrite_reply
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(ClientError::Rewrite("no scripted reply".to_string())))
        }

        async fn export_document(&self, _tailored_resume: &str) -> Result<Vec<u8>> {
            self.export_calls.fetch_add(1, Ordering::SeqCst);
            self.export_reply
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(ClientError::Export("no scripted reply".to_string())))
        }
    }

    pub(crate) fn sample_result() -> AnalysisResult {
        serde_json::from_value(json!({
            "jd_skills": ["rust", "tokio", "kubernetes"],
            "resume_skills": ["rust", "tokio", "python"],
            "overlap_skills": ["rust", "tokio"],
            "missing_skills": ["kubernetes"],
            "rewritten_bullets": ["Built async services in Rust", "Cut p99 latency by 40%"],
            "cover_letter": "Dear hiring team,\n\nI am excited to apply.",
            "tailored_resume": "# Jane Doe\n\n## Experience\n- **Rust** services",
            "ats_score": 85,
            "ats_breakdown": {"keywords": 32, "sections": 15, "contact": 10},
            "ats_recommendations": ["Mention Kubernetes experience"]
        }))
        .unwrap()
    }

    fn setup(
        api: FakeApi,
    ) -> (
        Arc<FakeApi>,
        Arc<MemoryCredentialStore>,
        Arc<AccessController>,
        SubmissionController,
    ) {
        let api = Arc::new(api);
        let store = Arc::new(MemoryCredentialStore::with_credential("code"));
        let access = Arc::new(AccessController::new(store.clone()));
        let controller = SubmissionController::new(api.clone(), access.clone());
        (api, store, access, controller)
    }

    fn resume() -> Option<ResumeFile> {
        Some(ResumeFile::new("resume.txt", b"Jane Doe, Rust engineer".to_vec()))
    }

    #[tokio::test]
    async fn test_missing_inputs_fail_without_network() {
        let (api, _, _, controller) = setup(FakeApi::default());

        let err = controller.submit(None, "Senior Rust engineer").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(matches!(controller.state(), SubmissionState::Failed(ClientError::Validation(_))));

        let err = controller.submit(resume(), "").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let err = controller.submit(resume(), "   ").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        assert_eq!(api.analyze_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_stores_result() {
        let (api, _, _, controller) = setup(FakeApi::with_analysis(Ok(sample_result())));

        let result = controller.submit(resume(), "Rust role").await.unwrap();
        assert_eq!(result.ats.as_ref().unwrap().band().label(), "Excellent Match");
        assert!(matches!(controller.state(), SubmissionState::Succeeded(_)));
        assert!(controller.presenter().is_some());
        assert_eq!(api.analyze_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auth_rejection_clears_credential_and_locks() {
        let (_, store, access, controller) = setup(FakeApi::with_analysis(Err(ClientError::Auth)));

        let err = controller.submit(resume(), "Rust role").await.unwrap_err();
        assert_eq!(err, ClientError::Auth);
        assert_eq!(controller.state(), SubmissionState::AuthRejected);
        assert_eq!(access.state(), AccessState::Locked);
        assert_eq!(store.get(), None);
        assert!(controller.result().is_none());
    }

    #[tokio::test]
    async fn test_service_error_keeps_access() {
        let (_, store, access, controller) = setup(FakeApi::with_analysis(Err(
            ClientError::Analysis("Failed to parse PDF".to_string()),
        )));

        let err = controller.submit(resume(), "Rust role").await.unwrap_err();
        assert_eq!(err, ClientError::Analysis("Failed to parse PDF".to_string()));
        assert!(matches!(controller.state(), SubmissionState::Failed(_)));
        assert!(access.is_unlocked());
        assert_eq!(store.get(), Some("code".to_string()));
    }

    #[tokio::test]
    async fn test_locked_gate_blocks_submission() {
        let (api, _, access, controller) = setup(FakeApi::with_analysis(Ok(sample_result())));
        access.logout().unwrap();

        let err = controller.submit(resume(), "Rust role").await.unwrap_err();
        assert_eq!(err, ClientError::Locked);
        assert_eq!(controller.state(), SubmissionState::Idle);
        assert_eq!(api.analyze_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_submission_is_rejected() {
        let api = FakeApi {
            yield_in_analyze: true,
            ..FakeApi::default()
        };
        api.push_analysis(Ok(sample_result()));
        let (api, _, _, controller) = setup(api);

        let (first, second) = tokio::join!(
            controller.submit(resume(), "Rust role"),
            controller.submit(resume(), "Rust role"),
        );

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), ClientError::Busy);
        assert_eq!(api.analyze_calls.load(Ordering::SeqCst), 1);
        assert!(matches!(controller.state(), SubmissionState::Succeeded(_)));
    }

    #[tokio::test]
    async fn test_next_submission_after_terminal_state() {
        let (api, _, _, controller) = setup(FakeApi::with_analysis(Err(
            ClientError::Analysis("Analysis failed".to_string()),
        )));
        api.push_analysis(Ok(sample_result()));

        assert!(controller.submit(resume(), "Rust role").await.is_err());
        assert!(controller.submit(resume(), "Rust role").await.is_ok());

        controller.reset().unwrap();
        assert_eq!(controller.state(), SubmissionState::Idle);
        assert!(controller.result().is_none());
    }

    #[tokio::test]
    async fn test_reset_refused_while_in_flight() {
        let api = FakeApi {
            yield_in_analyze: true,
            ..FakeApi::default()
        };
        api.push_analysis(Ok(sample_result()));
        let (_, _, _, controller) = setup(api);

        let (submitted, reset) = tokio::join!(controller.submit(resume(), "Rust role"), async {
            controller.reset()
        });

        assert!(submitted.is_ok());
        assert_eq!(reset, Err(ClientError::Busy));
        assert!(matches!(controller.state(), SubmissionState::Succeeded(_)));

        // idle is not terminal but resetting it is harmless
        controller.reset().unwrap();
        controller.reset().unwrap();
        assert_eq!(controller.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_rewrite_auth_failure_relocks() {
        let (api, store, access, controller) = setup(FakeApi::default());
        api.set_rewrite(Err(ClientError::Auth));

        let bullets = vec!["Shipped features".to_string()];
        assert_eq!(
            controller.rewrite(&bullets, "Rust role").await.unwrap_err(),
            ClientError::Auth
        );
        assert_eq!(access.state(), AccessState::Locked);
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn test_rewrite_blank_bullets_skip_network() {
        let (api, _, _, controller) = setup(FakeApi::default());

        let result = controller
            .rewrite(&["  ".to_string()], "Rust role")
            .await
            .unwrap();
        assert!(result.rewritten_bullets.is_empty());
        assert_eq!(api.rewrite_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rewrite_success() {
        let (api, _, _, controller) = setup(FakeApi::default());
        api.set_rewrite(Ok(RewriteResult {
            rewritten_bullets: vec!["Led migration to Rust".to_string()],
        }));

        let result = controller
            .rewrite(&["did migration".to_string()], "Rust role")
            .await
            .unwrap();
        assert_eq!(result.rewritten_bullets, vec!["Led migration to Rust"]);
    }
}
