use crate::backend::{Backend, BackendError};
use crate::types::{CapturedImage, CheckSet};
use crate::weights::{Model, ModelWeights};
use crate::wire::{CompareResponse, DetectResponse, SecurityResponse};
use thiserror::Error;

/// Which analysis the active view dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Two images, one compare request.
    Compare,
    /// One image, one security-check request.
    Security,
    /// One image, one face-detection request.
    Detection,
}

/// Parsed result of the last completed analysis.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Compare(CompareResponse),
    Security(SecurityResponse),
    Detection(DetectResponse),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no image captured")]
    MissingImage,
    #[error("compare requires two images")]
    MissingSecondImage,
    #[error("a request is already in flight")]
    Busy,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Session-scoped state for the form-driven flows: the captured images,
/// the model weights, and the last outcome. One instance per user
/// session, passed explicitly to handlers; no ambient globals.
#[derive(Debug)]
pub struct Session {
    mode: AnalysisMode,
    first: Option<CapturedImage>,
    second: Option<CapturedImage>,
    weights: ModelWeights,
    checks: CheckSet,
    include_attributes: bool,
    busy: bool,
    outcome: Option<Result<AnalysisOutcome, String>>,
}

impl Session {
    pub fn new(mode: AnalysisMode) -> Self {
        Self {
            mode,
            first: None,
            second: None,
            weights: ModelWeights::default(),
            checks: CheckSet::all(),
            include_attributes: false,
            busy: false,
            outcome: None,
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Switch views. Captured images survive a mode switch, matching the
    /// tabbed flow where one capture feeds whichever tab is active.
    pub fn set_mode(&mut self, mode: AnalysisMode) {
        self.mode = mode;
    }

    pub fn set_first(&mut self, image: CapturedImage) {
        self.first = Some(image);
    }

    pub fn set_second(&mut self, image: CapturedImage) {
        self.second = Some(image);
    }

    pub fn clear_first(&mut self) {
        self.first = None;
    }

    pub fn clear_second(&mut self) {
        self.second = None;
    }

    pub fn first(&self) -> Option<&CapturedImage> {
        self.first.as_ref()
    }

    pub fn second(&self) -> Option<&CapturedImage> {
        self.second.as_ref()
    }

    pub fn weights(&self) -> &ModelWeights {
        &self.weights
    }

    pub fn set_weight(&mut self, model: Model, value: f64) {
        self.weights.set(model, value);
    }

    pub fn checks(&self) -> &CheckSet {
        &self.checks
    }

    pub fn set_checks(&mut self, checks: CheckSet) {
        self.checks = checks;
    }

    pub fn set_include_attributes(&mut self, include: bool) {
        self.include_attributes = include;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn outcome(&self) -> Option<&Result<AnalysisOutcome, String>> {
        self.outcome.as_ref()
    }

    /// Unconditionally clear held images and any prior outcome.
    pub fn reset(&mut self) {
        self.first = None;
        self.second = None;
        self.outcome = None;
    }

    /// Dispatch exactly one request for the active mode.
    ///
    /// The busy flag is set for the duration of the request and cleared
    /// on success and failure alike; the outcome (result or error text)
    /// is stored for re-rendering either way.
    pub async fn analyze<B: Backend>(
        &mut self,
        backend: &B,
    ) -> Result<AnalysisOutcome, SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        let first = self.first.as_ref().ok_or(SessionError::MissingImage)?;
        if self.mode == AnalysisMode::Compare && self.second.is_none() {
            return Err(SessionError::MissingSecondImage);
        }

        self.busy = true;
        let result = match self.mode {
            AnalysisMode::Compare => {
                // Presence checked above.
                let second = self.second.as_ref().expect("checked above");
                backend
                    .compare(first, second, &self.weights)
                    .await
                    .map(AnalysisOutcome::Compare)
            }
            AnalysisMode::Security => backend
                .security_check(first, &self.checks)
                .await
                .map(AnalysisOutcome::Security),
            AnalysisMode::Detection => backend
                .detect(first, self.include_attributes)
                .await
                .map(AnalysisOutcome::Detection),
        };
        self.busy = false;

        match result {
            Ok(outcome) => {
                self.outcome = Some(Ok(outcome.clone()));
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(error = %err, mode = ?self.mode, "analysis request failed");
                self.outcome = Some(Err(err.to_string()));
                Err(err.into())
            }
        }
    }
}
