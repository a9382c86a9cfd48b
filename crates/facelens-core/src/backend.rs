use crate::types::{CapturedImage, CheckSet};
use crate::weights::ModelWeights;
use crate::wire::{CompareResponse, DetectResponse, SecurityResponse, StatusResponse};
use thiserror::Error;

/// Failure of one backend request, categorized so the UI can say more
/// than "request failed".
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend returned HTTP {status}: {detail}")]
    Http { status: u16, detail: String },
    #[error("response decode failed: {0}")]
    Decode(String),
}

/// The four backend operations the demo client consumes.
///
/// Implemented over HTTP by `facelens-api`, and by the opt-in
/// [`SimulatedBackend`](crate::SimulatedBackend) for offline demos.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn compare(
        &self,
        image1: &CapturedImage,
        image2: &CapturedImage,
        weights: &ModelWeights,
    ) -> Result<CompareResponse, BackendError>;

    async fn security_check(
        &self,
        image: &CapturedImage,
        checks: &CheckSet,
    ) -> Result<SecurityResponse, BackendError>;

    async fn detect(
        &self,
        image: &CapturedImage,
        include_attributes: bool,
    ) -> Result<DetectResponse, BackendError>;

    async fn status(&self) -> Result<StatusResponse, BackendError>;
}
