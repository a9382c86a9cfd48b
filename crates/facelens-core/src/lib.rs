//! facelens-core — Session state and backend abstraction for the
//! face-analysis demo client.
//!
//! Holds the captured-image/session model, the fixed recognition model
//! weight set, the wire types for the `/api/v1/*` backend, and the
//! [`Backend`] trait implemented by the HTTP client (facelens-api) and
//! by the opt-in [`SimulatedBackend`].

pub mod backend;
pub mod session;
pub mod simulate;
pub mod types;
pub mod weights;
pub mod wire;

pub use backend::{Backend, BackendError};
pub use session::{AnalysisMode, AnalysisOutcome, Session, SessionError};
pub use simulate::SimulatedBackend;
pub use types::{CapturedImage, CheckSet, ImageLoadError, SecurityCheck};
pub use weights::{Model, ModelWeights};
pub use wire::{
    CompareResponse, DetectResponse, Face, SecurityResponse, ServiceState, ServiceStatus,
    StatusResponse, StatusView,
};
