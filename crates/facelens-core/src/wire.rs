//! Wire types for the `/api/v1/*` backend.
//!
//! Responses are consumed permissively: every field the backend may omit
//! is an `Option` or carries a serde default, and unknown fields are
//! ignored. The aggregate `is_real_face` verdict is backend-computed and
//! treated as opaque; no combination rule is inferred from the
//! sub-results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Services the demo knows about, used when synthesizing an offline
/// snapshot after a failed status poll.
pub const KNOWN_SERVICES: [&str; 4] =
    ["face-detection", "face-recognition", "liveness", "deepfake"];

/// `POST /api/v1/face-recognition/compare` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    pub is_match: bool,
    /// Blended similarity in [0, 1].
    #[serde(default)]
    pub similarity: f64,
    /// Per-model similarity scores keyed by model name.
    #[serde(default)]
    pub model_details: BTreeMap<String, f64>,
}

/// `POST /api/v1/security/check` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityResponse {
    /// Aggregate verdict computed by the backend. Opaque: sub-results
    /// may disagree with it.
    #[serde(default)]
    pub is_real_face: bool,
    #[serde(default)]
    pub liveness: Option<LivenessResult>,
    #[serde(default)]
    pub deepfake: Option<DeepfakeResult>,
    #[serde(default)]
    pub spoofing: Option<SpoofingResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LivenessResult {
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepfakeResult {
    #[serde(default)]
    pub is_fake: bool,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpoofingResult {
    #[serde(default)]
    pub is_attack: bool,
    #[serde(default)]
    pub score: f64,
}

/// `POST /api/v1/face-detection` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectResponse {
    #[serde(default)]
    pub faces: Vec<Face>,
}

/// One detected face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    /// [x, y, width, height] in frame pixels.
    pub bbox: [f32; 4],
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub landmarks: Option<Vec<[f32; 2]>>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<f32>,
}

/// `GET /api/v1/status` response: a timestamped snapshot of backend
/// component health, overwritten wholesale on each poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub status: ServiceState,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
    #[default]
    Offline,
    /// Any state string this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceState::Online => write!(f, "online"),
            ServiceState::Offline => write!(f, "offline"),
            ServiceState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome of one status poll.
///
/// A failed poll still yields a full table (every known service marked
/// offline, never partial), but stays distinguishable from a backend
/// that is reachable and reporting its services down.
#[derive(Debug, Clone)]
pub enum StatusView {
    /// The backend answered; this is its own report.
    Live(StatusResponse),
    /// The poll failed; the snapshot is synthesized locally.
    Unreachable {
        error: String,
        snapshot: StatusResponse,
    },
}

impl StatusView {
    pub fn from_failure(error: impl std::fmt::Display) -> Self {
        StatusView::Unreachable {
            error: error.to_string(),
            snapshot: offline_snapshot(),
        }
    }

    pub fn snapshot(&self) -> &StatusResponse {
        match self {
            StatusView::Live(s) => s,
            StatusView::Unreachable { snapshot, .. } => snapshot,
        }
    }

    pub fn unreachable_error(&self) -> Option<&str> {
        match self {
            StatusView::Live(_) => None,
            StatusView::Unreachable { error, .. } => Some(error),
        }
    }
}

/// Locally synthesized snapshot with every known service offline.
pub fn offline_snapshot() -> StatusResponse {
    let services = KNOWN_SERVICES
        .iter()
        .map(|&name| {
            (
                name.to_string(),
                ServiceStatus {
                    status: ServiceState::Offline,
                    models: Vec::new(),
                    version: None,
                    message: Some("backend unreachable".to_string()),
                },
            )
        })
        .collect();
    StatusResponse {
        timestamp: Utc::now(),
        services,
    }
}
