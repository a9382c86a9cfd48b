//! Opt-in simulation backend.
//!
//! The original demo silently substituted randomized placeholder results
//! whenever a request failed, which masked backend outages. Here the
//! randomized data lives behind an explicit backend implementation the
//! user selects on purpose (`facelens --simulate`); the HTTP backend
//! never falls back to it.

use crate::backend::{Backend, BackendError};
use crate::types::{CapturedImage, CheckSet, SecurityCheck};
use crate::weights::{Model, ModelWeights};
use crate::wire::{
    CompareResponse, DeepfakeResult, DetectResponse, Face, LivenessResult, SecurityResponse,
    ServiceState, ServiceStatus, SpoofingResult, StatusResponse, KNOWN_SERVICES,
};
use chrono::Utc;
use rand::Rng;
use std::collections::BTreeMap;

/// Generates plausible random results without touching the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedBackend;

impl Backend for SimulatedBackend {
    async fn compare(
        &self,
        _image1: &CapturedImage,
        _image2: &CapturedImage,
        _weights: &ModelWeights,
    ) -> Result<CompareResponse, BackendError> {
        let mut rng = rand::thread_rng();
        let mut model_details = BTreeMap::new();
        for model in Model::ALL {
            model_details.insert(model.as_str().to_string(), rng.gen_range(0.6..1.0));
        }
        Ok(CompareResponse {
            is_match: rng.gen_bool(0.5),
            similarity: rng.gen_range(0.5..1.0),
            model_details,
        })
    }

    async fn security_check(
        &self,
        _image: &CapturedImage,
        checks: &CheckSet,
    ) -> Result<SecurityResponse, BackendError> {
        let mut rng = rand::thread_rng();
        let liveness = checks.contains(SecurityCheck::Liveness).then(|| LivenessResult {
            is_live: rng.gen_bool(0.8),
            score: rng.gen_range(0.6..1.0),
        });
        let deepfake = checks.contains(SecurityCheck::Deepfake).then(|| DeepfakeResult {
            is_fake: rng.gen_bool(0.2),
            score: rng.gen_range(0.7..1.0),
        });
        let spoofing = checks.contains(SecurityCheck::Spoofing).then(|| SpoofingResult {
            is_attack: rng.gen_bool(0.2),
            score: rng.gen_range(0.6..1.0),
        });
        Ok(SecurityResponse {
            is_real_face: rng.gen_bool(0.7),
            liveness,
            deepfake,
            spoofing,
        })
    }

    async fn detect(
        &self,
        _image: &CapturedImage,
        include_attributes: bool,
    ) -> Result<DetectResponse, BackendError> {
        let mut rng = rand::thread_rng();
        // One centered face in a nominal 640x480 frame.
        let width = rng.gen_range(140.0..220.0);
        let height = width * 1.25;
        let face = Face {
            bbox: [
                (640.0 - width) / 2.0,
                (480.0 - height) / 2.0,
                width,
                height,
            ],
            confidence: rng.gen_range(0.85..0.99),
            landmarks: None,
            gender: include_attributes
                .then(|| if rng.gen_bool(0.5) { "male" } else { "female" }.to_string()),
            age: include_attributes.then(|| rng.gen_range(18.0..65.0f32).round()),
        };
        Ok(DetectResponse { faces: vec![face] })
    }

    async fn status(&self) -> Result<StatusResponse, BackendError> {
        let services = KNOWN_SERVICES
            .iter()
            .map(|&name| {
                (
                    name.to_string(),
                    ServiceStatus {
                        status: ServiceState::Online,
                        models: vec![format!("{name}-demo")],
                        version: Some("0.0.0-sim".to_string()),
                        message: None,
                    },
                )
            })
            .collect();
        Ok(StatusResponse {
            timestamp: Utc::now(),
            services,
        })
    }
}
