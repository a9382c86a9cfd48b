use facelens_core::{
    Backend, BackendError, CapturedImage, CheckSet, CompareResponse, DetectResponse,
    ModelWeights, SecurityResponse, StatusResponse,
};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Base URL of the demo backend's API gateway.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP client for the four `/api/v1/*` operations.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn image_part(image: &CapturedImage) -> Result<Part, BackendError> {
        Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name())
            .mime_str(image.mime())
            .map_err(|e| BackendError::Transport(format!("invalid image part: {e}")))
    }

    async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, BackendError> {
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(200).collect();
            return Err(BackendError::Http {
                status: status.as_u16(),
                detail,
            });
        }
        resp.json::<T>().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else if err.is_decode() {
        BackendError::Decode(err.to_string())
    } else {
        BackendError::Transport(err.to_string())
    }
}

impl Backend for ApiClient {
    async fn compare(
        &self,
        image1: &CapturedImage,
        image2: &CapturedImage,
        weights: &ModelWeights,
    ) -> Result<CompareResponse, BackendError> {
        let form = Form::new()
            .part("image1", Self::image_part(image1)?)
            .part("image2", Self::image_part(image2)?)
            .text("model_weights", weights.to_json());

        tracing::debug!(url = %self.endpoint("/api/v1/face-recognition/compare"), "compare request");
        let resp = self
            .http
            .post(self.endpoint("/api/v1/face-recognition/compare"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read(resp).await
    }

    async fn security_check(
        &self,
        image: &CapturedImage,
        checks: &CheckSet,
    ) -> Result<SecurityResponse, BackendError> {
        let form = Form::new()
            .part("image", Self::image_part(image)?)
            .text("checks", checks.to_param());

        tracing::debug!(checks = %checks.to_param(), "security check request");
        let resp = self
            .http
            .post(self.endpoint("/api/v1/security/check"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read(resp).await
    }

    async fn detect(
        &self,
        image: &CapturedImage,
        include_attributes: bool,
    ) -> Result<DetectResponse, BackendError> {
        let mut form = Form::new().part("image", Self::image_part(image)?);
        if include_attributes {
            form = form.text("include_attributes", "true");
        }

        tracing::debug!(include_attributes, "detect request");
        let resp = self
            .http
            .post(self.endpoint("/api/v1/face-detection"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read(resp).await
    }

    async fn status(&self) -> Result<StatusResponse, BackendError> {
        let resp = self
            .http
            .get(self.endpoint("/api/v1/status"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint("/api/v1/status"),
            "http://localhost:8000/api/v1/status"
        );
    }

    #[test]
    fn test_endpoint_plain_base() {
        let client = ApiClient::new("http://backend:9000", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint("/api/v1/face-detection"),
            "http://backend:9000/api/v1/face-detection"
        );
    }
}
