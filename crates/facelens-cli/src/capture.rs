//! Image acquisition for the one-shot commands and the realtime loop.

use crate::config::Config;
use anyhow::{Context, Result};
use facelens_core::CapturedImage;
use facelens_hw::Camera;
use facelens_rt::{FrameSource, SourceFrame};
use std::path::Path;

/// Load and decode-validate an image file. A file that does not decode
/// is an explicit error, never a silent no-op.
pub fn load_image(path: &Path) -> Result<CapturedImage> {
    let data =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    CapturedImage::from_bytes(data).with_context(|| format!("decoding {}", path.display()))
}

/// Capture one still from the configured camera.
pub fn capture_image(config: &Config) -> Result<CapturedImage> {
    let camera = Camera::open(&config.camera_device)?;
    let frame = camera.capture_still(config.warmup_frames)?;
    tracing::debug!(
        brightness = frame.avg_brightness(),
        seq = frame.sequence,
        "captured still"
    );
    let jpeg = frame.to_jpeg(config.jpeg_quality)?;
    Ok(CapturedImage::from_encoded_jpeg(jpeg))
}

/// File when given, camera capture otherwise.
pub fn image_from(path: Option<&Path>, config: &Config, label: &str) -> Result<CapturedImage> {
    match path {
        Some(p) => load_image(p),
        None => {
            println!("Capturing {label} from {}...", config.camera_device);
            capture_image(config)
        }
    }
}

/// Live camera adapter for the realtime loop. A capture failure or dark
/// frame yields `None`: the tick is skipped, state unchanged.
pub struct CameraSource {
    camera: Camera,
    jpeg_quality: u8,
}

impl CameraSource {
    pub fn open(config: &Config) -> Result<Self> {
        let camera = Camera::open(&config.camera_device)?;
        Ok(Self {
            camera,
            jpeg_quality: config.jpeg_quality,
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Option<SourceFrame> {
        let frame = match self.camera.capture_frame() {
            Ok(f) => f,
            Err(err) => {
                tracing::debug!(error = %err, "camera not ready");
                return None;
            }
        };
        if frame.is_dark {
            tracing::debug!(seq = frame.sequence, "dark frame skipped");
            return None;
        }
        let jpeg = match frame.to_jpeg(self.jpeg_quality) {
            Ok(j) => j,
            Err(err) => {
                tracing::warn!(error = %err, "frame encode failed");
                return None;
            }
        };
        Some(SourceFrame {
            jpeg: CapturedImage::from_encoded_jpeg(jpeg),
            rgb: frame.data,
            width: frame.width,
            height: frame.height,
        })
    }
}
