use facelens_rt::RealtimeConfig;
use std::time::Duration;

/// Client configuration, loaded from environment variables.
pub struct Config {
    /// Backend base URL (default: http://localhost:8000).
    pub api_url: String,
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Warmup frames discarded before a still capture (camera AGC/AE
    /// stabilization).
    pub warmup_frames: usize,
    /// Realtime loop: minimum ms between processed frames.
    pub frame_interval_ms: u64,
    /// Realtime loop: minimum ms between backend round trips.
    pub api_cooldown_ms: u64,
    /// JPEG quality for uploaded captures.
    pub jpeg_quality: u8,
}

impl Config {
    /// Load configuration from `FACELENS_*` environment variables with
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("FACELENS_API_URL")
                .unwrap_or_else(|_| facelens_api::DEFAULT_BASE_URL.to_string()),
            camera_device: std::env::var("FACELENS_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            request_timeout_secs: env_u64("FACELENS_REQUEST_TIMEOUT_SECS", 30),
            warmup_frames: env_usize("FACELENS_WARMUP_FRAMES", 4),
            frame_interval_ms: env_u64("FACELENS_FRAME_INTERVAL_MS", 100),
            api_cooldown_ms: env_u64("FACELENS_API_COOLDOWN_MS", 300),
            jpeg_quality: env_u64("FACELENS_JPEG_QUALITY", 85).min(100) as u8,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn realtime(&self) -> RealtimeConfig {
        RealtimeConfig {
            frame_interval: Duration::from_millis(self.frame_interval_ms),
            api_cooldown: Duration::from_millis(self.api_cooldown_ms),
            ..RealtimeConfig::default()
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
