use image::ImageFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("image failed to decode: {0}")]
    Decode(#[from] image::ImageError),
}

/// An encoded still image held by the session, either captured from the
/// camera or loaded from a file. Replaced or cleared by user action,
/// never persisted.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    data: Vec<u8>,
    format: ImageFormat,
}

impl CapturedImage {
    /// Validate and wrap an encoded image.
    ///
    /// The payload must both sniff as a known format and fully decode;
    /// a corrupt upload is an explicit error, never a silent no-op.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ImageLoadError> {
        let format = image::guess_format(&data).map_err(|_| ImageLoadError::UnknownFormat)?;
        image::load_from_memory_with_format(&data, format)?;
        Ok(Self { data, format })
    }

    /// Wrap JPEG bytes we encoded ourselves (camera frames). Skips the
    /// decode round trip that [`from_bytes`](Self::from_bytes) performs
    /// on untrusted uploads.
    pub fn from_encoded_jpeg(data: Vec<u8>) -> Self {
        Self {
            data,
            format: ImageFormat::Jpeg,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn mime(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Multipart file name derived from the format ("capture.jpg" etc.).
    pub fn file_name(&self) -> String {
        let ext = self.format.extensions_str().first().copied().unwrap_or("bin");
        format!("capture.{ext}")
    }
}

/// One of the backend's security checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityCheck {
    Liveness,
    Deepfake,
    Spoofing,
}

impl SecurityCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityCheck::Liveness => "liveness",
            SecurityCheck::Deepfake => "deepfake",
            SecurityCheck::Spoofing => "spoofing",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown security check: {0}")]
pub struct UnknownCheck(String);

impl std::str::FromStr for SecurityCheck {
    type Err = UnknownCheck;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "liveness" => Ok(SecurityCheck::Liveness),
            "deepfake" => Ok(SecurityCheck::Deepfake),
            "spoofing" => Ok(SecurityCheck::Spoofing),
            other => Err(UnknownCheck(other.to_string())),
        }
    }
}

/// Ordered, deduplicated subset of security checks, sent to the backend
/// as the comma-separated `checks` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSet(Vec<SecurityCheck>);

impl CheckSet {
    pub fn new(checks: &[SecurityCheck]) -> Self {
        let mut out = Vec::with_capacity(checks.len());
        for &c in checks {
            if !out.contains(&c) {
                out.push(c);
            }
        }
        Self(out)
    }

    /// All three checks, the default for the demo flows.
    pub fn all() -> Self {
        Self(vec![
            SecurityCheck::Liveness,
            SecurityCheck::Deepfake,
            SecurityCheck::Spoofing,
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, check: SecurityCheck) -> bool {
        self.0.contains(&check)
    }

    pub fn iter(&self) -> impl Iterator<Item = SecurityCheck> + '_ {
        self.0.iter().copied()
    }

    /// Wire encoding: "liveness,deepfake,spoofing".
    pub fn to_param(&self) -> String {
        self.0
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for CheckSet {
    fn default() -> Self {
        Self::all()
    }
}

impl std::str::FromStr for CheckSet {
    type Err = UnknownCheck;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut checks = Vec::new();
        for part in s.split(',').filter(|p| !p.trim().is_empty()) {
            checks.push(part.parse::<SecurityCheck>()?);
        }
        Ok(Self::new(&checks))
    }
}
