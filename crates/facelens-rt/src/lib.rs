//! facelens-rt — The realtime webcam analysis loop.
//!
//! Captures frames on a cooperative tick, rate-limits both frame
//! processing and backend round trips, merges detect + security-check
//! results, and renders bounding-box overlays from the latest merged
//! result. Responses carry sequence numbers so a slow, stale response
//! can never overwrite a newer one.

pub mod engine;
pub mod monitor;
pub mod overlay;

pub use engine::{FrameSource, RealtimeConfig, RealtimeLoop, SourceFrame};
pub use monitor::{LatencyWindow, MergedAnalysis, Monitor};
