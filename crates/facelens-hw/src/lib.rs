//! facelens-hw — Webcam capture for the demo client.
//!
//! Provides V4L2-based camera access, YUYV/MJPG to RGB conversion, and
//! JPEG encoding of captured frames for upload.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, PixelFormat};
pub use frame::{Frame, FrameError};
