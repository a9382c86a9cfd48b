use facelens_core::{Face, SecurityResponse};
use std::collections::VecDeque;
use std::time::Duration;

/// Detect and security-check results of one round trip, merged into a
/// single display object.
#[derive(Debug, Clone, Default)]
pub struct MergedAnalysis {
    pub faces: Vec<Face>,
    /// Present only when at least one face was found and the follow-up
    /// check succeeded.
    pub security: Option<SecurityResponse>,
}

/// Rolling window of end-to-end round-trip latencies.
///
/// The displayed FPS figure is the reciprocal of the window mean — a
/// processing-rate estimate, not the render rate.
#[derive(Debug)]
pub struct LatencyWindow {
    samples: VecDeque<Duration>,
    cap: usize,
}

impl LatencyWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(cap),
            cap: cap.max(1),
        }
    }

    pub fn push(&mut self, latency: Duration) {
        if self.samples.len() == self.cap {
            self.samples.pop_front();
        }
        self.samples.push_back(latency);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }

    /// Estimated processed frames per second, rounded.
    pub fn fps_estimate(&self) -> Option<u32> {
        let mean = self.mean()?;
        let secs = mean.as_secs_f64();
        if secs <= 0.0 {
            return None;
        }
        Some((1.0 / secs).round() as u32)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Latest applied analysis plus the sequencing guard.
#[derive(Debug)]
pub struct Monitor {
    latest: Option<MergedAnalysis>,
    last_applied_seq: u64,
    latencies: LatencyWindow,
}

impl Monitor {
    pub fn new(latency_window: usize) -> Self {
        Self {
            latest: None,
            last_applied_seq: 0,
            latencies: LatencyWindow::new(latency_window),
        }
    }

    /// Apply a completed round trip.
    ///
    /// Results are applied only in sequence order: a response whose
    /// sequence number is not beyond the last applied one is stale and
    /// dropped (its latency still counts toward the FPS estimate).
    pub fn apply(&mut self, seq: u64, result: MergedAnalysis, latency: Duration) -> bool {
        self.latencies.push(latency);
        if seq <= self.last_applied_seq {
            tracing::debug!(seq, last = self.last_applied_seq, "dropping stale result");
            return false;
        }
        self.last_applied_seq = seq;
        self.latest = Some(result);
        true
    }

    pub fn latest(&self) -> Option<&MergedAnalysis> {
        self.latest.as_ref()
    }

    pub fn fps_estimate(&self) -> Option<u32> {
        self.latencies.fps_estimate()
    }

    pub fn face_count(&self) -> usize {
        self.latest.as_ref().map_or(0, |a| a.faces.len())
    }

    /// Forget everything: called when the loop goes idle so no stale
    /// overlay outlives deactivation.
    pub fn clear(&mut self) {
        self.latest = None;
        self.latencies.clear();
    }
}
