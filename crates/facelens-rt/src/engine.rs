//! The realtime analysis loop: Idle -> Active -> tick loop -> Idle.

use crate::monitor::{MergedAnalysis, Monitor};
use crate::overlay;
use facelens_core::{Backend, CapturedImage, CheckSet};
use image::RgbImage;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

/// Timing knobs for the loop. The defaults reproduce the demo's rates:
/// a ~60 Hz tick, at most 10 processed frames/second, and at most one
/// backend round trip per 300 ms.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Tick period standing in for the display refresh callback.
    pub tick_interval: Duration,
    /// Minimum wall-clock delta between processed frames.
    pub frame_interval: Duration,
    /// Minimum delta between round-trip *starts*.
    pub api_cooldown: Duration,
    /// Rolling latency window length for the FPS estimate.
    pub latency_window: usize,
    /// Checks requested in the follow-up security call.
    pub checks: CheckSet,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(16),
            frame_interval: Duration::from_millis(100),
            api_cooldown: Duration::from_millis(300),
            latency_window: 10,
            checks: CheckSet::all(),
        }
    }
}

/// One captured frame: the encoded upload payload plus the raw RGB
/// buffer the overlay is drawn on.
#[derive(Clone)]
pub struct SourceFrame {
    pub jpeg: CapturedImage,
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Supplier of webcam frames.
pub trait FrameSource {
    /// Current frame, or `None` when the source is not ready. A
    /// not-ready source is skipped silently; state is unchanged.
    fn next_frame(&mut self) -> Option<SourceFrame>;
}

/// The Active-state loop. Constructed per activation; dropping it (or
/// letting `run` return) is the transition back to Idle.
pub struct RealtimeLoop<B, S> {
    backend: B,
    source: S,
    config: RealtimeConfig,
    monitor: Monitor,
    next_seq: u64,
    sink: Option<Box<dyn FnMut(&RgbImage)>>,
}

impl<B: Backend, S: FrameSource> RealtimeLoop<B, S> {
    pub fn new(backend: B, source: S, config: RealtimeConfig) -> Self {
        let monitor = Monitor::new(config.latency_window);
        Self {
            backend,
            source,
            config,
            monitor,
            next_seq: 1,
            sink: None,
        }
    }

    /// Receive every rendered overlay frame (e.g., to write to disk).
    pub fn with_sink(mut self, sink: impl FnMut(&RgbImage) + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Run until `shutdown` flips to true or its sender is dropped.
    ///
    /// On exit the monitor is cleared: deactivation leaves no overlay
    /// and issues no further backend calls.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let mut tick = tokio::time::interval(self.config.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_frame: Option<Instant> = None;
        let mut last_call: Option<Instant> = None;

        tracing::info!(
            frame_interval_ms = self.config.frame_interval.as_millis() as u64,
            api_cooldown_ms = self.config.api_cooldown.as_millis() as u64,
            "realtime analysis active"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    match changed {
                        Ok(()) if *shutdown.borrow() => break,
                        Ok(()) => continue,
                        // Sender gone: treat as deactivation.
                        Err(_) => break,
                    }
                }
                _ = tick.tick() => {}
            }

            let now = Instant::now();
            if let Some(prev) = last_frame {
                if now - prev < self.config.frame_interval {
                    continue;
                }
            }
            last_frame = Some(now);

            let Some(frame) = self.source.next_frame() else {
                continue;
            };

            // Overlay is recomputed from the latest merged result on
            // every processed frame; stale results persist between
            // successful fetches.
            self.publish_overlay(&frame);

            if let Some(prev) = last_call {
                if now - prev < self.config.api_cooldown {
                    continue;
                }
            }
            last_call = Some(now);

            let seq = self.next_seq;
            self.next_seq += 1;
            let started = Instant::now();

            let detect = match self.backend.detect(&frame.jpeg, true).await {
                Ok(d) => d,
                Err(err) => {
                    tracing::warn!(seq, error = %err, "detect failed; frame skipped");
                    continue;
                }
            };

            if detect.faces.is_empty() {
                tracing::debug!(seq, "no face in frame");
                continue;
            }

            let security = match self
                .backend
                .security_check(&frame.jpeg, &self.config.checks)
                .await
            {
                Ok(s) => Some(s),
                Err(err) => {
                    tracing::warn!(seq, error = %err, "security check failed; showing detect only");
                    None
                }
            };

            let latency = started.elapsed();
            let merged = MergedAnalysis {
                faces: detect.faces,
                security,
            };

            if self.monitor.apply(seq, merged, latency) {
                tracing::info!(
                    seq,
                    faces = self.monitor.face_count(),
                    latency_ms = latency.as_millis() as u64,
                    fps = self.monitor.fps_estimate().unwrap_or(0),
                    "analysis updated"
                );
                self.publish_overlay(&frame);
            }
        }

        self.monitor.clear();
        tracing::info!("realtime analysis idle; overlay cleared");
    }

    fn publish_overlay(&mut self, frame: &SourceFrame) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let empty = MergedAnalysis::default();
        let analysis = self.monitor.latest().unwrap_or(&empty);
        match overlay::render(&frame.rgb, frame.width, frame.height, analysis) {
            Some(img) => sink(&img),
            None => tracing::warn!("frame buffer size mismatch; overlay skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facelens_core::{
        BackendError, CompareResponse, DetectResponse, Face, ModelWeights, SecurityResponse,
        StatusResponse,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct ScriptedBackend {
        /// Round-trip start instants, in order.
        detect_starts: Rc<RefCell<Vec<Instant>>>,
        security_calls: Rc<RefCell<usize>>,
        /// Simulated per-call latency.
        detect_delay: Duration,
        faces_per_frame: usize,
    }

    impl Backend for ScriptedBackend {
        async fn compare(
            &self,
            _: &CapturedImage,
            _: &CapturedImage,
            _: &ModelWeights,
        ) -> Result<CompareResponse, BackendError> {
            unreachable!("realtime loop never compares")
        }

        async fn security_check(
            &self,
            _: &CapturedImage,
            _: &CheckSet,
        ) -> Result<SecurityResponse, BackendError> {
            *self.security_calls.borrow_mut() += 1;
            Ok(SecurityResponse {
                is_real_face: true,
                ..Default::default()
            })
        }

        async fn detect(
            &self,
            _: &CapturedImage,
            _: bool,
        ) -> Result<DetectResponse, BackendError> {
            self.detect_starts.borrow_mut().push(Instant::now());
            if !self.detect_delay.is_zero() {
                tokio::time::sleep(self.detect_delay).await;
            }
            let face = Face {
                bbox: [100.0, 100.0, 120.0, 150.0],
                confidence: 0.95,
                landmarks: None,
                gender: None,
                age: None,
            };
            Ok(DetectResponse {
                faces: vec![face; self.faces_per_frame],
            })
        }

        async fn status(&self) -> Result<StatusResponse, BackendError> {
            unreachable!("realtime loop never polls status")
        }
    }

    struct TestSource {
        frame_pulls: Rc<RefCell<Vec<Instant>>>,
    }

    impl FrameSource for TestSource {
        fn next_frame(&mut self) -> Option<SourceFrame> {
            self.frame_pulls.borrow_mut().push(Instant::now());
            Some(SourceFrame {
                jpeg: CapturedImage::from_encoded_jpeg(vec![0xFF, 0xD8]),
                rgb: vec![80u8; 640 * 480 * 3],
                width: 640,
                height: 480,
            })
        }
    }

    fn test_loop(
        backend: ScriptedBackend,
    ) -> (
        RealtimeLoop<ScriptedBackend, TestSource>,
        Rc<RefCell<Vec<Instant>>>,
        Rc<RefCell<Vec<Instant>>>,
    ) {
        let detect_starts = backend.detect_starts.clone();
        let frame_pulls = Rc::new(RefCell::new(Vec::new()));
        let source = TestSource {
            frame_pulls: frame_pulls.clone(),
        };
        let rt = RealtimeLoop::new(backend, source, RealtimeConfig::default());
        (rt, detect_starts, frame_pulls)
    }

    async fn run_for(rt: &mut RealtimeLoop<ScriptedBackend, TestSource>, duration: Duration) {
        let (tx, rx) = watch::channel(false);
        tokio::join!(rt.run(rx), async {
            tokio::time::sleep(duration).await;
            let _ = tx.send(true);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_trips_respect_cooldown() {
        let backend = ScriptedBackend {
            detect_delay: Duration::from_millis(40),
            faces_per_frame: 1,
            ..Default::default()
        };
        let (mut rt, detect_starts, _) = test_loop(backend);
        run_for(&mut rt, Duration::from_secs(3)).await;

        let starts = detect_starts.borrow();
        assert!(starts.len() >= 5, "expected several round trips, got {}", starts.len());
        for pair in starts.windows(2) {
            assert!(
                pair[1] - pair[0] >= Duration::from_millis(300),
                "round trips started {:?} apart",
                pair[1] - pair[0]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_frame_processing_respects_frame_interval() {
        let backend = ScriptedBackend {
            faces_per_frame: 1,
            ..Default::default()
        };
        let (mut rt, _, frame_pulls) = test_loop(backend);
        run_for(&mut rt, Duration::from_secs(2)).await;

        let pulls = frame_pulls.borrow();
        assert!(pulls.len() >= 10);
        for pair in pulls.windows(2) {
            assert!(
                pair[1] - pair[0] >= Duration::from_millis(100),
                "frames processed {:?} apart",
                pair[1] - pair[0]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivation_stops_calls_and_clears_overlay() {
        let backend = ScriptedBackend {
            faces_per_frame: 1,
            ..Default::default()
        };
        let (mut rt, detect_starts, _) = test_loop(backend);
        run_for(&mut rt, Duration::from_secs(1)).await;

        assert!(rt.monitor().latest().is_none(), "overlay state must be cleared");
        let calls_at_deactivation = detect_starts.borrow().len();
        assert!(calls_at_deactivation >= 1);

        // Idle: time passing issues no further calls.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(detect_starts.borrow().len(), calls_at_deactivation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_security_check_without_faces() {
        let backend = ScriptedBackend {
            faces_per_frame: 0,
            ..Default::default()
        };
        let security_calls = backend.security_calls.clone();
        let (mut rt, detect_starts, _) = test_loop(backend);
        run_for(&mut rt, Duration::from_secs(1)).await;

        assert!(detect_starts.borrow().len() >= 1);
        assert_eq!(*security_calls.borrow(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_applied_results_reach_the_overlay() {
        let backend = ScriptedBackend {
            detect_delay: Duration::from_millis(50),
            faces_per_frame: 1,
            ..Default::default()
        };
        let source = TestSource {
            frame_pulls: Rc::new(RefCell::new(Vec::new())),
        };

        let published = Rc::new(RefCell::new(0usize));
        let boxed = Rc::new(RefCell::new(0usize));
        let (published_c, boxed_c) = (published.clone(), boxed.clone());

        let mut rt = RealtimeLoop::new(backend, source, RealtimeConfig::default()).with_sink(
            move |img: &image::RgbImage| {
                *published_c.borrow_mut() += 1;
                // Face bbox starts at (100, 100); green means an applied
                // result was drawn.
                if img.get_pixel(100, 100) == &image::Rgb([0, 255, 0]) {
                    *boxed_c.borrow_mut() += 1;
                }
            },
        );
        run_for(&mut rt, Duration::from_secs(2)).await;

        assert!(*published.borrow() > 0, "overlay frames must be published");
        assert!(
            *boxed.borrow() > 0,
            "at least one published overlay must carry the applied face box"
        );
    }
}
