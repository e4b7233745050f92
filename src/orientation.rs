//! Device orientation capability.
//!
//! The camera is driven by tilt samples `(alpha, beta, gamma)` in degrees.
//! Where they come from is hidden behind [`OrientationSource`]:
//!
//! - [`LiveOrientation`] - a last-write-wins slot fed by an [`OrientationFeed`]
//!   that any thread (a sensor reader, the window's pointer handler) can
//!   publish into.
//! - [`ScriptedOrientation`] - replays a fixed list of samples, for tests and
//!   headless runs.
//! - [`UnsupportedOrientation`] - the platform has no orientation API.
//!
//! Reading samples requires a one-shot permission grant, tracked by
//! [`PermissionGate`].

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One tilt reading, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationSample {
    /// Rotation about the vertical axis (compass heading).
    pub alpha: f32,
    /// Front-to-back tilt.
    pub beta: f32,
    /// Left-to-right tilt.
    pub gamma: f32,
}

impl OrientationSample {
    pub fn new(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self { alpha, beta, gamma }
    }
}

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// No orientation API on this platform.
    Unsupported,
}

/// Whether the camera follows orientation samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Camera fixed at its default pose.
    #[default]
    AwaitingPermission,
    /// Camera recomputed every frame from the latest sample.
    OrientationActive,
}

/// A provider of orientation samples.
pub trait OrientationSource {
    /// Ask the platform for access to orientation events.
    fn request_permission(&mut self) -> PermissionStatus;

    /// Latest available sample, if any. Intermediate samples may be dropped.
    fn poll(&mut self) -> Option<OrientationSample>;

    /// Cancel the subscription. Later samples are discarded.
    fn shutdown(&mut self) {}
}

/// One-shot transition from [`CameraMode::AwaitingPermission`] to
/// [`CameraMode::OrientationActive`].
#[derive(Debug, Clone, Default)]
pub struct PermissionGate {
    mode: CameraMode,
    last_status: Option<PermissionStatus>,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.mode == CameraMode::OrientationActive
    }

    /// Outcome of the most recent request, if one was made.
    #[inline]
    pub fn last_status(&self) -> Option<PermissionStatus> {
        self.last_status
    }

    /// Request permission from `source` unless already active.
    ///
    /// A denial is not an error: the gate stays closed and the user may try
    /// again later.
    pub fn request(&mut self, source: &mut dyn OrientationSource) -> CameraMode {
        if self.is_active() {
            return self.mode;
        }

        let status = source.request_permission();
        self.last_status = Some(status);
        match status {
            PermissionStatus::Granted => {
                tracing::info!("device orientation enabled");
                self.mode = CameraMode::OrientationActive;
            }
            PermissionStatus::Denied => {
                tracing::warn!("device orientation permission denied");
            }
            PermissionStatus::Unsupported => {
                tracing::warn!("device orientation is not supported on this platform");
            }
        }
        self.mode
    }
}

#[derive(Debug, Default)]
struct Slot {
    latest: Mutex<Option<OrientationSample>>,
    closed: AtomicBool,
}

/// Publisher half of a [`LiveOrientation`]. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct OrientationFeed {
    slot: Arc<Slot>,
}

impl OrientationFeed {
    /// Replace the latest sample. Ignored once the subscription is shut down.
    pub fn publish(&self, sample: OrientationSample) {
        if self.slot.closed.load(Ordering::Acquire) {
            return;
        }
        if let Ok(mut latest) = self.slot.latest.lock() {
            *latest = Some(sample);
        }
    }

    /// Whether the receiving side has shut down.
    pub fn is_closed(&self) -> bool {
        self.slot.closed.load(Ordering::Acquire)
    }
}

/// Live platform adapter: samples pushed asynchronously, read last-write-wins.
#[derive(Debug)]
pub struct LiveOrientation {
    slot: Arc<Slot>,
    permission: PermissionStatus,
}

impl LiveOrientation {
    /// Ambient orientation events, no explicit permission prompt.
    pub fn new() -> (Self, OrientationFeed) {
        Self::gated(PermissionStatus::Granted)
    }

    /// A source whose permission prompt resolves to `permission`.
    pub fn gated(permission: PermissionStatus) -> (Self, OrientationFeed) {
        let slot = Arc::new(Slot::default());
        let feed = OrientationFeed { slot: slot.clone() };
        (Self { slot, permission }, feed)
    }
}

impl OrientationSource for LiveOrientation {
    fn request_permission(&mut self) -> PermissionStatus {
        if self.slot.closed.load(Ordering::Acquire) {
            return PermissionStatus::Unsupported;
        }
        self.permission
    }

    fn poll(&mut self) -> Option<OrientationSample> {
        if self.slot.closed.load(Ordering::Acquire) {
            return None;
        }
        self.slot.latest.lock().ok().and_then(|latest| *latest)
    }

    fn shutdown(&mut self) {
        self.slot.closed.store(true, Ordering::Release);
        if let Ok(mut latest) = self.slot.latest.lock() {
            *latest = None;
        }
    }
}

/// Deterministic fake that replays scripted samples, one per poll,
/// repeating the last one when the script runs out.
#[derive(Debug, Clone)]
pub struct ScriptedOrientation {
    samples: Vec<OrientationSample>,
    cursor: usize,
    permission: PermissionStatus,
    closed: bool,
}

impl ScriptedOrientation {
    pub fn new(samples: Vec<OrientationSample>) -> Self {
        Self {
            samples,
            cursor: 0,
            permission: PermissionStatus::Granted,
            closed: false,
        }
    }

    /// Set the outcome of the permission prompt.
    pub fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    /// Number of samples handed out so far.
    pub fn polled(&self) -> usize {
        self.cursor
    }
}

impl OrientationSource for ScriptedOrientation {
    fn request_permission(&mut self) -> PermissionStatus {
        self.permission
    }

    fn poll(&mut self) -> Option<OrientationSample> {
        if self.closed || self.samples.is_empty() {
            return None;
        }
        let index = self.cursor.min(self.samples.len() - 1);
        self.cursor += 1;
        Some(self.samples[index])
    }

    fn shutdown(&mut self) {
        self.closed = true;
    }
}

/// The platform exposes no orientation events at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedOrientation;

impl OrientationSource for UnsupportedOrientation {
    fn request_permission(&mut self) -> PermissionStatus {
        PermissionStatus::Unsupported
    }

    fn poll(&mut self) -> Option<OrientationSample> {
        None
    }
}

/// Map a pointer position inside the window to an emulated tilt.
///
/// The window centre is level; the edges are ±90°.
pub fn pointer_tilt(x: f64, y: f64, width: u32, height: u32) -> OrientationSample {
    let nx = if width > 0 { (x / width as f64) * 2.0 - 1.0 } else { 0.0 };
    let ny = if height > 0 { (y / height as f64) * 2.0 - 1.0 } else { 0.0 };
    OrientationSample {
        alpha: 0.0,
        beta: (ny.clamp(-1.0, 1.0) * 90.0) as f32,
        gamma: (nx.clamp(-1.0, 1.0) * 90.0) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_transitions_once() {
        let mut gate = PermissionGate::new();
        let mut source = ScriptedOrientation::new(vec![]);
        assert_eq!(gate.mode(), CameraMode::AwaitingPermission);
        assert_eq!(gate.request(&mut source), CameraMode::OrientationActive);

        // A later source that would deny cannot revert the mode.
        let mut denying =
            ScriptedOrientation::new(vec![]).with_permission(PermissionStatus::Denied);
        assert_eq!(gate.request(&mut denying), CameraMode::OrientationActive);
        assert_eq!(gate.last_status(), Some(PermissionStatus::Granted));
    }

    #[test]
    fn test_gate_stays_closed_on_denial() {
        let mut gate = PermissionGate::new();
        let mut source = ScriptedOrientation::new(vec![]).with_permission(PermissionStatus::Denied);
        assert_eq!(gate.request(&mut source), CameraMode::AwaitingPermission);
        assert_eq!(gate.last_status(), Some(PermissionStatus::Denied));

        let mut unsupported = UnsupportedOrientation;
        assert_eq!(gate.request(&mut unsupported), CameraMode::AwaitingPermission);
        assert_eq!(gate.last_status(), Some(PermissionStatus::Unsupported));
    }

    #[test]
    fn test_live_last_write_wins() {
        let (mut live, feed) = LiveOrientation::new();
        assert_eq!(live.poll(), None);

        feed.publish(OrientationSample::new(0.0, 10.0, 20.0));
        feed.publish(OrientationSample::new(0.0, 30.0, 40.0));
        assert_eq!(live.poll(), Some(OrientationSample::new(0.0, 30.0, 40.0)));
        // Reading does not consume the sample.
        assert_eq!(live.poll(), Some(OrientationSample::new(0.0, 30.0, 40.0)));
    }

    #[test]
    fn test_live_feed_from_other_thread() {
        let (mut live, feed) = LiveOrientation::new();
        let handle = std::thread::spawn(move || {
            feed.publish(OrientationSample::new(1.0, 2.0, 3.0));
        });
        handle.join().unwrap();
        assert_eq!(live.poll(), Some(OrientationSample::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_live_shutdown_drops_samples() {
        let (mut live, feed) = LiveOrientation::new();
        feed.publish(OrientationSample::new(0.0, 5.0, 5.0));
        live.shutdown();
        assert!(feed.is_closed());
        feed.publish(OrientationSample::new(0.0, 6.0, 6.0));
        assert_eq!(live.poll(), None);
    }

    #[test]
    fn test_scripted_repeats_last() {
        let mut source = ScriptedOrientation::new(vec![
            OrientationSample::new(0.0, 1.0, 1.0),
            OrientationSample::new(0.0, 2.0, 2.0),
        ]);
        assert_eq!(source.poll().unwrap().beta, 1.0);
        assert_eq!(source.poll().unwrap().beta, 2.0);
        assert_eq!(source.poll().unwrap().beta, 2.0);
        assert_eq!(source.polled(), 3);

        source.shutdown();
        assert_eq!(source.poll(), None);
    }

    #[test]
    fn test_pointer_tilt() {
        let centre = pointer_tilt(640.0, 360.0, 1280, 720);
        assert!(centre.beta.abs() < 1e-4 && centre.gamma.abs() < 1e-4);

        let corner = pointer_tilt(1280.0, 0.0, 1280, 720);
        assert!((corner.gamma - 90.0).abs() < 1e-4);
        assert!((corner.beta + 90.0).abs() < 1e-4);

        // Outside the window clamps to the edge.
        let outside = pointer_tilt(-500.0, 2000.0, 1280, 720);
        assert!((outside.gamma + 90.0).abs() < 1e-4);
        assert!((outside.beta - 90.0).abs() < 1e-4);
    }
}
