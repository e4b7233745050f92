//! Video texture source and playback policy.
//!
//! The footage is a looping, muted sequence of frames. Only the current frame
//! matters: the renderer asks [`VideoSource::current_frame`] once per redraw
//! and uploads it when it changed.
//!
//! Playback start follows the device class. Desktop browsers of the original
//! experience autoplay muted video, so playback starts immediately. Mobile
//! devices refuse autoplay, so playback is deferred until the first
//! interaction.

use crate::config::VideoConfig;
use crate::error::VideoError;
use crate::textures::{AddressMode, FilterMode, TextureConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Coarse device class used to pick the playback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    /// Mobile on android and ios targets, desktop elsewhere.
    pub fn detect() -> Self {
        if cfg!(any(target_os = "android", target_os = "ios")) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    /// `overridden` wins over detection when set.
    pub fn resolve(overridden: Option<DeviceClass>) -> Self {
        overridden.unwrap_or_else(Self::detect)
    }

    #[inline]
    pub fn is_mobile(self) -> bool {
        self == DeviceClass::Mobile
    }
}

/// Playback state of the video source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Waiting for the first interaction.
    #[default]
    Pending,
    Playing,
    /// The source could not start; the first frame stays up.
    Blocked,
}

/// When playback is allowed to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackPolicy {
    state: PlaybackState,
}

impl PlaybackPolicy {
    pub fn new(device: DeviceClass) -> Self {
        let state = if device.is_mobile() {
            PlaybackState::Pending
        } else {
            PlaybackState::Playing
        };
        Self { state }
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// A user interaction happened. Starts deferred playback.
    /// Returns `true` if this call started playback.
    pub fn interact(&mut self) -> bool {
        if self.state == PlaybackState::Pending {
            self.state = PlaybackState::Playing;
            return true;
        }
        false
    }

    /// The source failed to start.
    pub fn block(&mut self) {
        self.state = PlaybackState::Blocked;
    }
}

/// Where frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Directory of numbered frames.
    Sequence,
    /// A single image.
    Still,
    /// Generated fallback.
    Procedural,
}

/// Looping frame source.
#[derive(Debug)]
pub struct VideoSource {
    kind: SourceKind,
    frames: Vec<TextureConfig>,
    fps: f32,
    policy: PlaybackPolicy,
    /// Seconds of footage played so far.
    position: f32,
}

impl VideoSource {
    /// Open the configured asset, falling back to the procedural texture when
    /// there is none or it fails to load.
    pub fn open(config: &VideoConfig, device: DeviceClass) -> Self {
        Self::load(config, device).with_sampling(config.filter, config.address_mode)
    }

    fn load(config: &VideoConfig, device: DeviceClass) -> Self {
        let mut policy = PlaybackPolicy::new(device);
        let Some(path) = &config.path else {
            debug!("no video asset configured, using procedural texture");
            return Self::procedural(config.fps, policy);
        };

        match load_frames(path) {
            Ok((kind, frames)) => {
                info!(
                    "loaded {} video frame(s) from {} at {} fps",
                    frames.len(),
                    path.display(),
                    config.fps
                );
                Self {
                    kind,
                    frames,
                    fps: config.fps,
                    policy,
                    position: 0.0,
                }
            }
            Err(e) => {
                warn!("video asset {} unavailable: {e}", path.display());
                policy.block();
                Self::procedural(config.fps, policy)
            }
        }
    }

    /// Sample every frame with `filter` and `address_mode`.
    pub fn with_sampling(mut self, filter: FilterMode, address_mode: AddressMode) -> Self {
        self.frames = self
            .frames
            .into_iter()
            .map(|f| f.with_filter(filter).with_address_mode(address_mode))
            .collect();
        self
    }

    /// Build a source from already decoded frames.
    pub fn from_frames(
        frames: Vec<TextureConfig>,
        fps: f32,
        device: DeviceClass,
    ) -> Result<Self, VideoError> {
        let first = frames
            .first()
            .ok_or_else(|| VideoError::EmptySequence(PathBuf::new()))?;
        let expected = first.dimensions();
        if let Some(bad) = frames.iter().find(|f| f.dimensions() != expected) {
            return Err(VideoError::SizeMismatch {
                path: PathBuf::new(),
                expected,
                found: bad.dimensions(),
            });
        }
        let kind = if frames.len() == 1 {
            SourceKind::Still
        } else {
            SourceKind::Sequence
        };
        Ok(Self {
            kind,
            frames,
            fps,
            policy: PlaybackPolicy::new(device),
            position: 0.0,
        })
    }

    fn procedural(fps: f32, policy: PlaybackPolicy) -> Self {
        let tint = [64, 160, 255];
        let frames = vec![
            TextureConfig::noise(256, 1, tint),
            TextureConfig::noise(256, 2, tint),
            TextureConfig::noise(256, 3, tint),
            TextureConfig::checkerboard(256, 32, [40, 40, 60, 255], [90, 140, 220, 255]),
        ];
        Self {
            kind: SourceKind::Procedural,
            frames,
            fps,
            policy,
            position: 0.0,
        }
    }

    #[inline]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    #[inline]
    pub fn policy(&self) -> &PlaybackPolicy {
        &self.policy
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Dimensions shared by every frame.
    pub fn dimensions(&self) -> (u32, u32) {
        self.frames.first().map_or((1, 1), TextureConfig::dimensions)
    }

    /// Forward a user interaction to the playback policy.
    pub fn interact(&mut self) -> bool {
        let started = self.policy.interact();
        if started {
            info!("video playback started");
        }
        started
    }

    /// Advance the playback clock by `dt` seconds of real time.
    /// Does nothing unless playing.
    pub fn advance(&mut self, dt: f32) {
        if !self.policy.is_playing() || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let duration = self.frames.len() as f32 / self.fps;
        self.position = (self.position + dt) % duration;
    }

    /// Index of the frame showing at the current playback position.
    pub fn frame_index(&self) -> usize {
        if self.frames.len() <= 1 {
            return 0;
        }
        ((self.position * self.fps) as usize).min(self.frames.len() - 1)
    }

    /// The frame to display now. There is always at least one frame.
    pub fn current_frame(&self) -> &TextureConfig {
        &self.frames[self.frame_index()]
    }
}

/// Decode either a directory of frames (sorted by file name) or one image.
pub fn load_frames(path: &Path) -> Result<(SourceKind, Vec<TextureConfig>), VideoError> {
    if !path.is_dir() {
        let frame = TextureConfig::from_file(path)?;
        return Ok((SourceKind::Still, vec![frame]));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_frame_file(p))
        .collect();
    paths.sort();

    let mut frames: Vec<TextureConfig> = Vec::with_capacity(paths.len());
    for frame_path in paths {
        let frame = TextureConfig::from_file(&frame_path)?;
        if let Some(first) = frames.first() {
            if first.dimensions() != frame.dimensions() {
                return Err(VideoError::SizeMismatch {
                    path: frame_path,
                    expected: first.dimensions(),
                    found: frame.dimensions(),
                });
            }
        }
        frames.push(frame);
    }

    if frames.is_empty() {
        return Err(VideoError::EmptySequence(path.to_path_buf()));
    }
    Ok((SourceKind::Sequence, frames))
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or(false)
}
