//! Error types for kaleido.
//!
//! Only setup can fail: loading config, creating the window and GPU device,
//! decoding video frames. Nothing in the per-frame path returns an error.

use std::path::PathBuf;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),

    /// The surface reported no usable texture format.
    #[error("surface has no supported texture formats")]
    NoSurfaceFormat,
}

/// Errors that can occur while opening a video frame source.
#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    /// Failed to decode an image frame.
    #[error("failed to decode frame: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// Failed to read a file or directory.
    #[error("failed to read video asset: {0}")]
    Io(#[from] std::io::Error),

    /// The frame directory contained no decodable frames.
    #[error("no frames found in {0}")]
    EmptySequence(PathBuf),

    /// A frame had different dimensions from the first frame.
    #[error("frame {path} is {found:?}, expected {expected:?}")]
    SizeMismatch {
        path: PathBuf,
        expected: (u32, u32),
        found: (u32, u32),
    },
}

/// Errors that can occur when building or running a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Field generator parameters out of range.
    #[error("invalid field parameters: {0}")]
    InvalidField(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ValidationError("field.num_rings out of range".into());
        assert_eq!(
            err.to_string(),
            "config validation error: field.num_rings out of range"
        );
    }

    #[test]
    fn scene_error_from_config_is_transparent() {
        let err: SceneError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(err, SceneError::Config(_)));
        assert_eq!(err.to_string(), "config parse error: bad toml");
    }

    #[test]
    fn video_error_size_mismatch_mentions_path() {
        let err = VideoError::SizeMismatch {
            path: PathBuf::from("frames/0002.png"),
            expected: (640, 360),
            found: (320, 180),
        };
        let msg = err.to_string();
        assert!(msg.contains("frames/0002.png"));
        assert!(msg.contains("(640, 360)"));
    }

    #[test]
    fn invalid_field_display() {
        let err = SceneError::InvalidField("num_rings must be >= 2".into());
        assert_eq!(err.to_string(), "invalid field parameters: num_rings must be >= 2");
    }
}
