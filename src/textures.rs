//! RGBA frame images and sampler settings.
//!
//! Every frame the video source hands to the GPU is a [`TextureConfig`]:
//! tightly packed RGBA8 pixels plus the filter and address modes used when
//! the diamonds and the backdrop sample it.
//!
//! Frames can be decoded from PNG/JPEG files or generated procedurally for
//! the fallback texture shown when no footage is available.

use crate::error::VideoError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Filter mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Smooth linear filtering (default).
    #[default]
    Linear,
    /// Sharp nearest-neighbor filtering.
    Nearest,
}

impl FilterMode {
    pub fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            FilterMode::Linear => wgpu::FilterMode::Linear,
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
        }
    }
}

/// Address mode for texture wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressMode {
    /// Clamp to edge color (default).
    #[default]
    ClampToEdge,
    /// Tile the texture.
    Repeat,
    /// Mirror the texture at boundaries.
    MirrorRepeat,
}

impl AddressMode {
    pub fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            AddressMode::Repeat => wgpu::AddressMode::Repeat,
            AddressMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

/// One RGBA8 image plus how to sample it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureConfig {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub filter: FilterMode,
    pub address_mode: AddressMode,
}

impl TextureConfig {
    /// Wrap raw RGBA data. Returns `None` if the buffer length does not match
    /// the dimensions.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 || width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
            filter: FilterMode::Linear,
            address_mode: AddressMode::ClampToEdge,
        })
    }

    /// Decode an image file (PNG or JPEG).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VideoError> {
        let img = image::open(path.as_ref())?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
            filter: FilterMode::Linear,
            address_mode: AddressMode::ClampToEdge,
        })
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = mode;
        self
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row, as needed for texture uploads.
    #[inline]
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }

    /// A 1x1 texture of a single color.
    pub fn solid(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            data: vec![r, g, b, a],
            width: 1,
            height: 1,
            filter: FilterMode::Nearest,
            address_mode: AddressMode::ClampToEdge,
        }
    }

    /// A `size` x `size` checkerboard with `cell_size` pixel cells.
    pub fn checkerboard(size: u32, cell_size: u32, color1: [u8; 4], color2: [u8; 4]) -> Self {
        let cell_size = cell_size.max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let cx = x / cell_size;
                let cy = y / cell_size;
                let color = if (cx + cy) % 2 == 0 { color1 } else { color2 };
                data.extend_from_slice(&color);
            }
        }
        Self {
            data,
            width: size,
            height: size,
            filter: FilterMode::Nearest,
            address_mode: AddressMode::Repeat,
        }
    }

    /// Greyscale hash noise tinted by `tint`.
    pub fn noise(size: u32, seed: u32, tint: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let v = hash_noise(x, y, seed) as u16;
                data.push(((v * tint[0] as u16) / 255) as u8);
                data.push(((v * tint[1] as u16) / 255) as u8);
                data.push(((v * tint[2] as u16) / 255) as u8);
                data.push(255);
            }
        }
        Self {
            data,
            width: size,
            height: size,
            filter: FilterMode::Linear,
            address_mode: AddressMode::Repeat,
        }
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self::solid(0, 0, 0, 255)
    }
}

fn hash_noise(x: u32, y: u32, seed: u32) -> u8 {
    let mut n = x
        .wrapping_mul(374761393)
        .wrapping_add(y.wrapping_mul(668265263))
        .wrapping_add(seed.wrapping_mul(1013904223));
    n = (n ^ (n >> 13)).wrapping_mul(1274126177);
    n = n ^ (n >> 16);
    (n & 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(TextureConfig::from_rgba(vec![0; 16], 2, 2).is_some());
        assert!(TextureConfig::from_rgba(vec![0; 15], 2, 2).is_none());
        assert!(TextureConfig::from_rgba(vec![], 0, 0).is_none());
    }

    #[test]
    fn test_checkerboard_cells() {
        let white = [255, 255, 255, 255];
        let black = [0, 0, 0, 255];
        let tex = TextureConfig::checkerboard(4, 2, white, black);
        assert_eq!(tex.data.len(), 4 * 4 * 4);
        assert_eq!(&tex.data[0..4], &white);
        // Pixel (2, 0) is in the next cell.
        assert_eq!(&tex.data[8..12], &black);
        assert_eq!(tex.address_mode, AddressMode::Repeat);
    }

    #[test]
    fn test_noise_is_deterministic() {
        let a = TextureConfig::noise(8, 3, [255, 255, 255]);
        let b = TextureConfig::noise(8, 3, [255, 255, 255]);
        let c = TextureConfig::noise(8, 4, [255, 255, 255]);
        assert_eq!(a, b);
        assert_ne!(a.data, c.data);
        assert!(a.data.chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let tex = TextureConfig::from_file(&path).unwrap();
        assert_eq!(tex.dimensions(), (3, 2));
        assert_eq!(tex.bytes_per_row(), 12);
        assert_eq!(&tex.data[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_from_file_missing() {
        assert!(TextureConfig::from_file("/no/such/frame.png").is_err());
    }
}
