use serde::{Deserialize, Serialize};

use crate::error::{TempoError, TempoResult};
use crate::Color;

/// Pixel format of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA (4 bytes per pixel).
    Rgba8,
    /// 8-bit RGB (3 bytes per pixel, no alpha).
    Rgb8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }

    /// Format for a channel count. Only 3 and 4 are supported.
    pub fn from_channels(channels: u32) -> TempoResult<Self> {
        match channels {
            4 => Ok(PixelFormat::Rgba8),
            3 => Ok(PixelFormat::Rgb8),
            other => Err(TempoError::invalid(format!(
                "unsupported channel count {}",
                other
            ))),
        }
    }
}

/// A raster surface as a raw pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: PixelFormat,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with zeros (transparent black).
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let size = (width as usize) * (height as usize) * format.bytes_per_pixel();
        Self {
            data: vec![0u8; size],
            width,
            height,
            format,
        }
    }

    /// Create an RGBA frame buffer filled with a solid color.
    pub fn solid(width: u32, height: u32, color: &Color) -> Self {
        let mut fb = Self::new(width, height, PixelFormat::Rgba8);
        fb.fill(color);
        fb
    }

    /// Wrap existing pixel data, checking its length.
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> TempoResult<Self> {
        let expected = (width as usize) * (height as usize) * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(TempoError::invalid(format!(
                "buffer of {} bytes does not match {}x{} {:?} ({} bytes)",
                data.len(),
                width,
                height,
                format,
                expected
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: &Color) {
        let pixel = color.to_rgba8();
        let bpp = self.format.bytes_per_pixel();
        for px in self.data.chunks_exact_mut(bpp) {
            px.copy_from_slice(&pixel[..bpp]);
        }
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Total byte size of the pixel data.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * self.format.bytes_per_pixel()
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        match self.format {
            PixelFormat::Rgba8 => Some([
                self.data[offset],
                self.data[offset + 1],
                self.data[offset + 2],
                self.data[offset + 3],
            ]),
            PixelFormat::Rgb8 => Some([
                self.data[offset],
                self.data[offset + 1],
                self.data[offset + 2],
                255,
            ]),
        }
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = self.offset(x, y);
        let bpp = self.format.bytes_per_pixel();
        self.data[offset..offset + bpp].copy_from_slice(&rgba[..bpp]);
    }

    /// Source-over blend of `color` onto a single pixel. No-op if out of bounds.
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: &Color) {
        let Some(dst) = self.get_pixel(x, y) else {
            return;
        };
        let sa = color.a.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: f32, d: u8| -> u8 {
            let d = d as f32 / 255.0;
            let v = (s * sa + d * da * (1.0 - sa)) / out_a;
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        };
        self.set_pixel(
            x,
            y,
            [
                mix(color.r, dst[0]),
                mix(color.g, dst[1]),
                mix(color.b, dst[2]),
                (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
            ],
        );
    }

    /// Expand to RGBA (alpha 255 for RGB input).
    pub fn to_rgba(&self) -> FrameBuffer {
        match self.format {
            PixelFormat::Rgba8 => self.clone(),
            PixelFormat::Rgb8 => {
                let mut data = Vec::with_capacity(self.pixel_count() * 4);
                for px in self.data.chunks_exact(3) {
                    data.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
                FrameBuffer {
                    data,
                    width: self.width,
                    height: self.height,
                    format: PixelFormat::Rgba8,
                }
            }
        }
    }

    /// Convert to the requested format, dropping alpha when packing to RGB.
    pub fn to_format(&self, format: PixelFormat) -> FrameBuffer {
        match (self.format, format) {
            (a, b) if a == b => self.clone(),
            (_, PixelFormat::Rgba8) => self.to_rgba(),
            (_, PixelFormat::Rgb8) => {
                let mut data = Vec::with_capacity(self.pixel_count() * 3);
                for px in self.data.chunks_exact(4) {
                    data.extend_from_slice(&px[..3]);
                }
                FrameBuffer {
                    data,
                    width: self.width,
                    height: self.height,
                    format: PixelFormat::Rgb8,
                }
            }
        }
    }
}
