//! Raw and encoded video frame types

use crate::error::{MediaError, MediaResult};
use bytes::Bytes;

/// Raw I420 video frame
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Planar Y, U, V data without padding
    pub data: Vec<u8>,
    /// Capture timestamp in microseconds
    pub timestamp_us: u64,
}

impl VideoFrame {
    /// Build an I420 frame, checking the buffer length against the dimensions
    pub fn i420(width: u32, height: u32, data: Vec<u8>, timestamp_us: u64) -> MediaResult<Self> {
        let expected = i420_size(width, height);
        if data.len() != expected {
            return Err(MediaError::InvalidFrameData {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            timestamp_us,
        })
    }

    /// Uniform grey frame, handy for probing encoders
    pub fn black(width: u32, height: u32, timestamp_us: u64) -> Self {
        let luma = (width * height) as usize;
        let mut data = vec![16u8; luma];
        data.resize(i420_size(width, height), 128);
        Self {
            width,
            height,
            data,
            timestamp_us,
        }
    }

    /// Resample to `width`x`height` with bilinear filtering, plane by plane
    pub fn scaled(&self, width: u32, height: u32) -> MediaResult<Self> {
        let expected = i420_size(self.width, self.height);
        if self.data.len() != expected {
            return Err(MediaError::InvalidFrameData {
                expected,
                actual: self.data.len(),
            });
        }
        if width == 0 || height == 0 || self.width == 0 || self.height == 0 {
            return Err(MediaError::InvalidState {
                message: format!(
                    "cannot scale {}x{} frame to {}x{}",
                    self.width, self.height, width, height
                ),
            });
        }
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }

        let src = Planes::of(self.width, self.height);
        let dst = Planes::of(width, height);
        let mut data = Vec::with_capacity(i420_size(width, height));
        for plane in 0..3 {
            let (src_w, src_h) = src.dimensions(plane);
            let (dst_w, dst_h) = dst.dimensions(plane);
            let range = src.range(plane);
            scale_plane(&self.data[range], (src_w, src_h), (dst_w, dst_h), &mut data);
        }

        Ok(Self {
            width,
            height,
            data,
            timestamp_us: self.timestamp_us,
        })
    }
}

/// Plane geometry of an unpadded I420 buffer
#[derive(Debug, Clone, Copy)]
struct Planes {
    luma: (usize, usize),
    chroma: (usize, usize),
}

impl Planes {
    fn of(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self {
            luma: (w, h),
            chroma: (w.div_ceil(2), h.div_ceil(2)),
        }
    }

    fn dimensions(&self, plane: usize) -> (usize, usize) {
        if plane == 0 {
            self.luma
        } else {
            self.chroma
        }
    }

    fn range(&self, plane: usize) -> std::ops::Range<usize> {
        let luma = self.luma.0 * self.luma.1;
        let chroma = self.chroma.0 * self.chroma.1;
        match plane {
            0 => 0..luma,
            1 => luma..luma + chroma,
            _ => luma + chroma..luma + 2 * chroma,
        }
    }
}

fn scale_plane(src: &[u8], (src_w, src_h): (usize, usize), (dst_w, dst_h): (usize, usize), out: &mut Vec<u8>) {
    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;

    for y in 0..dst_h {
        let src_y = y as f32 * y_ratio;
        let y0 = (src_y as usize).min(src_h - 1);
        let y1 = (y0 + 1).min(src_h - 1);
        let y_frac = src_y - y0 as f32;

        for x in 0..dst_w {
            let src_x = x as f32 * x_ratio;
            let x0 = (src_x as usize).min(src_w - 1);
            let x1 = (x0 + 1).min(src_w - 1);
            let x_frac = src_x - x0 as f32;

            let pixel = |px: usize, py: usize| src[py * src_w + px] as f32;
            let top = pixel(x0, y0) * (1.0 - x_frac) + pixel(x1, y0) * x_frac;
            let bottom = pixel(x0, y1) * (1.0 - x_frac) + pixel(x1, y1) * x_frac;
            let value = top * (1.0 - y_frac) + bottom * y_frac;
            out.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }
}

/// Byte size of an unpadded I420 buffer
pub fn i420_size(width: u32, height: u32) -> usize {
    let (w, h) = (width as usize, height as usize);
    let chroma = w.div_ceil(2) * h.div_ceil(2);
    w * h + 2 * chroma
}

/// Encoded video frame produced by an encoder or fed to a decoder
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    /// Bitstream payload
    pub data: Bytes,
    /// Timestamp in microseconds
    pub timestamp_us: u64,
    /// Whether this is a keyframe
    pub is_keyframe: bool,
    /// Encoded width (0 when unknown)
    pub width: u32,
    /// Encoded height (0 when unknown)
    pub height: u32,
    /// Simulcast layer this image belongs to
    pub simulcast_index: usize,
}

impl EncodedImage {
    /// Wrap a bitstream with no layer information
    pub fn new(data: impl Into<Bytes>, timestamp_us: u64, is_keyframe: bool) -> Self {
        Self {
            data: data.into(),
            timestamp_us,
            is_keyframe,
            width: 0,
            height: 0,
            simulcast_index: 0,
        }
    }
}
