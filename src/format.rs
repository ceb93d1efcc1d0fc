// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Pixel format registry.
//!
//! The set of formats is closed: every format knows its name, its bit depth
//! and how many bytes a `width`x`height` image occupies. All functions here
//! are pure and may be called from any thread.

use crate::error::{Error, Result};
use core::fmt;
use std::str::FromStr;

/// Pixel formats understood by the image bridge.
///
/// `Unknown` is the sentinel returned by [`PixelFormat::from_name`] when a
/// name does not match; it has no name, depth or size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGB, 8 bits per channel
    Rgb8,
    /// RGB, 32-bit float per channel
    Rgb32f,
    /// RGBA, 8 bits per channel
    Rgba8,
    /// RGBA, 32-bit float per channel
    Rgba32f,
    /// YUV 4:2:2 packed, Y0 U Y1 V (also known as YUY2)
    Yuyv,
    /// YUV 4:2:2 packed, U Y0 V Y1
    Uyvy,
    /// YUV 4:2:0 planar, Y then U then V
    I420,
    /// YUV 4:2:0 planar, Y then V then U
    Yv12,
    /// YUV 4:2:0 semi-planar, Y then interleaved UV
    Nv12,
    /// Grayscale, 8 bits
    Gray8,
    /// Grayscale, 32-bit float
    Gray32f,
    Unknown,
}

/// Channel storage type of a format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BaseType {
    U8,
    F32,
}

/// Format family, grouping formats that share a channel layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Family {
    Rgb,
    Rgba,
    Yuv,
    Gray,
}

// Name table, canonical names first. Aliases map onto an existing format.
const NAMES: &[(&str, PixelFormat)] = &[
    ("rgb8", PixelFormat::Rgb8),
    ("rgb32f", PixelFormat::Rgb32f),
    ("rgba8", PixelFormat::Rgba8),
    ("rgba32f", PixelFormat::Rgba32f),
    ("yuyv", PixelFormat::Yuyv),
    ("uyvy", PixelFormat::Uyvy),
    ("i420", PixelFormat::I420),
    ("yv12", PixelFormat::Yv12),
    ("nv12", PixelFormat::Nv12),
    ("gray8", PixelFormat::Gray8),
    ("gray32f", PixelFormat::Gray32f),
    ("yuy2", PixelFormat::Yuyv),
];

impl PixelFormat {
    /// The format produced by the load path: RGBA with 32-bit float channels.
    pub const DEFAULT: PixelFormat = PixelFormat::Rgba32f;

    /// Every real format in declaration order.
    pub const ALL: [PixelFormat; 11] = [
        PixelFormat::Rgb8,
        PixelFormat::Rgb32f,
        PixelFormat::Rgba8,
        PixelFormat::Rgba32f,
        PixelFormat::Yuyv,
        PixelFormat::Uyvy,
        PixelFormat::I420,
        PixelFormat::Yv12,
        PixelFormat::Nv12,
        PixelFormat::Gray8,
        PixelFormat::Gray32f,
    ];

    /// Number of real formats.
    pub const COUNT: usize = Self::ALL.len();

    /// Alias of [`PixelFormat::Yuyv`].
    pub const YUY2: PixelFormat = PixelFormat::Yuyv;

    /// Canonical lowercase name of the format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFormat`] for the `Unknown` sentinel.
    pub fn name(self) -> Result<&'static str> {
        Ok(match self {
            PixelFormat::Rgb8 => "rgb8",
            PixelFormat::Rgb32f => "rgb32f",
            PixelFormat::Rgba8 => "rgba8",
            PixelFormat::Rgba32f => "rgba32f",
            PixelFormat::Yuyv => "yuyv",
            PixelFormat::Uyvy => "uyvy",
            PixelFormat::I420 => "i420",
            PixelFormat::Yv12 => "yv12",
            PixelFormat::Nv12 => "nv12",
            PixelFormat::Gray8 => "gray8",
            PixelFormat::Gray32f => "gray32f",
            PixelFormat::Unknown => return Err(Error::UnknownFormat),
        })
    }

    /// Looks a format up by name, ignoring ASCII case.
    ///
    /// Never fails: unrecognized names yield [`PixelFormat::Unknown`] and the
    /// caller is expected to check for it.
    pub fn from_name(name: &str) -> PixelFormat {
        NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, format)| format)
            .unwrap_or(PixelFormat::Unknown)
    }

    /// Bits per pixel. Planar YUV reports the effective depth across all
    /// planes (12 for 4:2:0), not a per-plane value.
    pub fn depth(self) -> Result<usize> {
        Ok(match self {
            PixelFormat::Rgb8 => 24,
            PixelFormat::Rgb32f => 96,
            PixelFormat::Rgba8 => 32,
            PixelFormat::Rgba32f => 128,
            PixelFormat::Yuyv | PixelFormat::Uyvy => 16,
            PixelFormat::I420 | PixelFormat::Yv12 | PixelFormat::Nv12 => 12,
            PixelFormat::Gray8 => 8,
            PixelFormat::Gray32f => 32,
            PixelFormat::Unknown => return Err(Error::UnknownFormat),
        })
    }

    /// Size in bytes of a `width`x`height` image in this format.
    ///
    /// 4:2:0 formats store a full resolution luma plane followed by two
    /// chroma planes subsampled by two in each direction, rounding odd
    /// dimensions up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] when either dimension is zero or
    /// the size does not fit in `usize`, and [`Error::UnknownFormat`] for the
    /// `Unknown` sentinel.
    pub fn byte_size(self, width: u32, height: u32) -> Result<usize> {
        let invalid = || Error::InvalidDimensions {
            width: width.into(),
            height: height.into(),
        };
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        let (w, h) = (width as usize, height as usize);
        let size = match self {
            PixelFormat::I420 | PixelFormat::Yv12 | PixelFormat::Nv12 => {
                let luma = w.checked_mul(h);
                let chroma = w.div_ceil(2).checked_mul(h.div_ceil(2));
                luma.zip(chroma)
                    .and_then(|(l, c)| c.checked_mul(2).and_then(|c| l.checked_add(c)))
            }
            _ => {
                let depth = self.depth()?;
                w.checked_mul(h)
                    .and_then(|px| px.checked_mul(depth))
                    .map(|bits| bits / 8)
            }
        };
        size.ok_or_else(invalid)
    }

    /// Channel count. Packed 4:2:2 reports two samples per pixel and planar
    /// YUV one sample per plane.
    pub fn channels(self) -> Result<usize> {
        Ok(match self.family()? {
            Family::Rgb => 3,
            Family::Rgba => 4,
            Family::Gray => 1,
            Family::Yuv => match self {
                PixelFormat::Yuyv | PixelFormat::Uyvy => 2,
                _ => 1,
            },
        })
    }

    pub fn base_type(self) -> Result<BaseType> {
        match self {
            PixelFormat::Rgb32f | PixelFormat::Rgba32f | PixelFormat::Gray32f => Ok(BaseType::F32),
            PixelFormat::Unknown => Err(Error::UnknownFormat),
            _ => Ok(BaseType::U8),
        }
    }

    pub fn family(self) -> Result<Family> {
        Ok(match self {
            PixelFormat::Rgb8 | PixelFormat::Rgb32f => Family::Rgb,
            PixelFormat::Rgba8 | PixelFormat::Rgba32f => Family::Rgba,
            PixelFormat::Yuyv
            | PixelFormat::Uyvy
            | PixelFormat::I420
            | PixelFormat::Yv12
            | PixelFormat::Nv12 => Family::Yuv,
            PixelFormat::Gray8 | PixelFormat::Gray32f => Family::Gray,
            PixelFormat::Unknown => return Err(Error::UnknownFormat),
        })
    }

    pub fn is_rgb(self) -> bool {
        matches!(self.family(), Ok(Family::Rgb | Family::Rgba))
    }

    pub fn is_yuv(self) -> bool {
        matches!(self.family(), Ok(Family::Yuv))
    }

    pub fn is_gray(self) -> bool {
        matches!(self.family(), Ok(Family::Gray))
    }

    pub fn is_float(self) -> bool {
        matches!(self.base_type(), Ok(BaseType::F32))
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat::DEFAULT
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name().unwrap_or("unknown"))
    }
}

impl FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match PixelFormat::from_name(s) {
            PixelFormat::Unknown => Err(Error::UnknownFormat),
            format => Ok(format),
        }
    }
}

/// Pixel element types with a statically known format.
///
/// Only 3 and 4 channel `u8`/`f32` elements implement this trait, so asking
/// for the format of any other element type fails to compile.
pub trait PixelElement: Copy {
    const FORMAT: PixelFormat;
}

impl PixelElement for [u8; 3] {
    const FORMAT: PixelFormat = PixelFormat::Rgb8;
}

impl PixelElement for [u8; 4] {
    const FORMAT: PixelFormat = PixelFormat::Rgba8;
}

impl PixelElement for [f32; 3] {
    const FORMAT: PixelFormat = PixelFormat::Rgb32f;
}

impl PixelElement for [f32; 4] {
    const FORMAT: PixelFormat = PixelFormat::Rgba32f;
}

impl PixelElement for rgb::Rgb<u8> {
    const FORMAT: PixelFormat = PixelFormat::Rgb8;
}

impl PixelElement for rgb::Rgba<u8> {
    const FORMAT: PixelFormat = PixelFormat::Rgba8;
}

impl PixelElement for rgb::Rgb<f32> {
    const FORMAT: PixelFormat = PixelFormat::Rgb32f;
}

impl PixelElement for rgb::Rgba<f32> {
    const FORMAT: PixelFormat = PixelFormat::Rgba32f;
}

/// Format of the pixel element type `T`.
pub const fn format_of<T: PixelElement>() -> PixelFormat {
    T::FORMAT
}
