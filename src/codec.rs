// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Disk codecs used by the image I/O adapter.

use crate::{
    error::{Error, Result},
    format::{Family, PixelFormat},
};
use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, ImageFormat, ImageReader};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::debug;

/// Image decoded into the canonical RGBA 32-bit float layout, with channel
/// values in the 0-255 range.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

/// Range of pixel values mapped onto the encoder's 0-255 output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRange {
    pub min: f32,
    pub max: f32,
}

impl PixelRange {
    pub fn up_to(max: f32) -> Self {
        Self { min: 0.0, max }
    }
}

impl Default for PixelRange {
    fn default() -> Self {
        Self::up_to(255.0)
    }
}

/// Pixels handed to [`Codec::encode`].
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Quality in 0-100, used by lossy containers.
    pub quality: u8,
    pub range: PixelRange,
}

/// Disk codec collaborator.
pub trait Codec {
    /// Decodes the file at `path` into canonical RGBA float pixels.
    fn decode(&self, path: &Path) -> Result<Decoded>;

    /// Encodes `request` into the file at `path`, never modifying the pixels.
    fn encode(&self, path: &Path, request: &EncodeRequest<'_>) -> Result<()>;
}

/// Codec for common image files, picking the container from the file
/// extension on save and from the content on load.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileCodec;

impl Codec for FileCodec {
    fn decode(&self, path: &Path) -> Result<Decoded> {
        let io_error = |source: io::Error| Error::Io {
            path: path.to_owned(),
            source,
        };
        let file = File::open(path).map_err(io_error)?;
        let reader = ImageReader::new(BufReader::new(file))
            .with_guessed_format()
            .map_err(io_error)?;
        let image = reader.decode().map_err(|e| Error::Decode {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;

        let rgba = image.to_rgba32f();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| p.0.map(|c| c * 255.0)).collect();
        debug!("decoded {} {}x{}", path.display(), width, height);

        Ok(Decoded {
            width,
            height,
            pixels,
        })
    }

    fn encode(&self, path: &Path, request: &EncodeRequest<'_>) -> Result<()> {
        let encode_error = |reason: String| Error::Encode {
            path: path.to_owned(),
            reason,
        };

        let target = ImageFormat::from_path(path).map_err(|e| encode_error(e.to_string()))?;
        if !target.writing_enabled() {
            return Err(encode_error(format!("no encoder for {:?}", target)));
        }
        let color = match request.format.family()? {
            Family::Gray => ExtendedColorType::L8,
            Family::Rgb => ExtendedColorType::Rgb8,
            Family::Rgba => ExtendedColorType::Rgba8,
            Family::Yuv => {
                return Err(encode_error(format!(
                    "{} must be converted to rgb before encoding",
                    request.format
                )))
            }
        };
        let size = request.format.byte_size(request.width, request.height)?;
        let Some(pixels) = request.pixels.get(..size) else {
            return Err(Error::InvalidArgument(format!(
                "{} bytes given for a {}x{} {} image of {} bytes",
                request.pixels.len(),
                request.width,
                request.height,
                request.format,
                size
            )));
        };

        let samples = quantize(pixels, request.format, request.range);
        let (samples, color) = match (target, color) {
            (ImageFormat::Jpeg, ExtendedColorType::Rgba8) => {
                (drop_alpha(&samples), ExtendedColorType::Rgb8)
            }
            _ => (samples, color),
        };

        // Encode next to the target and replace it only once the file is complete.
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(|e| encode_error(e.to_string()))?;
        write_samples(file.as_file_mut(), target, &samples, request, color)
            .map_err(|e| encode_error(e.to_string()))?;
        file.persist(path).map_err(|e| encode_error(e.error.to_string()))?;

        debug!(
            "encoded {} {}x{} {} quality {}",
            path.display(),
            request.width,
            request.height,
            request.format,
            request.quality
        );
        Ok(())
    }
}

fn write_samples(
    file: &mut File,
    target: ImageFormat,
    samples: &[u8],
    request: &EncodeRequest<'_>,
    color: ExtendedColorType,
) -> image::ImageResult<()> {
    let mut writer = BufWriter::new(file);
    if target == ImageFormat::Jpeg {
        JpegEncoder::new_with_quality(&mut writer, request.quality.clamp(1, 100)).encode(
            samples,
            request.width,
            request.height,
            color,
        )?;
    } else {
        image::write_buffer_with_format(
            &mut writer,
            samples,
            request.width,
            request.height,
            color,
            target,
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Maps samples from `range` onto 0-255 bytes.
fn quantize(pixels: &[u8], format: PixelFormat, range: PixelRange) -> Vec<u8> {
    let scale = 255.0 / (range.max - range.min);
    let quantize = |v: f32| ((v - range.min) * scale).round().clamp(0.0, 255.0) as u8;

    if format.is_float() {
        pixels
            .chunks_exact(4)
            .map(|c| quantize(f32::from_ne_bytes([c[0], c[1], c[2], c[3]])))
            .collect()
    } else if range == PixelRange::default() {
        pixels.to_vec()
    } else {
        pixels.iter().map(|&v| quantize(v as f32)).collect()
    }
}

fn drop_alpha(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect()
}
