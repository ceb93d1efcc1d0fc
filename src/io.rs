// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Loading images into published handles and saving handles back to disk.

use crate::{
    bridge::{self, unwrap_image, unwrap_memory},
    capsule::Capsule,
    codec::{Codec, EncodeRequest, FileCodec, PixelRange},
    error::{Error, Result},
    format::{format_of, PixelFormat},
    memory::{Allocator, NativeBuffer, Residency, SystemAllocator},
};
use std::{path::Path, sync::Arc};
use tracing::{debug, warn};

pub const DEFAULT_QUALITY: i32 = 95;
pub const DEFAULT_MAX_PIXEL: f32 = 255.0;

/// Options for [`ImageIo::save_from_handle`].
///
/// `width`, `height` and `format` only apply to raw memory handles, which
/// carry no image metadata of their own. The format defaults to
/// [`PixelFormat::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaveOptions {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<PixelFormat>,
    pub max_pixel: f32,
    /// Encoder quality. Values outside 0-100 are clamped.
    pub quality: i32,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            format: None,
            max_pixel: DEFAULT_MAX_PIXEL,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl SaveOptions {
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_max_pixel(mut self, max_pixel: f32) -> Self {
        self.max_pixel = max_pixel;
        self
    }

    pub fn with_quality(mut self, quality: i32) -> Self {
        self.quality = quality;
        self
    }
}

/// Image I/O adapter.
///
/// Decodes files through its [`Codec`] into host-mapped buffers from its
/// [`Allocator`] and publishes them with [`bridge::wrap`]. Saving goes the
/// other way, unwrapping a handle and handing its pixels to the codec.
pub struct ImageIo<C = FileCodec> {
    codec: C,
    allocator: Arc<dyn Allocator>,
}

impl Default for ImageIo<FileCodec> {
    fn default() -> Self {
        Self::new(FileCodec, Arc::new(SystemAllocator))
    }
}

impl<C: Codec> ImageIo<C> {
    pub fn new(codec: C, allocator: Arc<dyn Allocator>) -> Self {
        Self { codec, allocator }
    }

    /// Loads the image at `path` as a handle to a canonical RGBA float image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened and
    /// [`Error::Decode`] if its contents cannot be decoded.
    pub fn load_as_handle(&self, path: impl AsRef<Path>) -> Result<Capsule> {
        let path = path.as_ref();
        let decoded = self.codec.decode(path)?;
        let decode_error = |reason: String| Error::Decode {
            path: path.to_owned(),
            reason,
        };

        let mut buffer = NativeBuffer::alloc_image(
            self.allocator.clone(),
            decoded.width,
            decoded.height,
            format_of::<[f32; 4]>(),
            Residency::Mapped,
        )?;
        let expected = buffer.len() / std::mem::size_of::<[f32; 4]>();
        if decoded.pixels.len() != expected {
            return Err(decode_error(format!(
                "decoder returned {} pixels for a {}x{} image",
                decoded.pixels.len(),
                decoded.width,
                decoded.height
            )));
        }
        let Some(dst) = buffer.host_bytes_mut() else {
            return Err(decode_error("image buffer is not host visible".into()));
        };
        for (dst, px) in dst.chunks_exact_mut(16).zip(&decoded.pixels) {
            for (dst, value) in dst.chunks_exact_mut(4).zip(px) {
                dst.copy_from_slice(&value.to_ne_bytes());
            }
        }

        Ok(bridge::wrap(buffer))
    }

    /// Loads the image at `path`, returning its handle and dimensions.
    pub fn load_image(&self, path: impl AsRef<Path>) -> Result<(Capsule, u32, u32)> {
        let handle = self.load_as_handle(path)?;
        let (width, height) = match unwrap_image(&handle)? {
            Some(image) => (image.width, image.height),
            None => return Err(Error::InvalidHandle(handle.name().to_owned())),
        };
        Ok((handle, width, height))
    }

    /// Saves the image published by `handle` to `path`.
    ///
    /// Image handles supply their own dimensions and format. Memory handles
    /// need `width` and `height` from `options`, and are read as
    /// `options.format`. The handle's pixels are never modified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `handle` is not an image or
    /// memory handle, if required dimensions are missing or if the memory
    /// block is too small; [`Error::InvalidDimensions`] for non-positive
    /// dimensions; and [`Error::Encode`] if the codec fails or the file
    /// cannot be written. An existing file at `path` is kept on failure.
    pub fn save_from_handle(
        &self,
        path: impl AsRef<Path>,
        handle: &Capsule,
        options: &SaveOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        if !options.max_pixel.is_finite() || options.max_pixel <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "max_pixel must be positive, got {}",
                options.max_pixel
            )));
        }
        let quality = normalize_quality(options.quality);
        let not_a_handle = |err: Error| {
            Error::InvalidArgument(format!("expected an image or memory handle: {}", err))
        };

        let (pixels, width, height, format) = if let Some(image) =
            unwrap_image(handle).map_err(not_a_handle)?
        {
            image.format.byte_size(image.width, image.height)?;
            (image.host_bytes(), image.width, image.height, image.format)
        } else if let Some(memory) = unwrap_memory(handle).map_err(not_a_handle)? {
            let (Some(width), Some(height)) = (options.width, options.height) else {
                return Err(Error::InvalidArgument(
                    "width and height are required to save a memory handle".into(),
                ));
            };
            if width <= 0 || height <= 0 {
                return Err(Error::InvalidDimensions {
                    width: width.into(),
                    height: height.into(),
                });
            }
            let (width, height) = (width as u32, height as u32);
            let format = options.format.unwrap_or(PixelFormat::DEFAULT);
            let size = format.byte_size(width, height)?;
            if size > memory.len {
                return Err(Error::InvalidArgument(format!(
                    "{}x{} {} needs {} bytes but the memory block holds {}",
                    width, height, format, size, memory.len
                )));
            }
            (memory.host_bytes(), width, height, format)
        } else {
            return Err(Error::InvalidArgument(
                "expected an image or memory handle".into(),
            ));
        };

        let Some(pixels) = pixels else {
            return Err(Error::Encode {
                path: path.to_owned(),
                reason: "device memory is not visible to the host encoder".into(),
            });
        };

        debug!(
            "saving {}x{} {} to {} quality {}",
            width,
            height,
            format,
            path.display(),
            quality
        );
        self.codec.encode(
            path,
            &EncodeRequest {
                pixels,
                width,
                height,
                format,
                quality,
                range: PixelRange::up_to(options.max_pixel),
            },
        )
    }
}

fn normalize_quality(quality: i32) -> u8 {
    let clamped = quality.clamp(0, 100);
    if clamped != quality {
        warn!("quality {} clamped to {}", quality, clamped);
    }
    clamped as u8
}

/// Loads the image at `path` with the default file codec and allocator.
pub fn load_image(path: impl AsRef<Path>) -> Result<(Capsule, u32, u32)> {
    ImageIo::default().load_image(path)
}

/// Saves `handle` to `path` with the default file codec.
pub fn save_image(path: impl AsRef<Path>, handle: &Capsule, options: &SaveOptions) -> Result<()> {
    ImageIo::default().save_from_handle(path, handle, options)
}
