// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Publishing native buffers to the host runtime.
//!
//! [`wrap`] moves a [`NativeBuffer`] into a [`Capsule`] tagged as either an
//! image or a raw memory block. The host runtime owns the capsule's
//! reference count; when it reaches zero the registered release callback
//! frees the buffer. There is no way to free a published buffer by hand.

use crate::{
    capsule::Capsule,
    error::{Error, Result},
    format::PixelFormat,
    memory::{NativeBuffer, Residency, Shape},
};
use std::ptr::NonNull;
use tracing::debug;

/// Capsule name carried by published images.
pub const IMAGE_CAPSULE: &str = "edgefirst.image";

/// Capsule name carried by published memory blocks.
pub const MEMORY_CAPSULE: &str = "edgefirst.memory";

/// Kind of buffer a handle publishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeTag {
    Image,
    Memory,
}

impl TypeTag {
    pub fn capsule_name(self) -> &'static str {
        match self {
            TypeTag::Image => IMAGE_CAPSULE,
            TypeTag::Memory => MEMORY_CAPSULE,
        }
    }

    fn of(buffer: &NativeBuffer) -> Self {
        match buffer.shape() {
            Shape::Image { .. } => TypeTag::Image,
            Shape::Memory => TypeTag::Memory,
        }
    }
}

/// Fields of a published image, borrowed from its handle.
#[derive(Debug, Clone, Copy)]
pub struct ImageRef<'a> {
    pub ptr: NonNull<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub residency: Residency,
    buffer: &'a NativeBuffer,
}

impl<'a> ImageRef<'a> {
    /// Pixel bytes, when the image is host-visible.
    pub fn host_bytes(&self) -> Option<&'a [u8]> {
        self.buffer.host_bytes()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Fields of a published memory block, borrowed from its handle.
#[derive(Debug, Clone, Copy)]
pub struct MemoryRef<'a> {
    pub ptr: NonNull<u8>,
    pub len: usize,
    pub residency: Residency,
    buffer: &'a NativeBuffer,
}

impl<'a> MemoryRef<'a> {
    /// Block bytes, when the memory is host-visible.
    pub fn host_bytes(&self) -> Option<&'a [u8]> {
        self.buffer.host_bytes()
    }
}

/// Publishes `buffer` as a handle for the host runtime.
///
/// Ownership moves into the handle. The buffer is freed by the release
/// callback once the last reference to the handle is dropped.
pub fn wrap(buffer: NativeBuffer) -> Capsule {
    let tag = TypeTag::of(&buffer);
    debug!("publishing {} as {:?} handle", buffer, tag);
    Capsule::with_destructor(tag.capsule_name(), buffer, release)
}

fn release(buffer: NativeBuffer) {
    debug!("releasing {}", buffer);
    drop(buffer);
}

/// Buffer published by [`wrap`] and its tag. The capsule name must agree
/// with the buffer's shape.
fn published(handle: &Capsule) -> Result<(TypeTag, &NativeBuffer)> {
    let invalid = || Error::InvalidHandle(handle.name().to_owned());
    let buffer = handle
        .get::<NativeBuffer>(handle.name())
        .ok_or_else(invalid)?;
    let tag = TypeTag::of(buffer);
    if tag.capsule_name() != handle.name() {
        return Err(invalid());
    }
    Ok((tag, buffer))
}

fn lookup(handle: &Capsule, tag: TypeTag) -> Result<Option<&NativeBuffer>> {
    let (actual, buffer) = published(handle)?;
    Ok((actual == tag).then_some(buffer))
}

/// Image fields of `handle`.
///
/// Returns `Ok(None)` when the handle publishes a memory block instead, so
/// the caller can fall back to [`unwrap_memory`].
///
/// # Errors
///
/// Returns [`Error::InvalidHandle`] when `handle` was not created by
/// [`wrap`].
pub fn unwrap_image(handle: &Capsule) -> Result<Option<ImageRef<'_>>> {
    let Some(buffer) = lookup(handle, TypeTag::Image)? else {
        return Ok(None);
    };
    match buffer.shape() {
        Shape::Image {
            width,
            height,
            format,
        } => Ok(Some(ImageRef {
            ptr: buffer.as_ptr(),
            width,
            height,
            format,
            residency: buffer.residency(),
            buffer,
        })),
        Shape::Memory => Err(Error::InvalidHandle(handle.name().to_owned())),
    }
}

/// Memory fields of `handle`.
///
/// Returns `Ok(None)` when the handle publishes an image instead.
///
/// # Errors
///
/// Returns [`Error::InvalidHandle`] when `handle` was not created by
/// [`wrap`].
pub fn unwrap_memory(handle: &Capsule) -> Result<Option<MemoryRef<'_>>> {
    Ok(lookup(handle, TypeTag::Memory)?.map(|buffer| MemoryRef {
        ptr: buffer.as_ptr(),
        len: buffer.len(),
        residency: buffer.residency(),
        buffer,
    }))
}

/// Type tag of `handle`, or [`Error::InvalidHandle`] for foreign capsules.
pub fn type_tag(handle: &Capsule) -> Result<TypeTag> {
    published(handle).map(|(tag, _)| tag)
}
