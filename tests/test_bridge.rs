// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use edgefirst_imageio::{
    bridge::{self, unwrap_image, unwrap_memory, TypeTag, IMAGE_CAPSULE, MEMORY_CAPSULE},
    capsule::Capsule,
    format::PixelFormat,
    memory::{Allocator, NativeBuffer, Residency, Shape, SystemAllocator},
    Error,
};
use std::{
    error::Error as StdError,
    io,
    ptr::NonNull,
    sync::{Arc, Mutex},
};

/// Allocator that records every free it performs.
#[derive(Debug, Default)]
struct RecordingAllocator {
    frees: Mutex<Vec<(usize, Residency)>>,
}

impl RecordingAllocator {
    fn frees(&self) -> Vec<(usize, Residency)> {
        self.frees.lock().unwrap().clone()
    }
}

impl Allocator for RecordingAllocator {
    fn allocate(&self, size: usize, residency: Residency) -> io::Result<NonNull<u8>> {
        SystemAllocator.allocate(size, residency)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, size: usize, residency: Residency) -> io::Result<()> {
        self.frees.lock().unwrap().push((size, residency));
        SystemAllocator.free(ptr, size, residency)
    }
}

#[test]
fn test_image_round_trip() -> Result<(), Box<dyn StdError>> {
    let allocator = Arc::new(RecordingAllocator::default());
    let buffer =
        NativeBuffer::alloc_image(allocator.clone(), 640, 480, PixelFormat::Nv12, Residency::Device)?;
    let ptr = buffer.as_ptr();

    let handle = bridge::wrap(buffer);
    assert_eq!(bridge::type_tag(&handle)?, TypeTag::Image);

    let image = unwrap_image(&handle)?.expect("image handle");
    assert_eq!(image.ptr, ptr);
    assert_eq!((image.width, image.height), (640, 480));
    assert_eq!(image.format, PixelFormat::Nv12);
    assert_eq!(image.residency, Residency::Device);
    assert_eq!(image.len(), 460800);
    assert!(image.host_bytes().is_none());

    // An image is a miss for the memory accessor, not an invalid handle.
    assert!(unwrap_memory(&handle)?.is_none());

    Ok(())
}

#[test]
fn test_memory_round_trip() -> Result<(), Box<dyn StdError>> {
    let allocator = Arc::new(RecordingAllocator::default());
    let buffer = NativeBuffer::alloc(allocator.clone(), 4096, Residency::Mapped)?;
    let ptr = buffer.as_ptr();

    let handle = bridge::wrap(buffer);
    assert_eq!(handle.name(), TypeTag::Memory.capsule_name());

    let memory = unwrap_memory(&handle)?.expect("memory handle");
    assert_eq!(memory.ptr, ptr);
    assert_eq!(memory.len, 4096);
    assert_eq!(memory.residency, Residency::Mapped);
    assert_eq!(memory.host_bytes().map(<[u8]>::len), Some(4096));

    assert!(unwrap_image(&handle)?.is_none());

    Ok(())
}

#[test]
fn test_release_frees_once() -> Result<(), Box<dyn StdError>> {
    let allocator = Arc::new(RecordingAllocator::default());
    let handle = bridge::wrap(NativeBuffer::alloc_image(
        allocator.clone(),
        4,
        2,
        PixelFormat::Rgba8,
        Residency::Mapped,
    )?);

    let copies: Vec<Capsule> = (0..3).map(|_| handle.clone()).collect();
    assert_eq!(handle.ref_count(), 4);

    drop(handle);
    assert!(allocator.frees().is_empty());

    // Remaining references still see the buffer.
    let image = unwrap_image(&copies[2])?.expect("image handle");
    assert_eq!(image.len(), 32);

    drop(copies);
    assert_eq!(allocator.frees(), vec![(32, Residency::Mapped)]);

    Ok(())
}

#[test]
fn test_release_matches_residency() -> Result<(), Box<dyn StdError>> {
    let allocator = Arc::new(RecordingAllocator::default());
    let device = bridge::wrap(NativeBuffer::alloc(allocator.clone(), 128, Residency::Device)?);
    let mapped = bridge::wrap(NativeBuffer::alloc(allocator.clone(), 256, Residency::Mapped)?);

    drop(mapped);
    drop(device);

    assert_eq!(
        allocator.frees(),
        vec![(256, Residency::Mapped), (128, Residency::Device)]
    );

    Ok(())
}

#[test]
fn test_unpublished_buffer_is_freed() -> Result<(), Box<dyn StdError>> {
    let allocator = Arc::new(RecordingAllocator::default());
    let buffer = NativeBuffer::alloc(allocator.clone(), 16, Residency::Device)?;
    drop(buffer);
    assert_eq!(allocator.frees(), vec![(16, Residency::Device)]);
    Ok(())
}

#[test]
fn test_foreign_capsule_is_invalid() {
    let foreign = Capsule::new("numpy.array", vec![0u8; 16]);

    assert!(matches!(unwrap_image(&foreign), Err(Error::InvalidHandle(name)) if name == "numpy.array"));
    assert!(matches!(unwrap_memory(&foreign), Err(Error::InvalidHandle(_))));
    assert!(bridge::type_tag(&foreign).is_err());
}

#[test]
fn test_impostor_capsule_is_invalid() -> Result<(), Box<dyn StdError>> {
    // Right names, but not buffers published by the bridge.
    for name in [IMAGE_CAPSULE, MEMORY_CAPSULE] {
        let impostor = Capsule::new(name, 42u64);
        assert!(matches!(unwrap_image(&impostor), Err(Error::InvalidHandle(_))), "{name}");
        assert!(matches!(unwrap_memory(&impostor), Err(Error::InvalidHandle(_))), "{name}");
        assert!(matches!(bridge::type_tag(&impostor), Err(Error::InvalidHandle(_))), "{name}");
    }

    // A buffer under the other variant's name is not a bridge handle either.
    let buffer = NativeBuffer::alloc(Arc::new(SystemAllocator), 16, Residency::Mapped)?;
    let mislabeled = Capsule::new(IMAGE_CAPSULE, buffer);
    assert!(matches!(unwrap_image(&mislabeled), Err(Error::InvalidHandle(_))));
    assert!(matches!(unwrap_memory(&mislabeled), Err(Error::InvalidHandle(_))));

    Ok(())
}

#[test]
fn test_adopted_buffer() -> Result<(), Box<dyn StdError>> {
    let allocator = Arc::new(RecordingAllocator::default());
    let ptr = allocator.allocate(12, Residency::Mapped)?;
    let shape = Shape::Image {
        width: 2,
        height: 2,
        format: PixelFormat::Rgb8,
    };
    let buffer =
        unsafe { NativeBuffer::from_raw_parts(ptr, 12, Residency::Mapped, shape, allocator.clone()) };

    let handle = bridge::wrap(buffer);
    let image = unwrap_image(&handle)?.expect("image handle");
    assert_eq!(image.ptr, ptr);
    assert_eq!(image.format, PixelFormat::Rgb8);

    drop(handle);
    assert_eq!(allocator.frees(), vec![(12, Residency::Mapped)]);

    Ok(())
}
