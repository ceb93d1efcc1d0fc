// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Native buffers and the allocator that owns their memory.

use crate::{
    error::{Error, Result},
    format::PixelFormat,
};
use core::fmt;
use std::{
    io,
    ptr::NonNull,
    slice::{from_raw_parts, from_raw_parts_mut},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tracing::{debug, error};

/// Where a buffer lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Residency {
    /// Device memory, not addressable from the host.
    Device,
    /// Host memory mapped into the device address space, visible to both.
    Mapped,
}

impl fmt::Display for Residency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Residency::Device => f.write_str("device"),
            Residency::Mapped => f.write_str("mapped"),
        }
    }
}

/// Native memory allocator.
///
/// Implementations wrap the driver's residency-aware allocation primitives.
/// The allocator that produced a pointer is the one that frees it.
pub trait Allocator: Send + Sync + fmt::Debug {
    /// Allocates `size` zeroed bytes with the requested residency.
    fn allocate(&self, size: usize, residency: Residency) -> io::Result<NonNull<u8>>;

    /// Frees memory previously returned by [`Allocator::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator with the same `size`
    /// and `residency`, and must not be used after this call.
    unsafe fn free(&self, ptr: NonNull<u8>, size: usize, residency: Residency) -> io::Result<()>;
}

static OUTSTANDING: AtomicUsize = AtomicUsize::new(0);

/// Software allocator backed by the C heap.
///
/// Used on hosts without a GPU: both residencies are served from host
/// memory, so device-only buffers are emulated rather than truly remote.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Number of allocations made by any `SystemAllocator` and not yet freed.
    pub fn outstanding() -> usize {
        OUTSTANDING.load(Ordering::SeqCst)
    }
}

impl Allocator for SystemAllocator {
    fn allocate(&self, size: usize, _residency: Residency) -> io::Result<NonNull<u8>> {
        if size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "zero sized allocation",
            ));
        }
        let ptr = unsafe { libc::calloc(size, 1) } as *mut u8;
        let ptr = NonNull::new(ptr).ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))?;
        OUTSTANDING.fetch_add(1, Ordering::SeqCst);
        Ok(ptr)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, _size: usize, _residency: Residency) -> io::Result<()> {
        libc::free(ptr.as_ptr().cast());
        OUTSTANDING.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Shape of the data held by a [`NativeBuffer`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Untyped block of bytes.
    Memory,
    /// Image with known dimensions and pixel format.
    Image {
        width: u32,
        height: u32,
        format: PixelFormat,
    },
}

/// Natively allocated buffer with a single owner.
///
/// The memory is freed through its allocator exactly once, when the buffer
/// is dropped. Publishing a buffer through the bridge moves it into a
/// capsule, so ownership can never be shared.
pub struct NativeBuffer {
    ptr: NonNull<u8>,
    len: usize,
    residency: Residency,
    shape: Shape,
    allocator: Arc<dyn Allocator>,
}

// SAFETY: the buffer exclusively owns its allocation and only hands out
// borrows tied to its own lifetime, so it can move between threads and be
// read concurrently like a `Box<[u8]>`.
unsafe impl Send for NativeBuffer {}
unsafe impl Sync for NativeBuffer {}

impl NativeBuffer {
    /// Allocates an untyped block of `len` bytes.
    pub fn alloc(allocator: Arc<dyn Allocator>, len: usize, residency: Residency) -> Result<Self> {
        let ptr = allocator
            .allocate(len, residency)
            .map_err(|source| Error::Alloc {
                size: len,
                residency,
                source,
            })?;
        debug!("allocated {} bytes of {} memory", len, residency);
        Ok(Self {
            ptr,
            len,
            residency,
            shape: Shape::Memory,
            allocator,
        })
    }

    /// Allocates an image buffer sized for `format` at `width`x`height`.
    ///
    /// # Errors
    ///
    /// Returns an error if the format or dimensions are invalid, or if the
    /// allocator fails.
    pub fn alloc_image(
        allocator: Arc<dyn Allocator>,
        width: u32,
        height: u32,
        format: PixelFormat,
        residency: Residency,
    ) -> Result<Self> {
        let len = format.byte_size(width, height)?;
        let mut buffer = Self::alloc(allocator, len, residency)?;
        buffer.shape = Shape::Image {
            width,
            height,
            format,
        };
        Ok(buffer)
    }

    /// Takes ownership of memory allocated elsewhere.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocator` for `len` bytes with the
    /// given residency, nobody else may free it, and for images `len` must
    /// cover the image's byte size.
    pub unsafe fn from_raw_parts(
        ptr: NonNull<u8>,
        len: usize,
        residency: Residency,
        shape: Shape,
        allocator: Arc<dyn Allocator>,
    ) -> Self {
        Self {
            ptr,
            len,
            residency,
            shape,
            allocator,
        }
    }

    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn residency(&self) -> Residency {
        self.residency
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Host view of the buffer. `None` for device-only memory.
    pub fn host_bytes(&self) -> Option<&[u8]> {
        match self.residency {
            Residency::Mapped => Some(unsafe { from_raw_parts(self.ptr.as_ptr(), self.len) }),
            Residency::Device => None,
        }
    }

    /// Mutable host view of the buffer. `None` for device-only memory.
    pub fn host_bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self.residency {
            Residency::Mapped => {
                Some(unsafe { from_raw_parts_mut(self.ptr.as_ptr(), self.len) })
            }
            Residency::Device => None,
        }
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        if let Err(err) = unsafe { self.allocator.free(self.ptr, self.len, self.residency) } {
            // A failed free leaves the driver in an unknown state.
            error!(
                "failed to free {} bytes of {} memory at {:p}: {}",
                self.len, self.residency, self.ptr, err
            );
            std::process::abort();
        }
        debug!("freed {} bytes of {} memory", self.len, self.residency);
    }
}

impl fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("residency", &self.residency)
            .field("shape", &self.shape)
            .finish()
    }
}

impl fmt::Display for NativeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.shape {
            Shape::Memory => write!(f, "{} bytes {} {:p}", self.len, self.residency, self.ptr),
            Shape::Image {
                width,
                height,
                format,
            } => write!(
                f,
                "{}x{} {} {} {:p}",
                width, height, format, self.residency, self.ptr
            ),
        }
    }
}
