// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # EdgeFirst Image I/O Library
//!
//! This library moves images between disk, natively allocated GPU or
//! host-mapped memory, and a garbage collected host runtime. It provides the
//! pixel format model used to size and validate buffers, and the ownership
//! bridge that lets the host runtime hold natively allocated buffers without
//! leaking or double-freeing them.
//!
//! ## Features
//!
//! - **Pixel Formats**: A closed set of RGB, RGBA, YUV and grayscale formats
//!   with names, bit depths and byte sizes.
//! - **Ownership Bridge**: Publish a [`memory::NativeBuffer`] as a
//!   reference-counted [`capsule::Capsule`]; the buffer is freed exactly once
//!   when the last reference goes away.
//! - **Image I/O**: Load files as canonical RGBA float handles and save image
//!   or raw memory handles back to disk.
//!
//! ## Example
//!
//! ```no_run
//! use edgefirst_imageio::{
//!     bridge,
//!     format::PixelFormat,
//!     io::{load_image, save_image, SaveOptions},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (handle, width, height) = load_image("input.png")?;
//! let image = bridge::unwrap_image(&handle)?.expect("image handle");
//! assert_eq!(image.format, PixelFormat::Rgba32f);
//! println!("loaded {}x{}", width, height);
//!
//! save_image("output.jpg", &handle, &SaveOptions::default().with_quality(90))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety
//!
//! Native buffers are raw allocations. All unsafe code is confined to the
//! [`memory`] module, which only exposes borrows tied to the owning buffer.

pub mod bridge;
pub mod capsule;
pub mod codec;
pub mod error;
pub mod format;
pub mod io;
pub mod memory;

pub use error::{Error, Result};
