// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::memory::Residency;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors reported by the image bridge.
///
/// Nothing is retried internally: a failure is either a violated
/// precondition or a codec/device failure the caller must decide about.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown pixel format")]
    UnknownFormat,

    #[error("image dimensions {width}x{height} are invalid")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("object `{0}` is not an image or memory handle")]
    InvalidHandle(String),

    #[error("failed to allocate {size} bytes of {residency} memory: {source}")]
    Alloc {
        size: usize,
        residency: Residency,
        #[source]
        source: io::Error,
    },

    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("failed to encode {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
