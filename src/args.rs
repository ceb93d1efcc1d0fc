// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the EdgeFirst Image I/O tool.
///
/// Loads an image into a host-mapped handle, prints a JSON summary of the
/// handle and optionally saves it back to disk. Arguments can be specified
/// via command line or environment variables.
///
/// # Example
///
/// ```bash
/// # Inspect an image
/// edgefirst-imageio input.png
///
/// # Re-encode as JPEG
/// edgefirst-imageio input.png --output output.jpg --quality 90
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image file to load
    pub input: PathBuf,

    /// Save the loaded image to this path (format chosen by extension)
    #[arg(short, long, env = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Encoder quality (0-100, values outside the range are clamped)
    #[arg(long, env = "QUALITY", default_value = "95", allow_negative_numbers = true)]
    pub quality: i32,

    /// Pixel value mapped to full intensity when saving
    #[arg(long, env = "MAX_PIXEL", default_value = "255.0")]
    pub max_pixel: f32,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
