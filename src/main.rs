// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use args::Args;
use clap::Parser;
use edgefirst_imageio::{
    bridge,
    io::{ImageIo, SaveOptions},
};
use serde_json::json;
use std::{error::Error, time::Instant};
use tracing::{info, Level};

mod args;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    let imageio = ImageIo::default();

    let now = Instant::now();
    let (handle, width, height) = imageio.load_image(&args.input)?;
    let load_time = now.elapsed();

    let image = bridge::unwrap_image(&handle)?
        .ok_or_else(|| format!("{} did not load as an image", args.input.display()))?;
    let summary = json!({
        "path": args.input.display().to_string(),
        "width": width,
        "height": height,
        "format": image.format.to_string(),
        "bytes": image.len(),
        "residency": image.residency.to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    info!("loaded {} in {:?}", args.input.display(), load_time);

    if let Some(output) = &args.output {
        let options = SaveOptions::default()
            .with_quality(args.quality)
            .with_max_pixel(args.max_pixel);

        let now = Instant::now();
        imageio.save_from_handle(output, &handle, &options)?;
        info!("saved {} in {:?}", output.display(), now.elapsed());
    }

    Ok(())
}
