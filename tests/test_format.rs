// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use edgefirst_imageio::{
    format::{format_of, BaseType, Family, PixelFormat},
    Error,
};
use std::error::Error as StdError;

#[test]
fn test_formats() -> Result<(), Box<dyn StdError>> {
    assert_eq!(PixelFormat::Nv12.byte_size(1920, 1080)?, 3110400);
    assert_eq!(PixelFormat::I420.byte_size(1920, 1080)?, 3110400);
    assert_eq!(PixelFormat::Yuyv.byte_size(1920, 1080)?, 4147200);
    assert_eq!(PixelFormat::Uyvy.byte_size(1920, 1080)?, 4147200);
    assert_eq!(PixelFormat::Rgb8.byte_size(1920, 1080)?, 6220800);
    assert_eq!(PixelFormat::Rgba8.byte_size(1920, 1080)?, 8294400);
    assert_eq!(PixelFormat::Gray8.byte_size(1920, 1080)?, 2073600);
    assert_eq!(PixelFormat::Gray32f.byte_size(1920, 1080)?, 8294400);
    assert_eq!(PixelFormat::Rgb32f.byte_size(1920, 1080)?, 24883200);
    assert_eq!(PixelFormat::Rgba32f.byte_size(1920, 1080)?, 33177600);

    Ok(())
}

#[test]
fn test_odd_dimensions() -> Result<(), Box<dyn StdError>> {
    assert_eq!(PixelFormat::I420.byte_size(3, 3)?, 9 + 2 * 2 * 2);
    assert_eq!(PixelFormat::Nv12.byte_size(1, 1)?, 3);
    assert_eq!(PixelFormat::Yv12.byte_size(5, 2)?, 10 + 2 * 3);
    assert_eq!(PixelFormat::Rgba8.byte_size(4, 2)?, 32);

    Ok(())
}

#[test]
fn test_sizes_are_positive() -> Result<(), Box<dyn StdError>> {
    for format in PixelFormat::ALL {
        for (w, h) in [(1, 1), (1, 7), (3, 3), (640, 480), (1921, 1081)] {
            let size = format.byte_size(w, h)?;
            assert!(size > 0, "{} {}x{}", format, w, h);
            assert_eq!(size, format.byte_size(w, h)?);
        }
    }

    Ok(())
}

#[test]
fn test_invalid_dimensions() {
    for format in PixelFormat::ALL {
        assert!(matches!(
            format.byte_size(0, 1),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            format.byte_size(1, 0),
            Err(Error::InvalidDimensions { .. })
        ));
    }
}

#[test]
fn test_names() {
    for format in PixelFormat::ALL {
        let name = format.name().unwrap();
        assert_eq!(name, name.to_lowercase());
        assert_eq!(PixelFormat::from_name(name), format);
        assert_eq!(name.parse::<PixelFormat>().unwrap(), format);
        assert_eq!(format.to_string(), name);
    }

    assert_eq!(PixelFormat::from_name("yuy2"), PixelFormat::Yuyv);
    assert_eq!(PixelFormat::from_name("YUYV"), PixelFormat::YUY2);
    assert_eq!(PixelFormat::from_name("unknownformat"), PixelFormat::Unknown);
    assert!(matches!(
        "unknownformat".parse::<PixelFormat>(),
        Err(Error::UnknownFormat)
    ));
    assert_eq!(PixelFormat::Unknown.to_string(), "unknown");
}

#[test]
fn test_depths() -> Result<(), Box<dyn StdError>> {
    let depths = [
        (PixelFormat::Rgb8, 24),
        (PixelFormat::Rgb32f, 96),
        (PixelFormat::Rgba8, 32),
        (PixelFormat::Rgba32f, 128),
        (PixelFormat::Yuyv, 16),
        (PixelFormat::Uyvy, 16),
        (PixelFormat::I420, 12),
        (PixelFormat::Yv12, 12),
        (PixelFormat::Nv12, 12),
        (PixelFormat::Gray8, 8),
        (PixelFormat::Gray32f, 32),
    ];
    assert_eq!(depths.len(), PixelFormat::COUNT);
    for (format, depth) in depths {
        assert_eq!(format.depth()?, depth, "{}", format);
    }

    Ok(())
}

#[test]
fn test_layout() -> Result<(), Box<dyn StdError>> {
    assert_eq!(PixelFormat::Rgb32f.family()?, Family::Rgb);
    assert_eq!(PixelFormat::Rgba8.family()?, Family::Rgba);
    assert_eq!(PixelFormat::Uyvy.family()?, Family::Yuv);
    assert_eq!(PixelFormat::Gray32f.family()?, Family::Gray);
    assert_eq!(PixelFormat::Rgb32f.base_type()?, BaseType::F32);
    assert_eq!(PixelFormat::Nv12.base_type()?, BaseType::U8);
    assert_eq!(PixelFormat::Rgb8.channels()?, 3);
    assert_eq!(PixelFormat::Yuyv.channels()?, 2);
    assert_eq!(PixelFormat::I420.channels()?, 1);
    assert!(matches!(PixelFormat::Unknown.family(), Err(Error::UnknownFormat)));

    Ok(())
}

#[test]
fn test_element_types() {
    assert_eq!(format_of::<[u8; 3]>(), PixelFormat::Rgb8);
    assert_eq!(format_of::<[u8; 4]>(), PixelFormat::Rgba8);
    assert_eq!(format_of::<[f32; 3]>(), PixelFormat::Rgb32f);
    assert_eq!(format_of::<[f32; 4]>(), PixelFormat::Rgba32f);
    assert_eq!(format_of::<rgb::Rgb<u8>>(), PixelFormat::Rgb8);
    assert_eq!(format_of::<rgb::Rgba<u8>>(), PixelFormat::Rgba8);
    assert_eq!(format_of::<rgb::Rgb<f32>>(), PixelFormat::Rgb32f);

    const CANONICAL: PixelFormat = format_of::<[f32; 4]>();
    assert_eq!(CANONICAL, PixelFormat::DEFAULT);
}
