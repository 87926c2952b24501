//! Image-to-image transcoding
//!
//! Decodes with format auto-detection and re-encodes into the target codec,
//! preserving dimensions. AVIF is encode-only: converting *from* a stored
//! AVIF payload surfaces `ConversionFailed` rather than being rejected by
//! policy, since the table allows it.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::{Error, Result};

fn failed(to: &str, reason: impl ToString) -> Error {
    Error::ConversionFailed {
        to: to.to_string(),
        reason: reason.to_string(),
    }
}

fn target_format(mime: &str) -> Option<ImageFormat> {
    match mime {
        "image/png" => Some(ImageFormat::Png),
        "image/jpeg" => Some(ImageFormat::Jpeg),
        "image/webp" => Some(ImageFormat::WebP),
        "image/avif" => Some(ImageFormat::Avif),
        "image/gif" => Some(ImageFormat::Gif),
        _ => None,
    }
}

/// Re-encode raster data into the target image codec.
pub fn transcode(data: &[u8], target: &str) -> Result<Vec<u8>> {
    // The registry only dispatches image targets here; an unknown mime at
    // this point is a transform failure, not a policy decision.
    let format = target_format(target).ok_or_else(|| failed(target, "unknown image target"))?;

    let img = image::load_from_memory(data).map_err(|e| failed(target, e))?;

    // JPEG has no alpha channel; flatten before encoding
    let img = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).map_err(|e| failed(target, e))?;
    Ok(out.into_inner())
}
