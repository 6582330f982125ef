//! Functions to preprocess images.
//!
//! Raw bytes are decoded, forced to RGB, resized with `fast_image_resize` and
//! scaled into `[0, 1]` as a `(1, H, W, 3)` tensor.

use fast_image_resize::{
    images::Image as FirImage,
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::RgbImage;
use ndarray::Array;
use serde::{Deserialize, Serialize};

use crate::common::ImageTensor;
use crate::errors::NormalizeError;

/// Resampling filter used to bring images to the model resolution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Bilinear,
    /// Bicubic convolution.
    #[default] CatmullRom,
    Lanczos3,
}

impl ResizeFilter {
    pub fn resize_alg(&self) -> ResizeAlg {
        match self {
            ResizeFilter::Nearest => ResizeAlg::Nearest,
            ResizeFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ResizeFilter::CatmullRom => ResizeAlg::Convolution(FilterType::CatmullRom),
            ResizeFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
        }
    }
}

/// Main preprocessing entry point.
pub fn normalize(
    image_bytes: &[u8],
    target_size: (u32, u32),
    filter: ResizeFilter,
) -> Result<ImageTensor, NormalizeError> {
    let (target_w, target_h) = target_size;
    if target_w == 0 || target_h == 0 {
        return Err(NormalizeError::format(target_w, target_h, "target size must be non-zero"));
    }

    let rgb = decode_rgb(image_bytes)?;
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(NormalizeError::format(
            target_w,
            target_h,
            format!("source image is {}x{}", rgb.width(), rgb.height()),
        ));
    }

    let src = to_fir_image(rgb, target_w, target_h)?;
    let options = ResizeOptions::new().resize_alg(filter.resize_alg());
    let mut resizer = Resizer::new();
    let resized = resize_image(&src, target_h, target_w, &mut resizer, &options)?;

    nhwc_normalize(&resized)
}

/// Decodes any supported encoding and drops alpha / expands grayscale.
pub fn decode_rgb(image_bytes: &[u8]) -> Result<RgbImage, NormalizeError> {
    let image = image::load_from_memory(image_bytes).map_err(NormalizeError::Decode)?;
    Ok(image.to_rgb8())
}

fn to_fir_image(
    mut image: RgbImage,
    target_w: u32,
    target_h: u32,
) -> Result<FirImage<'static>, NormalizeError> {
    let (width, height) = image.dimensions();
    let buffer = std::mem::take(&mut image).into_raw();

    FirImage::from_vec_u8(width, height, buffer, PixelType::U8x3).map_err(|e| {
        NormalizeError::format_caused_by(target_w, target_h, "failed to wrap RGB buffer", e)
    })
}

fn resize_image(
    img: &FirImage,
    target_h: u32,
    target_w: u32,
    resizer: &mut Resizer,
    options: &ResizeOptions,
) -> Result<FirImage<'static>, NormalizeError> {
    let mut dst = FirImage::new(target_w, target_h, PixelType::U8x3);
    resizer
        .resize(img, &mut dst, options)
        .map_err(|e| NormalizeError::format_caused_by(target_w, target_h, "resize failed", e))?;
    Ok(dst)
}

fn nhwc_normalize(img: &FirImage) -> Result<ImageTensor, NormalizeError> {
    let buf = img.buffer();
    let w = img.width() as usize;
    let h = img.height() as usize;

    if buf.len() != w * h * 3 {
        return Err(NormalizeError::format(
            img.width(),
            img.height(),
            format!("unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3),
        ));
    }

    let float_data: Vec<f32> = buf.iter().map(|&v| v as f32 / 255.0).collect();
    let array = Array::from_shape_vec((1, h, w, 3), float_data)
        .map_err(|e| NormalizeError::format_caused_by(img.width(), img.height(), "bad tensor shape", e))?
        .into_dyn();

    Ok(ImageTensor::from(array))
}
