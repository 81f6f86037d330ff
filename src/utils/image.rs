//! Slice and stack image helpers.
//!
//! Covers the boundary between array-shaped stacks and the 3-channel
//! 8-bit images the mask generator consumes, plus reading raw stacks from
//! storage.

use crate::core::errors::{SegError, SegResult};
use crate::processors::normalization::normalize;
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::{Array2, Array3, ArrayD, ArrayViewD, Ix2, Ix3};
use std::path::Path;

/// Heuristic channel-axis disambiguation.
///
/// A trailing axis of exactly 3 entries on an array that is otherwise at
/// least 2D is treated as a color channel axis, not as a 3-slice stack
/// dimension.
pub fn guess_rgb(shape: &[usize]) -> bool {
    shape.len() > 2 && shape[shape.len() - 1] == 3
}

fn to_u8(x: f32) -> u8 {
    x.clamp(0.0, 255.0) as u8
}

/// Converts one slice into the 3-channel 8-bit image the generator
/// consumes, rescaling intensities from `source` into `target` first.
///
/// Grayscale slices (2D) are broadcast across all three channels; colored
/// slices (2D with a 3-entry channel axis) are rescaled per pixel. Passing
/// `source == target` makes the rescale the identity, which is how the
/// single-slice 2D path skips normalization.
pub fn slice_to_rgb(
    slice: ArrayViewD<'_, f32>,
    source: (f32, f32),
    target: (f32, f32),
) -> SegResult<RgbImage> {
    if slice.ndim() == 2 {
        let gray = slice
            .into_dimensionality::<Ix2>()
            .map_err(|e| SegError::invalid_input(e.to_string()))?;
        let scaled = normalize(gray, source, target);
        let (h, w) = scaled.dim();
        Ok(RgbImage::from_fn(w as u32, h as u32, |x, y| {
            let v = to_u8(scaled[[y as usize, x as usize]]);
            Rgb([v, v, v])
        }))
    } else if guess_rgb(slice.shape()) && slice.ndim() == 3 {
        let color = slice
            .into_dimensionality::<Ix3>()
            .map_err(|e| SegError::invalid_input(e.to_string()))?;
        let scaled = normalize(color, source, target);
        let (h, w, _) = scaled.dim();
        Ok(RgbImage::from_fn(w as u32, h as u32, |x, y| {
            Rgb([
                to_u8(scaled[[y as usize, x as usize, 0]]),
                to_u8(scaled[[y as usize, x as usize, 1]]),
                to_u8(scaled[[y as usize, x as usize, 2]]),
            ])
        }))
    } else {
        Err(SegError::invalid_input(format!(
            "expected a grayscale or 3-channel 2D slice, got shape {:?}",
            slice.shape()
        )))
    }
}

/// Reads a raw image stack from a caller-supplied path.
///
/// `.npy` files are read directly (u8 and u16 payloads are widened to
/// f32); anything else goes through the `image` crate, yielding an
/// `(h, w)` grayscale or `(h, w, 3)` color array.
pub fn read_stack(path: &Path) -> SegResult<ArrayD<f32>> {
    if path.extension().and_then(|e| e.to_str()) == Some("npy") {
        return read_npy_stack(path);
    }

    let img = image::open(path)?;
    Ok(match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => {
            let gray = img.to_luma32f();
            let (w, h) = gray.dimensions();
            Array2::from_shape_fn((h as usize, w as usize), |(y, x)| {
                gray.get_pixel(x as u32, y as u32)[0] * 255.0
            })
            .into_dyn()
        }
        _ => {
            let rgb = img.to_rgb8();
            let (w, h) = rgb.dimensions();
            Array3::from_shape_fn((h as usize, w as usize, 3), |(y, x, c)| {
                f32::from(rgb.get_pixel(x as u32, y as u32)[c])
            })
            .into_dyn()
        }
    })
}

fn read_npy_stack(path: &Path) -> SegResult<ArrayD<f32>> {
    let first_err = match ndarray_npy::read_npy::<_, ArrayD<f32>>(path) {
        Ok(arr) => return Ok(arr),
        Err(e) => e,
    };
    if let Ok(arr) = ndarray_npy::read_npy::<_, ArrayD<u8>>(path) {
        return Ok(arr.mapv(f32::from));
    }
    if let Ok(arr) = ndarray_npy::read_npy::<_, ArrayD<u16>>(path) {
        return Ok(arr.mapv(f32::from));
    }
    Err(SegError::stack_read(path, first_err))
}
