use image::imageops::{self, FilterType};
use image::DynamicImage;

use super::Error;
use crate::*;

/// Decodes the image at `path` as 8-bit grayscale.
pub fn read_gray(path: &Path) -> Result<GrayImage, Error> {
    Ok(image::open(path)?.to_luma8())
}

/// Grayscale conversion followed by a forced resize to `size` (width, height).
pub fn to_canonical(image: &DynamicImage, size: Option<(u32, u32)>) -> Result<GrayImage, Error> {
    fit(image.to_luma8(), size)
}

/// Resizes `gray` to `size` unless it already matches. `None` keeps the image as is.
pub fn fit(gray: GrayImage, size: Option<(u32, u32)>) -> Result<GrayImage, Error> {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage);
    }
    match size {
        Some((w, h)) if (w, h) != (width, height) => {
            log::debug!("resizing {width}x{height} image to {w}x{h}");
            Ok(imageops::resize(&gray, w, h, FilterType::Triangle))
        }
        _ => Ok(gray),
    }
}

/// Row-major intensity vector of a grayscale image.
pub fn vectorize(gray: &GrayImage) -> Array1<f64> {
    gray.as_raw().iter().map(|&p| p as f64).collect()
}

/// Inverse of [`vectorize`]. Values are clamped to [0, 255] and truncated.
pub fn to_gray_image(vector: ArrayView1<f64>, width: u32, height: u32) -> Option<GrayImage> {
    let raw = vector
        .iter()
        .map(|&v| v.clamp(0.0, 255.0) as u8)
        .collect::<Vec<u8>>();
    GrayImage::from_raw(width, height, raw)
}

/// Places equally sized images side by side.
pub fn hconcat(images: &[GrayImage]) -> Option<GrayImage> {
    let (width, height) = images.first()?.dimensions();
    let mut out = GrayImage::new(width * images.len() as u32, height);
    for (index, image) in images.iter().enumerate() {
        if image.dimensions() != (width, height) {
            return None;
        }
        imageops::replace(&mut out, image, (index as u32 * width) as i64, 0);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, RgbImage};

    #[test]
    fn vectorize_is_row_major() {
        let gray = GrayImage::from_raw(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let v = vectorize(&gray);
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let back = to_gray_image(v.view(), 3, 2).unwrap();
        assert_eq!(back, gray);
    }

    #[test]
    fn canonical_forces_size_and_gray() {
        let rgb = RgbImage::from_pixel(8, 6, image::Rgb([90, 90, 90]));
        let gray = to_canonical(&DynamicImage::ImageRgb8(rgb), Some((4, 3))).unwrap();
        assert_eq!(gray.dimensions(), (4, 3));
        assert!(gray.pixels().all(|&Luma([p])| (89..=90).contains(&p)));
    }

    #[test]
    fn empty_image_is_rejected() {
        let gray = GrayImage::new(0, 0);
        assert!(matches!(fit(gray, None), Err(Error::EmptyImage)));
    }

    #[test]
    fn hconcat_rejects_mismatched_sizes() {
        let a = GrayImage::new(2, 2);
        let b = GrayImage::new(3, 2);
        assert!(hconcat(&[a.clone(), b]).is_none());
        assert_eq!(hconcat(&[a.clone(), a]).unwrap().dimensions(), (4, 2));
    }
}
