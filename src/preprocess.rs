// Deterministic transform from the captured raster to the tensor the
// classifier was trained on. Step order is fixed: invert, grayscale,
// resize, scale to 0..1, foreground boost, statistical normalization.
// Reordering any of it changes the numeric regime the model expects.

use std::path::Path;

use image::{DynamicImage, imageops::FilterType};
use ndarray::Array3;

use crate::error::Error;

/// Side length of the classifier input. Fixed at training time.
pub const INPUT_SIDE: usize = 28;

/// Training-set normalization statistics. These must match the constants
/// the checkpoint was trained with, digit for digit.
pub const MNIST_MEAN: f32 = 0.1307;
pub const MNIST_STD: f32 = 0.3081;

/// Read the exported raster back from disk.
///
/// This is the single-reader half of the file handoff: the capture session
/// has already terminated by the time this runs, so a missing or
/// undecodable file is final, not transient.
pub fn load_raster(path: &Path) -> Result<DynamicImage, Error> {
    image::open(path).map_err(|e| Error::ImageLoad(format!("{}: {e}", path.display())))
}

/// Run the full pipeline against the raster at `path`.
pub fn preprocess_file(path: &Path, boost: f32) -> Result<Array3<f32>, Error> {
    let raster = load_raster(path)?;
    preprocess(&raster, boost)
}

/// Map a raster image into the normalized (1, 28, 28) tensor.
pub fn preprocess(raster: &DynamicImage, boost: f32) -> Result<Array3<f32>, Error> {
    // Strokes are captured dark-on-light; the training set is bright
    // digits on a dark background.
    let mut inverted = raster.clone();
    inverted.invert();

    let gray = inverted.to_luma8();

    // Anti-aliased downsample to the fixed input resolution.
    let resized = image::imageops::resize(
        &gray,
        INPUT_SIDE as u32,
        INPUT_SIDE as u32,
        FilterType::Lanczos3,
    );
    let (rw, rh) = resized.dimensions();
    if (rw as usize, rh as usize) != (INPUT_SIDE, INPUT_SIDE) {
        return Err(Error::Shape {
            expected: (1, INPUT_SIDE, INPUT_SIDE),
            actual: (1, rh as usize, rw as usize),
        });
    }

    let mut tensor = Array3::from_shape_fn((1, INPUT_SIDE, INPUT_SIDE), |(_, y, x)| {
        resized.get_pixel(x as u32, y as u32).0[0] as f32 / 255.0
    });

    boost_foreground(&mut tensor, boost);
    normalize(&mut tensor);

    let dim = tensor.dim();
    if dim != (1, INPUT_SIDE, INPUT_SIDE) {
        return Err(Error::Shape {
            expected: (1, INPUT_SIDE, INPUT_SIDE),
            actual: dim,
        });
    }
    Ok(tensor)
}

/// Push strictly positive elements further from the zero background.
/// Compensates for the softening the anti-aliased resize applies to
/// freehand strokes; background zeros are untouched.
pub fn boost_foreground(tensor: &mut Array3<f32>, boost: f32) {
    tensor.mapv_inplace(|v| if v > 0.0 { v + boost } else { v });
}

/// The fixed affine transform `(x - mean) / std` from training.
pub fn normalize(tensor: &mut Array3<f32>) {
    tensor.mapv_inplace(|v| (v - MNIST_MEAN) / MNIST_STD);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{PointerEvent, PointerEventKind, SketchSession};
    use crate::types::Point;
    use image::GrayImage;

    /// Value every element of a blank capture normalizes to.
    fn blank_baseline() -> f32 {
        (0.0 - MNIST_MEAN) / MNIST_STD
    }

    fn white_raster(side: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(side, side, image::Luma([255])))
    }

    #[test]
    fn blank_raster_is_all_baseline() {
        let tensor = preprocess(&white_raster(200), 0.45).unwrap();
        assert_eq!(tensor.dim(), (1, INPUT_SIDE, INPUT_SIDE));
        for &v in tensor.iter() {
            // No positive pixels exist, so the boost is a no-op and every
            // element lands exactly on the affine-transformed zero.
            assert_eq!(v, blank_baseline());
        }
    }

    #[test]
    fn boost_touches_only_positive_elements() {
        let mut tensor = Array3::zeros((1, INPUT_SIDE, INPUT_SIDE));
        tensor[[0, 5, 5]] = 1.0;
        tensor[[0, 6, 6]] = 0.25;
        boost_foreground(&mut tensor, 0.45);
        assert_eq!(tensor[[0, 5, 5]], 1.0 + 0.45);
        assert_eq!(tensor[[0, 6, 6]], 0.25 + 0.45);
        assert_eq!(tensor[[0, 0, 0]], 0.0);
    }

    #[test]
    fn normalize_is_the_fixed_affine_transform() {
        let mut tensor = Array3::zeros((1, INPUT_SIDE, INPUT_SIDE));
        tensor[[0, 3, 4]] = 1.45;
        normalize(&mut tensor);
        assert_eq!(tensor[[0, 3, 4]], (1.45 - MNIST_MEAN) / MNIST_STD);
        assert_eq!(tensor[[0, 0, 0]], blank_baseline());
    }

    #[test]
    fn resize_is_deterministic() {
        let gray = GrayImage::from_fn(200, 200, |x, y| image::Luma([((x * 7 + y * 3) % 256) as u8]));
        let a = image::imageops::resize(&gray, 28, 28, FilterType::Lanczos3);
        let b = image::imageops::resize(&gray, 28, 28, FilterType::Lanczos3);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn missing_file_is_an_image_load_error() {
        let path = std::env::temp_dir().join("digit-sketch-definitely-missing.png");
        match preprocess_file(&path, 0.45) {
            Err(Error::ImageLoad(_)) => {}
            other => panic!("expected ImageLoad error, got {other:?}"),
        }
    }

    #[test]
    fn diagonal_stroke_end_to_end() {
        // Draw one diagonal stroke on a 200x200 canvas, release, and run
        // the whole pipeline over the exported file.
        let path = std::env::temp_dir()
            .join(format!("digit-sketch-e2e-{}.png", std::process::id()));
        let mut session = SketchSession::new(200, 200, &path);
        session
            .handle(PointerEvent {
                kind: PointerEventKind::Press,
                pos: Point::new(20, 20),
            })
            .unwrap();
        session
            .handle(PointerEvent {
                kind: PointerEventKind::Motion,
                pos: Point::new(180, 180),
            })
            .unwrap();
        session
            .handle(PointerEvent {
                kind: PointerEventKind::Release,
                pos: Point::new(180, 180),
            })
            .unwrap();

        let tensor = preprocess_file(&path, 0.45).unwrap();
        assert_eq!(tensor.dim(), (1, INPUT_SIDE, INPUT_SIDE));
        assert!(tensor.iter().all(|v| v.is_finite()));
        let max = tensor.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(max > blank_baseline());
        std::fs::remove_file(&path).unwrap();
    }
}
