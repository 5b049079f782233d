// The seam the trained model plugs into, plus a linear checkpoint backend.
//
// Checkpoint layout: flat little-endian f32, 10x784 weights row-major
// followed by 10 biases (31,400 bytes total). Anything else is rejected
// up front.

use std::{fs, path::Path};

use ndarray::{Array1, Array2, Array3};

use crate::error::Error;
use crate::preprocess::INPUT_SIDE;

/// Digit classes 0..9.
pub const NUM_CLASSES: usize = 10;

const INPUT_LEN: usize = INPUT_SIDE * INPUT_SIDE;

/// Maps a normalized (1, 28, 28) tensor to a digit label.
pub trait Classifier {
    fn predict(&self, input: &Array3<f32>) -> Result<u8, Error>;
}

pub struct LinearClassifier {
    weights: Array2<f32>, // (NUM_CLASSES, INPUT_LEN)
    bias: Array1<f32>,    // (NUM_CLASSES)
}

impl LinearClassifier {
    /// Load a checkpoint from disk. The file must hold exactly the weight
    /// matrix and bias vector, nothing more.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let bytes = fs::read(path)
            .map_err(|e| Error::Model(format!("read {}: {e}", path.display())))?;

        let expected = (NUM_CLASSES * INPUT_LEN + NUM_CLASSES) * size_of::<f32>();
        if bytes.len() != expected {
            return Err(Error::Model(format!(
                "checkpoint {} is {} bytes, expected {expected}",
                path.display(),
                bytes.len()
            )));
        }

        let values: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let (w, b) = values.split_at(NUM_CLASSES * INPUT_LEN);

        let weights = Array2::from_shape_vec((NUM_CLASSES, INPUT_LEN), w.to_vec())
            .map_err(|e| Error::Model(format!("weight matrix: {e}")))?;
        let bias = Array1::from_vec(b.to_vec());
        log::debug!("loaded checkpoint from {}", path.display());
        Self::from_parts(weights, bias)
    }

    pub fn from_parts(weights: Array2<f32>, bias: Array1<f32>) -> Result<Self, Error> {
        if weights.dim() != (NUM_CLASSES, INPUT_LEN) || bias.len() != NUM_CLASSES {
            return Err(Error::Model(format!(
                "parameter dimensions {:?}/{} do not match {NUM_CLASSES}x{INPUT_LEN}+{NUM_CLASSES}",
                weights.dim(),
                bias.len()
            )));
        }
        Ok(Self { weights, bias })
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, input: &Array3<f32>) -> Result<u8, Error> {
        let dim = input.dim();
        if dim != (1, INPUT_SIDE, INPUT_SIDE) {
            return Err(Error::Shape {
                expected: (1, INPUT_SIDE, INPUT_SIDE),
                actual: dim,
            });
        }

        let flat = Array1::from_iter(input.iter().cloned());
        let scores = self.weights.dot(&flat) + &self.bias;

        let mut best = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for (i, &s) in scores.iter().enumerate() {
            if s > best_score {
                best = i;
                best_score = s;
            }
        }
        Ok(best as u8)
    }
}
