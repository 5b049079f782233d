// TOML configuration: canvas geometry, file handoff paths, and the one
// calibration knob (foreground boost).

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::Error;
use crate::preprocess::INPUT_SIDE;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Sketch canvas width in pixels.
    pub canvas_width: usize,
    /// Sketch canvas height in pixels.
    pub canvas_height: usize,
    /// Where the captured raster is written, and where the preprocessor
    /// reads it back from.
    pub output_path: PathBuf,
    /// Path of the persisted classifier checkpoint.
    pub model_path: PathBuf,
    /// Offset added to every strictly positive tensor element after the
    /// resize. Calibrated against this renderer's anti-aliasing; re-derive
    /// it if the drawing backend changes.
    pub boost: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_width: 200,
            canvas_height: 200,
            output_path: PathBuf::from("number.png"),
            model_path: PathBuf::from("models/digits.bin"),
            boost: 0.45,
        }
    }
}

impl Config {
    pub fn load<A: AsRef<Path>>(path: A) -> Result<Self, Error> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| Error::Config(format!("parse: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// The canvas must at least cover the classifier's input resolution,
    /// otherwise the resize step upsamples noise.
    pub fn validate(&self) -> Result<(), Error> {
        if self.canvas_width < INPUT_SIDE || self.canvas_height < INPUT_SIDE {
            return Err(Error::Config(format!(
                "canvas must be at least {INPUT_SIDE}x{INPUT_SIDE} (got {}x{})",
                self.canvas_width, self.canvas_height
            )));
        }
        if !self.boost.is_finite() || self.boost < 0.0 {
            return Err(Error::Config(format!(
                "boost must be a non-negative number (got {})",
                self.boost
            )));
        }
        Ok(())
    }
}
