// One error type for the whole pipeline.
// Every variant states *where* things went wrong.
use std::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    Capture(String),   // Creating, updating, or tearing down the sketch window failed
    ImageLoad(String), // Reading/decoding the exported raster failed
    Model(String),     // Loading the classifier checkpoint failed
    Config(String),    // Reading or validating the config file failed
    // A tensor deviated from the fixed classifier contract. Invariant
    // violation, not a recoverable condition.
    Shape {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },
}

impl Display for Error {
    // This decides how the error is printed to your console.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Capture(s) => write!(f, "Capture error: {s}"),
            Error::ImageLoad(s) => write!(f, "Image load error: {s}"),
            Error::Model(s) => write!(f, "Model error: {s}"),
            Error::Config(s) => write!(f, "Config error: {s}"),
            Error::Shape { expected, actual } => write!(
                f,
                "Shape error: expected {}x{}x{}, got {}x{}x{}",
                expected.0, expected.1, expected.2, actual.0, actual.1, actual.2
            ),
        }
    }
}

impl std::error::Error for Error {}
