// Draw a digit, get a prediction:
// • A small canvas window opens; hold the left mouse button to draw.
// • Releasing the button exports the drawing and closes the window.
// • The exported image is normalized to the training distribution and fed
//   to the classifier loaded from the configured checkpoint.

use std::env;

mod canvas;
mod classifier;
mod config;
mod error;
mod preprocess;
mod session;
mod types;

use canvas::SketchWindow;
use classifier::{Classifier, LinearClassifier};
use config::Config;
use error::Error;
use session::SketchSession;

fn main() -> Result<(), Error> {
    env_logger::builder()
        .filter_module(env!("CARGO_CRATE_NAME"), log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    /* --- Configuration ---
       One optional argument: a TOML config path. No argument runs with
       the defaults (200x200 canvas, ./number.png, ./models/digits.bin). */
    let config = match &*env::args().skip(1).collect::<Vec<_>>() {
        [] => Config::default(),
        [path] => Config::load(path)?,
        _ => {
            return Err(Error::Config(format!(
                "usage: {} [config.toml]",
                env!("CARGO_PKG_NAME")
            )));
        }
    };

    /* --- Classifier checkpoint ---
       Loaded before the window opens so a missing model fails fast
       instead of throwing away a finished drawing. */
    let model = LinearClassifier::load(&config.model_path)?;

    /* --- Capture ---
       Blocks until the stroke is released; the session has exported the
       raster by the time `run` returns. */
    let mut session = SketchSession::new(
        config.canvas_width,
        config.canvas_height,
        &config.output_path,
    );
    let mut window = SketchWindow::new(
        "digit-sketch — draw a digit",
        config.canvas_width,
        config.canvas_height,
    )?;
    window.run(&mut session)?;

    /* --- Preprocess + predict --- */
    let tensor = preprocess::preprocess_file(&config.output_path, config.boost)?;
    let label = model.predict(&tensor)?;

    println!("You drew: {label}");
    Ok(())
}
