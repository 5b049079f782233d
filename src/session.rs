// Single-shot capture session: a sequence of pointer events becomes one
// exported raster image.
//
// The session is an explicit three-state machine. Press arms drawing,
// motion connects consecutive points with line segments, release exports
// the canvas and closes the session for good. There is no multi-stroke
// editing: the first release ends the capture.

use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, Luma};

use crate::canvas;
use crate::error::Error;
use crate::types::{Bitmap, INK, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Press,
    Motion,
    Release,
}

#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub pos: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPhase {
    Idle,
    Drawing,
    Closed,
}

pub struct SketchSession {
    bitmap: Bitmap,
    /// Last recorded pointer position; the start of the next segment.
    /// Owned by the session, cleared when it closes.
    last_point: Option<Point>,
    phase: SessionPhase,
    output_path: PathBuf,
}

impl SketchSession {
    pub fn new(width: usize, height: usize, output_path: &Path) -> Self {
        Self {
            bitmap: Bitmap::blank(width, height),
            last_point: None,
            phase: SessionPhase::Idle,
            output_path: output_path.to_path_buf(),
        }
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn is_closed(&self) -> bool {
        self.phase == SessionPhase::Closed
    }

    /// Feed one pointer event into the session.
    ///
    /// Events arriving after the session closed are dropped; the exported
    /// file never changes once release has run.
    pub fn handle(&mut self, event: PointerEvent) -> Result<(), Error> {
        if self.phase == SessionPhase::Closed {
            log::debug!("ignoring {:?} after session close", event.kind);
            return Ok(());
        }

        match event.kind {
            PointerEventKind::Press => self.on_press(event.pos),
            PointerEventKind::Motion => self.on_motion(event.pos),
            PointerEventKind::Release => self.on_release()?,
        }
        Ok(())
    }

    /// Record the stroke origin. Nothing is drawn yet.
    fn on_press(&mut self, pos: Point) {
        self.last_point = Some(pos);
        self.phase = SessionPhase::Drawing;
    }

    /// Connect the previous point to this one. With no previous point the
    /// position is only recorded.
    fn on_motion(&mut self, pos: Point) {
        if let Some(prev) = self.last_point {
            canvas::draw_line(&mut self.bitmap, prev, pos, INK);
        }
        self.last_point = Some(pos);
    }

    /// Export the canvas and close the session. A release with nothing
    /// drawn still exports — a blank capture is valid, not an error.
    fn on_release(&mut self) -> Result<(), Error> {
        self.export()?;
        log::info!("capture written to {}", self.output_path.display());
        self.last_point = None;
        self.phase = SessionPhase::Closed;
        Ok(())
    }

    /// Write the raster as an 8-bit grayscale PNG. The canvas only ever
    /// holds background or ink, so one channel carries the whole image.
    fn export(&self) -> Result<(), Error> {
        let (w, h) = (self.bitmap.width, self.bitmap.height);
        let mut img = GrayImage::new(w as u32, h as u32);
        for (i, &px) in self.bitmap.pixels.iter().enumerate() {
            let x = (i % w) as u32;
            let y = (i / w) as u32;
            img.put_pixel(x, y, Luma([((px >> 16) & 0xFF) as u8]));
        }
        img.save_with_format(&self.output_path, ImageFormat::Png)
            .map_err(|e| {
                Error::Capture(format!("export {}: {e}", self.output_path.display()))
            })
    }
}
