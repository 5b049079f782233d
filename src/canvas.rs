// Window + software drawing utilities.
// What this provides:
// 1) A window that shows the sketch canvas while you draw on it.
// 2) A poll loop that turns minifb mouse state into Press/Motion/Release
//    pointer events for the capture session.
// 3) Bresenham line drawing into the raster the window displays.

use crate::error::Error;
use crate::session::{PointerEvent, PointerEventKind, SketchSession};
use crate::types::{Bitmap, Point};
use minifb::{Key, MouseButton, MouseMode, Window, WindowOptions};

pub struct SketchWindow {
    window: Window, // the on-screen window you draw in
}

impl SketchWindow {
    /// Create a window sized to the sketch canvas.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::Capture(format!("window init: {e}")))?;
        Ok(Self { window })
    }

    /// Drive the session until the drawing is released.
    ///
    /// Pointer events are derived from button-state edges between polls:
    /// up→down is a press, held is motion, down→up is the release. All of
    /// it runs on this one thread; callbacks never overlap.
    ///
    /// Closing the window (or ESC) before releasing a stroke is an error —
    /// the caller must never see a half-finished raster on disk.
    pub fn run(&mut self, session: &mut SketchSession) -> Result<(), Error> {
        let mut was_down = false;
        let mut last_pos = Point::new(0, 0);

        while self.window.is_open() && !self.window.is_key_down(Key::Escape) {
            if let Some((x, y)) = self.mouse_pos() {
                last_pos = Point::new(x as i32, y as i32);
            }

            let down = self.window.get_mouse_down(MouseButton::Left);
            let kind = match (was_down, down) {
                (false, true) => Some(PointerEventKind::Press),
                (true, true) => Some(PointerEventKind::Motion),
                (true, false) => Some(PointerEventKind::Release),
                (false, false) => None,
            };
            was_down = down;

            if let Some(kind) = kind {
                session.handle(PointerEvent {
                    kind,
                    pos: last_pos,
                })?;
            }

            // Release export happened inside `handle`; hand control back.
            if session.is_closed() {
                return Ok(());
            }

            self.present(session.bitmap())?;
        }

        Err(Error::Capture(
            "window closed before the drawing was released".into(),
        ))
    }

    /// Push the canvas pixels to the screen.
    fn present(&mut self, bitmap: &Bitmap) -> Result<(), Error> {
        self.window
            .update_with_buffer(&bitmap.pixels, bitmap.width, bitmap.height)
            .map_err(|e| Error::Capture(format!("window update: {e}")))?;
        Ok(())
    }

    /// Current mouse position in window pixel coordinates (clamped to the
    /// window).
    fn mouse_pos(&self) -> Option<(usize, usize)> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x.max(0.0) as usize, y.max(0.0) as usize))
    }
}

/* ---------- Software drawing: pixels and stroke segments ---------- */

/// Put a pixel on the bitmap if (x,y) is inside bounds.
#[inline]
fn put_pixel(bitmap: &mut Bitmap, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= bitmap.width || y >= bitmap.height {
        return;
    }
    let idx = y * bitmap.width + x;
    bitmap.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
/// A zero-length segment still marks its single pixel.
pub fn draw_line(bitmap: &mut Bitmap, from: Point, to: Point, color: u32) {
    let (mut x0, mut y0, x1, y1) = (from.x, from.y, to.x, to.y);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(bitmap, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
