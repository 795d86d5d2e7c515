//! Packed 1-bit frame buffer in the SSD1309 paged memory layout.
//!
//! The panel's GDDRAM is organised as 8 pages of 8 rows each. Every byte
//! holds one column of a page, least significant bit on top:
//!
//! ```text
//! index = x + page * WIDTH        page = y / 8        bit = y % 8
//! ```
//!
//! [`Framebuffer`] keeps an exact mirror of that memory so [`flush`] is a
//! straight copy, page by page.
//!
//! [`flush`]: Framebuffer::flush

use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    pixelcolor::BinaryColor,
    prelude::{OriginDimensions, Size},
    Pixel,
};

use crate::command::{page_address, SET_HIGH_COLUMN, SET_LOW_COLUMN};
use crate::interface::BusSink;

/// Display width in pixels.
pub const WIDTH: usize = 128;
/// Display height in pixels.
pub const HEIGHT: usize = 64;
/// Number of 8-row pages.
pub const NUM_PAGES: usize = HEIGHT / 8;
/// Frame buffer length in bytes.
pub const BUFFER_SIZE: usize = WIDTH * NUM_PAGES;

/// In-memory copy of the display RAM.
///
/// Every drawing operation mutates this buffer; nothing reaches the panel
/// until [`flush`](Self::flush). Writes outside the 128×64 frame are
/// silently clipped.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    buffer: [u8; BUFFER_SIZE],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let lit = self.buffer.iter().map(|b| b.count_ones()).sum::<u32>();
        f.debug_struct("Framebuffer")
            .field("lit_pixels", &lit)
            .finish()
    }
}

impl Framebuffer {
    /// A blank (all pixels off) frame buffer.
    pub const fn new() -> Self {
        Self {
            buffer: [0; BUFFER_SIZE],
        }
    }

    /// Byte index and bit mask for `(x, y)`, or `None` when off-frame.
    fn locate(x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        let page = y / 8;
        Some((x + page * WIDTH, 1 << (y % 8)))
    }

    /// Set or clear a single pixel.
    ///
    /// Only the addressed bit changes; the other seven rows sharing the
    /// byte are preserved. Off-frame coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        if let Some((index, bit)) = Self::locate(x, y) {
            match color {
                BinaryColor::On => self.buffer[index] |= bit,
                BinaryColor::Off => self.buffer[index] &= !bit,
            }
        }
    }

    /// `true` if the pixel at `(x, y)` is lit. Off-frame reads are `false`.
    pub fn is_on(&self, x: i32, y: i32) -> bool {
        Self::locate(x, y).is_some_and(|(index, bit)| self.buffer[index] & bit != 0)
    }

    /// Zero the whole buffer. Sends nothing to the panel.
    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    /// Raw page-major buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of lit pixels.
    pub fn lit_count(&self) -> usize {
        self.buffer.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// OR `bits` into the column byte at `page`, `x`. Existing bits stay lit.
    ///
    /// Out-of-range `page` or `x` are ignored.
    pub fn or_page_byte(&mut self, page: usize, x: usize, bits: u8) {
        if page < NUM_PAGES && x < WIDTH {
            self.buffer[x + page * WIDTH] |= bits;
        }
    }

    /// Load a previously captured buffer.
    ///
    /// A slice of the wrong length cannot be a valid frame; the buffer is
    /// re-zeroed instead and the previous content is lost.
    pub fn restore(&mut self, bytes: &[u8]) {
        if bytes.len() == BUFFER_SIZE {
            self.buffer.copy_from_slice(bytes);
        } else {
            #[cfg(feature = "log")]
            log::warn!(
                "frame buffer restore with {} bytes (expected {}); re-zeroing",
                bytes.len(),
                BUFFER_SIZE
            );
            self.clear();
        }
    }

    /// Stream the buffer to the panel.
    ///
    /// For each page: page-select, column low nibble 0, column high nibble 0,
    /// then [`WIDTH`] data bytes. 8 × 131 = 1048 bus writes in total. The
    /// first transport error aborts the flush and is returned.
    pub fn flush<S>(&self, sink: &mut S) -> Result<(), S::Error>
    where
        S: BusSink,
    {
        for (page, row) in self.buffer.chunks_exact(WIDTH).enumerate() {
            sink.send_command(page_address(page as u8))?;
            sink.send_command(SET_LOW_COLUMN)?;
            sink.send_command(SET_HIGH_COLUMN)?;
            for &byte in row {
                sink.send_data(byte)?;
            }
        }
        Ok(())
    }
}

// ── embedded-graphics integration ────────────────────────────────────────

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        self.buffer.fill(fill);
        Ok(())
    }
}
