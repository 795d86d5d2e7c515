//! Frame buffer driver for the SSD1309 (128×64) monochrome OLED.
//!
//! This crate keeps a packed, page-major copy of the panel's display RAM
//! and draws into it: pixels, filled boxes and disks, thick lines, alpha
//! stencilled images and word-wrapped text. [`Ssd1309`] wraps the buffer
//! together with the transport and reset line and streams the whole frame
//! to the controller on [`flush`](Ssd1309::flush).
//!
//! # Quick Start
//!
//! ```ignore
//! use display_interface_spi::SPIInterface;
//! use embedded_graphics::pixelcolor::BinaryColor;
//! use ssd1309_display_rs::{Ssd1309, TextStyle};
//!
//! let mut oled = Ssd1309::new(SPIInterface::new(spi, dc), reset);
//! oled.reset(&mut delay)?;
//! oled.init()?;
//!
//! oled.draw_box(0, 0, 127, 9, BinaryColor::On);
//! let style = TextStyle::new("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", 12)
//!     .with_wrap_width(128);
//! let height = oled.draw_text("Hello from the Pi", 0, 12, &style, false)?;
//! oled.flush()?;
//! ```
//!
//! # Modules
//!
//! - [`framebuffer`]: buffer layout, pixel access, flush.
//! - [`raster`]: boxes, disks and lines.
//! - [`compositor`]: image decoding and alpha stencilling.
//! - [`text`] / [`font`]: word wrap and glyph rendering.
//! - [`interface`]: the [`BusSink`] transport contract.
//! - [`command`]: SSD1309 command bytes.
//!
//! # Crate Features
//!
//! - **`log`** *(default)*: debug logging through the [`log`] facade.

pub mod command;
pub mod compositor;
pub mod driver;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod interface;
pub mod raster;
pub mod text;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use driver::Ssd1309;
pub use error::{FontError, OledError};
pub use font::{FontData, GlyphRenderer, MonoGlyphs, TextBounds, TrueTypeFont};
pub use framebuffer::{Framebuffer, HEIGHT, NUM_PAGES, WIDTH};
pub use interface::{BusSink, BusWrite, RecordingSink};
pub use text::{GlyphCanvas, TextOptions, TextStyle};
