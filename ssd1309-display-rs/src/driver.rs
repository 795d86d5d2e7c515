//! High-level SSD1309 driver owning the bus, the reset line and the frame buffer.
//!
//! [`Ssd1309`] manages the display lifecycle: construction without bus
//! traffic, hardware reset, explicit initialisation, drawing into the
//! in-memory [`Framebuffer`], and full-frame flush.

use std::path::Path;

use display_interface::DisplayError;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, OutputPin},
};

use crate::command::{DISPLAY_OFF, DISPLAY_ON, INIT_SEQUENCE, SET_CONTRAST};
use crate::compositor;
use crate::error::OledError;
use crate::font::FontData;
use crate::framebuffer::Framebuffer;
use crate::interface::BusSink;
use crate::raster;
use crate::text::{TextOptions, TextStyle};

/// How long the reset line is held in each state.
pub const RESET_HOLD_MS: u32 = 100;

/// Driver for an SSD1309 128×64 OLED panel.
///
/// # Lifecycle
///
/// 1. [`Ssd1309::new()`]: takes ownership of the transport and reset pin;
///    no bus traffic.
/// 2. [`Ssd1309::reset()`]: pulses the reset line.
/// 3. [`Ssd1309::init()`]: sends the controller initialisation sequence.
/// 4. Draw into the frame buffer (`draw_*`, or
///    [`framebuffer_mut()`](Self::framebuffer_mut) with `embedded-graphics`).
/// 5. [`Ssd1309::flush()`]: redraws the whole panel from the buffer.
///
/// # Example
///
/// ```no_run
/// use embedded_graphics::pixelcolor::BinaryColor;
/// use ssd1309_display_rs::{RecordingSink, Ssd1309};
/// # fn example(
/// #     reset: impl embedded_hal::digital::OutputPin,
/// #     mut delay: impl embedded_hal::delay::DelayNs,
/// # ) {
/// let mut oled = Ssd1309::new(RecordingSink::new(), reset);
/// oled.reset(&mut delay).unwrap();
/// oled.init().unwrap();
/// oled.draw_box(10, 10, 20, 20, BinaryColor::On);
/// oled.flush().unwrap();
/// # }
/// ```
pub struct Ssd1309<DI, RST> {
    interface: DI,
    reset: RST,
    framebuffer: Framebuffer,
    /// Set to `true` after a successful `init()` call.
    initialized: bool,
}

impl<DI, RST> Ssd1309<DI, RST>
where
    DI: BusSink<Error = DisplayError>,
    RST: OutputPin,
{
    /// Construct an uninitialised driver with a blank frame buffer.
    ///
    /// # Arguments
    /// * `interface`: command/data transport (takes ownership for exclusive access).
    /// * `reset`: output pin wired to the panel's RES# line.
    pub fn new(interface: DI, reset: RST) -> Self {
        Self {
            interface,
            reset,
            framebuffer: Framebuffer::new(),
            initialized: false,
        }
    }

    /// Hardware reset: drive RES# low for 100 ms, then high for 100 ms.
    ///
    /// # Errors
    ///
    /// [`OledError::Pin`] if the reset line cannot be driven.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), OledError> {
        self.reset.set_low().map_err(|e| OledError::Pin(e.kind()))?;
        delay.delay_ms(RESET_HOLD_MS);
        self.reset.set_high().map_err(|e| OledError::Pin(e.kind()))?;
        delay.delay_ms(RESET_HOLD_MS);

        #[cfg(feature = "log")]
        log::debug!("SSD1309 reset pulse complete");
        Ok(())
    }

    /// Send the controller initialisation sequence.
    ///
    /// Must be called once, after [`reset()`](Self::reset), before
    /// [`flush()`](Self::flush).
    ///
    /// # Errors
    ///
    /// [`OledError::InitializationFailed`] carrying the bus error if any
    /// byte of the sequence could not be sent.
    pub fn init(&mut self) -> Result<(), OledError> {
        for &byte in INIT_SEQUENCE.iter() {
            self.interface
                .send_command(byte)
                .map_err(OledError::InitializationFailed)?;
        }
        self.initialized = true;

        #[cfg(feature = "log")]
        log::info!("SSD1309 initialised ({} command bytes)", INIT_SEQUENCE.len());
        Ok(())
    }

    /// Check whether the display has been successfully initialised.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Transfer the whole frame buffer to the panel.
    ///
    /// # Errors
    ///
    /// [`OledError::NotInitialized`] before [`init()`](Self::init), or
    /// [`OledError::Display`] on the first failed bus write.
    pub fn flush(&mut self) -> Result<(), OledError> {
        if !self.initialized {
            return Err(OledError::NotInitialized);
        }
        self.framebuffer.flush(&mut self.interface)?;

        #[cfg(feature = "log")]
        log::trace!("flushed {} lit pixels", self.framebuffer.lit_count());
        Ok(())
    }

    /// Clear the in-memory frame buffer. No bus traffic.
    pub fn clear_buffer(&mut self) {
        self.framebuffer.clear();
    }

    /// Clear the frame buffer and blank the panel.
    pub fn clear(&mut self) -> Result<(), OledError> {
        self.clear_buffer();
        self.flush()
    }

    /// Turn the panel on. Display RAM is retained while off.
    pub fn display_on(&mut self) -> Result<(), OledError> {
        self.interface.send_command(DISPLAY_ON)?;
        Ok(())
    }

    /// Put the panel to sleep.
    pub fn display_off(&mut self) -> Result<(), OledError> {
        self.interface.send_command(DISPLAY_OFF)?;
        Ok(())
    }

    /// Set the contrast level (0–255).
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), OledError> {
        self.interface.send_command(SET_CONTRAST)?;
        self.interface.send_command(contrast)?;
        Ok(())
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Mutable access to the frame buffer, which is also an
    /// `embedded-graphics` [`DrawTarget`].
    ///
    /// [`DrawTarget`]: embedded_graphics::draw_target::DrawTarget
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    /// Give back the transport and reset pin.
    pub fn release(self) -> (DI, RST) {
        (self.interface, self.reset)
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    pub fn set_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        self.framebuffer.set_pixel(x, y, color);
    }

    /// See [`raster::draw_box`].
    pub fn draw_box(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: BinaryColor) {
        raster::draw_box(&mut self.framebuffer, x1, y1, x2, y2, color);
    }

    /// See [`raster::draw_circle`].
    pub fn draw_circle(&mut self, cx: i32, cy: i32, diameter: i32, color: BinaryColor) {
        raster::draw_circle(&mut self.framebuffer, cx, cy, diameter, color);
    }

    /// See [`raster::draw_line`].
    pub fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: BinaryColor,
        thickness: i32,
    ) {
        raster::draw_line(&mut self.framebuffer, x1, y1, x2, y2, color, thickness);
    }

    /// See [`compositor::draw_image`].
    pub fn draw_image<P: AsRef<Path>>(
        &mut self,
        path: P,
        x_offset: i32,
        y_offset: i32,
        scale: f32,
    ) -> Result<(), OledError> {
        compositor::draw_image(&mut self.framebuffer, path, x_offset, y_offset, scale)
    }

    /// Load the font named by `style` and draw wrapped text at `(x, y)`.
    ///
    /// Returns the height the text occupies. With `measure_only` the frame
    /// buffer is not modified. Blank text returns 0 before the font is
    /// loaded.
    ///
    /// # Errors
    ///
    /// [`OledError::Font`] if the font file is missing, unreadable or not a
    /// font, or if the size is 0.
    pub fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        style: &TextStyle,
        measure_only: bool,
    ) -> Result<u32, OledError> {
        if text.trim().is_empty() {
            return Ok(0);
        }

        let data = FontData::load(&style.font_path)?;
        let font = data.font(style.font_size)?;
        let options = TextOptions {
            wrap_width: style.wrap_width,
            measure_only,
        };
        Ok(crate::text::draw_text(
            &mut self.framebuffer,
            &font,
            text,
            x,
            y,
            options,
        ))
    }
}
