//! Error types for the OLED display driver.

use core::fmt;

use display_interface::DisplayError;
use embedded_hal::digital::ErrorKind;
use image::ImageError;
use ttf_parser::FaceParsingError;

/// Errors that can occur during OLED display operations.
///
/// Transport errors from the bus are surfaced unchanged; nothing is
/// retried. Off-frame drawing is never an error.
#[derive(Debug)]
pub enum OledError {
    /// Display interface error (wraps SPI and data/command line failures).
    Display(DisplayError),
    /// The initialisation sequence could not be written to the panel.
    InitializationFailed(DisplayError),
    /// The reset line could not be driven.
    Pin(ErrorKind),
    /// An operation was attempted before [`Ssd1309::init()`](crate::Ssd1309::init)
    /// was called.
    NotInitialized,
    /// The source image could not be read or decoded.
    Image(ImageError),
    /// Image scale factor was negative, NaN or infinite, or would stretch a
    /// side past [`MAX_SCALED_SIDE`](crate::compositor::MAX_SCALED_SIDE).
    InvalidScale,
    /// The font could not be loaded.
    Font(FontError),
}

impl From<DisplayError> for OledError {
    fn from(e: DisplayError) -> Self {
        OledError::Display(e)
    }
}

impl From<ImageError> for OledError {
    fn from(e: ImageError) -> Self {
        OledError::Image(e)
    }
}

impl From<FontError> for OledError {
    fn from(e: FontError) -> Self {
        OledError::Font(e)
    }
}

impl fmt::Display for OledError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OledError::Display(e) => write!(f, "display interface error: {:?}", e),
            OledError::InitializationFailed(e) => write!(f, "initialization failed: {:?}", e),
            OledError::Pin(kind) => write!(f, "reset pin error: {}", kind),
            OledError::NotInitialized => write!(f, "display not initialized"),
            OledError::Image(e) => write!(f, "image decode error: {}", e),
            OledError::InvalidScale => write!(
                f,
                "image scale must be finite, non-negative and keep each side within {} px",
                crate::compositor::MAX_SCALED_SIDE
            ),
            OledError::Font(e) => write!(f, "font error: {}", e),
        }
    }
}

impl std::error::Error for OledError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OledError::Image(e) => Some(e),
            OledError::Font(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors raised while loading a scalable font.
#[derive(Debug)]
pub enum FontError {
    /// The font file could not be read.
    Io(std::io::Error),
    /// The file is not a usable TrueType/OpenType face.
    Parse(FaceParsingError),
    /// A font size of 0 was requested.
    InvalidSize,
}

impl From<std::io::Error> for FontError {
    fn from(e: std::io::Error) -> Self {
        FontError::Io(e)
    }
}

impl From<FaceParsingError> for FontError {
    fn from(e: FaceParsingError) -> Self {
        FontError::Parse(e)
    }
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FontError::Io(e) => write!(f, "cannot read font file: {}", e),
            FontError::Parse(e) => write!(f, "cannot parse font: {}", e),
            FontError::InvalidSize => write!(f, "font size must be at least 1"),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FontError::Io(e) => Some(e),
            _ => None,
        }
    }
}
