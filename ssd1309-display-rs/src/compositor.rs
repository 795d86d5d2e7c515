//! Alpha-stencil compositing of raster images into the frame buffer.
//!
//! The source is converted to RGBA, resampled with a Lanczos filter, and
//! every pixel whose alpha exceeds [`ALPHA_THRESHOLD`] turns the matching
//! display pixel on. Colour channels are ignored and pixels are never
//! turned off, so an image only ever adds to what is already drawn.

use std::path::Path;

use embedded_graphics::pixelcolor::BinaryColor;
use image::{imageops, imageops::FilterType, DynamicImage, RgbaImage};

use crate::error::OledError;
use crate::framebuffer::{Framebuffer, HEIGHT, WIDTH};

/// Alpha values strictly above this light the pixel.
pub const ALPHA_THRESHOLD: u8 = 127;

/// Largest width or height an image may be resampled to.
pub const MAX_SCALED_SIDE: u32 = 4096;

/// Decode the image at `path` and composite it at the given offset.
///
/// # Errors
///
/// [`OledError::Image`] if the file cannot be opened or decoded, and
/// [`OledError::InvalidScale`] for a negative or non-finite `scale`, or one
/// that would make either side larger than [`MAX_SCALED_SIDE`]. Nothing is
/// drawn on error.
pub fn draw_image<P>(
    fb: &mut Framebuffer,
    path: P,
    x_offset: i32,
    y_offset: i32,
    scale: f32,
) -> Result<(), OledError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let img = image::open(path)?;

    #[cfg(feature = "log")]
    log::debug!(
        "decoded {} ({}x{}), scale {}",
        path.display(),
        img.width(),
        img.height(),
        scale
    );

    composite_image(fb, &img, x_offset, y_offset, scale)
}

/// Composite an already decoded image.
///
/// The resampled size is `floor(source × scale)` in each axis; a zero
/// dimension draws nothing.
pub fn composite_image(
    fb: &mut Framebuffer,
    img: &DynamicImage,
    x_offset: i32,
    y_offset: i32,
    scale: f32,
) -> Result<(), OledError> {
    if !scale.is_finite() || scale < 0.0 {
        return Err(OledError::InvalidScale);
    }

    let (width, height) = (img.width(), img.height());
    let new_width = scaled_side(width, scale)?;
    let new_height = scaled_side(height, scale)?;

    if new_width == 0 || new_height == 0 {
        return Ok(());
    }

    let rgba = img.to_rgba8();
    let resampled = if (new_width, new_height) == (width, height) {
        rgba
    } else {
        imageops::resize(&rgba, new_width, new_height, FilterType::Lanczos3)
    };

    stamp_alpha(fb, &resampled, x_offset, y_offset);
    Ok(())
}

fn scaled_side(side: u32, scale: f32) -> Result<u32, OledError> {
    let scaled = (f64::from(side) * f64::from(scale)).floor();
    if scaled > f64::from(MAX_SCALED_SIDE) {
        return Err(OledError::InvalidScale);
    }
    Ok(scaled as u32)
}

fn stamp_alpha(fb: &mut Framebuffer, img: &RgbaImage, x_offset: i32, y_offset: i32) {
    for (x, y, pixel) in img.enumerate_pixels() {
        let display_x = i64::from(x) + i64::from(x_offset);
        let display_y = i64::from(y) + i64::from(y_offset);
        if !(0..WIDTH as i64).contains(&display_x) || !(0..HEIGHT as i64).contains(&display_y) {
            continue;
        }

        let [_r, _g, _b, alpha] = pixel.0;
        if alpha > ALPHA_THRESHOLD {
            fb.set_pixel(display_x as i32, display_y as i32, BinaryColor::On);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, alpha: u8) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, alpha])))
    }

    #[test]
    fn opaque_image_lights_its_footprint() {
        let mut fb = Framebuffer::new();
        composite_image(&mut fb, &solid(4, 3, 255), 10, 20, 1.0).unwrap();
        assert_eq!(fb.lit_count(), 12);
        assert!(fb.is_on(10, 20));
        assert!(fb.is_on(13, 22));
        assert!(!fb.is_on(14, 22));
        assert!(!fb.is_on(10, 23));
    }

    #[test]
    fn alpha_threshold_is_strict() {
        let mut fb = Framebuffer::new();
        composite_image(&mut fb, &solid(2, 2, 127), 0, 0, 1.0).unwrap();
        assert_eq!(fb.lit_count(), 0);
        composite_image(&mut fb, &solid(2, 2, 128), 0, 0, 1.0).unwrap();
        assert_eq!(fb.lit_count(), 4);
    }

    #[test]
    fn colour_channels_are_ignored() {
        let mut fb = Framebuffer::new();
        let img = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        composite_image(&mut fb, &DynamicImage::ImageRgba8(img), 0, 0, 1.0).unwrap();
        assert!(fb.is_on(0, 0));
        assert!(fb.is_on(1, 0));
    }

    #[test]
    fn transparent_image_never_clears() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(5, 5, BinaryColor::On);
        fb.set_pixel(6, 6, BinaryColor::On);
        composite_image(&mut fb, &solid(16, 16, 0), 0, 0, 1.0).unwrap();
        assert!(fb.is_on(5, 5));
        assert!(fb.is_on(6, 6));
        assert_eq!(fb.lit_count(), 2);
    }

    #[test]
    fn image_is_clipped_at_edges() {
        let mut fb = Framebuffer::new();
        composite_image(&mut fb, &solid(10, 10, 255), -5, 60, 1.0).unwrap();
        // 5 columns × 4 rows remain on screen
        assert_eq!(fb.lit_count(), 20);
    }

    #[test]
    fn scale_resamples_dimensions() {
        let mut fb = Framebuffer::new();
        composite_image(&mut fb, &solid(8, 8, 255), 0, 0, 0.5).unwrap();
        assert_eq!(fb.lit_count(), 16);
        assert!(fb.is_on(3, 3));
        assert!(!fb.is_on(4, 0));
    }

    #[test]
    fn scale_floors_to_zero_draws_nothing() {
        let mut fb = Framebuffer::new();
        composite_image(&mut fb, &solid(3, 3, 255), 0, 0, 0.2).unwrap();
        composite_image(&mut fb, &solid(3, 3, 255), 0, 0, 0.0).unwrap();
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn invalid_scale_is_rejected() {
        let mut fb = Framebuffer::new();
        for scale in [f32::NAN, f32::INFINITY, -1.0] {
            let result = composite_image(&mut fb, &solid(3, 3, 255), 0, 0, scale);
            assert!(matches!(result, Err(OledError::InvalidScale)));
        }
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn oversized_scale_is_rejected() {
        let mut fb = Framebuffer::new();
        for scale in [1.0e9, f32::MAX, 4097.0] {
            let result = composite_image(&mut fb, &solid(1, 1, 255), 0, 0, scale);
            assert!(matches!(result, Err(OledError::InvalidScale)));
        }
        composite_image(&mut fb, &solid(1, 1, 255), 0, 0, 200.0).unwrap();
        assert_eq!(fb.lit_count(), WIDTH * HEIGHT);
    }

    #[test]
    fn offsets_at_the_integer_limits() {
        let mut fb = Framebuffer::new();
        composite_image(&mut fb, &solid(4, 4, 255), i32::MAX, i32::MAX, 1.0).unwrap();
        composite_image(&mut fb, &solid(4, 4, 255), i32::MIN, 0, 1.0).unwrap();
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn draw_image_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let mut fb = Framebuffer::new();
        draw_image(&mut fb, &path, 100, 40, 1.0).unwrap();
        assert_eq!(fb.lit_count(), 4);
        assert!(fb.is_on(101, 41));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut fb = Framebuffer::new();
        let result = draw_image(&mut fb, dir.path().join("absent.png"), 0, 0, 1.0);
        assert!(matches!(result, Err(OledError::Image(_))));
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let mut fb = Framebuffer::new();
        let result = draw_image(&mut fb, &path, 0, 0, 1.0);
        assert!(matches!(result, Err(OledError::Image(_))));
        assert_eq!(fb.lit_count(), 0);
    }
}
