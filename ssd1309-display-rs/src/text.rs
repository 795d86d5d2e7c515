//! Greedy word-wrapped text rendering.
//!
//! Text is drawn into a full-frame [`GlyphCanvas`] first and then OR'd into
//! the [`Framebuffer`] page by page, so text never erases what is already
//! on screen.
//!
//! # Wrapping
//!
//! Words (split on single spaces) are placed left to right from the
//! cursor. When a word would cross `wrap_width`, characters are dropped
//! from its end until `fragment + "-"` fits (or one character is left), the
//! hyphenated fragment is drawn, the cursor moves to the start of the next
//! line, and the rest of the word is laid out again from there. A word
//! longer than a whole line is therefore split across as many lines as it
//! needs.

use std::path::PathBuf;

use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    pixelcolor::BinaryColor,
    prelude::{OriginDimensions, Point, Size},
    Pixel,
};

use crate::font::{GlyphRenderer, TextBounds};
use crate::framebuffer::{Framebuffer, HEIGHT, NUM_PAGES, WIDTH};

// ── Configuration ────────────────────────────────────────────────────────

/// Per-call layout options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextOptions {
    /// Right edge for wrapping, as an absolute x coordinate. `0` disables
    /// wrapping.
    pub wrap_width: u32,
    /// Lay the text out and return its height without touching the frame
    /// buffer.
    pub measure_only: bool,
}

/// Font selection for text drawn through [`Ssd1309`](crate::Ssd1309).
///
/// The font path is always explicit; nothing is resolved relative to the
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    /// TrueType/OpenType font file.
    pub font_path: PathBuf,
    /// Font size in pixels. Also the line advance when wrapping.
    pub font_size: u32,
    /// See [`TextOptions::wrap_width`].
    pub wrap_width: u32,
}

impl TextStyle {
    pub fn new(font_path: impl Into<PathBuf>, font_size: u32) -> Self {
        Self {
            font_path: font_path.into(),
            font_size,
            wrap_width: 0,
        }
    }

    pub fn with_wrap_width(mut self, wrap_width: u32) -> Self {
        self.wrap_width = wrap_width;
        self
    }
}

// ── GlyphCanvas ──────────────────────────────────────────────────────────

/// Full-frame, one bit per pixel scratch bitmap for glyph rendering.
pub struct GlyphCanvas {
    pixels: Vec<bool>,
}

impl Default for GlyphCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphCanvas {
    pub fn new() -> Self {
        Self {
            pixels: vec![false; WIDTH * HEIGHT],
        }
    }

    fn index(x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            None
        } else {
            Some(y as usize * WIDTH + x as usize)
        }
    }

    /// Light `(x, y)`. Off-canvas coordinates are ignored.
    pub fn set(&mut self, x: i32, y: i32) {
        if let Some(i) = Self::index(x, y) {
            self.pixels[i] = true;
        }
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        Self::index(x, y).is_some_and(|i| self.pixels[i])
    }

    /// OR the canvas into `fb` using the paged layout.
    ///
    /// Bit `b` of the byte for page `p`, column `x` is canvas row `p * 8 + b`.
    pub fn transfer_into(&self, fb: &mut Framebuffer) {
        for page in 0..NUM_PAGES {
            for x in 0..WIDTH {
                let mut byte = 0u8;
                for bit in 0..8 {
                    let y = page * 8 + bit;
                    if y < HEIGHT && self.pixels[y * WIDTH + x] {
                        byte |= 1 << bit;
                    }
                }
                fb.or_page_byte(page, x, byte);
            }
        }
    }
}

impl OriginDimensions for GlyphCanvas {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for GlyphCanvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color.is_on() {
                self.set(point.x, point.y);
            } else if let Some(i) = Self::index(point.x, point.y) {
                self.pixels[i] = false;
            }
        }
        Ok(())
    }
}

// ── Layout ───────────────────────────────────────────────────────────────

/// Draw `text` at `(x, y)` and return the height it occupies.
///
/// The height is the distance the cursor moved down plus the tallest
/// fragment drawn. Empty or whitespace-only text returns 0 without doing
/// any work. With [`TextOptions::measure_only`] the layout runs in full but
/// `fb` is left untouched.
pub fn draw_text<F>(
    fb: &mut Framebuffer,
    font: &F,
    text: &str,
    x: i32,
    y: i32,
    options: TextOptions,
) -> u32
where
    F: GlyphRenderer + ?Sized,
{
    if text.trim().is_empty() {
        return 0;
    }

    let mut canvas = GlyphCanvas::new();
    let wrap_width = i32::try_from(options.wrap_width).unwrap_or(i32::MAX);
    let space = font.measure(" ").width;

    let mut cursor_x = x;
    let mut cursor_y = y;
    let mut max_height = 0;

    for word in text.split(' ') {
        let mut pending = word;
        while !pending.is_empty() {
            let bounds = font.measure(pending);

            if wrap_width > 0 && overflows(cursor_x, bounds.width, wrap_width) {
                let (head, head_bounds) =
                    shrink_to_fit(font, pending, bounds, cursor_x, wrap_width);
                let hyphenated = format!("{head}-");
                render_fragment(font, &hyphenated, cursor_x, cursor_y, &mut canvas);
                max_height = max_height.max(head_bounds.height);

                cursor_x = x;
                cursor_y = cursor_y.saturating_add(font.line_height());
                pending = &pending[head.len()..];
            } else {
                render_fragment(font, pending, cursor_x, cursor_y, &mut canvas);
                max_height = max_height.max(bounds.height);

                cursor_x = cursor_x.saturating_add(bounds.width).saturating_add(space);
                pending = "";
            }
        }
    }

    let advance = i64::from(cursor_y) - i64::from(y) + i64::from(max_height);
    let height = u32::try_from(advance.max(0)).unwrap_or(u32::MAX);

    #[cfg(feature = "log")]
    log::debug!(
        "laid out text at ({}, {}): height {}{}",
        x,
        y,
        height,
        if options.measure_only { " (measure only)" } else { "" }
    );

    if !options.measure_only {
        canvas.transfer_into(fb);
    }
    height
}

fn overflows(cursor_x: i32, width: i32, wrap_width: i32) -> bool {
    i64::from(cursor_x) + i64::from(width) > i64::from(wrap_width)
}

/// Render `text` at the cursor unless it lies wholly off the canvas.
fn render_fragment<F>(font: &F, text: &str, x: i32, y: i32, canvas: &mut GlyphCanvas)
where
    F: GlyphRenderer + ?Sized,
{
    let bounds = font.measure(text);
    // ink can reach up to a line past the advance and below the baseline
    let reach = i64::from(font.line_height().max(bounds.height).max(0)) * 2;
    let (left, top) = (i64::from(x), i64::from(y));
    if left >= WIDTH as i64
        || top >= HEIGHT as i64
        || left + i64::from(bounds.width) + reach < 0
        || top + reach < 0
    {
        return;
    }
    font.render(text, Point::new(x, y), canvas);
}

/// Drop characters from the end of `word` until `head + "-"` fits before
/// `wrap_width`, keeping at least one character.
///
/// The width of the hyphenated fragment is re-measured on every step.
/// Returns the head and the bounds last measured for it.
fn shrink_to_fit<'w, F>(
    font: &F,
    word: &'w str,
    word_bounds: TextBounds,
    cursor_x: i32,
    wrap_width: i32,
) -> (&'w str, TextBounds)
where
    F: GlyphRenderer + ?Sized,
{
    let mut head = word;
    let mut bounds = word_bounds;

    while overflows(cursor_x, bounds.width, wrap_width) && head.chars().nth(1).is_some() {
        let cut = head.char_indices().last().map_or(0, |(i, _)| i);
        head = &head[..cut];
        bounds = font.measure(&format!("{head}-"));
    }
    (head, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::MonoGlyphs;
    use embedded_graphics::mono_font::ascii::FONT_6X10;

    fn glyphs() -> MonoGlyphs<'static> {
        MonoGlyphs::new(&FONT_6X10)
    }

    fn draw(fb: &mut Framebuffer, text: &str, x: i32, y: i32, wrap_width: u32) -> u32 {
        let options = TextOptions {
            wrap_width,
            measure_only: false,
        };
        draw_text(fb, &glyphs(), text, x, y, options)
    }

    /// Bounding box of lit pixels as (min_x, min_y, max_x, max_y).
    fn ink(fb: &Framebuffer) -> Option<(i32, i32, i32, i32)> {
        let mut found: Option<(i32, i32, i32, i32)> = None;
        for y in 0..HEIGHT as i32 {
            for x in 0..WIDTH as i32 {
                if fb.is_on(x, y) {
                    found = Some(match found {
                        None => (x, y, x, y),
                        Some((a, b, c, d)) => (a.min(x), b.min(y), c.max(x), d.max(y)),
                    });
                }
            }
        }
        found
    }

    #[test]
    fn empty_and_blank_text_is_a_no_op() {
        let mut fb = Framebuffer::new();
        assert_eq!(draw(&mut fb, "", 0, 0, 0), 0);
        assert_eq!(draw(&mut fb, "   \t ", 0, 0, 0), 0);
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn single_line_height_and_placement() {
        let mut fb = Framebuffer::new();
        let height = draw(&mut fb, "Hi", 4, 8, 0);
        assert_eq!(height, 10);
        let (x0, y0, x1, y1) = ink(&fb).unwrap();
        assert!(x0 >= 4 && x1 < 16);
        assert!(y0 >= 8 && y1 < 18);
    }

    #[test]
    fn unbounded_width_never_wraps() {
        let mut fb = Framebuffer::new();
        let text = "one two three four five six seven eight nine ten";
        let height = draw(&mut fb, text, 0, 0, 0);
        assert_eq!(height, 10);
        let (_, _, _, y1) = ink(&fb).unwrap();
        assert!(y1 < 10);
    }

    #[test]
    fn measure_only_leaves_buffer_untouched() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(0, 0, BinaryColor::On);
        let options = TextOptions {
            wrap_width: 30,
            measure_only: true,
        };
        let height = draw_text(&mut fb, &glyphs(), "abc def", 0, 0, options);
        assert_eq!(height, 20);
        assert_eq!(fb.lit_count(), 1);
    }

    #[test]
    fn overflowing_word_is_hyphenated_and_continued() {
        // "abc" ends at x=18, cursor moves to 24. "def" needs 18 more: only
        // "d-" is drawn on the first line, "ef" goes to the second.
        let mut fb = Framebuffer::new();
        let height = draw(&mut fb, "abc def", 0, 0, 30);
        assert_eq!(height, 20);

        let mut line_two = Framebuffer::new();
        draw(&mut line_two, "ef", 0, 10, 0);
        for y in 10..20 {
            for x in 0..WIDTH as i32 {
                assert_eq!(fb.is_on(x, y), line_two.is_on(x, y), "({x}, {y})");
            }
        }

        let mut line_one = Framebuffer::new();
        draw(&mut line_one, "abc d-", 0, 0, 0);
        for y in 0..10 {
            for x in 0..WIDTH as i32 {
                assert_eq!(fb.is_on(x, y), line_one.is_on(x, y), "({x}, {y})");
            }
        }
    }

    #[test]
    fn fitting_words_share_a_line() {
        let mut fb = Framebuffer::new();
        // "ab cd" spans 0..30 with the cursor at 36 afterwards
        assert_eq!(draw(&mut fb, "ab cd", 0, 0, 30), 10);
    }

    #[test]
    fn wrap_narrower_than_one_glyph_still_terminates() {
        let mut fb = Framebuffer::new();
        let height = draw(&mut fb, "abc", 0, 0, 3);
        // "a-", "b-", "c-" each on their own line
        assert_eq!(height, 40);
        let (_, _, _, y1) = ink(&fb).unwrap();
        assert!((20..30).contains(&y1));
    }

    #[test]
    fn long_word_splits_across_lines() {
        let mut fb = Framebuffer::new();
        // 20 chars = 120 px against a 64 px line: 9 chars + hyphen per line
        let height = draw(&mut fb, "abcdefghijklmnopqrst", 0, 0, 64);
        assert_eq!(height, 30);
    }

    #[test]
    fn repeated_spaces_do_not_move_cursor() {
        let mut single = Framebuffer::new();
        let mut double = Framebuffer::new();
        draw(&mut single, "a b", 0, 0, 0);
        draw(&mut double, "a  b", 0, 0, 0);
        assert_eq!(single, double);
    }

    #[test]
    fn text_is_additive() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(120, 60, BinaryColor::On);
        fb.set_pixel(2, 2, BinaryColor::On);
        draw(&mut fb, "x", 0, 0, 0);
        assert!(fb.is_on(120, 60));
        assert!(fb.is_on(2, 2));
    }

    #[test]
    fn text_off_the_bottom_is_clipped() {
        let mut fb = Framebuffer::new();
        let height = draw(&mut fb, "clipped", 0, 60, 0);
        assert_eq!(height, 10);
        let (_, y0, _, _) = ink(&fb).unwrap();
        assert!(y0 >= 60);
    }

    #[test]
    fn shrink_keeps_one_character_minimum() {
        let font = glyphs();
        let word = "wide";
        let (head, bounds) = shrink_to_fit(&font, word, font.measure(word), 100, 101);
        assert_eq!(head, "w");
        assert_eq!(bounds.width, 12);
    }

    #[test]
    fn shrink_handles_multibyte_characters() {
        let font = glyphs();
        let word = "héé";
        let (head, _) = shrink_to_fit(&font, word, font.measure(word), 0, 13);
        assert_eq!(head, "h");
    }

    #[test]
    fn canvas_transfer_packs_pages() {
        let mut canvas = GlyphCanvas::new();
        canvas.set(3, 9);
        canvas.set(127, 63);
        canvas.set(-1, 5);
        canvas.set(0, 64);

        let mut fb = Framebuffer::new();
        fb.set_pixel(3, 8, BinaryColor::On);
        canvas.transfer_into(&mut fb);

        assert_eq!(fb.as_bytes()[3 + WIDTH], 0b0000_0011);
        assert_eq!(fb.as_bytes()[127 + 7 * WIDTH], 0b1000_0000);
        assert_eq!(fb.lit_count(), 3);
    }

    #[test]
    fn cursor_at_the_integer_limits() {
        let mut fb = Framebuffer::new();
        assert_eq!(draw(&mut fb, "abc def", i32::MAX - 2, 0, 0), 10);
        assert_eq!(draw(&mut fb, "abc def", i32::MIN, i32::MIN, 0), 10);
        draw(&mut fb, "abc", i32::MAX - 2, i32::MAX - 2, 64);
        draw(&mut fb, "abc def", 0, i32::MAX, 30);
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn text_hanging_off_the_left_edge_is_drawn() {
        let mut fb = Framebuffer::new();
        draw(&mut fb, "abcdef", -12, 0, 0);
        let (x0, _, x1, _) = ink(&fb).unwrap();
        assert!(x0 < 6);
        assert!(x1 < 24);
    }

    #[test]
    fn text_style_builder() {
        let style = TextStyle::new("/usr/share/fonts/Arial.ttf", 12).with_wrap_width(100);
        assert_eq!(style.font_path, PathBuf::from("/usr/share/fonts/Arial.ttf"));
        assert_eq!(style.font_size, 12);
        assert_eq!(style.wrap_width, 100);
    }
}
