//! Glyph metrics and rendering for the text layout engine.
//!
//! Layout only needs three things from a font: a line advance, the size of
//! a run of text, and a way to draw that run into a [`GlyphCanvas`]. That
//! contract is [`GlyphRenderer`]. Two providers implement it:
//!
//! - [`TrueTypeFont`]: a scalable TrueType/OpenType face parsed with
//!   `ttf-parser` and rasterized to one bit per pixel.
//! - [`MonoGlyphs`]: any `embedded-graphics` [`MonoFont`], for builds
//!   without a font file on disk.

use std::path::Path;

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::error::FontError;
use crate::text::GlyphCanvas;

/// Pixel extent of a run of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBounds {
    /// Horizontal advance of the run.
    pub width: i32,
    /// Height of the inked area.
    pub height: i32,
}

/// Font operations consumed by the text layout engine.
pub trait GlyphRenderer {
    /// Vertical advance between wrapped lines.
    fn line_height(&self) -> i32;

    /// Size of `text` when drawn on one line.
    fn measure(&self, text: &str) -> TextBounds;

    /// Draw `text` with its top-left corner at `origin`.
    fn render(&self, text: &str, origin: Point, canvas: &mut GlyphCanvas);
}

// ── embedded-graphics mono fonts ─────────────────────────────────────────

/// [`GlyphRenderer`] over a fixed-width `embedded-graphics` font.
#[derive(Clone, Copy)]
pub struct MonoGlyphs<'a> {
    font: &'a MonoFont<'a>,
}

impl<'a> MonoGlyphs<'a> {
    pub fn new(font: &'a MonoFont<'a>) -> Self {
        Self { font }
    }
}

impl GlyphRenderer for MonoGlyphs<'_> {
    fn line_height(&self) -> i32 {
        self.font.character_size.height as i32
    }

    fn measure(&self, text: &str) -> TextBounds {
        let n = text.chars().count() as i32;
        if n == 0 {
            return TextBounds::default();
        }
        let glyph = self.font.character_size.width as i32;
        let spacing = self.font.character_spacing as i32;
        TextBounds {
            width: n * glyph + (n - 1) * spacing,
            height: self.font.character_size.height as i32,
        }
    }

    fn render(&self, text: &str, origin: Point, canvas: &mut GlyphCanvas) {
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        // canvas drawing is infallible
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(canvas);
    }
}

// ── TrueType / OpenType ──────────────────────────────────────────────────

/// Raw bytes of a font file.
///
/// Kept separate from [`TrueTypeFont`] because the parsed face borrows
/// from these bytes.
pub struct FontData {
    bytes: Vec<u8>,
}

impl FontData {
    /// Read a font file from disk.
    ///
    /// # Errors
    ///
    /// [`FontError::Io`] if the file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FontError> {
        let bytes = std::fs::read(path)?;
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Parse the face at `size` pixels per em.
    ///
    /// # Errors
    ///
    /// [`FontError::InvalidSize`] for size 0, [`FontError::Parse`] if the
    /// bytes are not a font.
    pub fn font(&self, size: u32) -> Result<TrueTypeFont<'_>, FontError> {
        TrueTypeFont::from_bytes(&self.bytes, size)
    }
}

/// A scalable font at a fixed integer size.
///
/// Outlines are flattened to line segments and filled with the non-zero
/// winding rule, sampling each pixel at its centre. There is no
/// anti-aliasing: a pixel is either inside the glyph or not.
pub struct TrueTypeFont<'a> {
    face: Face<'a>,
    size: u32,
    scale: f32,
}

impl<'a> TrueTypeFont<'a> {
    pub fn from_bytes(data: &'a [u8], size: u32) -> Result<Self, FontError> {
        if size == 0 {
            return Err(FontError::InvalidSize);
        }
        let face = Face::parse(data, 0)?;
        let scale = size as f32 / f32::from(face.units_per_em());
        Ok(Self { face, size, scale })
    }

    fn glyph_id(&self, c: char) -> GlyphId {
        self.face.glyph_index(c).unwrap_or(GlyphId(0))
    }

    fn advance(&self, glyph: GlyphId) -> f32 {
        f32::from(self.face.glyph_hor_advance(glyph).unwrap_or(0)) * self.scale
    }

    /// Distance from the top of the line to the baseline.
    fn ascent(&self) -> f32 {
        f32::from(self.face.ascender()) * self.scale
    }
}

impl GlyphRenderer for TrueTypeFont<'_> {
    fn line_height(&self) -> i32 {
        self.size as i32
    }

    fn measure(&self, text: &str) -> TextBounds {
        let mut advance = 0.0f32;
        let mut top = f32::MAX;
        let mut bottom = f32::MIN;

        for c in text.chars() {
            let id = self.glyph_id(c);
            if let Some(bbox) = self.face.glyph_bounding_box(id) {
                top = top.min(-f32::from(bbox.y_max) * self.scale);
                bottom = bottom.max(-f32::from(bbox.y_min) * self.scale);
            }
            advance += self.advance(id);
        }

        let height = if bottom >= top {
            (bottom - top).ceil() as i32
        } else {
            0
        };
        TextBounds {
            width: advance.round() as i32,
            height,
        }
    }

    fn render(&self, text: &str, origin: Point, canvas: &mut GlyphCanvas) {
        let baseline = origin.y as f32 + self.ascent();
        let mut pen_x = origin.x as f32;

        for c in text.chars() {
            let id = self.glyph_id(c);
            let mut outline = Outline::new(pen_x, baseline, self.scale);
            if self.face.outline_glyph(id, &mut outline).is_some() {
                outline.fill(canvas);
            }
            pen_x += self.advance(id);
        }
    }
}

// ── Outline flattening and fill ──────────────────────────────────────────

const QUAD_STEPS: u32 = 8;
const CUBIC_STEPS: u32 = 12;

type Vertex = [f32; 2];

#[derive(Clone, Copy, Debug)]
struct Edge {
    p0: Vertex,
    p1: Vertex,
}

impl Edge {
    /// Signed crossing of a ray cast from `(x, y)` towards +x.
    fn winding(&self, x: f32, y: f32) -> i32 {
        let [x0, y0] = self.p0;
        let [x1, y1] = self.p1;
        if (y0 <= y && y < y1) || (y1 <= y && y < y0) {
            let t = (y - y0) / (y1 - y0);
            let x_int = x0 + t * (x1 - x0);
            if x < x_int {
                return if y0 < y1 { 1 } else { -1 };
            }
        }
        0
    }
}

/// Collects a glyph outline as device-space edges.
///
/// Font units are y-up; device space is y-down with the baseline at
/// `origin_y`.
struct Outline {
    edges: Vec<Edge>,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
    current: Vertex,
    start: Vertex,
}

impl Outline {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            edges: Vec::with_capacity(64),
            origin_x,
            origin_y,
            scale,
            current: [0.0, 0.0],
            start: [0.0, 0.0],
        }
    }

    fn to_device(&self, x: f32, y: f32) -> Vertex {
        [self.origin_x + x * self.scale, self.origin_y - y * self.scale]
    }

    fn push_edge(&mut self, to: Vertex) {
        if self.current != to {
            self.edges.push(Edge {
                p0: self.current,
                p1: to,
            });
        }
        self.current = to;
    }

    /// Light every canvas pixel whose centre lies inside the outline.
    fn fill(&self, canvas: &mut GlyphCanvas) {
        if self.edges.is_empty() {
            return;
        }

        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for e in &self.edges {
            for [x, y] in [e.p0, e.p1] {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }

        let size = canvas.size();
        let x_start = (min_x.floor() as i32).max(0);
        let y_start = (min_y.floor() as i32).max(0);
        let x_end = (max_x.ceil() as i32).min(size.width as i32);
        let y_end = (max_y.ceil() as i32).min(size.height as i32);

        for py in y_start..y_end {
            let cy = py as f32 + 0.5;
            for px in x_start..x_end {
                let cx = px as f32 + 0.5;
                let winding: i32 = self.edges.iter().map(|e| e.winding(cx, cy)).sum();
                if winding != 0 {
                    canvas.set(px, py);
                }
            }
        }
    }
}

fn lerp(a: Vertex, b: Vertex, t: f32) -> Vertex {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

impl OutlineBuilder for Outline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.current = self.to_device(x, y);
        self.start = self.current;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.to_device(x, y);
        self.push_edge(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.current;
        let c = self.to_device(x1, y1);
        let p2 = self.to_device(x, y);
        for i in 1..=QUAD_STEPS {
            let t = i as f32 / QUAD_STEPS as f32;
            let p = lerp(lerp(p0, c, t), lerp(c, p2, t), t);
            self.push_edge(p);
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.current;
        let c1 = self.to_device(x1, y1);
        let c2 = self.to_device(x2, y2);
        let p3 = self.to_device(x, y);
        for i in 1..=CUBIC_STEPS {
            let t = i as f32 / CUBIC_STEPS as f32;
            let a = lerp(lerp(p0, c1, t), lerp(c1, c2, t), t);
            let b = lerp(lerp(c1, c2, t), lerp(c2, p3, t), t);
            self.push_edge(lerp(a, b, t));
        }
    }

    fn close(&mut self) {
        let start = self.start;
        self.push_edge(start);
    }
}
