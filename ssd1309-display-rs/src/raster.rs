//! Geometric primitives built on [`Framebuffer::set_pixel`].
//!
//! All coordinates are signed so shapes may hang off the frame; the
//! off-frame part is clipped. Any `i32` coordinates are accepted, and only
//! the on-frame part of a shape is iterated.

use embedded_graphics::pixelcolor::BinaryColor;

use crate::framebuffer::{Framebuffer, HEIGHT, WIDTH};

const MAX_X: i64 = WIDTH as i64 - 1;
const MAX_Y: i64 = HEIGHT as i64 - 1;

/// Fill the rectangle spanning `(x1, y1)`–`(x2, y2)`, both corners included.
///
/// An inverted range (`x1 > x2` or `y1 > y2`) draws nothing.
pub fn draw_box(fb: &mut Framebuffer, x1: i32, y1: i32, x2: i32, y2: i32, color: BinaryColor) {
    for y in y1.max(0)..=y2.min(MAX_Y as i32) {
        for x in x1.max(0)..=x2.min(MAX_X as i32) {
            fb.set_pixel(x, y, color);
        }
    }
}

/// Fill a disk centred on `(cx, cy)`.
///
/// The radius is `diameter / 2`, so diameters 0 and 1 both give a single
/// pixel. A point `(dx, dy)` from the centre is inside when
/// `dx² + dy² <= radius²`.
pub fn draw_circle(fb: &mut Framebuffer, cx: i32, cy: i32, diameter: i32, color: BinaryColor) {
    stamp(fb, i64::from(cx), i64::from(cy), radius(diameter), color);
}

fn radius(diameter: i32) -> i64 {
    i64::from((diameter / 2).max(0))
}

/// The on-frame part of a filled disk. Only rows and columns inside the
/// frame are visited.
fn stamp(fb: &mut Framebuffer, cx: i64, cy: i64, radius: i64, color: BinaryColor) {
    let r2 = radius * radius;
    for y in (cy - radius).max(0)..=(cy + radius).min(MAX_Y) {
        for x in (cx - radius).max(0)..=(cx + radius).min(MAX_X) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r2 {
                // bounded by the frame above
                fb.set_pixel(x as i32, y as i32, color);
            }
        }
    }
}

/// Draw a line from `(x1, y1)` to `(x2, y2)` with Bresenham stepping.
///
/// Each visited point is stamped with a [`draw_circle`] of diameter
/// `thickness`, which gives the line its width. Both end points are always
/// drawn.
///
/// Only the stretch of the walk whose stamps can reach the frame is
/// stepped through; the accumulator is seeded at the first such point, so
/// the pixels drawn are the same as for a walk from `(x1, y1)`.
pub fn draw_line(
    fb: &mut Framebuffer,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    color: BinaryColor,
    thickness: i32,
) {
    let walk = Walk::new(x1, y1, x2, y2);
    let radius = radius(thickness);
    let Some((first, last)) = walk.visible_steps(radius) else {
        return;
    };

    let (mut x, mut y) = walk.point_at(first);
    let mut err = walk.error_at(x, y);
    for step in first..=last {
        stamp(fb, x, y, radius, color);
        if step == last {
            break;
        }
        let e2 = 2 * err;
        if e2 > -walk.dy {
            err -= walk.dy;
            x += walk.sx;
        }
        if e2 < walk.dx {
            err += walk.dx;
            y += walk.sy;
        }
    }
}

/// Integer line walk, in `i64` so that any pair of `i32` end points works.
///
/// With `err` starting at `dx - dy`, every step moves one unit along the
/// longer axis, and after `k` steps the shorter axis has moved
/// `(2·k·minor + major - 1) / (2·major)` (floored). That closed form lets
/// the walk start anywhere along the line.
struct Walk {
    x1: i64,
    y1: i64,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
}

impl Walk {
    fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (x1, y1, x2, y2) = (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));
        Self {
            x1,
            y1,
            dx: (x2 - x1).abs(),
            dy: (y2 - y1).abs(),
            sx: if x1 < x2 { 1 } else { -1 },
            sy: if y1 < y2 { 1 } else { -1 },
        }
    }

    /// Number of steps from start to end.
    fn steps(&self) -> i64 {
        self.dx.max(self.dy)
    }

    fn point_at(&self, step: i64) -> (i64, i64) {
        if self.dx >= self.dy {
            (
                self.x1 + self.sx * step,
                self.y1 + self.sy * minor_offset(step, self.dx, self.dy),
            )
        } else {
            (
                self.x1 + self.sx * minor_offset(step, self.dy, self.dx),
                self.y1 + self.sy * step,
            )
        }
    }

    /// Accumulator value the walk carries at `(x, y)`.
    fn error_at(&self, x: i64, y: i64) -> i64 {
        let moved_x = i128::from((x - self.x1).abs());
        let moved_y = i128::from((y - self.y1).abs());
        let (dx, dy) = (i128::from(self.dx), i128::from(self.dy));
        // stays within a few multiples of dx and dy
        (dx - dy + moved_y * dx - moved_x * dy) as i64
    }

    /// First and last step whose stamp of `radius` can touch the frame.
    fn visible_steps(&self, radius: i64) -> Option<(i64, i64)> {
        let (x_first, x_last) =
            self.axis_steps(|s| self.point_at(s).0, self.sx, -radius, MAX_X + radius);
        let (y_first, y_last) =
            self.axis_steps(|s| self.point_at(s).1, self.sy, -radius, MAX_Y + radius);
        let first = x_first.max(y_first);
        let last = x_last.min(y_last);
        (first <= last).then_some((first, last))
    }

    /// Steps where the monotonic coordinate `coord` lies in `lo..=hi`.
    fn axis_steps(
        &self,
        coord: impl Fn(i64) -> i64,
        direction: i64,
        lo: i64,
        hi: i64,
    ) -> (i64, i64) {
        let (lo, hi) = if direction > 0 { (lo, hi) } else { (-hi, -lo) };
        let first = partition_point(self.steps(), |s| direction * coord(s) >= lo);
        let last = partition_point(self.steps(), |s| direction * coord(s) > hi) - 1;
        (first, last)
    }
}

fn minor_offset(step: i64, major: i64, minor: i64) -> i64 {
    if major == 0 {
        return 0;
    }
    let (step, major, minor) = (i128::from(step), i128::from(major), i128::from(minor));
    // at most |minor|, which fits
    ((2 * step * minor + major - 1) / (2 * major)) as i64
}

/// Smallest step in `0..=last` where the monotonic `pred` holds, or
/// `last + 1` if it never does.
fn partition_point(last: i64, pred: impl Fn(i64) -> bool) -> i64 {
    let (mut lo, mut hi) = (0, last + 1);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}
