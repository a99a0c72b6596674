//! Screen-space clipping of projected triangles.
//!
//! Two strategies are offered, selected with [`ClipMode`]:
//!
//! - [`ClipMode::ScreenMembership`] only counts how many corners land inside
//!   the viewport. No new vertices are produced, so a triangle straddling
//!   the border is either drawn whole or dropped. This is the cheap legacy
//!   behaviour and leaves visible popping at the screen edges.
//! - [`ClipMode::Polygon`] runs Sutherland–Hodgman against the four viewport
//!   edges, interpolating depth, and hands the rasterizer the exact visible
//!   convex polygon.

use serde::Deserialize;

use crate::ScreenVertex;

/// Upper bound on the vertex count of a polygon produced by clipping a
/// triangle against a rectangle (3 + 4), rounded up.
pub const MAX_POLYGON_VERTICES: usize = 10;

/// How triangles touching the viewport border are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipMode {
    /// Submit a triangle only when all of its corners are on screen.
    ScreenMembership,
    /// Clip the triangle to the viewport rectangle.
    #[default]
    Polygon,
}

/// Whether `v` lies in `[0, width) × [0, height)`.
#[inline]
pub fn is_on_screen(v: &ScreenVertex, width: u32, height: u32) -> bool {
    v.x >= 0 && v.y >= 0 && (v.x as i64) < width as i64 && (v.y as i64) < height as i64
}

/// Copy the vertices that lie on screen into `kept` and return how many there were.
pub fn filter_on_screen(
    vertices: &[ScreenVertex],
    width: u32,
    height: u32,
    kept: &mut Vec<ScreenVertex>,
) -> usize {
    kept.clear();
    kept.extend(vertices.iter().filter(|v| is_on_screen(v, width, height)));
    kept.len()
}

type Point = [f64; 3];

/// Sutherland–Hodgman clipper with reusable scratch storage.
#[derive(Clone, Debug, Default)]
pub struct Clipper {
    front: Vec<Point>,
    back: Vec<Point>,
}

impl Clipper {
    pub fn new() -> Self {
        Self {
            front: Vec::with_capacity(MAX_POLYGON_VERTICES),
            back: Vec::with_capacity(MAX_POLYGON_VERTICES),
        }
    }

    /// Clip a convex polygon to `[0, width - 1] × [0, height - 1]`.
    ///
    /// The result is written to `output` in the input's winding order and
    /// is empty when nothing is visible.
    pub fn clip(
        &mut self,
        input: &[ScreenVertex],
        width: u32,
        height: u32,
        output: &mut Vec<ScreenVertex>,
    ) {
        output.clear();
        if width == 0 || height == 0 || input.len() < 3 {
            return;
        }

        // Fast path: nothing to cut.
        if input.iter().all(|v| is_on_screen(v, width, height)) {
            output.extend_from_slice(input);
            return;
        }

        let max_x = (width - 1) as f64;
        let max_y = (height - 1) as f64;

        self.front.clear();
        self.front
            .extend(input.iter().map(|v| [v.x as f64, v.y as f64, v.z as f64]));

        for (axis, bound, keep_greater) in [
            (0, 0.0, true),
            (0, max_x, false),
            (1, 0.0, true),
            (1, max_y, false),
        ] {
            clip_against_edge(&self.front, &mut self.back, axis, bound, keep_greater);
            std::mem::swap(&mut self.front, &mut self.back);
            if self.front.is_empty() {
                return;
            }
        }

        output.extend(self.front.iter().map(|p| ScreenVertex {
            x: p[0].round() as i32,
            y: p[1].round() as i32,
            z: p[2].round() as i32,
        }));
    }
}

fn clip_against_edge(
    input: &[Point],
    output: &mut Vec<Point>,
    axis: usize,
    bound: f64,
    keep_greater: bool,
) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let inside = |p: &Point| {
        if keep_greater {
            p[axis] >= bound
        } else {
            p[axis] <= bound
        }
    };

    let mut previous = last;
    for &current in input {
        match (inside(&previous), inside(&current)) {
            (true, true) => output.push(current),
            (true, false) => output.push(intersect(previous, current, axis, bound)),
            (false, true) => {
                output.push(intersect(previous, current, axis, bound));
                output.push(current);
            }
            (false, false) => {}
        }
        previous = current;
    }
}

fn intersect(a: Point, b: Point, axis: usize, bound: f64) -> Point {
    let t = (bound - a[axis]) / (b[axis] - a[axis]);
    let mut p = [
        a[0] + t * (b[0] - a[0]),
        a[1] + t * (b[1] - a[1]),
        a[2] + t * (b[2] - a[2]),
    ];
    p[axis] = bound;
    p
}
