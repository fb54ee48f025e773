// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Boundary tracing.  Escape-time fields are, for all practical
//! purposes, continuous: if every pixel on the border of a square is
//! bounded, the inside of the square almost certainly is too, and we
//! don't bother to look.  If any border pixel escapes, the square is
//! split into quadrants and each quadrant gets the same treatment.
//!
//! This is a heuristic.  An island of escaping pixels that is
//! entirely surrounded by a bounded border will not be drawn.

use num::Complex;

use crate::escape::{Escape, Family, IterationMap};
use crate::planes::{Pixel, PlaneMapper};
use crate::raster::Raster;
use crate::squares::{Area, TraceRegion};

#[derive(Copy, Clone, Debug, PartialEq)]
enum Cell {
    Unknown,
    Bounded,
    Escaped(f64),
}

/// What a trace has learned about the pixels of one square.  A pixel
/// is evaluated at most once; after that every recursive call reads
/// the recorded answer.
#[derive(Clone, Debug)]
pub struct PixelResult {
    origin: TraceRegion,
    cells: Vec<Cell>,
    evaluations: usize,
}

impl PixelResult {
    fn new(origin: TraceRegion) -> Self {
        PixelResult {
            origin,
            cells: vec![Cell::Unknown; origin.area()],
            evaluations: 0,
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        (y - self.origin.y) * self.origin.size + (x - self.origin.x)
    }

    /// How many pixels were actually run through the map.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// True if the pixel was evaluated during the trace.
    pub fn is_checked(&self, pixel: &Pixel) -> bool {
        self.cells[self.index(pixel.0, pixel.1)] != Cell::Unknown
    }

    /// The pixels that escaped, with their continuous values.
    pub fn escaped<'a>(&'a self) -> impl Iterator<Item = (Pixel, f64)> + 'a {
        let TraceRegion { x, y, size } = self.origin;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| match *cell {
            Cell::Escaped(v) => Some((Pixel(x + i % size, y + i / size), v)),
            _ => None,
        })
    }
}

/// Everything a worker needs to trace squares: the plane, the map,
/// how to seed it, when to give up, and the sub-pixel offset of the
/// current oversampling pass.
pub struct Tracer<'a, M: IterationMap + ?Sized> {
    mapper: &'a PlaneMapper,
    map: &'a M,
    family: Family,
    escape: Escape,
    offset: (f64, f64),
}

impl<'a, M: IterationMap + ?Sized> Tracer<'a, M> {
    /// Constructor.  `offset` is added to every pixel coordinate
    /// before it's mapped onto the complex plane.
    pub fn new(
        mapper: &'a PlaneMapper,
        map: &'a M,
        family: Family,
        escape: Escape,
        offset: (f64, f64),
    ) -> Self {
        Tracer {
            mapper,
            map,
            family,
            escape,
            offset,
        }
    }

    fn point(&self, x: usize, y: usize) -> Complex<f64> {
        self.mapper
            .subpixel_to_point(x as f64 + self.offset.0, y as f64 + self.offset.1)
    }

    /// The continuous escape value of a single pixel, or 0 if it
    /// never escaped.
    pub fn evaluate(&self, x: usize, y: usize) -> f64 {
        self.escape.evaluate(self.map, &self.family, self.point(x, y)).1
    }

    // Look the pixel up, evaluating it if nobody has yet.  True if it
    // escaped.
    fn sample(&self, result: &mut PixelResult, x: usize, y: usize) -> bool {
        let index = result.index(x, y);
        if result.cells[index] == Cell::Unknown {
            let (i, value) = self.escape.evaluate(self.map, &self.family, self.point(x, y));
            result.evaluations += 1;
            result.cells[index] = if i == 0 {
                Cell::Bounded
            } else {
                Cell::Escaped(value)
            };
        }
        match result.cells[index] {
            Cell::Escaped(_) => true,
            _ => false,
        }
    }

    /// Trace one square.  Returns what was learned about its pixels,
    /// and appends to `refined` every square whose border was found to
    /// escape (plus every single pixel evaluated on its own).
    pub fn trace_square(&self, square: &TraceRegion, refined: &mut Vec<TraceRegion>) -> PixelResult {
        let mut result = PixelResult::new(*square);
        self.refine(&mut result, refined, square.x, square.y, square.size);
        result
    }

    fn refine(
        &self,
        result: &mut PixelResult,
        refined: &mut Vec<TraceRegion>,
        x0: usize,
        y0: usize,
        size: usize,
    ) {
        if size == 1 {
            if !result.is_checked(&Pixel(x0, y0)) {
                self.sample(result, x0, y0);
                refined.push(TraceRegion::new(x0, y0, 1));
            }
            return;
        }

        // Left, right, top, bottom; every corner is visited once.
        let last = size - 1;
        let left = (0..last).map(|i| (x0, y0 + i));
        let right = (1..size).map(|i| (x0 + last, y0 + i));
        let top = (1..size).map(|i| (x0 + i, y0));
        let bottom = (0..last).map(|i| (x0 + i, y0 + last));
        let escaped = left
            .chain(right)
            .chain(top)
            .chain(bottom)
            .any(|(x, y)| self.sample(result, x, y));
        if !escaped {
            return;
        }

        refined.push(TraceRegion::new(x0, y0, size));
        let half = size / 2;
        for &(dx, dy) in &[(0, 0), (half, 0), (0, half), (half, half)] {
            self.refine(result, refined, x0 + dx, y0 + dy, half);
        }
    }

    /// Trace a square and write its escaped pixels into a raster that
    /// covers the whole plane.
    pub fn trace(&self, square: &TraceRegion, raster: &mut Raster, refined: &mut Vec<TraceRegion>) {
        let result = self.trace_square(square, refined);
        for (Pixel(x, y), value) in result.escaped() {
            raster[(x, y)] = value;
        }
    }

    /// Evaluate every pixel of a square with no tracing at all.
    pub fn fill(&self, square: &TraceRegion, raster: &mut Raster) {
        self.fill_area(&Area::new(square.x, square.y, square.size, square.size), raster);
    }

    /// Evaluate every pixel of an area with no tracing at all.  This
    /// is the reference the tracer is measured against.
    pub fn fill_area(&self, area: &Area, raster: &mut Raster) {
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                raster[(x, y)] = self.evaluate(x, y);
            }
        }
    }
}
