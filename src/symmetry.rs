// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Most of the interesting maps are symmetric.  The Mandelbrot set of
//! any map with real coefficients is its own mirror image across the
//! real axis, and the Julia set of an even map is its own image under
//! `z -> -z`.  When a view straddles the axis of symmetry we only
//! compute one side and reflect the other.
//!
//! Reflection is done pixel for pixel, so it is only attempted when
//! the axis falls exactly on (or exactly between) rows and columns of
//! the raster.  Otherwise the whole view is computed.

use std::ops::Range;

use crate::planes::PlaneMapper;
use crate::raster::Raster;
use crate::squares::Area;
use num::Complex;

/// Which reflection the caller's map permits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Symmetry {
    /// Don't reflect anything.
    None,
    /// Mirror across the real axis: `f(conj z) = conj f(z)`.  Valid for
    /// Mandelbrot renders of maps with real coefficients.
    Conjugate,
    /// Reflect through the origin: `f(-z) = f(z)`.  Valid for Julia
    /// renders of even maps.
    Point,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Reflection {
    Identity,
    Vertical { my: usize },
    Point { mx: usize, my: usize },
}

// A fold of n samples about the index m / 2.  Every index outside
// `primary` has its mirror image m - i inside it.
#[derive(Clone, Debug, PartialEq)]
struct Fold {
    m: usize,
    primary: Range<usize>,
}

const ALIGNMENT: f64 = 1e-9;

impl Fold {
    fn new(n: usize, axis: f64) -> Option<Fold> {
        let twice = 2.0 * axis;
        let m = twice.round();
        if !m.is_finite() || (twice - m).abs() > ALIGNMENT {
            return None;
        }
        // The axis has to sit strictly between the first and last
        // samples, or there is nothing to reflect.
        if m < 1.0 || m > (2 * n) as f64 - 3.0 {
            return None;
        }
        let m = m as usize;
        let before = (m + 1) / 2;
        let after = m / 2 + 1;
        let primary = if before >= n - after {
            0..after
        } else {
            before..n
        };
        Some(Fold { m, primary })
    }

    fn secondary(&self, n: usize) -> Range<usize> {
        if self.primary.start == 0 {
            self.primary.end..n
        } else {
            0..self.primary.start
        }
    }
}

/// Which parts of a raster have to be computed, and how to fill in
/// the rest afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    width: usize,
    height: usize,
    areas: Vec<Area>,
    reflection: Reflection,
}

impl Plan {
    /// Compute everything.
    pub fn full(width: usize, height: usize) -> Plan {
        Plan {
            width,
            height,
            areas: vec![Area::new(0, 0, width, height)],
            reflection: Reflection::Identity,
        }
    }

    /// Work out the smallest set of areas that, together with their
    /// reflections, covers the raster exactly.
    pub fn new(mapper: &PlaneMapper, symmetry: Symmetry) -> Plan {
        let (width, height) = (mapper.width(), mapper.height());
        let (x_axis, y_axis) = mapper.point_to_coordinates(&Complex::new(0.0, 0.0));
        let plan = match symmetry {
            Symmetry::None => None,
            Symmetry::Conjugate => Fold::new(height, y_axis).map(|fy| Plan {
                width,
                height,
                areas: vec![Area::new(0, fy.primary.start, width, fy.primary.len())],
                reflection: Reflection::Vertical { my: fy.m },
            }),
            Symmetry::Point => match (Fold::new(width, x_axis), Fold::new(height, y_axis)) {
                (Some(fx), Some(fy)) => Some(Plan::point(width, height, fx.m, &fy)),
                _ => None,
            },
        };
        plan.unwrap_or_else(|| Plan::full(width, height))
    }

    // The longer half is computed in full.  The shorter half is a
    // point reflection of it wherever the reflected column still lies
    // inside the raster; the columns where it doesn't are a second,
    // independent area.
    fn point(width: usize, height: usize, mx: usize, fy: &Fold) -> Plan {
        let mut areas = vec![Area::new(0, fy.primary.start, width, fy.primary.len())];
        let rows = fy.secondary(height);
        let columns = if mx + 1 > width {
            0..mx + 1 - width
        } else {
            mx + 1..width
        };
        if !columns.is_empty() && !rows.is_empty() {
            areas.push(Area::new(columns.start, rows.start, columns.len(), rows.len()));
        }
        Plan {
            width,
            height,
            areas,
            reflection: Reflection::Point { mx, my: fy.m },
        }
    }

    /// The areas that have to be computed.  They never overlap.
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// True if nothing is reflected.
    pub fn is_full(&self) -> bool {
        self.reflection == Reflection::Identity
    }

    /// Number of pixels that are actually computed.
    pub fn computed(&self) -> usize {
        self.areas.iter().map(|a| a.len()).sum()
    }

    fn source(&self, x: usize, y: usize) -> (usize, usize) {
        match self.reflection {
            Reflection::Identity => (x, y),
            Reflection::Vertical { my } => (x, my - y),
            Reflection::Point { mx, my } => (mx - x, my - y),
        }
    }

    /// Fill in every pixel outside the computed areas from its mirror
    /// image.
    pub fn reconstruct(&self, raster: &mut Raster) {
        if self.is_full() {
            return;
        }
        for y in 0..self.height {
            for x in 0..self.width {
                if self.areas.iter().any(|a| a.contains(x, y)) {
                    continue;
                }
                let source = self.source(x, y);
                raster[(x, y)] = raster[source];
            }
        }
    }
}
