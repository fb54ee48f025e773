#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fractal renderer
//!
//! Two kinds of picture come out of this crate.  The first is the
//! familiar one: take a point on the complex plane, apply a map to it
//! over and over, and measure how quickly it runs off to infinity.
//! That "velocity", smoothed into a fractional value, is the number
//! drawn at each pixel.  Points that never escape are left at zero.
//! Depending on whether the pixel is the starting point or the
//! parameter of the map, the result is a Julia set or a Mandelbrot
//! set.
//!
//! Almost all of the work in such a picture goes into the points that
//! never escape, and those come in large connected blobs.  So rather
//! than evaluating every pixel, the image is cut into squares, and
//! only the border of each square is evaluated.  If the border is
//! entirely bounded, so is the inside; otherwise the square is split
//! into four and we try again.  When the view straddles an axis of
//! symmetry, only one side is computed at all.
//!
//! The second kind of picture is the Buddhabrot.  Instead of asking
//! how fast a point escapes, we follow the orbit of every escaping
//! point and count how many times each pixel is visited along the
//! way.
//!
//! Both kinds produce a raw raster of numbers; `normalize` turns that
//! into intensities between 0 and 1, ready to be written out as an
//! image.

pub mod config;
pub mod error;
pub mod escape;
pub mod normalize;
pub mod orbits;
pub mod overlay;
pub mod planes;
pub mod pool;
pub mod raster;
pub mod scheduler;
pub mod squares;
pub mod symmetry;
pub mod tracer;

pub use crate::config::{BoundaryConfig, OrbitConfig};
pub use crate::error::Error;
pub use crate::escape::{Escape, Family, IterationMap, Polynomial};
pub use crate::normalize::{normalize, quantize, BitDepth};
pub use crate::planes::{PlaneMapper, ViewBounds};
pub use crate::raster::{OrbitHistogram, Raster};
pub use crate::scheduler::BoundaryMap;
pub use crate::squares::TraceRegion;
pub use crate::symmetry::Symmetry;

/// Render the escape-time boundary map of `map` over `bounds`, as a
/// `width` x `height` raster.  Bounded pixels are zero; escaping
/// pixels hold their continuous escape value, summed over every
/// oversampling pass.
pub fn compute_boundary_map<M>(
    bounds: ViewBounds,
    (width, height): (usize, usize),
    map: &M,
    config: &BoundaryConfig,
) -> Result<BoundaryMap, Error>
where
    M: IterationMap + ?Sized,
{
    let mapper = PlaneMapper::new(width, height, bounds)?;
    scheduler::render(&mapper, map, config)
}

/// Render the orbit density (Buddhabrot) of `map` over `bounds`, as a
/// `width` x `height` histogram of visit counts.
pub fn compute_orbit_density<M>(
    bounds: ViewBounds,
    (width, height): (usize, usize),
    map: &M,
    config: &OrbitConfig,
) -> Result<OrbitHistogram, Error>
where
    M: IterationMap + ?Sized,
{
    let mapper = PlaneMapper::new(width, height, bounds)?;
    orbits::render(&mapper, map, config)
}
