// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The parameters of the two kinds of render.  Once a render has
//! started these are never changed.

use num::Complex;

use crate::error::Error;
use crate::escape::{Escape, Family};
use crate::planes::ViewBounds;
use crate::symmetry::Symmetry;

/// Parameters for an escape-time boundary map (a Julia or Mandelbrot
/// image).
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryConfig {
    /// Whether pixels are starting points or parameters.
    pub family: Family,
    /// Give up on a pixel after this many iterations.
    pub max_iterations: usize,
    /// Iterations past escape, to smooth the continuous value.
    pub extra_iterations: usize,
    /// A point farther than this from the origin has escaped.
    pub magnitude_threshold: f64,
    /// The degree of the map.  Used by the continuous value only.
    pub exponent: f64,
    /// Number of worker threads.
    pub workers: usize,
    /// Each pixel is sampled `oversample * oversample` times.
    pub oversample: usize,
    /// Start the square decomposition this many halvings below the
    /// largest square that fits.
    pub size_offset: u32,
    /// The reflection the map permits, if any.
    pub symmetry: Symmetry,
    /// Trace square borders before filling them.  When off, every
    /// pixel is evaluated.
    pub boundary_tracing: bool,
    /// A human readable description of the map, for file names and
    /// logs.
    pub label: Option<String>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        BoundaryConfig {
            family: Family::Mandelbrot,
            max_iterations: 30,
            extra_iterations: 2,
            magnitude_threshold: 2.0,
            exponent: 2.0,
            workers: num_cpus::get(),
            oversample: 1,
            size_offset: 2,
            symmetry: Symmetry::None,
            boundary_tracing: true,
            label: None,
        }
    }
}

impl BoundaryConfig {
    /// A Julia render with parameter `c`.
    pub fn julia(c: Complex<f64>) -> Self {
        BoundaryConfig {
            family: Family::Julia(c),
            ..BoundaryConfig::default()
        }
    }

    /// A Mandelbrot render.
    pub fn mandelbrot() -> Self {
        BoundaryConfig::default()
    }

    /// Check that a render with these parameters makes sense.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_iterations == 0 {
            return Err(Error::config("max_iterations must be at least 1"));
        }
        if !(self.magnitude_threshold > 0.0) || !self.magnitude_threshold.is_finite() {
            return Err(Error::config(format!(
                "magnitude_threshold must be a positive number, not {}",
                self.magnitude_threshold
            )));
        }
        if !(self.exponent > 1.0) || !self.exponent.is_finite() {
            return Err(Error::config(format!(
                "exponent must be greater than 1, not {}",
                self.exponent
            )));
        }
        if self.workers == 0 {
            return Err(Error::config("workers must be at least 1"));
        }
        if self.oversample == 0 {
            return Err(Error::config("oversample must be at least 1"));
        }
        Ok(())
    }

    /// The escape-time knobs.
    pub fn escape(&self) -> Escape {
        Escape {
            max_iterations: self.max_iterations,
            extra_iterations: self.extra_iterations,
            threshold: self.magnitude_threshold,
            exponent: self.exponent,
        }
    }
}

/// Parameters for an orbit-density (Buddhabrot) render.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitConfig {
    /// Seeds to draw, as a fraction of the number of pixels.
    pub seed_fraction: f64,
    /// Orbits that escape at or before this step are not plotted.
    pub settle_threshold: usize,
    /// Orbits still in view after this many steps are not plotted.
    pub max_iterations: usize,
    /// Number of worker threads.
    pub workers: usize,
    /// Seed for the random number generator.  `None` draws from the
    /// operating system, and no two renders will be the same.
    pub rng_seed: Option<u64>,
    /// Where seeds are drawn from.  Defaults to the view itself.
    pub sample_bounds: Option<ViewBounds>,
    /// Skip seeds inside the main cardioid and the period-2 disk.
    /// Those regions are bounded for `z^2 + c` only; turn this off for
    /// any other map.
    pub reject_known_bounded: bool,
    /// A human readable description, for file names and logs.
    pub label: Option<String>,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        OrbitConfig {
            seed_fraction: 0.5,
            settle_threshold: 100,
            max_iterations: 2000,
            workers: num_cpus::get(),
            rng_seed: None,
            sample_bounds: None,
            reject_known_bounded: true,
            label: None,
        }
    }
}

impl OrbitConfig {
    /// Check that a render with these parameters makes sense.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.seed_fraction >= 0.0) || !self.seed_fraction.is_finite() {
            return Err(Error::config(format!(
                "seed_fraction must be a non-negative number, not {}",
                self.seed_fraction
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::config("max_iterations must be at least 1"));
        }
        if self.settle_threshold >= self.max_iterations {
            return Err(Error::config(format!(
                "settle_threshold ({}) must be below max_iterations ({})",
                self.settle_threshold, self.max_iterations
            )));
        }
        if self.workers == 0 {
            return Err(Error::config("workers must be at least 1"));
        }
        Ok(())
    }
}
