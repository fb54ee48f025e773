// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time iteration.  A point map is applied over and over to a
//! seed until the result is farther from the origin than a threshold,
//! or until we run out of patience.  How long it took to escape,
//! refined into a fractional value, is what gets drawn.

use num::Complex;

/// A point map `(z, c) -> z'`.  It must be a pure function: the same
/// inputs always give the same output, and nothing else is touched.
/// Workers call it concurrently.
pub trait IterationMap: Sync {
    /// Apply the map once.
    fn apply(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64>;
}

impl<F> IterationMap for F
where
    F: Fn(Complex<f64>, Complex<f64>) -> Complex<f64> + Sync,
{
    fn apply(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        self(z, c)
    }
}

/// The classic family `z^degree + c`.  Degree 2 is the Mandelbrot
/// set; higher degrees give the multibrots.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Polynomial {
    /// The power `z` is raised to.  Zero is treated as one.
    pub degree: u32,
}

impl Polynomial {
    /// A `z^degree + c` map.
    pub fn new(degree: u32) -> Self {
        Polynomial { degree }
    }

    /// The growth rate used by the continuous escape value.
    pub fn exponent(&self) -> f64 {
        f64::from(self.degree.max(2))
    }
}

impl IterationMap for Polynomial {
    fn apply(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        let mut w = z;
        for _ in 1..self.degree.max(1) {
            w = w * z;
        }
        w + c
    }
}

/// Which of the two classic ways of feeding a pixel to the map to use.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Family {
    /// Every pixel is a starting point `z`, and `c` is fixed.
    Julia(Complex<f64>),
    /// Every pixel is a parameter `c`, and `z` starts at zero.
    Mandelbrot,
}

impl Family {
    /// Split a pixel's point into the `(z0, c)` pair to iterate.
    pub fn seed(&self, point: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        match *self {
            Family::Julia(c) => (point, c),
            Family::Mandelbrot => (Complex::new(0.0, 0.0), point),
        }
    }
}

/// The knobs of a single escape-time evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escape {
    /// Give up on a seed after this many applications of the map.
    pub max_iterations: usize,
    /// Applications of the map after escape, to sharpen the
    /// continuous value.
    pub extra_iterations: usize,
    /// A point farther than this from the origin has escaped.
    pub threshold: f64,
    /// The degree of the map, which sets how fast escaping orbits grow.
    pub exponent: f64,
}

impl Escape {
    /// Iterate from `z` with parameter `c`.  Returns the last value of
    /// `z` and the (1-based) iteration at which it escaped, or zero if
    /// it never did.
    pub fn iterate<M: IterationMap + ?Sized>(
        &self,
        map: &M,
        z: Complex<f64>,
        c: Complex<f64>,
    ) -> (Complex<f64>, usize) {
        let limit = self.threshold * self.threshold;
        let mut z = z;
        for i in 1..=self.max_iterations {
            z = map.apply(z, c);
            if z.norm_sqr() > limit {
                for _ in 0..self.extra_iterations {
                    z = map.apply(z, c);
                }
                return (z, i);
            }
        }
        (z, 0)
    }

    /// The fractional escape value of an iteration result.  Bounded
    /// results, and results that work out to nothing positive, are 0.
    pub fn continuous(&self, z: Complex<f64>, i: usize) -> f64 {
        if i == 0 {
            return 0.0;
        }
        let value = i as f64 + 0.5 - z.norm().ln().ln() / self.exponent.ln();
        if value > 0.0 {
            value
        } else {
            0.0
        }
    }

    /// Run a pixel's point through the map.  Returns the iteration
    /// sentinel together with the continuous value.
    pub fn evaluate<M: IterationMap + ?Sized>(
        &self,
        map: &M,
        family: &Family,
        point: Complex<f64>,
    ) -> (usize, f64) {
        let (z, c) = family.seed(point);
        let (z, i) = self.iterate(map, z, c);
        (i, self.continuous(z, i))
    }
}
