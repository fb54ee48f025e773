// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Buddhabrot.  Instead of colouring a point by how fast it
//! escapes, we follow the orbit of every escaping point and count how
//! often each pixel is visited along the way.
//!
//! Seeds are drawn at random.  For the quadratic map they can skip the
//! main cardioid and the period-2 disk: both are known to be bounded,
//! so their orbits never escape and would only waste time.  Other maps
//! have other bounded regions, and for them every candidate is kept.
//! The seeds are drawn up front, on
//! the calling thread, and dealt out to the workers; the workers
//! themselves never touch the random number generator.

use std::time::Instant;

use log::{debug, info};
use num::Complex;
use rand::distributions::{Distribution, Uniform};
use rand::prelude::*;

use crate::config::OrbitConfig;
use crate::error::Error;
use crate::escape::IterationMap;
use crate::planes::{PlaneMapper, ViewBounds};
use crate::pool;
use crate::raster::OrbitHistogram;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;

// Candidates drawn per requested seed before the sampler gives up.
const ATTEMPTS_PER_SEED: usize = 1000;

/// As I understand it, the two halves of the `and` expression
/// represent false if the point is guaranteed to be inside the
/// mandelbrot set: the first is the main cardioid, the second the
/// disk of the period-2 bulb.  It does *not* guarantee that a point
/// will be outside, however; there are plenty of points inside the
/// set for which this returns true.
pub fn maybe_outside(point: Complex<f64>) -> bool {
    let y = point.im * point.im;
    let q = y + (point.re - D4) * (point.re - D4);
    q * (q + point.re - D4) > (y * D4) && (point.re + 1.0_f64) * (point.re + 1.0_f64) + y > D16
}

/// A stream of uniformly distributed candidate points inside a view.
pub struct SeedStream {
    re: Uniform<f64>,
    im: Uniform<f64>,
    rng: StdRng,
}

impl SeedStream {
    /// Candidates from inside `bounds`.  With a seed the stream is
    /// reproducible; without one it is seeded from the operating
    /// system.
    pub fn new(bounds: &ViewBounds, seed: Option<u64>) -> Self {
        let (re, im) = (bounds.real(), bounds.imag());
        SeedStream {
            re: Uniform::new(re.0, re.1),
            im: Uniform::new(im.0, im.1),
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        }
    }

    /// The next candidate, accepted or not.
    pub fn candidate(&mut self) -> Complex<f64> {
        Complex::new(self.re.sample(&mut self.rng), self.im.sample(&mut self.rng))
    }

    /// Draw `count` seeds.  With `reject_known_bounded`, every
    /// candidate inside the quadratic map's cardioid or period-2 disk
    /// is skipped, and the sampler gives up, rather than spinning
    /// forever, if the view lies almost entirely inside them.
    pub fn seeds(
        &mut self,
        count: usize,
        reject_known_bounded: bool,
    ) -> Result<Vec<Complex<f64>>, Error> {
        let budget = count.saturating_mul(ATTEMPTS_PER_SEED).max(ATTEMPTS_PER_SEED);
        let mut seeds = Vec::with_capacity(count);
        let mut attempts = 0;
        while seeds.len() < count {
            if attempts == budget {
                return Err(Error::Sampling {
                    accepted: seeds.len(),
                    requested: count,
                });
            }
            attempts += 1;
            let c = self.candidate();
            if !reject_known_bounded || maybe_outside(c) {
                seeds.push(c);
            }
        }
        debug!("accepted {} seeds from {} candidates", count, attempts);
        Ok(seeds)
    }
}

// Follow one orbit from z = 0.  Every step that lands in view is
// remembered; the first step out of view ends the orbit, and if that
// happened after the settle threshold and before the iteration limit,
// the remembered pixels are counted.  Orbits that never leave are
// thrown away.
fn plot<M: IterationMap + ?Sized>(
    mapper: &PlaneMapper,
    map: &M,
    c: Complex<f64>,
    settle: usize,
    max_iterations: usize,
    visited: &mut Vec<usize>,
    cells: &mut [u32],
) {
    visited.clear();
    let mut z = Complex::new(0.0, 0.0);
    for step in 1..=max_iterations {
        z = map.apply(z, c);
        match mapper.point_to_offset(&z) {
            Some(offset) => visited.push(offset),
            None => {
                if settle < step && step < max_iterations {
                    for &offset in visited.iter() {
                        cells[offset] = cells[offset].saturating_add(1);
                    }
                }
                return;
            }
        }
    }
}

/// Plot the orbits of a fixed set of seeds.  Seed `i` goes to worker
/// `i % workers`; each worker fills its own histogram and the
/// histograms are summed, so the result doesn't depend on the number
/// of workers.
pub fn accumulate<M>(
    mapper: &PlaneMapper,
    map: &M,
    seeds: &[Complex<f64>],
    settle: usize,
    max_iterations: usize,
    workers: usize,
) -> Result<OrbitHistogram, Error>
where
    M: IterationMap + ?Sized,
{
    let (width, height) = (mapper.width(), mapper.height());
    let partials = pool::scatter(workers, |worker| {
        let mut histogram = OrbitHistogram::new(width, height);
        let mut visited = Vec::with_capacity(max_iterations);
        for &c in pool::stride(seeds, worker, workers) {
            plot(
                mapper,
                map,
                c,
                settle,
                max_iterations,
                &mut visited,
                histogram.as_mut_slice(),
            );
        }
        histogram
    })?;

    let mut histogram = OrbitHistogram::new(width, height);
    for partial in &partials {
        histogram.accumulate(partial);
    }
    Ok(histogram)
}

/// Render an orbit-density histogram of the plane described by
/// `mapper`.
pub fn render<M>(mapper: &PlaneMapper, map: &M, config: &OrbitConfig) -> Result<OrbitHistogram, Error>
where
    M: IterationMap + ?Sized,
{
    config.validate()?;
    let bounds = config.sample_bounds.unwrap_or(mapper.bounds);
    let count = (config.seed_fraction * mapper.len() as f64).round() as usize;
    let start = Instant::now();

    let seeds =
        SeedStream::new(&bounds, config.rng_seed).seeds(count, config.reject_known_bounded)?;
    info!(
        "orbit density {}: {}x{}, {} seeds, settle {}, {} iterations, {} workers",
        config.label.as_ref().map(|s| s.as_str()).unwrap_or("(unlabelled)"),
        mapper.width(),
        mapper.height(),
        seeds.len(),
        config.settle_threshold,
        config.max_iterations,
        config.workers
    );

    let histogram = accumulate(
        mapper,
        map,
        &seeds,
        config.settle_threshold,
        config.max_iterations,
        config.workers,
    )?;
    info!(
        "orbit density finished in {:.2?}: {} visits recorded",
        start.elapsed(),
        histogram.total()
    );
    Ok(histogram)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        z * z + c
    }

    fn mapper(w: usize, h: usize) -> PlaneMapper {
        PlaneMapper::new(w, h, ViewBounds::new((-2.0, 2.0), (-2.0, 2.0)).unwrap()).unwrap()
    }

    fn cubic(z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        z * z * z + c
    }

    fn histogram(c: f64, settle: usize, max_iterations: usize) -> OrbitHistogram {
        let seeds = [Complex::new(c, 0.0)];
        accumulate(&mapper(5, 5), &quadratic, &seeds, settle, max_iterations, 1).unwrap()
    }

    #[test]
    fn known_bounded_regions_are_excluded() {
        assert!(!maybe_outside(Complex::new(0.0, 0.0)));
        assert!(!maybe_outside(Complex::new(0.2, 0.3)));
        assert!(!maybe_outside(Complex::new(-1.0, 0.0)));
        assert!(!maybe_outside(Complex::new(-1.1, 0.1)));
        assert!(maybe_outside(Complex::new(0.5, 0.0)));
        assert!(maybe_outside(Complex::new(-2.0, 0.0)));
        assert!(maybe_outside(Complex::new(-0.75, 0.5)));
    }

    #[test]
    fn seeds_come_from_the_bounds_and_outside_the_cardioid() {
        let bounds = ViewBounds::new((-2.0, 1.0), (-1.5, 1.5)).unwrap();
        let seeds = SeedStream::new(&bounds, Some(7)).seeds(500, true).unwrap();
        assert_eq!(seeds.len(), 500);
        assert!(seeds.iter().all(|c| bounds.contains(c) && maybe_outside(*c)));
    }

    #[test]
    fn seeded_streams_repeat() {
        let bounds = ViewBounds::new((-2.0, 2.0), (-2.0, 2.0)).unwrap();
        let a = SeedStream::new(&bounds, Some(99)).seeds(64, true).unwrap();
        let b = SeedStream::new(&bounds, Some(99)).seeds(64, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sampling_inside_the_cardioid_gives_up() {
        let bounds = ViewBounds::new((-0.2, 0.1), (-0.1, 0.1)).unwrap();
        let result = SeedStream::new(&bounds, Some(1)).seeds(10, true);
        assert_eq!(
            result,
            Err(Error::Sampling {
                accepted: 0,
                requested: 10
            })
        );
    }

    #[test]
    fn cardioid_seeds_are_kept_when_rejection_is_off() {
        let bounds = ViewBounds::new((-0.2, 0.1), (-0.1, 0.1)).unwrap();
        let seeds = SeedStream::new(&bounds, Some(1)).seeds(10, false).unwrap();
        assert_eq!(seeds.len(), 10);
        assert!(seeds.iter().all(|c| !maybe_outside(*c)));
    }

    #[test]
    fn cubic_orbits_from_the_quadratic_bulb_escape() {
        // -1 is in the quadratic period-2 disk, but under z^3 + c it
        // goes 0 -> -1 -> -2 -> -9.
        assert!(!maybe_outside(Complex::new(-1.0, 0.0)));
        let seeds = [Complex::new(-1.0, 0.0)];
        let h = accumulate(&mapper(5, 5), &cubic, &seeds, 0, 10, 1).unwrap();
        assert_eq!(h[(1, 2)], 1);
        assert_eq!(h[(0, 2)], 1);
        assert_eq!(h.total(), 2);
    }

    #[test]
    fn cubic_render_without_rejection_samples_the_bulb() {
        let config = OrbitConfig {
            seed_fraction: 4.0,
            settle_threshold: 0,
            max_iterations: 20,
            workers: 2,
            rng_seed: Some(5),
            sample_bounds: Some(ViewBounds::new((-1.2, -0.8), (-0.1, 0.1)).unwrap()),
            reject_known_bounded: false,
            ..OrbitConfig::default()
        };
        let pm = mapper(8, 8);
        assert!(render(&pm, &cubic, &config).unwrap().total() > 0);
        let rejecting = OrbitConfig {
            reject_known_bounded: true,
            ..config
        };
        assert!(render(&pm, &cubic, &rejecting).is_err());
    }

    #[test]
    fn escaping_orbit_is_plotted() {
        // 0 -> 1 -> 2 -> 5; the first two land on pixels (3, 2) and
        // (4, 2), the third leaves the view on step 3.
        let h = histogram(1.0, 0, 10);
        assert_eq!(h.total(), 2);
        assert_eq!(h[(3, 2)], 1);
        assert_eq!(h[(4, 2)], 1);
    }

    #[test]
    fn orbits_escaping_before_the_settle_threshold_are_dropped() {
        assert_eq!(histogram(1.0, 2, 10).total(), 2);
        assert_eq!(histogram(1.0, 3, 10).total(), 0);
    }

    #[test]
    fn orbits_escaping_on_the_last_step_are_dropped() {
        assert_eq!(histogram(1.0, 0, 4).total(), 2);
        assert_eq!(histogram(1.0, 0, 3).total(), 0);
        // Still in view when the budget runs out.
        assert_eq!(histogram(1.0, 0, 2).total(), 0);
    }

    #[test]
    fn bounded_orbits_are_dropped() {
        assert_eq!(histogram(-1.0, 0, 50).total(), 0);
    }

    #[test]
    fn repeat_visits_are_counted() {
        // 0.3 creeps up the real axis: three steps on pixel 2, eight on
        // pixel 3, one on pixel 4, and out on step 13.
        let h = histogram(0.3, 0, 50);
        assert_eq!(h[(2, 2)], 3);
        assert_eq!(h[(3, 2)], 8);
        assert_eq!(h[(4, 2)], 1);
        assert_eq!(h.total(), 12);
    }

    #[test]
    fn worker_count_does_not_change_the_histogram() {
        let bounds = ViewBounds::new((-2.0, 2.0), (-2.0, 2.0)).unwrap();
        let seeds = SeedStream::new(&bounds, Some(2024)).seeds(400, true).unwrap();
        let pm = mapper(16, 16);
        let one = accumulate(&pm, &quadratic, &seeds, 0, 50, 1).unwrap();
        for &workers in &[2, 3, 7] {
            let many = accumulate(&pm, &quadratic, &seeds, 0, 50, workers).unwrap();
            assert_eq!(one, many);
        }
        assert!(one.total() > 0);
    }

    #[test]
    fn seeded_renders_are_reproducible() {
        let config = OrbitConfig {
            settle_threshold: 0,
            max_iterations: 50,
            workers: 3,
            rng_seed: Some(17),
            ..OrbitConfig::default()
        };
        let pm = mapper(16, 16);
        let a = render(&pm, &quadratic, &config).unwrap();
        let b = render(&pm, &quadratic, &config).unwrap();
        assert_eq!(a, b);
        assert!(a.total() > 0);
    }

    #[test]
    fn empty_seed_fraction_renders_nothing() {
        let config = OrbitConfig {
            seed_fraction: 0.0,
            rng_seed: Some(3),
            ..OrbitConfig::default()
        };
        assert_eq!(render(&mapper(8, 8), &quadratic, &config).unwrap().total(), 0);
    }
}
