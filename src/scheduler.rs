// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Boundary-map rendering.  The view is reduced by symmetry, the
//! areas that remain are cut into squares, and the squares are dealt
//! out to the workers.  Every oversampling pass is one round of the
//! pool; the workers' rasters are summed into the running total, and
//! once the last pass is in the reflected pixels are filled.

use std::time::Instant;

use itertools::iproduct;
use log::{debug, info};

use crate::config::BoundaryConfig;
use crate::error::Error;
use crate::escape::IterationMap;
use crate::planes::PlaneMapper;
use crate::pool;
use crate::raster::Raster;
use crate::squares::{decompose_area, TraceRegion};
use crate::symmetry::Plan;
use crate::tracer::Tracer;

/// A finished boundary map.
#[derive(Clone, Debug)]
pub struct BoundaryMap {
    /// Accumulated continuous escape values, summed over every
    /// oversampling pass.
    pub raster: Raster,
    /// The squares the tracer had to look inside during the first
    /// pass, for drawing diagnostic overlays.
    pub refined: Vec<TraceRegion>,
}

/// The sub-pixel offsets of every pass: an `oversample` x
/// `oversample` grid, `1 / oversample` apart, centred on the pixel.
/// A single pass samples the pixel itself.
pub fn offsets(oversample: usize) -> Vec<(f64, f64)> {
    let n = oversample.max(1);
    let at = |k: usize| (k as f64 + 0.5) / (n as f64) - 0.5;
    iproduct!(0..n, 0..n).map(|(i, j)| (at(i), at(j))).collect()
}

/// Render a boundary map of the whole plane described by `mapper`.
pub fn render<M>(mapper: &PlaneMapper, map: &M, config: &BoundaryConfig) -> Result<BoundaryMap, Error>
where
    M: IterationMap + ?Sized,
{
    config.validate()?;
    let (width, height) = (mapper.width(), mapper.height());
    let plan = Plan::new(mapper, config.symmetry);
    let squares: Vec<TraceRegion> = plan
        .areas()
        .iter()
        .flat_map(|area| decompose_area(area, config.size_offset))
        .collect();
    let escape = config.escape();
    let workers = config.workers;

    info!(
        "boundary map {}: {}x{}, {} of {} pixels computed in {} squares, {} workers, {} passes, {} iterations",
        config.label.as_ref().map(|s| s.as_str()).unwrap_or("(unlabelled)"),
        width,
        height,
        plan.computed(),
        mapper.len(),
        squares.len(),
        workers,
        config.oversample * config.oversample,
        config.max_iterations
    );
    let start = Instant::now();

    let mut accumulator = Raster::new(width, height);
    let mut refined: Vec<TraceRegion> = vec![];
    for (pass, offset) in offsets(config.oversample).into_iter().enumerate() {
        let partials = pool::scatter(workers, |worker| {
            let tracer = Tracer::new(mapper, map, config.family, escape, offset);
            let mut raster = Raster::new(width, height);
            let mut regions = vec![];
            for square in pool::stride(&squares, worker, workers) {
                if config.boundary_tracing {
                    tracer.trace(square, &mut raster, &mut regions);
                } else {
                    tracer.fill(square, &mut raster);
                }
            }
            (raster, regions)
        })?;

        for (raster, regions) in partials {
            accumulator.accumulate(&raster);
            if pass == 0 {
                refined.extend(regions);
            }
        }
        debug!(
            "pass {} at offset ({:.3}, {:.3}) merged after {:.2?}",
            pass + 1,
            offset.0,
            offset.1,
            start.elapsed()
        );
    }

    plan.reconstruct(&mut accumulator);
    info!("boundary map finished in {:.2?}", start.elapsed());
    Ok(BoundaryMap {
        raster: accumulator,
        refined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::Family;
    use crate::planes::ViewBounds;
    use crate::symmetry::Symmetry;
    use num::Complex;

    fn quadratic(z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        z * z + c
    }

    fn mapper(w: usize, h: usize, real: (f64, f64), imag: (f64, f64)) -> PlaneMapper {
        PlaneMapper::new(w, h, ViewBounds::new(real, imag).unwrap()).unwrap()
    }

    fn config(workers: usize, oversample: usize) -> BoundaryConfig {
        BoundaryConfig {
            max_iterations: 40,
            workers,
            oversample,
            ..BoundaryConfig::default()
        }
    }

    #[test]
    fn offsets_are_centred_on_the_pixel() {
        assert_eq!(offsets(1), vec![(0.0, 0.0)]);
        assert_eq!(
            offsets(2),
            vec![(-0.25, -0.25), (-0.25, 0.25), (0.25, -0.25), (0.25, 0.25)]
        );
        let three = offsets(3);
        assert_eq!(three.len(), 9);
        let sum: f64 = three.iter().map(|o| o.0 + o.1).sum();
        assert!(sum.abs() < 1e-12);
    }

    #[test]
    fn worker_count_does_not_change_the_raster() {
        let pm = mapper(40, 30, (-2.0, 1.0), (-1.2, 1.05));
        let one = render(&pm, &quadratic, &config(1, 1)).unwrap();
        let many = render(&pm, &quadratic, &config(5, 1)).unwrap();
        assert_eq!(one.raster, many.raster);
    }

    #[test]
    fn oversampling_accumulates_passes() {
        let pm = mapper(16, 16, (2.5, 3.5), (2.5, 3.5));
        // Everything escapes on the first step, so every pass adds a
        // positive value to every pixel.
        let single = BoundaryConfig {
            extra_iterations: 0,
            ..config(2, 1)
        };
        let double = BoundaryConfig {
            oversample: 2,
            ..single.clone()
        };
        let single = render(&pm, &quadratic, &single).unwrap();
        let double = render(&pm, &quadratic, &double).unwrap();
        assert!(single.raster.as_slice().iter().all(|&v| v > 0.0));
        let total: f64 = double.raster.as_slice().iter().sum();
        let once: f64 = single.raster.as_slice().iter().sum();
        assert!(total > 3.0 * once);
    }

    #[test]
    fn tracing_off_evaluates_every_pixel() {
        let pm = mapper(24, 24, (-0.6, 0.0), (0.3, 0.9));
        let mut brute = config(3, 1);
        brute.boundary_tracing = false;
        let traced = render(&pm, &quadratic, &config(3, 1)).unwrap();
        let brute = render(&pm, &quadratic, &brute).unwrap();
        assert!(brute.refined.is_empty());
        for (t, b) in traced.raster.as_slice().iter().zip(brute.raster.as_slice()) {
            assert!(*t == 0.0 || t == b);
        }
    }

    #[test]
    fn symmetric_render_matches_full_render() {
        let pm = mapper(30, 21, (-2.0, 1.0), (-1.25, 1.25));
        let mut full = config(4, 1);
        full.boundary_tracing = false;
        let mut mirrored = full.clone();
        mirrored.symmetry = Symmetry::Conjugate;
        let full = render(&pm, &quadratic, &full).unwrap();
        let mirrored = render(&pm, &quadratic, &mirrored).unwrap();
        assert_eq!(full.raster, mirrored.raster);
    }

    #[test]
    fn julia_symmetric_render_matches_full_render() {
        let pm = mapper(11, 9, (-1.5, 1.0), (-0.75, 1.25));
        let mut full = config(2, 2);
        full.family = Family::Julia(Complex::new(-0.8, 0.156));
        full.boundary_tracing = false;
        let mut mirrored = full.clone();
        mirrored.symmetry = Symmetry::Point;
        let full = render(&pm, &quadratic, &full).unwrap();
        let mirrored = render(&pm, &quadratic, &mirrored).unwrap();
        for (a, b) in full.raster.as_slice().iter().zip(mirrored.raster.as_slice()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn refined_regions_come_from_the_first_pass() {
        let pm = mapper(16, 16, (2.5, 3.5), (2.5, 3.5));
        let mut c = config(2, 2);
        c.size_offset = 0;
        let result = render(&pm, &quadratic, &c).unwrap();
        assert_eq!(result.refined[0], TraceRegion::new(0, 0, 16));
        assert_eq!(result.refined.iter().filter(|r| r.size == 16).count(), 1);
    }

    #[test]
    fn a_panicking_map_fails_the_render() {
        let pm = mapper(8, 8, (-2.0, 1.0), (-1.0, 1.0));
        let bomb = |_z: Complex<f64>, _c: Complex<f64>| -> Complex<f64> { panic!("boom") };
        assert_eq!(
            render(&pm, &bomb, &config(2, 1)).unwrap_err(),
            Error::Worker
        );
    }

    #[test]
    fn invalid_configuration_is_rejected_up_front() {
        let pm = mapper(8, 8, (-2.0, 1.0), (-1.0, 1.0));
        assert!(render(&pm, &quadratic, &config(0, 1)).is_err());
        assert!(render(&pm, &quadratic, &config(1, 0)).is_err());
    }
}
