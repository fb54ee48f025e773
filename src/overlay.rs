// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A diagnostic picture of where the tracer had to work.  Every
//! refined square adds its side length to the pixels it covers, and
//! its outline is drawn brighter still, so large squares read as
//! flat, bright panels and the busy regions along the boundary as a
//! fine mesh.

use crate::error::Error;
use crate::raster::Raster;
use crate::squares::TraceRegion;

/// Paint the refined squares of a boundary map onto an empty raster of
/// the given size.  Any part of a square outside the raster is
/// ignored.
pub fn refined_regions(width: usize, height: usize, regions: &[TraceRegion]) -> Raster {
    let mut raster = Raster::new(width, height);
    let edge = (width.max(height) / 5) as f64;
    for region in regions {
        let last = region.size.saturating_sub(1);
        for i in 0..region.size {
            for j in 0..region.size {
                let (x, y) = (region.x + j, region.y + i);
                if x >= width || y >= height {
                    continue;
                }
                let mut paint = region.size as f64;
                if i == 0 || j == 0 || i == last || j == last {
                    paint += edge;
                }
                raster[(x, y)] += paint;
            }
        }
    }
    raster
}

/// Mix a normalized overlay into a normalized image: `weight` of the
/// overlay, `1 - weight` of the image.
pub fn blend(image: &Raster, overlay: &Raster, weight: f64) -> Result<Raster, Error> {
    if !(weight >= 0.0 && weight <= 1.0) {
        return Err(Error::config(format!(
            "overlay weight must be between 0 and 1, not {}",
            weight
        )));
    }
    if (image.width(), image.height()) != (overlay.width(), overlay.height()) {
        return Err(Error::config(format!(
            "overlay is {}x{} but the image is {}x{}",
            overlay.width(),
            overlay.height(),
            image.width(),
            image.height()
        )));
    }
    let mut out = image.clone();
    for (cell, over) in out.as_mut_slice().iter_mut().zip(overlay.as_slice()) {
        *cell = (1.0 - weight) * *cell + weight * over;
    }
    Ok(out)
}
