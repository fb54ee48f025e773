// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning raw escape values or visit counts into intensities between
//! 0 and 1.  Either a straight division by the maximum, or a stretch
//! that pulls the bulk of the data toward mid-grey: an asinh curve when
//! the data is mostly dark, a sinh curve when it is mostly bright.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::Error;
use crate::raster::Raster;

/// The sample depth of the encoded image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BitDepth {
    /// 0 to 255.
    Eight,
    /// 0 to 65535.
    Sixteen,
}

impl BitDepth {
    /// The brightest representable sample.
    pub fn max_value(self) -> u16 {
        match self {
            BitDepth::Eight => 255,
            BitDepth::Sixteen => 65535,
        }
    }
}

impl FromStr for BitDepth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim() {
            "8" => Ok(BitDepth::Eight),
            "16" => Ok(BitDepth::Sixteen),
            other => Err(Error::config(format!(
                "bit depth must be 8 or 16, not {}",
                other
            ))),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Stretch {
    Asinh(f64),
    Sinh(f64),
}

fn shape(m: f64) -> f64 {
    (1.0 - 4.0 * m * m).sqrt() / (2.0 * m * m)
}

impl Stretch {
    // The curve that maps the median onto roughly one half.  There is
    // nothing to do for a median of exactly one half, or for a median
    // so extreme that the curve degenerates.
    fn for_median(median: f64) -> Option<Stretch> {
        let stretch = if median < 0.5 {
            Stretch::Asinh(shape(median))
        } else if median > 0.5 {
            Stretch::Sinh(shape(1.0 - median))
        } else {
            return None;
        };
        match stretch {
            Stretch::Asinh(a) | Stretch::Sinh(a) if a.is_finite() && a > 0.0 => Some(stretch),
            _ => None,
        }
    }

    fn apply(self, x: f64) -> f64 {
        let y = match self {
            Stretch::Asinh(a) => (a * x).asinh() / a.asinh(),
            // sinh(a x) / sinh(a), rearranged so that neither sinh
            // overflows for large a.
            Stretch::Sinh(a) => (a * (x - 1.0)).exp() * (-2.0 * a * x).exp_m1() / (-2.0 * a).exp_m1(),
        };
        y.min(1.0)
    }
}

/// The `q`th percentile of sorted data, interpolating linearly between
/// the two closest ranks.
pub fn percentile_of(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (q / 100.0).max(0.0).min(1.0) * (sorted.len() - 1) as f64;
    let (lo, hi) = (rank.floor() as usize, rank.ceil() as usize);
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Scale a raster into `[0, 1]`.
///
/// With a `percentile` of 0 every cell is divided by the maximum.
/// Otherwise the raster is first shifted and scaled so that its
/// minimum is 0 and its maximum 1, then the `(100 - percentile)`th
/// percentile of the non-zero cells picks a stretch curve, which is
/// applied to every non-zero cell.  Zero cells stay zero.
///
/// A raster whose maximum is zero holds nothing to scale, and is
/// reported as `Error::NoData` rather than turned into a black image.
pub fn normalize(raster: &Raster, percentile: f64) -> Result<Raster, Error> {
    if !(percentile >= 0.0 && percentile <= 100.0) {
        return Err(Error::config(format!(
            "percentile must be between 0 and 100, not {}",
            percentile
        )));
    }
    let max = match raster.max() {
        Some(max) if max > 0.0 => max,
        _ => return Err(Error::NoData),
    };

    let mut out = raster.clone();
    if percentile == 0.0 {
        for v in out.as_mut_slice() {
            *v /= max;
        }
        return Ok(out);
    }

    let min = raster.min().unwrap_or(0.0);
    let span = max - min;
    for v in out.as_mut_slice() {
        *v = if span > 0.0 { (*v - min) / span } else { 0.0 };
    }

    let mut nonzero: Vec<f64> = out.as_slice().iter().cloned().filter(|&v| v != 0.0).collect();
    nonzero.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let stretch = percentile_of(&nonzero, 100.0 - percentile).and_then(Stretch::for_median);
    if let Some(stretch) = stretch {
        for v in out.as_mut_slice() {
            if *v != 0.0 {
                *v = stretch.apply(*v);
            }
        }
    }
    Ok(out)
}

/// Scale a normalized raster to the sample range of an image.
pub fn quantize(raster: &Raster, depth: BitDepth) -> Vec<u16> {
    let top = f64::from(depth.max_value());
    raster
        .as_slice()
        .iter()
        .map(|&v| (v.max(0.0).min(1.0) * top).round() as u16)
        .collect()
}
