// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0 in
//! the upper left, and a rectangle on the complex plane described by
//! a pair of ranges on the real and imaginary axes.
use num::Complex;

use crate::error::Error;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a pixel.  x grows to the right, y grows
/// downwards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pixel(pub usize, pub usize);

/// The region of the complex plane a render looks at: a range on the
/// real axis and a range on the imaginary axis.  Each range is stored
/// low-to-high no matter which order it was given in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewBounds {
    real: (f64, f64),
    imag: (f64, f64),
}

fn sorted(pair: (f64, f64)) -> (f64, f64) {
    if pair.1 < pair.0 {
        (pair.1, pair.0)
    } else {
        pair
    }
}

impl ViewBounds {
    /// Build a view from a real and an imaginary range.  The ranges
    /// may be given in either order; a range with no width (or one
    /// that isn't a finite number) is rejected.
    pub fn new(real: (f64, f64), imag: (f64, f64)) -> Result<ViewBounds, Error> {
        let (real, imag) = (sorted(real), sorted(imag));
        for (name, (lo, hi)) in &[("real", real), ("imaginary", imag)] {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(Error::config(format!("the {} range is not finite", name)));
            }
            if !(lo < hi) {
                return Err(Error::config(format!(
                    "the {} range [{}, {}] has no span",
                    name, lo, hi
                )));
            }
        }
        Ok(ViewBounds { real, imag })
    }

    /// Build a view from its left-lower and right-upper corners.
    pub fn from_corners(leftlower: Complex<f64>, rightupper: Complex<f64>) -> Result<ViewBounds, Error> {
        ViewBounds::new((leftlower.re, rightupper.re), (leftlower.im, rightupper.im))
    }

    /// The real range, low to high.
    pub fn real(&self) -> (f64, f64) {
        self.real
    }

    /// The imaginary range, low to high.
    pub fn imag(&self) -> (f64, f64) {
        self.imag
    }

    /// Width of the view on the real axis.
    pub fn real_span(&self) -> f64 {
        self.real.1 - self.real.0
    }

    /// Height of the view on the imaginary axis.
    pub fn imag_span(&self) -> f64 {
        self.imag.1 - self.imag.0
    }

    /// The middle of the view.
    pub fn centre(&self) -> Complex<f64> {
        Complex::new(
            (self.real.0 + self.real.1) / 2.0,
            (self.imag.0 + self.imag.1) / 2.0,
        )
    }

    /// The image height that keeps pixels square for a given width.
    pub fn height_for(&self, width: usize) -> usize {
        ((width as f64) * self.imag_span() / self.real_span()).round() as usize
    }

    /// True if the point lies inside (or on the edge of) the view.
    pub fn contains(&self, point: &Complex<f64>) -> bool {
        point.re >= self.real.0
            && point.re <= self.real.1
            && point.im >= self.imag.0
            && point.im <= self.imag.1
    }
}

/// Contains the definitions of two planes: an integral cartesian
/// plane, and a complex cartesian plane.  Maps points from one to the
/// other.  Pixel (0, 0) sits on the real-low, imaginary-high corner
/// and pixel (width - 1, height - 1) on the opposite one.
///
/// Both directions are computed relative to the centre of the view,
/// so that a view which is symmetric about an axis produces exactly
/// mirrored coordinates for mirrored pixels.
#[derive(Clone, Debug)]
pub struct PlaneMapper {
    /// The size of the integral plane.
    pub integral_plane: IntegralPlane,
    /// The region of the complex plane being mapped.
    pub bounds: ViewBounds,
    centre: Complex<f64>,
    // The pixel coordinates of the centre of the view.
    middle: (f64, f64),
    // The distance in the complex plane between adjacent pixels.
    steps: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the integral plane and the view
    /// on the complex plane.
    pub fn new(width: usize, height: usize, bounds: ViewBounds) -> Result<PlaneMapper, Error> {
        if width == 0 || height == 0 {
            return Err(Error::config(format!(
                "cannot map onto a {}x{} raster",
                width, height
            )));
        }
        let last = |n: usize| (n.max(2) - 1) as f64;
        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            bounds,
            centre: bounds.centre(),
            middle: ((width - 1) as f64 / 2.0, (height - 1) as f64 / 2.0),
            steps: (
                bounds.real_span() / last(width),
                bounds.imag_span() / last(height),
            ),
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// The continuous pixel coordinates of a point.  Not rounded and
    /// not clipped.
    pub fn point_to_coordinates(&self, point: &Complex<f64>) -> (f64, f64) {
        (
            self.middle.0 + (point.re - self.centre.re) / self.steps.0,
            self.middle.1 - (point.im - self.centre.im) / self.steps.1,
        )
    }

    /// Given a complex number corresponding to a location on the
    /// complex cartesian plane, map that to the nearest point on the
    /// integral cartesian plane.  Points that round to a pixel outside
    /// the plane, or that aren't finite, have no pixel.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let (x, y) = self.point_to_coordinates(point);
        let (x, y) = (x.round(), y.round());
        if x >= 0.0
            && x < (self.integral_plane.0 as f64)
            && y >= 0.0
            && y < (self.integral_plane.1 as f64)
        {
            Some(Pixel(x as usize, y as usize))
        } else {
            None
        }
    }

    /// Given a pixel on the integral cartesian plane, map that to a
    /// point on the complex cartesian plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        self.subpixel_to_point(pixel.0 as f64, pixel.1 as f64)
    }

    /// As `pixel_to_point`, for a position between pixels.  The
    /// oversampler uses this to nudge every sample by a fraction of a
    /// pixel.
    pub fn subpixel_to_point(&self, x: f64, y: f64) -> Complex<f64> {
        Complex::new(
            self.centre.re + (x - self.middle.0) * self.steps.0,
            self.centre.im - (y - self.middle.1) * self.steps.1,
        )
    }

    /// Since the Buddhabrot actually tracks the progress of a complex
    /// number as it orbits the Mandelbrot set's interior, we have to
    /// map those complex numbers back to the pixel plane, and then
    /// increment those points on the pixel plane as the orbit passes
    /// through them.  This function takes a point, maps it to pixel
    /// coordinates, then returns the linear offset from the root of
    /// the image buffer in memory.
    pub fn point_to_offset(&self, point: &Complex<f64>) -> Option<usize> {
        self.point_to_pixel(point)
            .map(|Pixel(x, y)| y * self.integral_plane.0 + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex<f64>, b: Complex<f64>) -> bool {
        (a - b).norm() < 1e-12
    }

    fn mapper(w: usize, h: usize, real: (f64, f64), imag: (f64, f64)) -> PlaneMapper {
        PlaneMapper::new(w, h, ViewBounds::new(real, imag).unwrap()).unwrap()
    }

    #[test]
    fn viewbounds_sorts_its_ranges() {
        let vb = ViewBounds::new((1.0, -1.0), (2.0, -0.5)).unwrap();
        assert_eq!(vb.real(), (-1.0, 1.0));
        assert_eq!(vb.imag(), (-0.5, 2.0));
    }

    #[test]
    fn viewbounds_fails_on_zero_span() {
        assert!(ViewBounds::new((1.0, 1.0), (-1.0, 1.0)).is_err());
        assert!(ViewBounds::new((-1.0, 1.0), (0.0, 0.0)).is_err());
        assert!(ViewBounds::new((f64::NAN, 1.0), (0.0, 1.0)).is_err());
    }

    #[test]
    fn viewbounds_from_corners() {
        let vb =
            ViewBounds::from_corners(Complex::new(-2.0, -1.0), Complex::new(1.0, 1.0)).unwrap();
        assert_eq!(vb.real(), (-2.0, 1.0));
        assert_eq!(vb.imag(), (-1.0, 1.0));
    }

    #[test]
    fn height_keeps_pixels_square() {
        let vb = ViewBounds::new((-2.0, 1.0), (-1.0, 1.0)).unwrap();
        assert_eq!(vb.height_for(300), 200);
    }

    #[test]
    fn planemapper_fails_on_empty_raster() {
        let vb = ViewBounds::new((-1.0, 1.0), (-1.0, 1.0)).unwrap();
        assert!(PlaneMapper::new(0, 4, vb).is_err());
        assert!(PlaneMapper::new(4, 0, vb).is_err());
    }

    #[test]
    fn corners_map_to_corners() {
        let pm = mapper(5, 3, (-2.0, 2.0), (-1.0, 1.0));
        assert!(close(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, 1.0)));
        assert!(close(pm.pixel_to_point(&Pixel(4, 2)), Complex::new(2.0, -1.0)));
        assert!(close(pm.pixel_to_point(&Pixel(2, 1)), Complex::new(0.0, 0.0)));
        assert!(close(pm.pixel_to_point(&Pixel(1, 2)), Complex::new(-1.0, -1.0)));
    }

    #[test]
    fn point_to_pixel_on_mixed_planes() {
        let pm = mapper(5, 5, (-2.0, 2.0), (-2.0, 2.0));
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, 0.0)), Some(Pixel(2, 2)));
        assert_eq!(pm.point_to_pixel(&Complex::new(-2.0, 2.0)), Some(Pixel(0, 0)));
        assert_eq!(pm.point_to_pixel(&Complex::new(2.0, -2.0)), Some(Pixel(4, 4)));
        assert_eq!(pm.point_to_pixel(&Complex::new(0.9, -1.1)), Some(Pixel(3, 3)));
    }

    #[test]
    fn point_to_pixel_rejects_points_off_the_plane() {
        let pm = mapper(5, 5, (-2.0, 2.0), (-2.0, 2.0));
        assert_eq!(pm.point_to_pixel(&Complex::new(2.6, 0.0)), None);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, -2.6)), None);
        assert_eq!(pm.point_to_pixel(&Complex::new(f64::NAN, 0.0)), None);
        assert_eq!(pm.point_to_pixel(&Complex::new(f64::INFINITY, 0.0)), None);
    }

    #[test]
    fn point_to_offset_is_row_major() {
        let pm = mapper(5, 5, (-2.0, 2.0), (-2.0, 2.0));
        assert_eq!(pm.point_to_offset(&Complex::new(-1.0, 1.0)), Some(6));
        assert_eq!(pm.point_to_offset(&Complex::new(2.0, -2.0)), Some(24));
    }

    #[test]
    fn pixels_round_trip_through_the_complex_plane() {
        let pm = mapper(37, 23, (-2.1, 0.7), (-0.3, 1.4));
        for x in 0..37 {
            for y in 0..23 {
                let p = Pixel(x, y);
                assert_eq!(pm.point_to_pixel(&pm.pixel_to_point(&p)), Some(p));
            }
        }
    }

    #[test]
    fn symmetric_views_produce_mirrored_points() {
        let pm = mapper(7, 6, (-1.5, 1.5), (-1.25, 1.25));
        for x in 0..7 {
            for y in 0..6 {
                let a = pm.pixel_to_point(&Pixel(x, y));
                let b = pm.pixel_to_point(&Pixel(6 - x, 5 - y));
                assert_eq!(a, -b);
            }
        }
    }

    #[test]
    fn single_pixel_maps_to_the_centre() {
        let pm = mapper(1, 1, (0.0, 2.0), (0.0, 4.0));
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(1.0, 2.0));
        assert_eq!(pm.point_to_pixel(&Complex::new(1.4, 2.9)), Some(Pixel(0, 0)));
    }
}
