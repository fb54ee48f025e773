// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Given a rectangle of pixels, we try to find a square size that we
//! can break the region up into, each of which can then be handed to
//! the tracer.  Whatever doesn't fit along the right and bottom edges
//! is broken up the same way, with smaller squares.

/// A square of pixels with a power-of-two side, anchored at its upper
/// left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TraceRegion {
    /// Column of the upper left pixel.
    pub x: usize,
    /// Row of the upper left pixel.
    pub y: usize,
    /// Length of a side, in pixels.
    pub size: usize,
}

impl TraceRegion {
    /// Constructor.
    pub fn new(x: usize, y: usize, size: usize) -> Self {
        TraceRegion { x, y, size }
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.size * self.size
    }
}

/// A rectangle of pixels inside a raster.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Area {
    /// Column of the upper left pixel.
    pub x: usize,
    /// Row of the upper left pixel.
    pub y: usize,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl Area {
    /// Constructor.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Area {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels covered.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True if the area covers nothing.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if the pixel lies inside the area.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

fn floor_log2(n: usize) -> u32 {
    (usize::max_value().count_ones() - 1) - n.leading_zeros()
}

/// Cover a width x height rectangle, exactly and without overlap, with
/// squares whose sides are powers of two.  The first pass uses the
/// largest power of two that fits, shrunk by `size_offset` halvings to
/// start with a finer grid; the leftover strips on the right and the
/// bottom are covered recursively.
pub fn decompose(width: usize, height: usize, size_offset: u32) -> Vec<TraceRegion> {
    let mut squares = vec![];
    decompose_into(&mut squares, 0, 0, width, height, size_offset);
    squares
}

/// `decompose` for a sub-area of a larger raster: the squares come
/// back in the raster's coordinates.
pub fn decompose_area(area: &Area, size_offset: u32) -> Vec<TraceRegion> {
    let mut squares = vec![];
    decompose_into(&mut squares, area.x, area.y, area.width, area.height, size_offset);
    squares
}

fn decompose_into(
    squares: &mut Vec<TraceRegion>,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
    size_offset: u32,
) {
    if width == 0 || height == 0 {
        return;
    }
    if width == 1 && height == 1 {
        squares.push(TraceRegion::new(x0, y0, 1));
        return;
    }

    let side = 1usize << floor_log2(width.min(height)).saturating_sub(size_offset);
    let (w_mod, h_mod) = (width % side, height % side);

    for x in 0..width / side {
        for y in 0..height / side {
            squares.push(TraceRegion::new(x0 + x * side, y0 + y * side, side));
        }
    }

    // The strip down the right hand side, then the one along the
    // bottom (which stops short of the right hand strip).
    decompose_into(squares, x0 + width - w_mod, y0, w_mod, height, 0);
    decompose_into(squares, x0, y0 + height - h_mod, width - w_mod, h_mod, 0);
}
