// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The failure modes of a render.  Nothing in this crate retries:
//! every error goes straight back to whoever asked for the raster.

use failure::Fail;

/// Everything that can go wrong between a set of parameters and a
/// finished raster.
#[derive(Debug, Fail, PartialEq)]
pub enum Error {
    /// The caller asked for something that cannot be rendered: an
    /// empty or inverted view, a zero-sized image, no workers, an
    /// unsupported bit depth, and so on.
    #[fail(display = "invalid configuration: {}", _0)]
    Config(String),

    /// Normalization was asked to scale a raster in which nothing was
    /// ever recorded.
    #[fail(display = "no data: the raster maximum is zero")]
    NoData,

    /// A worker thread panicked during a pool round.  The whole
    /// computation is abandoned.
    #[fail(display = "a worker failed during the pool round")]
    Worker,

    /// The seed sampler gave up because almost every candidate fell
    /// inside the known-bounded regions.
    #[fail(
        display = "sampling exhausted: accepted {} of {} seeds",
        accepted, requested
    )]
    Sampling {
        /// Seeds accepted before giving up.
        accepted: usize,
        /// Seeds that were asked for.
        requested: usize,
    },
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}
