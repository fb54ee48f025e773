// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A fixed pool of scoped threads.  Each worker borrows the shared,
//! read-only inputs, builds its own result, and hands it back through
//! its join handle.  Nobody writes to anything another worker can see.

use crossbeam::thread::ScopedJoinHandle;

use crate::error::Error;

/// The items a worker is responsible for: every `workers`-th item,
/// starting at its own index.  Item `i` goes to worker `i % workers`.
pub fn stride<T>(items: &[T], worker: usize, workers: usize) -> impl Iterator<Item = &T> {
    items.iter().skip(worker).step_by(workers.max(1))
}

/// Run `job` once per worker, each on its own thread, and wait for all
/// of them.  The results come back in worker order.  If any worker
/// panics the whole round fails.
pub fn scatter<R, F>(workers: usize, job: F) -> Result<Vec<R>, Error>
where
    R: Send,
    F: Fn(usize) -> R + Sync,
{
    if workers == 0 {
        return Err(Error::config("at least one worker is needed"));
    }
    let job = &job;
    crossbeam::scope(|spawner| {
        let handles: Vec<ScopedJoinHandle<R>> = (0..workers)
            .map(|worker| spawner.spawn(move |_| job(worker)))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| Error::Worker))
            .collect::<Result<Vec<R>, Error>>()
    })
    .map_err(|_| Error::Worker)?
}
