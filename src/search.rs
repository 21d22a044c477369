//! Parallel brute force over every possible tail value.
//!
//! For a fixed buffer length the map from tail to checksum is a bijection, so exactly one
//! candidate restores the target. Each worker scans its own contiguous partition and the first
//! hit is recorded in a [`Claim`] that every worker polls to know when to stop.

use crate::crc::Crc32;
use crate::error::*;
use crate::tail;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, trace};

/// Every 32-bit tail value.
pub const DOMAIN: Range<u64> = 0..1 << 32;

/// Candidates scanned between two looks at the found-flag.
const POLL_INTERVAL: u64 = 1 << 12;

/// Candidates scanned between two progress events; a multiple of `POLL_INTERVAL`.
const PROGRESS_INTERVAL: u64 = 1 << 28;

/// Splits `domain` into `workers` contiguous ranges. The last range absorbs the remainder, so
/// the ranges always cover `domain` exactly once, even when there are more workers than
/// candidates.
pub fn partition(domain: Range<u64>, workers: NonZeroUsize) -> Vec<Range<u64>> {
    let workers = workers.get() as u64;
    let chunk = (domain.end - domain.start) / workers;
    (0..workers)
        .map(|t| {
            let start = domain.start + t * chunk;
            let end = if t == workers - 1 { domain.end } else { start + chunk };
            start..end
        })
        .collect()
}

/// Single-assignment slot shared by the workers of one search.
pub struct Claim {
    found: AtomicBool,
    winner: OnceLock<u32>,
}

impl Claim {
    pub fn new() -> Self {
        Self { found: AtomicBool::new(false), winner: OnceLock::new() }
    }

    /// Cheap poll for cancellation. May lag behind a concurrent [`Claim::claim`].
    pub fn is_claimed(&self) -> bool {
        self.found.load(Ordering::Relaxed)
    }

    /// Records `candidate` if nobody got here first. Returns whether this call won.
    pub fn claim(&self, candidate: u32) -> bool {
        if self.found.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.winner.set(candidate).is_ok()
    }

    pub fn winner(&self) -> Option<u32> {
        self.winner.get().copied()
    }

    pub fn into_inner(self) -> Option<u32> {
        self.winner.into_inner()
    }
}

impl Default for Claim {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Searcher {
    workers: NonZeroUsize,
}

impl Searcher {
    /// One worker per available hardware thread, or a single worker if that is unknown.
    pub fn new() -> Self {
        Self::with_workers(thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
    }

    pub fn with_workers(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Finds the tail that, appended to a prefix whose checksum is `base`, yields `target`.
    pub fn find(&self, crc: &Crc32, target: u32, base: u32) -> Result<u32> {
        self.find_within(crc, target, base, DOMAIN)
    }

    pub(crate) fn find_within(&self, crc: &Crc32, target: u32, base: u32, domain: Range<u64>) -> Result<u32> {
        debug_assert!(domain.end <= DOMAIN.end);
        let claim = Claim::new();
        thread::scope(|scope| {
            for (worker, range) in partition(domain, self.workers).into_iter().enumerate() {
                let claim = &claim;
                scope.spawn(move || scan(worker, range, crc, target, base, claim));
            }
        });
        claim.into_inner().ok_or(Error::SearchExhausted { target })
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

fn scan(worker: usize, range: Range<u64>, crc: &Crc32, target: u32, base: u32, claim: &Claim) {
    trace!(worker, start = range.start, end = range.end, "scanning");
    let mut start = range.start;
    while start < range.end {
        if claim.is_claimed() {
            trace!(worker, at = start, "stopped");
            return;
        }
        let end = range.end.min(start + POLL_INTERVAL);
        for candidate in start..end {
            let candidate = candidate as u32;
            if crc.resume(base, &tail::encode(candidate)) == target {
                if claim.claim(candidate) {
                    debug!(worker, candidate = %format_args!("{candidate:#010x}"), "found tail");
                }
                return;
            }
        }
        let scanned = end - range.start;
        if scanned % PROGRESS_INTERVAL == 0 {
            debug!(worker, progress = scanned as f64 / (range.end - range.start) as f64, "searching");
        }
        start = end;
    }
}
