pub mod compose;
pub mod crc;
pub mod error;
pub mod file;
pub mod search;
pub mod tail;

pub use error::{Error, Result};

use compose::Composition;
use crc::Crc32;
use search::Searcher;
use std::path::Path;
use tracing::{debug, info};

/// What gets appended when the caller has nothing better to say.
pub const DEFAULT_INJECTION: &str = "He-he-he";

/// Returns `original ‖ injection ‖ tail`, with the four tail bytes chosen so the whole thing has
/// the same CRC-32 as `original`.
pub fn hack(original: &[u8], injection: &[u8]) -> Result<Vec<u8>> {
    hack_with(&Crc32::new(), &Searcher::new(), original, injection)
}

pub fn hack_with(crc: &Crc32, searcher: &Searcher, original: &[u8], injection: &[u8]) -> Result<Vec<u8>> {
    finish(crc, searcher, Composition::new(crc, original, injection))
}

/// Reads `input`, writes the extended copy to `output` and returns the checksum both share.
pub fn hack_file(crc: &Crc32, searcher: &Searcher, input: &Path, output: &Path, injection: &[u8]) -> Result<u32> {
    let original = file::read_file(input)?;
    let composition = Composition::new(crc, &original, injection);
    let checksum = composition.target();
    file::write_file(output, &finish(crc, searcher, composition)?)?;
    Ok(checksum)
}

fn finish(crc: &Crc32, searcher: &Searcher, composition: Composition) -> Result<Vec<u8>> {
    debug!(
        original = %format_args!("{:#010x}", composition.target()),
        base = %format_args!("{:#010x}", composition.base()),
        len = composition.buffer().len(),
        "composed"
    );
    info!(workers = searcher.workers().get(), "searching for tail");
    let candidate = searcher.find(crc, composition.target(), composition.base())?;
    Ok(composition.apply(candidate))
}





#[cfg(test)]
mod search_tests {
    use crate::crc::*;
    use crate::error::*;
    use crate::fixtures::*;
    use crate::search::*;
    use std::num::NonZeroUsize;
    use std::sync::Arc;
    use std::thread;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn window(center: u32, radius: u64) -> std::ops::Range<u64> {
        let center = center as u64;
        center.saturating_sub(radius)..(center + radius).min(DOMAIN.end)
    }

    #[test]
    fn partitions_cover_domain() {
        for n in [1, 2, 3, 7, 16, 64, 1000] {
            let ranges = partition(DOMAIN, workers(n));
            assert_eq!(ranges.len(), n);
            assert_eq!(ranges.first().unwrap().start, 0);
            assert_eq!(ranges.last().unwrap().end, 1 << 32);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            let chunk = (1u64 << 32) / n as u64;
            assert!(ranges[..n - 1].iter().all(|r| r.end - r.start == chunk));
            assert!(ranges[n - 1].end - ranges[n - 1].start >= chunk);
        }
    }

    #[test]
    fn single_partition() {
        assert_eq!(partition(DOMAIN, workers(1)), vec![DOMAIN]);
    }

    #[test]
    fn more_workers_than_candidates() {
        let ranges = partition(10..13, workers(5));
        assert_eq!(ranges.iter().map(|r| r.end - r.start).sum::<u64>(), 3);
        assert_eq!(ranges.last().unwrap(), &(10..13));
    }

    #[test]
    fn first_claim_wins() {
        let claim = Claim::new();
        assert!(!claim.is_claimed());
        assert!(claim.claim(7));
        assert!(!claim.claim(8));
        assert!(claim.is_claimed());
        assert_eq!(claim.winner(), Some(7));
        assert_eq!(claim.into_inner(), Some(7));
    }

    #[test]
    fn concurrent_claims() {
        let claim = Arc::new(Claim::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let claim = claim.clone();
                thread::spawn(move || claim.claim(i))
            })
            .collect();
        let wins = handles.into_iter().filter_map(|h| h.join().ok()).filter(|won| *won).count();
        assert_eq!(wins, 1);
        assert!(claim.winner().is_some());
    }

    #[test]
    fn finds_known_tail() {
        let crc = Crc32::new();
        let buffer = bytes(512, 30);
        let (target, base) = (crc.calculate(&buffer[..200]), crc.calculate(&buffer));
        let expected = forge(base, target);
        for n in [1, 2, 3, 8] {
            let found = Searcher::with_workers(workers(n)).find_within(&crc, target, base, window(expected, 100_000));
            assert_eq!(found.unwrap(), expected);
        }
    }

    #[test]
    fn tail_is_unique_nearby() {
        let crc = Crc32::new();
        let buffer = bytes(64, 31);
        let (target, base) = (crc.calculate(&buffer[..10]), crc.calculate(&buffer));
        let expected = forge(base, target);
        let hits = window(expected, 1 << 16)
            .filter(|c| crc.resume(base, &(*c as u32).to_le_bytes()) == target)
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn tail_is_unique_across_domain() {
        let crc = Crc32::new();
        let (target, base) = (crc.calculate(b"AB"), crc.calculate(b"ABX"));
        let ranges = partition(DOMAIN, thread::available_parallelism().unwrap_or(NonZeroUsize::MIN));
        let hits: Vec<u64> = thread::scope(|scope| {
            let handles: Vec<_> = ranges
                .into_iter()
                .map(|range| {
                    let crc = &crc;
                    scope.spawn(move || {
                        range.filter(|c| crc.resume(base, &(*c as u32).to_le_bytes()) == target).collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(hits, vec![0x0e44a8cb]);
    }

    #[test]
    fn logs_hit_at_debug() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let crc = Crc32::new();
        let (target, base) = (crc.calculate(b"AB"), crc.calculate(b"ABX"));
        let found = Searcher::with_workers(workers(2)).find_within(&crc, target, base, window(0x0e44a8cb, 1 << 12));
        assert_eq!(found.unwrap(), 0x0e44a8cb);
    }

    #[test]
    fn exhausted() {
        let crc = Crc32::new();
        let (target, base) = (crc.calculate(b"AB"), crc.calculate(b"ABX"));
        let expected = forge(base, target) as u64;
        let domain = if expected >= 1 << 20 { 0..1 << 20 } else { (1 << 31)..(1 << 31) + (1 << 20) };
        let found = Searcher::with_workers(workers(4)).find_within(&crc, target, base, domain);
        assert!(matches!(found, Err(Error::SearchExhausted { target: t }) if t == target));
    }

    #[test]
    fn default_workers() {
        assert!(Searcher::new().workers().get() >= 1);
    }
}
