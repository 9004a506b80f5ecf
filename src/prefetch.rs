//! The Prefetch Cache (§4.2): wraps a [`crate::byte_source::ByteSource`], serves reads
//! from a coalesced, pre-issued set of byte ranges, and falls through to the source on a
//! miss. Grounded on the teacher's `examples/s3/src/stream.rs` `RangedStreamer`, which
//! caches one in-flight byte-range chunk and re-fetches on a miss outside it; this
//! generalises that single-chunk cache to the full set of ranges a read plans up front.

use std::sync::Mutex;

use crate::byte_source::ByteSource;
use crate::error::Result;

/// Ranges within this many bytes of each other are merged into one prefetch segment,
/// trading a bounded amount of wasted bytes for fewer round trips to the source.
const COALESCE_GAP: u64 = 32 * 1024;

struct Segment {
    start: u64,
    end: u64,
    data: Option<Vec<u8>>,
}

/// Caches coalesced byte ranges over a [`ByteSource`].
///
/// `plan` declares the ranges a read intends to touch, merging adjacent or overlapping
/// ones (within [`COALESCE_GAP`]) into as few segments as possible; `slice` resolves a
/// single range, fetching and caching its covering segment on first access. A segment is
/// fetched at most once: the table is guarded by a single [`Mutex`], so a second caller
/// for the same segment blocks on the first rather than issuing a duplicate fetch — the
/// single-flight behaviour the design notes call for, via the simplest primitive that
/// gives it to us rather than a bespoke one-shot-completion map.
pub struct PrefetchCache<S> {
    source: S,
    segments: Mutex<Vec<Segment>>,
}

impl<S: ByteSource> PrefetchCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            segments: Mutex::new(Vec::new()),
        }
    }

    pub fn byte_len(&self) -> u64 {
        self.source.byte_len()
    }

    /// Declares the byte ranges this read will need. Coalesces them and registers the
    /// merged segments; does not fetch anything yet, so planning a range that `slice`
    /// never actually visits costs nothing.
    pub fn plan(&self, ranges: &[(u64, u64)]) {
        if ranges.is_empty() {
            return;
        }
        let mut sorted = ranges.to_vec();
        sorted.sort_unstable_by_key(|r| r.0);

        let mut merged: Vec<(u64, u64)> = Vec::with_capacity(sorted.len());
        for (start, end) in sorted {
            if let Some((_, last_end)) = merged.last_mut() {
                if start <= last_end.saturating_add(COALESCE_GAP) {
                    *last_end = (*last_end).max(end);
                    continue;
                }
            }
            merged.push((start, end));
        }

        log::debug!(
            "prefetch cache: coalesced {} requested range(s) into {} segment(s)",
            ranges.len(),
            merged.len()
        );

        let mut segments = self.segments.lock().expect("prefetch cache lock poisoned");
        for (start, end) in merged {
            if !segments.iter().any(|s| s.start == start && s.end == end) {
                segments.push(Segment {
                    start,
                    end,
                    data: None,
                });
            }
        }
    }

    /// Returns the bytes in `[start, end)`. If the range falls inside a planned segment,
    /// fetches (and caches) that whole segment on first access and serves this and every
    /// later sub-range from the cached buffer; otherwise falls through to a direct,
    /// uncoalesced fetch from the underlying source.
    pub fn slice(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        let mut segments = self.segments.lock().expect("prefetch cache lock poisoned");
        if let Some(segment) = segments
            .iter_mut()
            .find(|s| s.start <= start && end <= s.end)
        {
            if segment.data.is_none() {
                log::debug!(
                    "prefetch cache: miss, fetching segment [{}, {})",
                    segment.start, segment.end
                );
                segment.data = Some(self.source.slice(segment.start, segment.end)?);
            } else {
                log::trace!("prefetch cache: hit for [{}, {})", start, end);
            }
            let data = segment.data.as_ref().expect("just populated above");
            let offset = (start - segment.start) as usize;
            let len = (end - start) as usize;
            return Ok(data[offset..offset + len].to_vec());
        }
        drop(segments);
        log::debug!(
            "prefetch cache: [{}, {}) was not planned, fetching directly",
            start, end
        );
        self.source.slice(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_source::SyncByteSource;
    use std::io::Cursor;

    #[test]
    fn coalesces_adjacent_ranges_into_one_fetch() {
        let data = (0u8..=255).collect::<Vec<_>>();
        let source = SyncByteSource::new(Cursor::new(data.clone())).unwrap();
        let cache = PrefetchCache::new(source);

        cache.plan(&[(0, 10), (10, 20), (200, 210)]);
        assert_eq!(cache.slice(0, 10).unwrap(), data[0..10]);
        assert_eq!(cache.slice(10, 20).unwrap(), data[10..20]);
        assert_eq!(cache.slice(200, 210).unwrap(), data[200..210]);
    }

    #[test]
    fn falls_through_for_unplanned_ranges() {
        let data = (0u8..=255).collect::<Vec<_>>();
        let source = SyncByteSource::new(Cursor::new(data.clone())).unwrap();
        let cache = PrefetchCache::new(source);

        assert_eq!(cache.slice(5, 15).unwrap(), data[5..15]);
    }
}
