use std::ops::Range;

/// How a flat workload `[0, total)` is split into contiguous chunks.
///
/// Every chunk except the last has exactly `chunk_size` elements; the last
/// one takes whatever remains. The chunks tile the workload without gaps
/// or overlaps.
///
/// ```
/// use parmat::Partition;
///
/// // 4 workers plus the caller, but no chunk may be smaller than 100
/// let partition = Partition::new(150, 4, 100);
/// assert_eq!(100, partition.chunk_size());
/// assert_eq!(vec![0..100, 100..150], partition.ranges().collect::<Vec<_>>());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    total: usize,
    chunk_size: usize,
    chunk_count: usize,
}

impl Partition {
    /// Split `total` elements for `threads` pool workers plus the calling
    /// thread, with chunks no smaller than `limit` (a 0 limit counts as 1).
    ///
    /// With no workers, or when a single chunk already covers the
    /// workload, the result is one chunk spanning everything.
    pub fn new(total: usize, threads: usize, limit: usize) -> Self {
        let limit = limit.max(1);
        if threads == 0 || limit >= total {
            return Self::sequential(total);
        }

        let chunk_size = (total / threads.saturating_add(1)).max(limit);
        // ceil without computing `total + chunk_size`, which can overflow
        let chunk_count = total / chunk_size + usize::from(total % chunk_size != 0);
        Self {
            total,
            chunk_size,
            chunk_count,
        }
    }

    /// a single chunk covering the whole workload
    pub fn sequential(total: usize) -> Self {
        Self {
            total,
            chunk_size: total,
            chunk_count: 1,
        }
    }

    /// size of the workload
    pub fn total(&self) -> usize {
        self.total
    }

    /// size of every chunk but the last
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// number of chunks, always at least 1
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// whether the whole workload runs as one chunk on the calling thread
    pub fn is_sequential(&self) -> bool {
        self.chunk_count == 1
    }

    /// The index range of chunk `index`. The last chunk ends at `total`.
    pub fn range(&self, index: usize) -> Range<usize> {
        let start = index * self.chunk_size;
        if index + 1 == self.chunk_count {
            start..self.total
        } else {
            start..start + self.chunk_size
        }
    }

    /// chunk ranges in order
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.chunk_count).map(move |index| self.range(index))
    }
}
