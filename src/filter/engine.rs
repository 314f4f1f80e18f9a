use crate::customer::Customer;
use crate::filter::{Criterion, FilterKind, Selection};
use crate::flight::SegmentRef;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use tracing::debug;

/// Runs filters over contiguous partitions of the working set on a bounded
/// pool of scoped workers. Output order never depends on which worker
/// finishes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterEngine {
    partitions: usize,
    workers: usize,
}

impl Default for FilterEngine {
    fn default() -> Self {
        let workers = thread::available_parallelism().map_or(1, |n| n.get());
        FilterEngine::new(workers, workers)
    }
}

impl FilterEngine {
    pub fn new(partitions: usize, workers: usize) -> FilterEngine {
        FilterEngine {
            partitions: partitions.max(1),
            workers: workers.max(1),
        }
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn run(
        &self,
        kind: FilterKind,
        customers: &[Customer],
        segments: &[SegmentRef],
        spec: &str,
    ) -> Vec<SegmentRef> {
        if !kind.is_partitionable() || self.partitions == 1 {
            return kind.apply(customers, segments, spec);
        }
        match kind.compile(customers, segments, spec) {
            Ok(Selection::Replace(all)) => all,
            Ok(Selection::Keep(criterion)) => self.fan_out(&criterion, segments),
            Err(e) => {
                debug!(filter = kind.name(), error = %e, "filter rejected, view unchanged");
                segments.to_vec()
            }
        }
    }

    fn fan_out(&self, criterion: &Criterion, segments: &[SegmentRef]) -> Vec<SegmentRef> {
        if segments.is_empty() {
            return vec![];
        }
        let chunk_size = segments.len().div_ceil(self.partitions);
        let chunks = segments.chunks(chunk_size).collect::<Vec<_>>();
        let workers = self.workers.min(chunks.len());
        debug!(chunks = chunks.len(), chunk_size, workers, "dispatching filter");

        let next = AtomicUsize::new(0);
        let mut slots: Vec<Option<Vec<SegmentRef>>> = vec![None; chunks.len()];

        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel();
            for _ in 0..workers {
                let tx = tx.clone();
                let next = &next;
                let chunks = &chunks;
                scope.spawn(move || {
                    loop {
                        let idx = next.fetch_add(1, Ordering::Relaxed);
                        let Some(chunk) = chunks.get(idx) else {
                            break;
                        };
                        if tx.send((idx, criterion.retain(chunk))).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);

            // the channel closes once every worker has exited
            for (idx, kept) in rx {
                slots[idx] = Some(kept);
            }
        });

        slots.into_iter().flatten().flatten().collect()
    }
}
