//! Epoch streaming.
//!
//! Training consumes the finite example set as an infinite sequence of
//! fixed-size batches. The stream shuffles the full set, hands it out,
//! shuffles again when exhausted, and keeps going; conceptually the
//! permutations are concatenated end-to-end and cut into batches of
//! `epoch_size`.
//!
//! # Batch boundaries
//!
//! `epoch_size` rarely divides the dataset evenly, so a batch may straddle
//! two permutations: the tail of one shuffle and the head of the next.
//! The already-cut prefix of a batch is never reshuffled; a fresh
//! permutation is drawn only when the current one is fully consumed.
//!
//! # Memory
//!
//! The stream holds the shared example set (`Arc` per example, the same
//! sharing idiom the rest of the pipeline uses for feature data), one
//! index permutation, and a cursor. Batches clone `Arc`s, not examples,
//! so lookahead stays bounded no matter how long training runs.
//!
//! # Restartability
//!
//! Every [`EpochStream::new`] call owns an independent generator and
//! permutation, so each training run re-walks the data from a fresh
//! shuffle.
//!
//! # Example
//!
//! ```ignore
//! use price_pipeline::stream::EpochStream;
//!
//! let mut stream = EpochStream::new(examples, 512, Some(42))?;
//! for batch in stream.by_ref().take(10) {
//!     consume(batch);
//! }
//! ```

use crate::dataset::Example;
use crate::error::{PipelineError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

/// A fixed-size slice of the infinite shuffled cycle.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Shared examples, exactly `epoch_size` of them.
    pub examples: Vec<Arc<Example>>,
}

impl Batch {
    /// Number of examples in the batch.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the batch is empty. Streams never produce empty batches.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// Infinite, restartable-per-construction batch stream.
pub struct EpochStream {
    examples: Vec<Arc<Example>>,
    epoch_size: usize,
    order: Vec<usize>,
    cursor: usize,
    rng: StdRng,
}

impl EpochStream {
    /// Build a stream over `examples` producing batches of `epoch_size`.
    ///
    /// `seed` pins the shuffle sequence for reproducible runs; `None`
    /// seeds from entropy. Fails on an empty example set or a zero batch
    /// size, either of which would make the infinite stream meaningless.
    pub fn new(
        examples: Vec<Example>,
        epoch_size: usize,
        seed: Option<u64>,
    ) -> Result<EpochStream> {
        if examples.is_empty() {
            return Err(PipelineError::Config(
                "epoch stream needs at least one example".to_string(),
            ));
        }
        if epoch_size == 0 {
            return Err(PipelineError::Config(
                "epoch_size must be > 0".to_string(),
            ));
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut stream = EpochStream {
            order: (0..examples.len()).collect(),
            examples: examples.into_iter().map(Arc::new).collect(),
            epoch_size,
            cursor: 0,
            rng,
        };
        stream.reshuffle();
        Ok(stream)
    }

    /// Number of distinct examples behind the stream.
    pub fn example_count(&self) -> usize {
        self.examples.len()
    }

    /// Draw the next batch. Always succeeds; the stream never ends.
    pub fn next_batch(&mut self) -> Batch {
        let mut batch = Vec::with_capacity(self.epoch_size);
        while batch.len() < self.epoch_size {
            if self.cursor == self.order.len() {
                self.reshuffle();
            }
            let index = self.order[self.cursor];
            self.cursor += 1;
            batch.push(Arc::clone(&self.examples[index]));
        }
        Batch { examples: batch }
    }

    fn reshuffle(&mut self) {
        self.order.shuffle(&mut self.rng);
        self.cursor = 0;
    }
}

impl Iterator for EpochStream {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        Some(self.next_batch())
    }
}
