use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::AppResult;

use super::embedding::{Embedder, Embedding};

const BAG_DIM: usize = 64;
const PINNED_DIM: usize = 8;

/// Deterministic embedder for tests
///
/// Labels are embedded as a byte histogram. Labels pinned to the same slot
/// get identical one-hot vectors orthogonal to every histogram.
#[derive(Default)]
pub struct FakeEmbedder {
    pinned: HashMap<String, usize>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn pin(mut self, label: &str, slot: usize) -> Self {
        assert!(slot < PINNED_DIM);
        self.pinned.insert(label.to_string(), slot);
        self
    }

    /// Number of `embed` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for FakeEmbedder {
    fn embed(&self, labels: &[&str]) -> AppResult<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(labels
            .iter()
            .map(|label| {
                let mut v = vec![0.0; BAG_DIM + PINNED_DIM];
                if let Some(slot) = self.pinned.get(*label) {
                    v[BAG_DIM + slot] = 1.0;
                } else {
                    for b in label.bytes() {
                        v[b as usize % BAG_DIM] += 1.0;
                    }
                }
                v
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        BAG_DIM + PINNED_DIM
    }
}
