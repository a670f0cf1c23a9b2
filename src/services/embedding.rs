//! Sentence-embedding provider.
//!
//! [`Embedder`] is the seam the genre mapper depends on. [`FastEmbedder`] backs
//! it with the all-MiniLM-L6-v2 model, loaded at most once per process.

use std::path::PathBuf;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use once_cell::sync::OnceCell;

use crate::error::{AppError, AppResult};

pub type Embedding = Vec<f32>;

/// Converts text labels into fixed-size vectors
///
/// Implementations return one vector per input label, in input order, with
/// the same dimensionality on every call. Calls are CPU-bound and blocking.
pub trait Embedder: Send + Sync {
    fn embed(&self, labels: &[&str]) -> AppResult<Vec<Embedding>>;

    fn dimension(&self) -> usize;
}

/// all-MiniLM-L6-v2 produces 384-dimensional vectors
const MINILM_DIMENSION: usize = 384;

/// A value built on first use, once per process
///
/// Concurrent first callers block until the single load finishes. A failed
/// load is not cached, so a later call retries it.
pub struct LazyModel<M> {
    cell: OnceCell<M>,
}

impl<M> LazyModel<M> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Option<&M> {
        self.cell.get()
    }

    pub fn get_or_load<F>(&self, load: F) -> AppResult<&M>
    where
        F: FnOnce() -> AppResult<M>,
    {
        self.cell.get_or_try_init(load)
    }
}

impl<M> Default for LazyModel<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// fastembed-backed embedder with a lazily loaded model
pub struct FastEmbedder {
    cache_dir: Option<PathBuf>,
    model: LazyModel<TextEmbedding>,
}

impl FastEmbedder {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self {
            cache_dir,
            model: LazyModel::new(),
        }
    }

    /// Loads the model now instead of on first use
    ///
    /// Called during startup so a missing or corrupt model stops the process
    /// before it serves traffic.
    pub fn warm_up(&self) -> AppResult<()> {
        self.model().map(|_| ())
    }

    fn model(&self) -> AppResult<&TextEmbedding> {
        self.model.get_or_load(|| load_minilm(self.cache_dir.clone()))
    }
}

fn load_minilm(cache_dir: Option<PathBuf>) -> AppResult<TextEmbedding> {
    tracing::info!(model = "all-MiniLM-L6-v2", "Loading embedding model");

    let mut options =
        InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
    if let Some(dir) = cache_dir {
        options = options.with_cache_dir(dir);
    }

    let model = TextEmbedding::try_new(options).map_err(|e| {
        AppError::UpstreamUnavailable(format!("Failed to load embedding model: {}", e))
    })?;

    tracing::info!("Embedding model loaded");
    Ok(model)
}

impl Embedder for FastEmbedder {
    fn embed(&self, labels: &[&str]) -> AppResult<Vec<Embedding>> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }

        self.model()?
            .embed(labels.to_vec(), None)
            .map_err(|e| AppError::UpstreamUnavailable(format!("Embedding failed: {}", e)))
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }
}
