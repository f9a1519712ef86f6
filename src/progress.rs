//! Progress reporting for long-running operations.
//!
//! A [`ProgressCallback`] can be injected into the enrichment pipeline and
//! into [`load_all_messages`](crate::source::load_all_messages) to receive
//! push-based updates.
//!
//! # Example
//!
//! ```rust
//! use groupex::progress::{Progress, ProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress| {
//!     if let Some(pct) = progress.percentage() {
//!         println!("{:?}: {:.1}%", progress.stage, pct);
//!     }
//! });
//!
//! for i in 0..10usize {
//!     callback(Progress::new(Stage::Resolving, i + 1).with_total(10));
//! }
//! ```

use std::sync::Arc;

/// Which part of the run a [`Progress`] update describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    /// Pulling message pages from the source.
    Loading,
    /// Resolving sender, reply and reactions per message.
    #[default]
    Resolving,
}

/// Progress information for long-running operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Stage this update belongs to.
    pub stage: Stage,

    /// Number of items (messages) processed so far.
    pub items_processed: usize,

    /// Total items to process, if known.
    pub total_items: Option<usize>,
}

impl Progress {
    /// Creates a new progress instance.
    pub fn new(stage: Stage, items_processed: usize) -> Self {
        Self {
            stage,
            items_processed,
            total_items: None,
        }
    }

    /// Creates a progress instance with total items.
    #[must_use]
    pub fn with_total(mut self, total_items: usize) -> Self {
        self.total_items = Some(total_items);
        self
    }

    /// Returns the progress as a percentage (0.0 - 100.0).
    ///
    /// Returns `None` if the total is not known.
    ///
    /// ```rust
    /// use groupex::progress::{Progress, Stage};
    ///
    /// let progress = Progress::new(Stage::Resolving, 50).with_total(200);
    /// assert_eq!(progress.percentage(), Some(25.0));
    /// ```
    pub fn percentage(&self) -> Option<f64> {
        self.total_items.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.items_processed as f64 / total as f64) * 100.0
            }
        })
    }

    /// Returns whether every known item has been processed.
    pub fn is_complete(&self) -> bool {
        self.total_items
            .is_some_and(|total| self.items_processed >= total)
    }
}

/// Callback type for receiving progress updates.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a progress callback that prints to stderr every `every` items
/// and on completion.
pub fn stderr_progress(every: usize) -> ProgressCallback {
    let every = every.max(1);
    Arc::new(move |progress| {
        if progress.items_processed % every == 0 || progress.is_complete() {
            match progress.percentage() {
                Some(pct) => eprintln!("{:?}: {:.1}%", progress.stage, pct),
                None => eprintln!("{:?}: {} items", progress.stage, progress.items_processed),
            }
        }
    })
}
