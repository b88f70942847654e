//! Processing statistics tracking.
//!
//! This module provides thread-safe counters for the failure categories seen
//! while processing a batch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ErrorType;

/// Thread-safe processing statistics tracker.
///
/// Every `ErrorType` is initialized to zero on creation, so counters can be
/// incremented from any task sharing the tracker through an `Arc`.
pub struct ProcessingStats {
    errors: HashMap<ErrorType, AtomicUsize>,
}

impl ProcessingStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }
        ProcessingStats { errors }
    }

    /// Increment an error counter.
    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                error
            );
        }
    }

    /// Get the count for an error type.
    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total number of errors recorded across all categories.
    pub fn total_errors(&self) -> usize {
        self.errors.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Non-zero counters in declaration order.
    pub fn non_zero(&self) -> Vec<(ErrorType, usize)> {
        ErrorType::iter()
            .map(|e| (e, self.get_error_count(e)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}
