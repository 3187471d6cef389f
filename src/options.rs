//! Knobs that change how a scan runs or reports, never which kernel it applies.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::image_arithmetic::Dimensions;

/// How a finished row is turned into a progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressScale {
    /// Pixel index just past the row divided by the buffer's *byte* length.
    ///
    /// Kept for parity with the original tool's progress bar: the last row
    /// reports `(height - 1) / (4 * height)`, not 1.0.
    #[default]
    Legacy,
    /// Finished interior rows over interior row count; the last row reports 1.0.
    Fraction,
}

impl ProgressScale {
    /// Progress after interior row `row` (1-based image row) has been written.
    pub fn value(self, dims: Dimensions, row: usize) -> f32 {
        match self {
            Self::Legacy => {
                let row_end_index = (row + 1) * dims.width() as usize;
                row_end_index as f32 / dims.byte_len() as f32
            }
            Self::Fraction => row as f32 / dims.interior_row_count() as f32,
        }
    }
}

/// Treatment of the fourth channel for interior pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaPolicy {
    /// Alpha goes through the kernel like any colour channel.
    #[default]
    Convolve,
    /// Interior pixels keep the source alpha.
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStrategy {
    #[default]
    Sequential,
    /// Contiguous bands of rows on scoped worker threads, progress still in row order.
    RowParallel { threads: NonZeroUsize },
}

impl ScanStrategy {
    /// Row-parallel scan; `0` means one thread per available core.
    pub fn row_parallel(threads: usize) -> Self {
        let threads = NonZeroUsize::new(threads)
            .or_else(|| thread::available_parallelism().ok())
            .unwrap_or(NonZeroUsize::MIN);
        return Self::RowParallel { threads };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub progress_scale: ProgressScale,
    pub alpha: AlphaPolicy,
    pub strategy: ScanStrategy,
}

impl FilterOptions {
    pub fn with_progress_scale(mut self, progress_scale: ProgressScale) -> Self {
        self.progress_scale = progress_scale;
        self
    }

    pub fn with_alpha(mut self, alpha: AlphaPolicy) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_strategy(mut self, strategy: ScanStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Cooperative stop flag, checked by the scanner before each row.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_scale_stops_near_a_quarter() {
        let dims = Dimensions::new(5, 5).unwrap();
        let values: Vec<f32> =
            dims.interior_rows().map(|row| ProgressScale::Legacy.value(dims, row)).collect();
        assert_eq!(values, vec![0.1, 0.15, 0.2]);
    }

    #[test]
    fn fraction_scale_ends_at_one() {
        let dims = Dimensions::new(7, 6).unwrap();
        let values: Vec<f32> =
            dims.interior_rows().map(|row| ProgressScale::Fraction.value(dims, row)).collect();
        assert_eq!(values, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn zero_threads_means_available_parallelism() {
        match ScanStrategy::row_parallel(0) {
            ScanStrategy::RowParallel { threads } => assert!(threads.get() >= 1),
            other => panic!("unexpected strategy {:?}", other),
        }
        assert_eq!(
            ScanStrategy::row_parallel(3),
            ScanStrategy::RowParallel { threads: NonZeroUsize::new(3).unwrap() }
        );
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn defaults_match_the_original_behaviour() {
        let options = FilterOptions::default();
        assert_eq!(options.progress_scale, ProgressScale::Legacy);
        assert_eq!(options.alpha, AlphaPolicy::Convolve);
        assert_eq!(options.strategy, ScanStrategy::Sequential);
    }
}
