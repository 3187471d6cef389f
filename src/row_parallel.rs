//! Row-parallel scan.
//!
//! Interior rows only read the source, so bands of rows can be convolved on
//! separate threads. Workers report finished rows; the calling thread turns
//! them into progress values strictly in row order.

use std::sync::mpsc;
use std::thread;

use tracing::{debug, warn};

use super::image_arithmetic::{Dimensions, ProgressSink};
use super::laplace::{scan_row, LaplaceFilter};
use crate::error::{FilterError, FilterResult};

/// Convolves the interior rows of `destination` with up to `threads` workers.
///
/// `on_progress` runs on the calling thread, once per row, for the longest
/// prefix of rows that are finished.
pub(crate) fn scan_rows<S: ProgressSink>(
    filter: &LaplaceFilter, source: &[u8], destination: &mut [u8], dims: Dimensions,
    threads: usize, on_progress: &mut S,
) -> FilterResult<()> {
    let stride = dims.stride();
    let interior_rows = dims.interior_row_count();
    let threads = threads.clamp(1, interior_rows);
    let rows_per_thread = interior_rows.div_ceil(threads);
    let kernel = filter.kernel();
    let options = filter.options();
    debug!(threads, rows_per_thread, "splitting interior rows");

    let interior = &mut destination[stride..(interior_rows + 1) * stride];
    let mut finished = vec![false; interior_rows];
    let mut rows_done = 0;
    thread::scope(|scope| {
        let (sender, receiver) = mpsc::channel::<usize>();
        for (band, band_out) in interior.chunks_mut(rows_per_thread * stride).enumerate() {
            let sender = sender.clone();
            let first_row = 1 + band * rows_per_thread;
            scope.spawn(move || {
                for (offset, row_out) in band_out.chunks_mut(stride).enumerate() {
                    if filter.is_cancelled() {
                        break;
                    }
                    let row = first_row + offset;
                    scan_row(source, row_out, dims, row, kernel, options.alpha);
                    if sender.send(row).is_err() {
                        break;
                    }
                }
            });
        }
        // The loop below ends once every worker has dropped its sender.
        drop(sender);
        for row in receiver {
            finished[row - 1] = true;
            while rows_done < interior_rows && finished[rows_done] {
                rows_done += 1;
                on_progress.report(options.progress_scale.value(dims, rows_done));
            }
        }
    });

    if rows_done < interior_rows {
        warn!(rows_done, "scan cancelled");
        return Err(FilterError::Cancelled { rows_done });
    }
    return Ok(());
}
