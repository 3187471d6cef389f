//! Core functionality for 3x3 convolution over packed RGBA buffers.
//!
//! A scan zeroes the one-pixel border of a freshly allocated destination,
//! then convolves every interior pixel row by row, reporting progress after
//! each row. The source is only ever read; the destination is handed to the
//! caller once every byte of it has been written.

use tracing::{debug, warn};

use super::image_arithmetic::{
    clamp_channel, fill_pixels, pixel_range, Dimensions, Kernel, ProgressSink, ALPHA_CHANNEL,
    BYTES_PER_PIXEL, TRANSPARENT_BLACK,
};
use super::options::{AlphaPolicy, CancellationToken, FilterOptions, ScanStrategy};
use super::row_parallel;
use crate::error::{FilterError, FilterResult};

/// Source rows above, at and below the row being convolved.
pub(crate) type Neighbourhood<'a> = [&'a [u8]; Kernel::SIDE];

#[derive(Debug, Clone)]
pub struct LaplaceFilter {
    kernel: Kernel,
    options: FilterOptions,
    cancellation: Option<CancellationToken>,
}

impl LaplaceFilter {
    pub fn new(kernel: Kernel) -> Self {
        return Self { kernel, options: FilterOptions::default(), cancellation: None };
    }

    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        return self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled);
    }

    /// Filters `source` (`width * height` RGBA pixels) into a new buffer.
    ///
    /// `on_progress` is called on the calling thread once per interior row,
    /// in row order, with values scaled by [`FilterOptions::progress_scale`].
    /// Preconditions are checked before anything is allocated; on error no
    /// destination is returned.
    #[tracing::instrument(
        level = "debug",
        skip(self, source, on_progress),
        fields(kernel = %self.kernel, strategy = ?self.options.strategy)
    )]
    pub fn apply<S: ProgressSink>(
        &self, source: &[u8], width: u32, height: u32, mut on_progress: S,
    ) -> FilterResult<Vec<u8>> {
        let dims = Dimensions::new(width, height)?;
        dims.check_buffer(source)?;

        let mut destination = vec![0u8; dims.byte_len()];
        zero_border(&mut destination, dims);
        debug!(rows = dims.interior_row_count(), "scanning interior");
        match self.options.strategy {
            ScanStrategy::Sequential => {
                self.scan_sequential(source, &mut destination, dims, &mut on_progress)?
            }
            ScanStrategy::RowParallel { threads } => row_parallel::scan_rows(
                self,
                source,
                &mut destination,
                dims,
                threads.get(),
                &mut on_progress,
            )?,
        }
        debug!("scan finished");
        return Ok(destination);
    }

    fn scan_sequential<S: ProgressSink>(
        &self, source: &[u8], destination: &mut [u8], dims: Dimensions, on_progress: &mut S,
    ) -> FilterResult<()> {
        let stride = dims.stride();
        for (rows_done, row) in dims.interior_rows().enumerate() {
            if self.is_cancelled() {
                warn!(rows_done, "scan cancelled");
                return Err(FilterError::Cancelled { rows_done });
            }
            let row_out = &mut destination[row * stride..(row + 1) * stride];
            scan_row(source, row_out, dims, row, &self.kernel, self.options.alpha);
            on_progress.report(self.options.progress_scale.value(dims, row));
        }
        return Ok(());
    }
}

/// Filters with default options: sequential scan, legacy progress scale, alpha convolved.
pub fn apply<S: ProgressSink>(
    source: &[u8], width: u32, height: u32, kernel: &Kernel, on_progress: S,
) -> FilterResult<Vec<u8>> {
    return LaplaceFilter::new(*kernel).apply(source, width, height, on_progress);
}

/// Zeroes the top and bottom rows and the first and last pixel of every interior row.
pub fn zero_border(destination: &mut [u8], dims: Dimensions) {
    let width = dims.width() as usize;
    let height = dims.height() as usize;
    fill_pixels(destination, 0, width, TRANSPARENT_BLACK);
    fill_pixels(destination, (height - 1) * width, width, TRANSPARENT_BLACK);
    for row in dims.interior_rows() {
        fill_pixels(destination, row * width, 1, TRANSPARENT_BLACK);
        fill_pixels(destination, (row + 1) * width - 1, 1, TRANSPARENT_BLACK);
    }
}

/// Convolves the interior columns of `row` into `row_out`, one destination row.
///
/// Border pixels of `row_out` are left untouched.
pub(crate) fn scan_row(
    source: &[u8], row_out: &mut [u8], dims: Dimensions, row: usize, kernel: &Kernel,
    alpha: AlphaPolicy,
) {
    let rows = neighbourhood(source, dims.stride(), row);
    for column in dims.interior_columns() {
        let mut pixel = convolve_pixel(&rows, column, kernel);
        if alpha == AlphaPolicy::Preserve {
            pixel[ALPHA_CHANNEL] = rows[1][column * BYTES_PER_PIXEL + ALPHA_CHANNEL];
        }
        row_out[pixel_range(column)].copy_from_slice(&pixel);
    }
}

fn neighbourhood(source: &[u8], stride: usize, row: usize) -> Neighbourhood<'_> {
    return [
        &source[(row - 1) * stride..row * stride],
        &source[row * stride..(row + 1) * stride],
        &source[(row + 1) * stride..(row + 2) * stride],
    ];
}

/// Weighted sum of the 3x3 window centred on `column`, per channel, clamped.
fn convolve_pixel(neighbourhood: &Neighbourhood, column: usize, kernel: &Kernel) -> [u8; 4] {
    let mut sums = [0f64; BYTES_PER_PIXEL];
    for (source_row, weights) in neighbourhood.iter().zip(kernel.rows()) {
        let window = &source_row[(column - 1) * BYTES_PER_PIXEL..(column + 2) * BYTES_PER_PIXEL];
        for (pixel, &weight) in window.chunks_exact(BYTES_PER_PIXEL).zip(weights) {
            for (sum, &channel) in sums.iter_mut().zip(pixel) {
                *sum += f64::from(channel) * f64::from(weight);
            }
        }
    }
    return sums.map(clamp_channel);
}

/// Filtered value of the single pixel at linear `index`.
///
/// Only pixels with a full 3x3 neighbourhood inside the buffer can be filtered.
pub fn apply_kernel_at(
    source: &[u8], width: u32, height: u32, index: usize, kernel: &Kernel,
) -> FilterResult<[u8; 4]> {
    let dims = Dimensions::new(width, height)?;
    dims.check_buffer(source)?;
    if !dims.is_interior(index) {
        return Err(FilterError::PixelOutsideInterior { index });
    }
    let (column, row) = dims.coordinates(index);
    return Ok(convolve_pixel(&neighbourhood(source, dims.stride(), row), column, kernel));
}
