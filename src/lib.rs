//! Laplacian edge filtering of packed RGBA buffers.
//!
//! The core is [`apply`] / [`LaplaceFilter::apply`]: a blocking function from
//! a source buffer, a 3x3 kernel and a progress sink to a new destination
//! buffer. Decoding, encoding and running the scan off the main thread live in
//! [`image_io`] and [`background`] and are not needed to use the core.
#![forbid(unsafe_code)]

pub mod background;
pub mod error;
pub mod image_arithmetic;
pub mod image_io;
pub mod laplace;
pub mod log_setup;
pub mod options;
mod row_parallel;

pub use error::{FilterError, FilterResult};
pub use image_arithmetic::{
    ChannelSink, Dimensions, Kernel, ProgressSink, DIAGONAL_LAPLACE_KERNEL, IDENTITY_KERNEL,
    LAPLACE_KERNEL, STRAIGHT_LAPLACE_KERNEL,
};
pub use laplace::{apply, apply_kernel_at, zero_border, LaplaceFilter};
pub use options::{AlphaPolicy, CancellationToken, FilterOptions, ProgressScale, ScanStrategy};
