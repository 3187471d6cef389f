//! Utilities for working with packed RGBA buffers.

pub mod traits;
pub use self::traits::*;
pub mod types;
pub use self::types::*;
pub mod utilities;
pub use self::utilities::*;

/// 8-neighbour Laplacian, the filter's default mask.
pub const LAPLACE_KERNEL: Kernel = Kernel::new([-1, -1, -1, -1, 8, -1, -1, -1, -1]);
/// 4-neighbour Laplacian.
pub const STRAIGHT_LAPLACE_KERNEL: Kernel = Kernel::new([0, -1, 0, -1, 4, -1, 0, -1, 0]);
pub const DIAGONAL_LAPLACE_KERNEL: Kernel = Kernel::new([1, -2, 1, -2, 4, -2, 1, -2, 1]);
pub const IDENTITY_KERNEL: Kernel = Kernel::new([0, 0, 0, 0, 1, 0, 0, 0, 0]);
