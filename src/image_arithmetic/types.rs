use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use super::utilities::BYTES_PER_PIXEL;
use crate::error::{FilterError, FilterResult};

/// Validated size of a packed RGBA buffer.
///
/// Both sides are at least [`Dimensions::MIN_SIDE`] so that a one-pixel
/// border leaves a non-empty interior.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    pub const MIN_SIDE: u32 = 3;

    pub fn new(width: u32, height: u32) -> FilterResult<Self> {
        if width < Self::MIN_SIDE || height < Self::MIN_SIDE {
            return Err(FilterError::InvalidDimensions { width, height });
        }
        // The byte length must be addressable.
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
            .ok_or(FilterError::InvalidDimensions { width, height })?;
        return Ok(Self { width, height });
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    pub fn pixel_count(self) -> usize {
        return self.width as usize * self.height as usize;
    }

    pub fn byte_len(self) -> usize {
        return self.pixel_count() * BYTES_PER_PIXEL;
    }

    /// Bytes per row.
    pub fn stride(self) -> usize {
        return self.width as usize * BYTES_PER_PIXEL;
    }

    /// Rows that get a real convolution result.
    pub fn interior_rows(self) -> Range<usize> {
        return 1..self.height as usize - 1;
    }

    pub fn interior_columns(self) -> Range<usize> {
        return 1..self.width as usize - 1;
    }

    pub fn interior_row_count(self) -> usize {
        return self.height as usize - 2;
    }

    /// Whether the pixel at `index` has a full 3x3 neighbourhood.
    pub fn is_interior(self, index: usize) -> bool {
        if index >= self.pixel_count() {
            return false;
        }
        let (x, y) = self.coordinates(index);
        return self.interior_columns().contains(&x) && self.interior_rows().contains(&y);
    }

    /// Column and row of a linear pixel index.
    pub fn coordinates(self, index: usize) -> (usize, usize) {
        let width = self.width as usize;
        return (index % width, index / width);
    }

    pub fn check_buffer(self, buffer: &[u8]) -> FilterResult<()> {
        if buffer.len() != self.byte_len() {
            return Err(FilterError::BufferSizeMismatch {
                expected: self.byte_len(),
                actual: buffer.len(),
            });
        }
        return Ok(());
    }
}

/// A 3x3 grid of integer weights, row-major, centre at index 4.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Kernel([i32; 9]);

impl Kernel {
    pub const SIDE: usize = 3;
    pub const LEN: usize = Self::SIDE * Self::SIDE;

    pub const fn new(weights: [i32; Self::LEN]) -> Self {
        Self(weights)
    }

    pub fn from_slice(weights: &[i32]) -> FilterResult<Self> {
        let weights: [i32; Self::LEN] =
            weights.try_into().map_err(|_| FilterError::InvalidKernel { len: weights.len() })?;
        return Ok(Self(weights));
    }

    pub fn weights(&self) -> &[i32; Self::LEN] {
        &self.0
    }

    /// Weight for the neighbour at offset (`dy`, `dx`), both in `-1..=1`.
    pub fn weight(&self, dy: i32, dx: i32) -> i32 {
        assert!((-1..=1).contains(&dy) && (-1..=1).contains(&dx), "offset outside 3x3 kernel");
        return self.0[((dy + 1) * Self::SIDE as i32 + dx + 1) as usize];
    }

    /// Weight rows from top (`dy = -1`) to bottom (`dy = 1`).
    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        return self.0.chunks_exact(Self::SIDE);
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weights: Vec<String> = self.0.iter().map(|w| w.to_string()).collect();
        write!(f, "{}", weights.join(","))
    }
}

/// Parses nine comma separated integers, e.g. `-1,-1,-1,-1,8,-1,-1,-1,-1`.
impl FromStr for Kernel {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let weights = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<i32>().map_err(|_| FilterError::InvalidWeight(part.to_string()))
            })
            .collect::<FilterResult<Vec<i32>>>()?;
        return Self::from_slice(&weights);
    }
}
