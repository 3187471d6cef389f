pub type FilterResult<T> = Result<T, FilterError>;

#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    #[error("invalid dimensions {width}x{height}: both sides must be at least 3 pixels")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("kernel must have 9 weights, got {len}")]
    InvalidKernel { len: usize },

    #[error("invalid kernel weight {0:?}")]
    InvalidWeight(String),

    #[error("pixel {index} has no full 3x3 neighbourhood")]
    PixelOutsideInterior { index: usize },

    #[error("scan cancelled after {rows_done} rows")]
    Cancelled { rows_done: usize },

    #[error("image is {width}x{height}, the smaller side must be at least {min} pixels")]
    InputTooSmall { width: u32, height: u32, min: u32 },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FilterError {
    /// Whether the error was raised by an input precondition rather than by I/O.
    pub fn is_precondition(&self) -> bool {
        return matches!(
            self,
            Self::InvalidDimensions { .. }
                | Self::BufferSizeMismatch { .. }
                | Self::InvalidKernel { .. }
                | Self::InvalidWeight(_)
                | Self::PixelOutsideInterior { .. }
                | Self::InputTooSmall { .. }
        );
    }
}
