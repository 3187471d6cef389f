use std::ops::Range;

use num_traits::clamp;

pub const BYTES_PER_PIXEL: usize = 4;
pub const ALPHA_CHANNEL: usize = 3;

pub const TRANSPARENT_BLACK: [u8; BYTES_PER_PIXEL] = [0; BYTES_PER_PIXEL];

/// Clamps an accumulated channel sum into `0..=255`, truncating the fraction.
pub fn clamp_channel(sum: f64) -> u8 {
    return clamp(sum, 0.0, 255.0) as u8;
}

/// Byte range of the pixel at `index` within a packed buffer or row.
pub fn pixel_range(index: usize) -> Range<usize> {
    let start = index * BYTES_PER_PIXEL;
    return start..start + BYTES_PER_PIXEL;
}

/// Byte range of `count` pixels starting at pixel `first`.
pub fn pixels_range(first: usize, count: usize) -> Range<usize> {
    let start = first * BYTES_PER_PIXEL;
    return start..start + count * BYTES_PER_PIXEL;
}

pub fn fill_pixels(buffer: &mut [u8], first: usize, count: usize, pixel: [u8; BYTES_PER_PIXEL]) {
    for chunk in buffer[pixels_range(first, count)].chunks_exact_mut(BYTES_PER_PIXEL) {
        chunk.copy_from_slice(&pixel);
    }
}
