//! # StarPRNT Raster Graphics
//!
//! Labels are sent as `ESC GS S` raster images, split into chunks of at most
//! `max_chunk_rows` rows so the printer buffer does not overflow.
//!
//! ## Bit Packing
//!
//! - Bit 7 (MSB) = leftmost dot
//! - 1 = black, 0 = white
//! - Each row is padded to a whole byte
//!
//! ```text
//! 0xF0 = 11110000 = ████░░░░
//! 0x0F = 00001111 = ░░░░████
//! ```

use super::commands::{ESC, GS, u16_le};

/// # Print Raster Graphics Data (ESC GS S m xL xH yL yH n d1...dk)
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | ESC GS S m xL xH yL yH n d1...dk |
/// | Hex    | 1B 1D 53 m xL xH yL yH n d1...dk |
///
/// - `m`: 1 (monochrome)
/// - `xL, xH`: width in bytes
/// - `yL, yH`: height in dots
/// - `n`: 0 (black)
///
/// ```
/// use pulselabel::protocol::graphics;
///
/// let data = vec![0xAA; 48 * 10];
/// let cmd = graphics::raster(384, 10, &data);
/// assert_eq!(&cmd[..9], &[0x1B, 0x1D, 0x53, 1, 48, 0, 10, 0, 0]);
/// assert_eq!(cmd.len(), 9 + data.len());
/// ```
pub fn raster(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);
    debug_assert_eq!(
        data.len(),
        width_bytes as usize * height as usize,
        "raster data must be width_bytes × height"
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(9 + data.len());
    cmd.extend_from_slice(&[ESC, GS, b'S', 1, xl, xh, yl, yh, 0]);
    cmd.extend_from_slice(data);
    cmd
}

/// Raster commands for a tall image, `max_rows` rows at a time.
///
/// `data` is row-major with `width_dots.div_ceil(8)` bytes per row.
pub fn raster_chunked(width_dots: u16, data: &[u8], max_rows: u16) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8) as usize;
    if width_bytes == 0 || data.is_empty() {
        return Vec::new();
    }
    let max_rows = max_rows.max(1) as usize;

    let mut out = Vec::with_capacity(data.len() + data.len() / (width_bytes * max_rows) * 9 + 9);
    for chunk in data.chunks(width_bytes * max_rows) {
        let rows = (chunk.len() / width_bytes) as u16;
        out.extend(raster(width_dots, rows, chunk));
    }
    out
}
