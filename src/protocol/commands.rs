//! # StarPRNT Control Commands
//!
//! Job framing for label output: reset, feed and cut.
//!
//! ## Byte Order
//!
//! Multi-byte integers are sent **little-endian**: `0x1234` goes out as
//! `[0x34, 0x12]`.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC, the prefix of most commands.
pub const ESC: u8 = 0x1B;

/// GS, combined with ESC for raster graphics (`ESC GS S`).
pub const GS: u8 = 0x1D;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | ESC @ |
/// | Hex    | 1B 40 |
///
/// Clears the print buffer and resets formatting. NV graphics and
/// configuration survive.
///
/// ```
/// use pulselabel::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// PAPER CONTROL
// ============================================================================

/// # Feed in Units (ESC J n)
///
/// Feeds `n` × 0.25mm. Used between labels printed without a cut.
#[inline]
pub fn feed_units(n: u8) -> Vec<u8> {
    vec![ESC, b'J', n]
}

/// # Feed to Cut Position, Then Full Cut (ESC d 2)
///
/// | Format | Bytes    |
/// |--------|----------|
/// | ASCII  | ESC d 2  |
/// | Hex    | 1B 64 02 |
///
/// Feeds so the last printed row clears the blade, then cuts.
#[inline]
pub fn cut_full_feed() -> Vec<u8> {
    vec![ESC, b'd', 2]
}

/// # Feed to Cut Position, Then Partial Cut (ESC d 3)
///
/// Leaves a hinge so a strip of labels stays attached to the roll.
#[inline]
pub fn cut_partial_feed() -> Vec<u8> {
    vec![ESC, b'd', 3]
}

// ============================================================================
// HELPERS
// ============================================================================

/// Split a `u16` into `[low, high]` bytes.
#[inline]
pub fn u16_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}
