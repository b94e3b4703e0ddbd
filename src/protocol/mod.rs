//! # StarPRNT Protocol
//!
//! Command builders for Star Micronics thermal printers.
//!
//! - [`commands`]: reset, feed and cut
//! - [`graphics`]: raster image data
//!
//! ```
//! use pulselabel::protocol::{commands, graphics};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(graphics::raster(384, 2, &[0xFF; 96]));
//! data.extend(commands::cut_full_feed());
//! assert_eq!(&data[..2], &[0x1B, 0x40]);
//! ```

pub mod commands;
pub mod graphics;
