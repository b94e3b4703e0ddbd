//! # Printer Transport Layer
//!
//! - [`device`]: device files (RFCOMM, USB line printer, serial)

pub mod device;

pub use device::{DEFAULT_DEVICE, DeviceTransport, send};
