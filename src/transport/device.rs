//! # Device File Transport
//!
//! Sends print jobs to a printer exposed as a device file: a Bluetooth
//! RFCOMM port (`/dev/rfcomm0`), a USB line printer (`/dev/usb/lp0`) or a
//! serial adapter.
//!
//! ## TTY Configuration
//!
//! When the target is a terminal it is switched to raw mode so binary data
//! passes through unmodified:
//!
//! - **No input processing**, including XON/XOFF (0x11/0x13 appear in raster data)
//! - **No output processing**: OPOST off, no CR/LF translation
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**
//!
//! Plain files are written as-is, which is handy for capturing jobs.
//!
//! ## Chunked Writes
//!
//! Writes larger than the chunk size (4096 bytes) are split with a short
//! pause between chunks so the Bluetooth buffer keeps up.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::error::LabelError;

/// Default RFCOMM device path
pub const DEFAULT_DEVICE: &str = "/dev/rfcomm0";

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Printer Device Transport
///
/// ```no_run
/// use pulselabel::transport::DeviceTransport;
/// use pulselabel::protocol::commands;
///
/// let mut transport = DeviceTransport::open("/dev/rfcomm0")?;
/// transport.write_all(&commands::init())?;
/// # Ok::<(), pulselabel::error::LabelError>(())
/// ```
pub struct DeviceTransport<W: Write = File> {
    sink: W,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl DeviceTransport<File> {
    /// Open a device for writing, configuring raw mode if it is a TTY.
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, LabelError> {
        let path = device.as_ref();

        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            LabelError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;

        configure_tty_raw(&file)?;
        debug!(device = %path.display(), "printer device opened");

        Ok(Self::new(file))
    }
}

impl<W: Write> DeviceTransport<W> {
    /// Wrap any writer with the default chunking.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        }
    }

    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    /// Write all of `data`, then flush.
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), LabelError> {
        if data.len() <= self.chunk_size {
            self.sink
                .write_all(data)
                .map_err(|e| LabelError::Transport(format!("Write failed: {}", e)))?;
        } else {
            for chunk in data.chunks(self.chunk_size) {
                self.sink
                    .write_all(chunk)
                    .map_err(|e| LabelError::Transport(format!("Write failed: {}", e)))?;

                if !self.chunk_delay.is_zero() {
                    thread::sleep(self.chunk_delay);
                }
            }
        }

        self.sink
            .flush()
            .map_err(|e| LabelError::Transport(format!("Flush failed: {}", e)))?;
        debug!(bytes = data.len(), "print data sent");
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Open `device` and send `data` in one go.
pub fn send(device: &Path, data: &[u8]) -> Result<(), LabelError> {
    DeviceTransport::open(device)?.write_all(data)
}

/// Switch a TTY to raw mode. Non-terminals are left alone.
#[cfg(unix)]
fn configure_tty_raw(file: &File) -> Result<(), LabelError> {
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    if unsafe { libc::isatty(fd) } != 1 {
        return Ok(());
    }

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(LabelError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(LabelError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &File) -> Result<(), LabelError> {
    Ok(())
}
