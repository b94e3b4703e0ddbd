//! Print job assembly: one or more label rasters framed for the printer.

use crate::error::LabelError;
use crate::protocol::{commands, graphics};
use crate::render::LabelRaster;

use super::PrinterConfig;

/// What happens after each label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutMode {
    /// Feed to the blade and cut fully.
    #[default]
    Full,
    /// Feed to the blade and leave a hinge.
    Partial,
    /// Feed a short gap only.
    None,
}

impl CutMode {
    /// `cut = false` wins; otherwise `partial` picks a hinged cut.
    pub fn from_flags(cut: bool, partial: bool) -> Self {
        match (cut, partial) {
            (false, _) => CutMode::None,
            (true, true) => CutMode::Partial,
            (true, false) => CutMode::Full,
        }
    }
}

/// Gap fed between uncut labels, in 0.25mm units (3mm).
const LABEL_GAP_UNITS: u8 = 12;

/// Bytes for a single label: init, raster chunks, then feed and cut.
///
/// Fails if the raster is wider than the printer; render with
/// [`crate::render::render_label_fit`] first to scale it down.
pub fn print_job_bytes(
    raster: &LabelRaster,
    config: &PrinterConfig,
    cut: CutMode,
) -> Result<Vec<u8>, LabelError> {
    print_batch_bytes(std::slice::from_ref(raster), config, cut)
}

/// Bytes for several labels in one job, one init at the start.
pub fn print_batch_bytes(
    rasters: &[LabelRaster],
    config: &PrinterConfig,
    cut: CutMode,
) -> Result<Vec<u8>, LabelError> {
    let mut out = commands::init();
    for raster in rasters {
        if raster.width > config.width_dots as usize {
            return Err(LabelError::Render(format!(
                "label is {} dots wide, {} prints at most {}",
                raster.width, config.name, config.width_dots
            )));
        }
        if raster.height > 0 && raster.width > 0 {
            out.extend(graphics::raster_chunked(
                raster.width as u16,
                &raster.data,
                config.max_chunk_rows,
            ));
        }
        match cut {
            CutMode::Full => out.extend(commands::cut_full_feed()),
            CutMode::Partial => out.extend(commands::cut_partial_feed()),
            CutMode::None => out.extend(commands::feed_units(LABEL_GAP_UNITS)),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_cut_mode_from_flags() {
        assert_eq!(CutMode::from_flags(true, false), CutMode::Full);
        assert_eq!(CutMode::from_flags(true, true), CutMode::Partial);
        assert_eq!(CutMode::from_flags(false, true), CutMode::None);
    }

    fn black(width: u32, height: u32) -> LabelRaster {
        LabelRaster::from_gray(&GrayImage::from_pixel(width, height, Luma([0])))
    }

    #[test]
    fn test_single_label_framing() {
        let bytes = print_job_bytes(&black(16, 3), &PrinterConfig::TSP650II, CutMode::Full).unwrap();
        assert_eq!(&bytes[..2], &[0x1B, 0x40]);
        assert_eq!(&bytes[2..11], &[0x1B, 0x1D, b'S', 1, 2, 0, 3, 0, 0]);
        assert_eq!(&bytes[11..17], &[0xFF; 6]);
        assert_eq!(&bytes[17..], &[0x1B, b'd', 2]);
    }

    #[test]
    fn test_tall_label_is_chunked() {
        let bytes =
            print_job_bytes(&black(8, 600), &PrinterConfig::TSP650II, CutMode::Partial).unwrap();
        let headers = bytes
            .windows(3)
            .filter(|w| w == &[0x1B, 0x1D, b'S'])
            .count();
        assert_eq!(headers, 3);
        assert_eq!(&bytes[bytes.len() - 3..], &[0x1B, b'd', 3]);
    }

    #[test]
    fn test_too_wide_rejected() {
        let result = print_job_bytes(&black(600, 1), &PrinterConfig::TSP650II, CutMode::Full);
        assert!(matches!(result, Err(LabelError::Render(_))));
    }

    #[test]
    fn test_batch_single_init() {
        let labels = vec![black(8, 1), black(8, 1)];
        let bytes = print_batch_bytes(&labels, &PrinterConfig::TSP650II, CutMode::None).unwrap();
        let inits = bytes.windows(2).filter(|w| w == &[0x1B, 0x40]).count();
        assert_eq!(inits, 1);
        assert_eq!(&bytes[bytes.len() - 3..], &[0x1B, b'J', 12]);
    }
}
