//! Barcode and QR symbol encoding for label rendering.
//!
//! Uses the barcoders crate for Code 128 and the qrcode crate for QR codes.
//! Both return unscaled module grids; the renderer fits them to the element.

use barcoders::sym::code128::Code128;
use qrcode::{EcLevel, QrCode};

use crate::error::LabelError;

/// Encode data as Code 128 modules (true = bar).
pub fn encode_code128(data: &str) -> Result<Vec<bool>, LabelError> {
    if data.is_empty() {
        return Err(LabelError::Render("barcode data is empty".into()));
    }
    // Character Set B prefix (Ɓ): upper/lowercase, digits, punctuation.
    let prefixed = format!("\u{0181}{}", data);
    let barcode = Code128::new(&prefixed)
        .map_err(|e| LabelError::Render(format!("cannot encode '{}' as Code 128: {}", data, e)))?;
    Ok(barcode.encode().into_iter().map(|m| m == 1).collect())
}

/// A square grid of QR modules (true = dark).
#[derive(Debug, Clone)]
pub struct QrMatrix {
    pub width: usize,
    pub modules: Vec<bool>,
}

impl QrMatrix {
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules.get(y * self.width + x).copied().unwrap_or(false)
    }
}

/// Encode data as a QR code at error correction level M.
pub fn encode_qr(data: &str) -> Result<QrMatrix, LabelError> {
    let code = QrCode::with_error_correction_level(data, EcLevel::M)
        .map_err(|e| LabelError::Render(format!("QR code generation failed: {}", e)))?;
    let width = code.width();
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();
    Ok(QrMatrix { width, modules })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code128_encoding() {
        let bars = encode_code128("TRK123456789").unwrap();
        assert!(!bars.is_empty());
        assert!(bars.iter().any(|&b| b));
    }

    #[test]
    fn test_code128_rejects_empty() {
        assert!(encode_code128("").is_err());
    }

    #[test]
    fn test_qr_encoding() {
        let qr = encode_qr("https://camerpulse.cm").unwrap();
        assert!(qr.width >= 21);
        assert_eq!(qr.modules.len(), qr.width * qr.width);
        // Finder pattern corner is dark.
        assert!(qr.is_dark(0, 0));
    }
}
