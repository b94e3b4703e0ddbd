//! # Label Rendering
//!
//! Turns a [`LayoutDocument`] plus a [`DataContext`] into pixels.
//!
//! Elements are drawn bottom layer first onto an 8-bit grayscale canvas, then
//! thresholded to a 1-bit [`LabelRaster`] suitable for thermal printing.
//!
//! | Kind | Drawn as |
//! |------|----------|
//! | text, dynamic-field | Spleen bitmap text, word-wrapped |
//! | barcode | Code 128 bars, human-readable line when tall enough |
//! | qr | QR code (level M), centered |
//! | image | file at `content`, resized and Floyd-Steinberg dithered |
//! | shape | 2px outline |
//!
//! ## Limits
//!
//! Canvases larger than [`MAX_CANVAS_DOTS`] on either side are rejected.
//! Element rects are clamped to the canvas before drawing, so an oversized
//! or far-away element costs no more than a full-canvas one.
//!
//! ## Bit Packing
//!
//! Same as StarPRNT raster data: MSB is the leftmost pixel, 1 = black,
//! rows padded to whole bytes.

pub mod barcode;
pub mod font;

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, imageops::FilterType};
use tracing::warn;

use crate::binding::{DataContext, FieldBindingRegistry};
use crate::error::LabelError;
use crate::layout::{ElementKind, FontWeight, LayoutDocument, LayoutElement, TextAlign};
use font::{GlyphCache, Rect, TextStyle};

const WHITE: u8 = 255;
const BLACK: u8 = 0;

/// Largest canvas side, in pixels, that will be rendered.
pub const MAX_CANVAS_DOTS: u32 = 4096;

/// Luma below this prints black.
pub const THRESHOLD: u8 = 128;

/// Shape outline thickness in pixels.
const STROKE: i64 = 2;

/// Barcodes shorter than this get no human-readable line.
const BARCODE_CAPTION_MIN_HEIGHT: i64 = 40;
const BARCODE_CAPTION_SIZE: f32 = 12.0;

// ============================================================================
// RASTER
// ============================================================================

/// A 1-bit packed label image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRaster {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl LabelRaster {
    /// Threshold a grayscale image.
    pub fn from_gray(img: &GrayImage) -> Self {
        let width = img.width() as usize;
        let height = img.height() as usize;
        let width_bytes = width.div_ceil(8);
        let mut data = vec![0u8; width_bytes * height];

        for (x, y, pixel) in img.enumerate_pixels() {
            if pixel[0] < THRESHOLD {
                let (x, y) = (x as usize, y as usize);
                data[y * width_bytes + x / 8] |= 0x80 >> (x % 8);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width_bytes(&self) -> usize {
        self.width.div_ceil(8)
    }

    pub fn is_black(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y * self.width_bytes() + x / 8];
        (byte >> (7 - (x % 8))) & 1 == 1
    }

    /// Number of black pixels.
    pub fn ink(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            if self.is_black(x as usize, y as usize) {
                Luma([BLACK])
            } else {
                Luma([WHITE])
            }
        })
    }

    /// Encode as a grayscale PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, LabelError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(self.to_gray())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| LabelError::Render(format!("PNG encoding failed: {}", e)))?;
        Ok(bytes)
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// Render a document for `context` to a 1-bit raster.
pub fn render_label(
    doc: &LayoutDocument,
    context: &DataContext,
    registry: &FieldBindingRegistry,
) -> Result<LabelRaster, LabelError> {
    Ok(LabelRaster::from_gray(&render_gray(doc, context, registry)?))
}

/// Render a document and scale it down (aspect preserved) to at most
/// `max_width` pixels wide before thresholding.
pub fn render_label_fit(
    doc: &LayoutDocument,
    context: &DataContext,
    registry: &FieldBindingRegistry,
    max_width: usize,
) -> Result<LabelRaster, LabelError> {
    let gray = render_gray(doc, context, registry)?;
    Ok(LabelRaster::from_gray(&fit_width(gray, max_width)))
}

/// Downscale `img` to `max_width` if it is wider.
pub fn fit_width(img: GrayImage, max_width: usize) -> GrayImage {
    let max_width = max_width.max(1) as u32;
    if img.width() <= max_width {
        return img;
    }
    let height = (img.height() as f32 * max_width as f32 / img.width() as f32)
        .round()
        .max(1.0) as u32;
    image::imageops::resize(&img, max_width, height, FilterType::Triangle)
}

/// Render a document to an 8-bit grayscale canvas.
pub fn render_gray(
    doc: &LayoutDocument,
    context: &DataContext,
    registry: &FieldBindingRegistry,
) -> Result<GrayImage, LabelError> {
    let canvas = doc.canvas_size();
    let limit = MAX_CANVAS_DOTS as f32;
    let fits = |side: f32| side.is_finite() && side.round() <= limit;
    if !fits(canvas.width) || !fits(canvas.height) {
        return Err(LabelError::Render(format!(
            "canvas {}x{} exceeds the {} px limit",
            canvas.width, canvas.height, MAX_CANVAS_DOTS
        )));
    }
    let mut img = GrayImage::from_pixel(
        canvas.width.round().max(1.0) as u32,
        canvas.height.round().max(1.0) as u32,
        Luma([WHITE]),
    );
    let mut glyphs = GlyphCache::new();

    for element in doc.elements() {
        draw_element(&mut img, &mut glyphs, element, context, registry)?;
    }
    Ok(img)
}

/// Element bounds in pixels. Position is clamped to the canvas edge and size
/// to the canvas dimensions; nothing past that is visible anyway.
fn element_rect(element: &LayoutElement, img: &GrayImage) -> Rect {
    let (w, h) = (img.width() as f32, img.height() as f32);
    // NaN casts to 0.
    let px = |v: f32, max: f32| v.round().clamp(0.0, max) as i64;
    Rect {
        x: px(element.position.x, w),
        y: px(element.position.y, h),
        width: px(element.size.width, w),
        height: px(element.size.height, h),
    }
}

fn draw_element(
    img: &mut GrayImage,
    glyphs: &mut GlyphCache,
    element: &LayoutElement,
    context: &DataContext,
    registry: &FieldBindingRegistry,
) -> Result<(), LabelError> {
    let rect = element_rect(element, img);
    let style = &element.style;
    let ink = parse_luma(style.color()).unwrap_or(BLACK);

    if let Some(bg) = style.background_color() {
        match parse_luma(bg) {
            Some(luma) => fill_rect(img, rect, luma),
            None => warn!(element = %element.id, color = bg, "unrecognized background color"),
        }
    }

    let inner = rect.inset(style.padding().round() as i64);

    match element.kind {
        ElementKind::Text | ElementKind::DynamicField => {
            let text = registry.resolve_element(element, context);
            let text_style = TextStyle {
                size: style.font_size(),
                weight: style.font_weight(),
                align: style.text_align(),
                luma: ink,
            };
            font::draw_text(img, glyphs, inner, &text, text_style)
        }
        ElementKind::Barcode => {
            let value = registry.resolve_element(element, context);
            draw_barcode(img, glyphs, inner, &value, ink)
        }
        ElementKind::Qr => {
            let value = registry.resolve_element(element, context);
            draw_qr(img, inner, &value, ink)
        }
        ElementKind::Image => {
            draw_image(img, inner, &element.content);
            Ok(())
        }
        ElementKind::Shape => {
            stroke_rect(img, rect, STROKE, ink);
            Ok(())
        }
    }
}

fn draw_barcode(
    img: &mut GrayImage,
    glyphs: &mut GlyphCache,
    rect: Rect,
    value: &str,
    ink: u8,
) -> Result<(), LabelError> {
    let bars = barcode::encode_code128(value)?;
    let module = rect.width / bars.len() as i64;
    if module < 1 {
        return Err(LabelError::Render(format!(
            "barcode for '{}' needs {} px, element is {} px wide",
            value,
            bars.len(),
            rect.width
        )));
    }

    let (caption_h, bar_h) = if rect.height >= BARCODE_CAPTION_MIN_HEIGHT {
        let (_, cell_h) = font::cell_size(BARCODE_CAPTION_SIZE);
        (cell_h as i64, rect.height - cell_h as i64)
    } else {
        (0, rect.height)
    };

    let symbol_w = module * bars.len() as i64;
    let left = rect.x + (rect.width - symbol_w) / 2;
    for (i, &bar) in bars.iter().enumerate() {
        if bar {
            let bar_rect = Rect {
                x: left + i as i64 * module,
                y: rect.y,
                width: module,
                height: bar_h,
            };
            fill_rect(img, bar_rect, ink);
        }
    }

    if caption_h > 0 {
        let caption = Rect {
            x: rect.x,
            y: rect.y + bar_h,
            width: rect.width,
            height: caption_h,
        };
        let style = TextStyle {
            size: BARCODE_CAPTION_SIZE,
            weight: FontWeight::Normal,
            align: TextAlign::Center,
            luma: ink,
        };
        font::draw_text(img, glyphs, caption, value, style)?;
    }
    Ok(())
}

fn draw_qr(img: &mut GrayImage, rect: Rect, value: &str, ink: u8) -> Result<(), LabelError> {
    let qr = barcode::encode_qr(value)?;
    let side = rect.width.min(rect.height);
    let module = side / qr.width as i64;
    if module < 1 {
        return Err(LabelError::Render(format!(
            "QR code needs {} px, element allows {} px",
            qr.width, side
        )));
    }

    let symbol = module * qr.width as i64;
    let left = rect.x + (rect.width - symbol) / 2;
    let top = rect.y + (rect.height - symbol) / 2;
    for qy in 0..qr.width {
        for qx in 0..qr.width {
            if qr.is_dark(qx, qy) {
                let cell = Rect {
                    x: left + qx as i64 * module,
                    y: top + qy as i64 * module,
                    width: module,
                    height: module,
                };
                fill_rect(img, cell, ink);
            }
        }
    }
    Ok(())
}

/// Missing or unreadable images render as a crossed placeholder box.
fn draw_image(img: &mut GrayImage, rect: Rect, path: &str) {
    if rect.intersect(Rect::of_image(img)).is_empty() {
        return;
    }
    let loaded = if path.is_empty() {
        None
    } else {
        match image::open(path) {
            Ok(source) => Some(source),
            Err(e) => {
                warn!(path, error = %e, "image element could not be loaded");
                None
            }
        }
    };

    let Some(source) = loaded else {
        stroke_rect(img, rect, 1, BLACK);
        draw_cross(img, rect);
        return;
    };

    let mut scaled = source
        .resize_exact(rect.width as u32, rect.height as u32, FilterType::Lanczos3)
        .to_luma8();
    dither_floyd_steinberg(&mut scaled);
    for (x, y, pixel) in scaled.enumerate_pixels() {
        font::put(img, rect.x + x as i64, rect.y + y as i64, rect, pixel[0]);
    }
}

/// Floyd-Steinberg error diffusion to pure black/white, in place.
pub fn dither_floyd_steinberg(img: &mut GrayImage) {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let mut buf: Vec<f32> = img.pixels().map(|p| p[0] as f32).collect();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let old = buf[idx];
            let new = if old < THRESHOLD as f32 { 0.0 } else { 255.0 };
            buf[idx] = new;
            let err = old - new;
            if x + 1 < w {
                buf[idx + 1] += err * 7.0 / 16.0;
            }
            if y + 1 < h {
                if x > 0 {
                    buf[idx + w - 1] += err * 3.0 / 16.0;
                }
                buf[idx + w] += err * 5.0 / 16.0;
                if x + 1 < w {
                    buf[idx + w + 1] += err * 1.0 / 16.0;
                }
            }
        }
    }

    for (pixel, value) in img.pixels_mut().zip(buf) {
        pixel[0] = value.clamp(0.0, 255.0) as u8;
    }
}

// ============================================================================
// PRIMITIVES
// ============================================================================

fn fill_rect(img: &mut GrayImage, rect: Rect, luma: u8) {
    let visible = rect.intersect(Rect::of_image(img));
    for y in visible.y..visible.bottom() {
        for x in visible.x..visible.right() {
            img.put_pixel(x as u32, y as u32, Luma([luma]));
        }
    }
}

fn stroke_rect(img: &mut GrayImage, rect: Rect, thickness: i64, luma: u8) {
    let t = thickness.min(rect.width).min(rect.height).max(0);
    let edges = [
        Rect { height: t, ..rect },
        Rect { y: rect.bottom().saturating_sub(t), height: t, ..rect },
        Rect { width: t, ..rect },
        Rect { x: rect.right().saturating_sub(t), width: t, ..rect },
    ];
    for edge in edges {
        fill_rect(img, edge, luma);
    }
}

fn draw_cross(img: &mut GrayImage, rect: Rect) {
    let steps = rect.width.max(rect.height);
    if steps <= 0 {
        return;
    }
    for i in 0..steps {
        let x = rect.x + i * rect.width / steps;
        let y = rect.y + i * rect.height / steps;
        font::put(img, x, y, rect, BLACK);
        font::put(img, rect.x + rect.width - 1 - (x - rect.x), y, rect, BLACK);
    }
}

/// Parse `#rgb`, `#rrggbb`, `black` or `white` to perceptual luma.
pub fn parse_luma(color: &str) -> Option<u8> {
    let color = color.trim();
    match color.to_ascii_lowercase().as_str() {
        "black" => return Some(BLACK),
        "white" => return Some(WHITE),
        _ => {}
    }
    let hex = color.strip_prefix('#').filter(|h| h.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let (r, g, b) = match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            (expand(0)?, expand(1)?, expand(2)?)
        }
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        _ => return None,
    };
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    Some(luma.round().clamp(0.0, 255.0) as u8)
}
