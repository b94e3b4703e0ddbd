//! Bitmap text for label rendering.
//!
//! Uses the Spleen 12×24 bitmap font, scaled nearest-neighbor to the
//! element's font size. Text is word-wrapped to the element width.

use std::collections::HashMap;

use image::{GrayImage, Luma};
use spleen_font::{FONT_12X24, PSF2Font};

use crate::error::LabelError;
use crate::layout::{FontWeight, TextAlign};

/// Native glyph cell of the Spleen font.
pub const GLYPH_WIDTH: usize = 12;
pub const GLYPH_HEIGHT: usize = 24;

/// Pixel rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    /// The whole area of `img`.
    pub fn of_image(img: &GrayImage) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: img.width() as i64,
            height: img.height() as i64,
        }
    }

    pub fn right(self) -> i64 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(self) -> i64 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Overlap of two rects; zero-sized when they do not touch.
    pub fn intersect(self, other: Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Rect {
            x,
            y,
            width: (self.right().min(other.right()) - x).max(0),
            height: (self.bottom().min(other.bottom()) - y).max(0),
        }
    }

    /// Shrink on all sides, never below zero size.
    pub fn inset(self, by: i64) -> Rect {
        let twice = by.saturating_mul(2);
        Rect {
            x: self.x.saturating_add(by),
            y: self.y.saturating_add(by),
            width: self.width.saturating_sub(twice).max(0),
            height: self.height.saturating_sub(twice).max(0),
        }
    }
}

/// How a run of text is drawn.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub align: TextAlign,
    pub luma: u8,
}

/// Glyph bitmaps (`GLYPH_WIDTH * GLYPH_HEIGHT`, 1 = ink), loaded lazily per character.
#[derive(Default)]
pub struct GlyphCache {
    glyphs: HashMap<char, Vec<u8>>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn glyph(&mut self, ch: char) -> Result<&[u8], LabelError> {
        if !self.glyphs.contains_key(&ch) {
            let glyph = generate_glyph(ch)?;
            self.glyphs.insert(ch, glyph);
        }
        Ok(self.glyphs.get(&ch).map(Vec::as_slice).unwrap_or(&[]))
    }
}

/// Rasterize one character from the Spleen font.
/// Characters missing from the font render as a box outline.
fn generate_glyph(ch: char) -> Result<Vec<u8>, LabelError> {
    let mut glyph = vec![0u8; GLYPH_WIDTH * GLYPH_HEIGHT];
    let mut spleen = PSF2Font::new(FONT_12X24)
        .map_err(|_| LabelError::Render("failed to load bitmap font".into()))?;
    let utf8 = ch.to_string();

    if let Some(spleen_glyph) = spleen.glyph_for_utf8(utf8.as_bytes()) {
        for (row_y, row) in spleen_glyph.enumerate() {
            for (col_x, on) in row.enumerate() {
                let idx = row_y * GLYPH_WIDTH + col_x;
                if idx < glyph.len() {
                    glyph[idx] = if on { 1 } else { 0 };
                }
            }
        }
    } else {
        draw_box(&mut glyph, GLYPH_WIDTH, GLYPH_HEIGHT);
    }
    Ok(glyph)
}

fn draw_box(glyph: &mut [u8], width: usize, height: usize) {
    for x in 0..width {
        glyph[x] = 1;
        glyph[(height - 1) * width + x] = 1;
    }
    for y in 0..height {
        glyph[y * width] = 1;
        glyph[y * width + width - 1] = 1;
    }
}

/// Largest font size drawn; bigger sizes are clamped to it.
pub const MAX_FONT_SIZE: f32 = 1024.0;

/// Cell size in pixels for a font size (the font size is the line height).
pub fn cell_size(size: f32) -> (usize, usize) {
    let size = size.min(MAX_FONT_SIZE);
    let scale = size / GLYPH_HEIGHT as f32;
    let w = (GLYPH_WIDTH as f32 * scale).round().max(1.0) as usize;
    let h = size.round().max(1.0) as usize;
    (w, h)
}

/// Greedy word wrap to at most `max_chars` per line. Words longer than a
/// line are hard-split. Explicit newlines are kept.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let line_len = line.chars().count();
            let needed = if line.is_empty() { word.len() } else { line_len + 1 + word.len() };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.extend(word);
        }
        lines.push(line);
    }
    lines
}

/// Draw `text` inside `rect`, wrapping and clipping to it.
pub fn draw_text(
    img: &mut GrayImage,
    glyphs: &mut GlyphCache,
    rect: Rect,
    text: &str,
    style: TextStyle,
) -> Result<(), LabelError> {
    if rect.width <= 0 || rect.height <= 0 {
        return Ok(());
    }
    let (cell_w, cell_h) = cell_size(style.size);
    let max_chars = (rect.width as usize / cell_w).max(1);

    for (line_no, line) in wrap(text, max_chars).iter().enumerate() {
        let top = rect.y + (line_no * cell_h) as i64;
        if top + cell_h as i64 > rect.y + rect.height && line_no > 0 {
            break;
        }
        let line_width = (line.chars().count() * cell_w) as i64;
        let left = match style.align {
            TextAlign::Left => rect.x,
            TextAlign::Center => rect.x + (rect.width - line_width).max(0) / 2,
            TextAlign::Right => rect.x + (rect.width - line_width).max(0),
        };

        for (i, ch) in line.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let glyph = glyphs.glyph(ch)?;
            let origin_x = left + (i * cell_w) as i64;
            blit_glyph(img, glyph, origin_x, top, (cell_w, cell_h), rect, style);
        }
    }
    Ok(())
}

fn blit_glyph(
    img: &mut GrayImage,
    glyph: &[u8],
    origin_x: i64,
    origin_y: i64,
    (cell_w, cell_h): (usize, usize),
    clip: Rect,
    style: TextStyle,
) {
    let bold = style.weight == FontWeight::Bold;
    for dy in 0..cell_h {
        let sy = dy * GLYPH_HEIGHT / cell_h;
        for dx in 0..cell_w {
            let sx = dx * GLYPH_WIDTH / cell_w;
            if glyph.get(sy * GLYPH_WIDTH + sx).copied().unwrap_or(0) == 0 {
                continue;
            }
            let x = origin_x + dx as i64;
            let y = origin_y + dy as i64;
            put(img, x, y, clip, style.luma);
            if bold {
                put(img, x + 1, y, clip, style.luma);
            }
        }
    }
}

/// Set a pixel if it lies inside both the image and `clip`.
pub fn put(img: &mut GrayImage, x: i64, y: i64, clip: Rect, luma: u8) {
    if x < clip.x || y < clip.y || x >= clip.right() || y >= clip.bottom() {
        return;
    }
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    img.put_pixel(x as u32, y as u32, Luma([luma]));
}
