use std::io::{self, Write};

use crate::error::{ShowError, ShowResult};

pub type Rgb = (u8, u8, u8);

/// A text character drawn over the pixel layer, addressed by terminal cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub col: usize,
    pub row: usize,
    pub ch: char,
    pub color: Rgb,
    pub opacity: f32,
}

/// Persistent pixel buffer drawn in canvas units and shown with half-blocks.
///
/// Every terminal cell holds two vertical pixels and every pixel covers
/// `scale` canvas units on each axis. Pixels keep their colour between
/// frames; `fade` pulls them back toward the background, which is what
/// leaves the streaks behind moving sparks.
pub struct Canvas {
    width: usize,
    height: usize,
    scale: f32,
    bg: Rgb,
    pixels: Vec<[f32; 3]>,
    output_buf: Vec<u8>,
}

impl Canvas {
    pub fn new(cols: usize, rows: usize, scale: f32, bg: Rgb) -> ShowResult<Self> {
        if cols == 0 || rows == 0 {
            return Err(ShowError::config(format!(
                "terminal is too small ({cols}x{rows})"
            )));
        }
        let width = cols;
        let height = rows * 2;
        Ok(Self {
            width,
            height,
            scale,
            bg,
            pixels: vec![rgb_to_f32(bg); width * height],
            output_buf: Vec::with_capacity(width * height * 25),
        })
    }

    /// Canvas width in canvas units.
    pub fn width(&self) -> f32 {
        self.width as f32 * self.scale
    }

    /// Canvas height in canvas units.
    pub fn height(&self) -> f32 {
        self.height as f32 * self.scale
    }

    /// Paints the background over everything at the given alpha.
    pub fn fade(&mut self, alpha: f32) {
        let bg = rgb_to_f32(self.bg);
        for px in &mut self.pixels {
            for c in 0..3 {
                px[c] += (bg[c] - px[c]) * alpha;
            }
        }
    }

    /// Blends `color` over the pixel containing (x, y). Off-canvas points are dropped.
    pub fn dot(&mut self, x: f32, y: f32, color: Rgb, alpha: f32) {
        if let Some(idx) = self.index_of(x / self.scale, y / self.scale) {
            blend(&mut self.pixels[idx], color, alpha);
        }
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb, alpha: f32) {
        let (x0, y0) = (from.0 / self.scale, from.1 / self.scale);
        let (x1, y1) = (to.0 / self.scale, to.1 / self.scale);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0);
        if !steps.is_finite() {
            return;
        }

        let steps = steps as usize;
        let mut last = None;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let idx = self.index_of(x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
            // Neighbouring samples often land in the same pixel
            match idx {
                Some(i) if idx != last => {
                    blend(&mut self.pixels[i], color, alpha);
                    last = idx;
                }
                _ => {}
            }
        }
    }

    /// Colour of a pixel, in pixel coordinates.
    pub fn pixel(&self, px: usize, py: usize) -> Option<Rgb> {
        (px < self.width && py < self.height)
            .then(|| rgb_from_f32(self.pixels[py * self.width + px]))
    }

    /// Terminal cell (col, row) containing the canvas point, if on screen.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let px = x / self.scale;
        let py = y / self.scale;
        if !px.is_finite() || !py.is_finite() || px < 0.0 || py < 0.0 {
            return None;
        }
        let (col, row) = (px as usize, py as usize / 2);
        (col < self.width && row < self.height / 2).then_some((col, row))
    }

    /// Writes one full frame: the pixel layer as half-blocks, then the glyphs.
    pub fn render<W: Write>(&mut self, glyphs: &[Glyph], out: &mut W) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top: Rgb = (255, 255, 255);
        let mut prev_bot: Rgb = (255, 255, 255);

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top = rgb_from_f32(self.pixels[y * self.width + x]);
                let bot = rgb_from_f32(self.pixels[(y + 1) * self.width + x]);

                if top != prev_top {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = top;
                }
                if bot != prev_bot {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = bot;
                }
                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top = (255, 255, 255);
            prev_bot = (255, 255, 255);
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        for glyph in glyphs {
            if glyph.col >= self.width || glyph.row * 2 + 1 >= self.height || glyph.opacity <= 0.0 {
                continue;
            }
            let top = self.pixels[glyph.row * 2 * self.width + glyph.col];
            let bot = self.pixels[(glyph.row * 2 + 1) * self.width + glyph.col];
            let mut under = [0.0; 3];
            for c in 0..3 {
                under[c] = (top[c] + bot[c]) * 0.5;
            }
            let mut ink = under;
            blend(&mut ink, glyph.color, glyph.opacity.min(1.0));
            let (under, ink) = (rgb_from_f32(under), rgb_from_f32(ink));
            write!(
                self.output_buf,
                "\x1b[{};{}H\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m\x1b[1m{}\x1b[0m",
                glyph.row + 1,
                glyph.col + 1,
                under.0,
                under.1,
                under.2,
                ink.0,
                ink.1,
                ink.2,
                glyph.ch
            )?;
        }

        out.write_all(&self.output_buf)
    }

    fn index_of(&self, px: f32, py: f32) -> Option<usize> {
        if !px.is_finite() || !py.is_finite() || px < 0.0 || py < 0.0 {
            return None;
        }
        let (x, y) = (px as usize, py as usize);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

fn blend(px: &mut [f32; 3], color: Rgb, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    let src = rgb_to_f32(color);
    for c in 0..3 {
        px[c] += (src[c] - px[c]) * alpha;
    }
}

fn rgb_to_f32(color: Rgb) -> [f32; 3] {
    [color.0 as f32, color.1 as f32, color.2 as f32]
}

fn rgb_from_f32(px: [f32; 3]) -> Rgb {
    (
        px[0].round().clamp(0.0, 255.0) as u8,
        px[1].round().clamp(0.0, 255.0) as u8,
        px[2].round().clamp(0.0, 255.0) as u8,
    )
}
