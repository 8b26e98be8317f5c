use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result, anyhow};
use bytemuck::{cast_slice, cast_slice_mut};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use stroop_core::{Rgba, Screen};
use stroop_timing::{HighPrecisionTimer, Timer};
use tiny_skia::{Color, Paint, Pixmap, PremultipliedColorU8, Rect, Transform};

// Text heights as fractions of the window height.
const MESSAGE_SCALE: f32 = 0.03;
const STIMULUS_SCALE: f32 = 0.09;
const FEEDBACK_SCALE: f32 = 0.05;
const FIXATION_SCALE: f32 = 0.075;
const LINE_SPACING: f32 = 1.35;

const WHITE: Rgba = [255, 255, 255, 255];
const BLACK: Rgba = [0, 0, 0, 255];

/// Rasterizes `text` on one line into a tight transparent pixmap.
///
/// Returns `None` when nothing in the string has an outline (empty or
/// whitespace-only text).
pub fn render_text_pixmap<F: Font>(
    text: &str,
    font_size: f32,
    font: &F,
    color: Rgba,
) -> Option<Pixmap> {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    // 1) Layout with baseline at ascent
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    // 2) Union pixel bounds from outlined glyphs
    let outlines: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();
    if outlines.is_empty() {
        return None;
    }
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for out in &outlines {
        let b = out.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;

    // 3) Transparent, premultiplied pixmap
    let mut pm = Pixmap::new(w, h)?;
    let stride = w as usize;
    let dst = pm.pixels_mut();

    // 4) Rasterize with premultiplied "over" blending
    for out in &outlines {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - min_x).floor() as i32;
            let iy = (y as f32 + b.min.y - min_y).floor() as i32;
            if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                return;
            }
            let i = iy as usize * stride + ix as usize;

            let a_lin = (cov * color[3] as f32 / 255.0).clamp(0.0, 1.0);
            let sa = (a_lin * 255.0) as u8;
            let sr = (color[0] as f32 * a_lin) as u8;
            let sg = (color[1] as f32 * a_lin) as u8;
            let sb = (color[2] as f32 * a_lin) as u8;

            let bg = dst[i];
            let inv = 1.0 - (sa as f32 / 255.0);
            let blended = PremultipliedColorU8::from_rgba(
                sr.saturating_add((bg.red() as f32 * inv) as u8),
                sg.saturating_add((bg.green() as f32 * inv) as u8),
                sb.saturating_add((bg.blue() as f32 * inv) as u8),
                sa.saturating_add((bg.alpha() as f32 * inv) as u8),
            );
            if let Some(px) = blended {
                dst[i] = px;
            }
        });
    }

    Some(pm)
}

/// Copies a premultiplied pixmap onto `canvas`, centered on `pos`, clipped to
/// the canvas.
fn blit_centered(canvas: &mut Pixmap, src: &Pixmap, pos: (f32, f32)) {
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    let (w, h) = (src.width() as i32, src.height() as i32);

    let x = (pos.0 - w as f32 * 0.5).round() as i32;
    let y = (pos.1 - h as f32 * 0.5).round() as i32;

    // Cull fully off-screen
    if x + w <= 0 || y + h <= 0 || x >= cw || y >= ch {
        return;
    }

    let dst_x = x.max(0);
    let dst_y = y.max(0);
    let src_x = dst_x - x;
    let src_y = dst_y - y;
    let copy_w = (w - src_x).min(cw - dst_x) as usize;
    let copy_h = (h - src_y).min(ch - dst_y) as usize;

    let src_px: &[[u8; 4]] = cast_slice(src.data());
    let dst_px: &mut [[u8; 4]] = cast_slice_mut(canvas.data_mut());

    for row in 0..copy_h {
        let s_off = (src_y as usize + row) * w as usize + src_x as usize;
        let d_off = (dst_y as usize + row) * cw as usize + dst_x as usize;
        for i in 0..copy_w {
            let s = src_px[s_off + i];
            let d = &mut dst_px[d_off + i];
            let inv = 255 - s[3] as u32;
            for c in 0..4 {
                d[c] = (s[c] as u32 + (d[c] as u32 * inv + 127) / 255).min(255) as u8;
            }
        }
    }
}

fn draw_fixation(canvas: &mut Pixmap, center: (f32, f32), size: f32, color: Rgba) {
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));

    let thickness = (size / 12.0).max(2.0).round();
    let bars = [
        Rect::from_xywh(center.0 - size / 2.0, center.1 - thickness / 2.0, size, thickness),
        Rect::from_xywh(center.0 - thickness / 2.0, center.1 - size / 2.0, thickness, size),
    ];
    for bar in bars.into_iter().flatten() {
        canvas.fill_rect(bar, &paint, Transform::identity(), None);
    }
}

type TextKey = (String, Rgba, u32);

struct TextCache {
    font: FontVec,
    map: HashMap<TextKey, Option<Arc<Pixmap>>>,
}

impl TextCache {
    fn new(font: FontVec) -> Self {
        Self {
            font,
            map: HashMap::new(),
        }
    }

    fn get_or_render(&mut self, text: &str, size_px: f32, color: Rgba) -> Option<Arc<Pixmap>> {
        let key = (text.to_string(), color, size_px.to_bits());
        if let Some(p) = self.map.get(&key) {
            return p.clone();
        }
        let pm = render_text_pixmap(text, size_px, &self.font, color).map(Arc::new);
        self.map.insert(key, pm.clone());
        pm
    }
}

pub struct FrameStats {
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
}

/// Software renderer for experiment screens
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    background: Rgba,
    text_cache: TextCache,
    canvas: Pixmap,
    timer: HighPrecisionTimer,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, font: FontVec, background: Rgba) -> Result<Self> {
        let canvas = Pixmap::new(width.max(1), height.max(1))
            .ok_or_else(|| anyhow!("cannot allocate {width}×{height} canvas"))?;
        Ok(Self {
            width: canvas.width(),
            height: canvas.height(),
            center: (canvas.width() as f32 / 2.0, canvas.height() as f32 / 2.0),
            background,
            text_cache: TextCache::new(font),
            canvas,
            timer: HighPrecisionTimer::new(),
        })
    }

    pub fn from_font_file(path: &Path, width: u32, height: u32, background: Rgba) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading font {}", path.display()))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| anyhow!("invalid font {}: {e}", path.display()))?;
        Self::new(width, height, font, background)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = Pixmap::new(new_width.max(1), new_height.max(1))
            .ok_or_else(|| anyhow!("cannot allocate {new_width}×{new_height} canvas"))?;
        self.width = self.canvas.width();
        self.height = self.canvas.height();
        self.center = (self.width as f32 / 2.0, self.height as f32 / 2.0);
        // Text sizes follow the window height.
        self.text_cache.map.clear();
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Draws `screen` and copies it into an RGBA frame of the same size.
    pub fn render_screen(&mut self, screen: &Screen, frame: &mut [u8]) -> Result<FrameStats> {
        let expected = self.canvas.data().len();
        if frame.len() != expected {
            return Err(anyhow!(
                "frame is {} bytes, canvas needs {expected}",
                frame.len()
            ));
        }

        let t_draw = self.timer.now();
        let bg = self.background;
        self.canvas
            .fill(Color::from_rgba8(bg[0], bg[1], bg[2], bg[3]));
        let h = self.height as f32;

        match screen {
            Screen::Blank => {}
            Screen::Message(text) => self.draw_lines(text, h * MESSAGE_SCALE, WHITE),
            Screen::Fixation => {
                draw_fixation(&mut self.canvas, self.center, h * FIXATION_SCALE, BLACK)
            }
            Screen::Stimulus { word, color } => self.draw_lines(word, h * STIMULUS_SCALE, *color),
            Screen::Feedback { text, .. } => self.draw_lines(text, h * FEEDBACK_SCALE, WHITE),
        }
        let draw = self.timer.elapsed(t_draw);

        // The canvas is opaque, so premultiplied and straight RGBA agree.
        let t_copy = self.timer.now();
        frame.copy_from_slice(self.canvas.data());
        let copy = self.timer.elapsed(t_copy);

        Ok(FrameStats {
            draw,
            copy,
            total: draw + copy,
        })
    }

    /// Centers a block of lines on the canvas.
    fn draw_lines(&mut self, text: &str, size_px: f32, color: Rgba) {
        let size_px = size_px.max(12.0);
        let lines: Vec<&str> = text.lines().collect();
        let line_h = size_px * LINE_SPACING;
        let top = self.center.1 - line_h * (lines.len() as f32 - 1.0) / 2.0;

        for (i, line) in lines.iter().enumerate() {
            if let Some(pm) = self.text_cache.get_or_render(line, size_px, color) {
                blit_centered(&mut self.canvas, &pm, (self.center.0, top + i as f32 * line_h));
            }
        }
    }
}
