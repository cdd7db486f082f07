use ab_glyph::FontVec;
use anyhow::{Context, Result};
use bytemuck::try_cast_slice_mut;
use rafex_core::{Color, Scene, Shape, ShapeHandle, ShapePatch, Surface, SurfaceError};
use rafex_timing::{FrameTimingStats, HighPrecisionTimer, Timer};
use tiny_skia::Pixmap;

use crate::raster::{draw_shape, skia_color};
use crate::text::render_text_pixmap;

const CAPTION_SIZE_PX: f32 = 24.0;
const CAPTION_GAP_PX: usize = 16;

/// [`Surface`] rasterized with tiny-skia into an offscreen canvas, which the
/// host copies into its window frame buffer with [`present`](Self::present).
pub struct SkiaSurface {
    scene: Scene,
    canvas: Option<Pixmap>,
    caption: Option<Pixmap>,
    font: Option<FontVec>,
    caption_color: Color,
    raster_timer: HighPrecisionTimer,
    frames: u64,
}

impl SkiaSurface {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            canvas: None,
            caption: None,
            font: None,
            caption_color: Color::WHITE,
            raster_timer: HighPrecisionTimer::new(),
            frames: 0,
        }
    }

    /// Enables captions, using the given TrueType/OpenType font data.
    pub fn with_font(mut self, data: Vec<u8>) -> Result<Self> {
        self.font = Some(FontVec::try_from_vec(data).context("invalid font data")?);
        Ok(self)
    }

    pub fn with_caption_color(mut self, color: Color) -> Self {
        self.caption_color = color;
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The last rendered canvas, if a trial is on screen.
    pub fn canvas(&self) -> Option<&Pixmap> {
        self.canvas.as_ref()
    }

    pub fn caption(&self) -> Option<&Pixmap> {
        self.caption.as_ref()
    }

    /// Number of `render_all` calls so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn raster_stats(&self) -> FrameTimingStats {
        self.raster_timer.frame_stats()
    }

    /// Copies the canvas into an RGBA frame buffer of `width`x`height`,
    /// centered, with the caption below it. Everything else is `backdrop`.
    pub fn present(&self, frame: &mut [u8], width: u32, height: u32, backdrop: Color) {
        let (fw, fh) = (width as usize, height as usize);
        let Some(dst) = frame.get_mut(..fw * fh * 4) else {
            log::warn!("frame buffer smaller than {width}x{height}");
            return;
        };
        fill(dst, backdrop.to_array());

        let Some(canvas) = &self.canvas else {
            return;
        };
        let (cw, ch) = (canvas.width() as usize, canvas.height() as usize);
        let x0 = fw.saturating_sub(cw) / 2;
        let y0 = fh.saturating_sub(ch + self.caption_height()) / 2;
        blit(dst, fw, fh, canvas, x0, y0, true);

        if let Some(caption) = &self.caption {
            let cx = fw.saturating_sub(caption.width() as usize) / 2;
            blit(dst, fw, fh, caption, cx, y0 + ch + CAPTION_GAP_PX, false);
        }
    }

    fn caption_height(&self) -> usize {
        self.caption
            .as_ref()
            .map_or(0, |c| c.height() as usize + CAPTION_GAP_PX)
    }
}

impl Default for SkiaSurface {
    fn default() -> Self {
        Self::new()
    }
}

fn fill(dst: &mut [u8], rgba: [u8; 4]) {
    match try_cast_slice_mut::<u8, u32>(dst) {
        Ok(words) => words.fill(u32::from_ne_bytes(rgba)),
        // unaligned buffer, fall back to byte chunks
        Err(_) => dst.chunks_exact_mut(4).for_each(|px| px.copy_from_slice(&rgba)),
    }
}

/// Copies `src` into the `fw`-wide RGBA buffer `dst` at (`x0`, `y0`),
/// clipped. Opaque sources are copied row by row; others are blended
/// source-over in premultiplied space.
fn blit(dst: &mut [u8], fw: usize, fh: usize, src: &Pixmap, x0: usize, y0: usize, opaque: bool) {
    if x0 >= fw || y0 >= fh {
        return;
    }
    let sw = src.width() as usize;
    let copy_w = sw.min(fw - x0);
    let copy_h = (src.height() as usize).min(fh - y0);
    let src_data = src.data();

    for row in 0..copy_h {
        let s_off = row * sw * 4;
        let d_off = ((y0 + row) * fw + x0) * 4;
        let s = &src_data[s_off..s_off + copy_w * 4];
        let d = &mut dst[d_off..d_off + copy_w * 4];
        if opaque {
            d.copy_from_slice(s);
            continue;
        }
        for (dp, sp) in d.chunks_exact_mut(4).zip(s.chunks_exact(4)) {
            let inv = 255 - sp[3] as u32;
            for i in 0..4 {
                dp[i] = (sp[i] as u32 + (dp[i] as u32 * inv + 127) / 255).min(255) as u8;
            }
        }
    }
}

impl Surface for SkiaSurface {
    fn create_canvas(&mut self, width: f64, height: f64, background: Color) -> Result<(), SurfaceError> {
        let (w, h) = (width.ceil().max(1.0) as u32, height.ceil().max(1.0) as u32);
        let mut pixmap = Pixmap::new(w, h).ok_or(SurfaceError::CanvasAllocation { width: w, height: h })?;
        pixmap.fill(skia_color(background));
        self.scene.create_canvas(width, height, background);
        self.canvas = Some(pixmap);
        log::debug!("canvas {w}x{h} created");
        Ok(())
    }

    fn add_shape(&mut self, shape: Shape) -> Result<ShapeHandle, SurfaceError> {
        self.scene.add(shape)
    }

    fn update_shape(&mut self, handle: ShapeHandle, patch: ShapePatch) -> Result<(), SurfaceError> {
        self.scene.update(handle, patch)
    }

    fn render_all(&mut self) -> Result<(), SurfaceError> {
        let t = self.raster_timer.now();
        let (Some(canvas), Some(info)) = (self.canvas.as_mut(), self.scene.canvas()) else {
            return Err(SurfaceError::NoCanvas);
        };
        canvas.fill(skia_color(info.background));
        for shape in self.scene.shapes() {
            draw_shape(canvas, shape);
        }
        let elapsed = self.raster_timer.elapsed(t);
        self.raster_timer.record_frame(elapsed);
        self.frames += 1;
        Ok(())
    }

    fn clear(&mut self) {
        self.scene.clear();
        self.canvas = None;
        self.caption = None;
    }

    fn set_caption(&mut self, text: Option<&str>) -> Result<(), SurfaceError> {
        self.caption = match (text, &self.font) {
            (Some(text), Some(font)) => render_text_pixmap(text, CAPTION_SIZE_PX, font, self.caption_color),
            (Some(_), None) => {
                log::warn!("prompt given but no font loaded; prompt not shown");
                None
            }
            (None, _) => None,
        };
        Ok(())
    }
}
