#![allow(dead_code)]

use rafex_core::{Color, Scene, Shape, ShapeHandle, ShapePatch, Surface, SurfaceError};
use rafex_trial::{KeyPress, KeyResponse, ListenerHandle};
use rafex_core::Key;

/// Surface that keeps the scene and counts what was asked of it.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub scene: Scene,
    pub renders: usize,
    pub updates: usize,
    pub clears: usize,
    pub caption: Option<String>,
}

impl Surface for RecordingSurface {
    fn create_canvas(&mut self, width: f64, height: f64, background: Color) -> Result<(), SurfaceError> {
        self.scene.create_canvas(width, height, background);
        Ok(())
    }

    fn add_shape(&mut self, shape: Shape) -> Result<ShapeHandle, SurfaceError> {
        self.scene.add(shape)
    }

    fn update_shape(&mut self, handle: ShapeHandle, patch: ShapePatch) -> Result<(), SurfaceError> {
        self.updates += 1;
        self.scene.update(handle, patch)
    }

    fn render_all(&mut self) -> Result<(), SurfaceError> {
        self.renders += 1;
        Ok(())
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.scene.clear();
    }

    fn set_caption(&mut self, text: Option<&str>) -> Result<(), SurfaceError> {
        self.caption = text.map(str::to_owned);
        Ok(())
    }
}

pub fn response(listener: ListenerHandle, key: Key, elapsed_ms: f64) -> KeyResponse {
    KeyResponse {
        listener,
        key,
        elapsed_ms,
    }
}

pub fn press(key: Key, timestamp_ns: u64) -> KeyPress {
    KeyPress {
        key,
        repeat: false,
        timestamp_ns,
    }
}

pub fn held(key: Key, timestamp_ns: u64) -> KeyPress {
    KeyPress {
        key,
        repeat: true,
        timestamp_ns,
    }
}
