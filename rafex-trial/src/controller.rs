use rafex_core::geometry::DOT_COUNT;
use rafex_core::{
    Color, Layout, Phase, RenderMode, Shape, ShapeHandle, ShapePatch, Surface, TrialConfig,
    TrialPhase, TrialResult, TrialState,
};
use rafex_timing::Timer;

use crate::error::TrialError;
use crate::input::{KeyResponse, Keyboard, ListenerHandle, ListenerSpec};

/// Handles of the shapes that move with the rod.
#[derive(Debug, Clone, PartialEq)]
enum RodShapes {
    Line(ShapeHandle),
    Dots([ShapeHandle; DOT_COUNT]),
}

/// Drives one trial from first frame to scored result.
///
/// The controller owns the trial state. The host lends it the surface and
/// keyboard on every call and forwards what the keyboard delivers; a
/// [`TrialResult`] comes back exactly once, from either
/// [`handle_key`](Self::handle_key) or [`update`](Self::update).
pub struct TrialController<T>
where
    T: Timer<Timestamp = u64>,
{
    config: TrialConfig,
    layout: Layout,
    state: TrialState,
    timer: T,
    listener: Option<ListenerHandle>,
    rod: RodShapes,
    break_deadline_ns: Option<u64>,
}

impl<T> TrialController<T>
where
    T: Timer<Timestamp = u64>,
{
    /// Draws the stimulus at its start angle and arms the keyboard listener.
    pub fn start<S, K>(
        config: TrialConfig,
        surface: &mut S,
        keyboard: &mut K,
        timer: T,
    ) -> Result<Self, TrialError>
    where
        S: Surface,
        K: Keyboard,
    {
        let layout = Layout::new(&config);
        let state = TrialState::new(&config);

        surface.create_canvas(layout.width, layout.height, config.canvas_background)?;
        surface.set_caption(config.prompt.as_deref())?;

        // z-order: background circle, rod, frame
        surface.add_shape(background_circle(&layout, config.circle_color))?;
        let rod = match config.render_mode {
            RenderMode::Rod => {
                let (from, to) = layout.rod_line(state.current_angle_deg);
                RodShapes::Line(surface.add_shape(Shape::Line {
                    from,
                    to,
                    stroke: config.rod_color,
                    width: config.rod_stroke_width / 2.0,
                })?)
            }
            RenderMode::Dots => {
                let mut handles = [ShapeHandle(0); DOT_COUNT];
                for (handle, center) in handles.iter_mut().zip(layout.dots(state.current_angle_deg)) {
                    *handle = surface.add_shape(Shape::Circle {
                        center,
                        radius: config.rod_stroke_width / 2.0,
                        fill: config.rod_color,
                    })?;
                }
                RodShapes::Dots(handles)
            }
        };
        surface.add_shape(Shape::Rect {
            center: layout.center,
            width: config.frame_size_px,
            height: config.frame_size_px,
            angle_deg: config.frame_angle_deg,
            fill: Color::TRANSPARENT,
            stroke: config.frame_color,
            stroke_width: config.frame_stroke_width,
        })?;
        surface.render_all()?;

        let listener = keyboard.listen(ListenerSpec {
            valid_keys: config.key_bindings.as_array().to_vec(),
            allow_repeat: true,
            armed_at_ns: timer.now(),
        });

        log::info!(
            "trial started: rod {:.2}°, frame {:.2}°, {} mode",
            config.rod_start_angle_deg,
            config.frame_angle_deg,
            config.render_mode
        );

        Ok(Self {
            config,
            layout,
            state,
            timer,
            listener: Some(listener),
            rod,
            break_deadline_ns: None,
        })
    }

    /// Processes a key the listener accepted. Keys arriving after the
    /// response was taken, or from another listener, are ignored.
    pub fn handle_key<S, K>(
        &mut self,
        response: &KeyResponse,
        surface: &mut S,
        keyboard: &mut K,
    ) -> Result<Option<TrialResult>, TrialError>
    where
        S: Surface,
        K: Keyboard,
    {
        if !self.state.phase.allows_input() || self.listener != Some(response.listener) {
            return Ok(None);
        }

        let keys = self.config.key_bindings;
        if response.key == keys.clockwise {
            self.rotate(self.config.rotation_step_deg, surface)?;
            Ok(None)
        } else if response.key == keys.counterclockwise {
            self.rotate(-self.config.rotation_step_deg, surface)?;
            Ok(None)
        } else if response.key == keys.confirm {
            self.confirm(response.elapsed_ms, surface, keyboard)
        } else {
            Ok(None)
        }
    }

    /// Finishes the trial once its break has run out.
    pub fn update<S: Surface>(&mut self, surface: &mut S) -> Result<Option<TrialResult>, TrialError> {
        match (self.state.phase, self.break_deadline_ns) {
            (TrialPhase::Ending, Some(deadline)) if self.timer.now() >= deadline => {
                self.finish(surface).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Tears the trial down without a result.
    pub fn abandon<S, K>(&mut self, surface: &mut S, keyboard: &mut K)
    where
        S: Surface,
        K: Keyboard,
    {
        if let Some(listener) = self.listener.take() {
            keyboard.cancel(listener);
        }
        if self.state.phase != TrialPhase::Done {
            log::warn!("trial abandoned after {} adjustments", self.state.adjustment_count);
            self.state.phase = TrialPhase::Done;
            surface.clear();
        }
    }

    fn rotate<S: Surface>(&mut self, delta_deg: f64, surface: &mut S) -> Result<(), TrialError> {
        self.state.current_angle_deg += delta_deg;
        let angle = self.state.current_angle_deg;
        match &self.rod {
            RodShapes::Line(handle) => {
                let (from, to) = self.layout.rod_line(angle);
                surface.update_shape(*handle, ShapePatch::Endpoints(from, to))?;
            }
            RodShapes::Dots(handles) => {
                for (handle, center) in handles.iter().zip(self.layout.dots(angle)) {
                    surface.update_shape(*handle, ShapePatch::Center(center))?;
                }
            }
        }
        surface.render_all()?;
        self.state.adjustment_count += 1;
        log::trace!("rod at {:.3}° after {} adjustments", angle, self.state.adjustment_count);
        Ok(())
    }

    fn confirm<S, K>(
        &mut self,
        elapsed_ms: f64,
        surface: &mut S,
        keyboard: &mut K,
    ) -> Result<Option<TrialResult>, TrialError>
    where
        S: Surface,
        K: Keyboard,
    {
        if self.config.require_minimum_input && self.state.adjustment_count == 0 {
            log::debug!("confirm ignored: rod not adjusted yet");
            return Ok(None);
        }

        self.state.reaction_time_ms = Some(elapsed_ms);
        if let Some(listener) = self.listener.take() {
            keyboard.cancel(listener);
        }
        self.state.phase = self.state.phase.next().unwrap_or(TrialPhase::Done);

        match self.config.break_duration_ms {
            Some(break_ms) => {
                surface.add_shape(background_circle(&self.layout, self.config.circle_color))?;
                surface.render_all()?;
                // clamps at the end of the clock; such a break never expires
                let break_ns = break_ms.saturating_mul(1_000_000);
                self.break_deadline_ns = Some(self.timer.now().saturating_add(break_ns));
                log::debug!("response at {:.1} ms, break of {} ms", elapsed_ms, break_ms);
                Ok(None)
            }
            None => self.finish(surface).map(Some),
        }
    }

    fn finish<S: Surface>(&mut self, surface: &mut S) -> Result<TrialResult, TrialError> {
        self.state.phase = self.state.phase.next().unwrap_or(TrialPhase::Done);
        self.break_deadline_ns = None;
        let result = TrialResult::score(&self.config, &self.state);
        surface.clear();
        log::info!(
            "trial done: error {:.2}°, {} adjustments, rt {:?} ms",
            result.response_error_deg,
            result.adjustment_count,
            result.reaction_time_ms
        );
        Ok(result)
    }

    pub fn state(&self) -> &TrialState {
        &self.state
    }

    pub fn phase(&self) -> TrialPhase {
        self.state.phase
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn listener(&self) -> Option<ListenerHandle> {
        self.listener
    }

    /// When the running break ends, on the controller's clock.
    pub fn break_deadline_ns(&self) -> Option<u64> {
        self.break_deadline_ns
    }
}

fn background_circle(layout: &Layout, fill: Color) -> Shape {
    Shape::Circle {
        center: layout.center,
        radius: layout.circle_radius,
        fill,
    }
}
