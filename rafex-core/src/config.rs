use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};

use crate::color::Color;
use crate::error::ConfigError;
use crate::key::Key;

/// How the rod is drawn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, StrumDisplay, DeserializeFromStr, SerializeDisplay,
)]
#[strum(serialize_all = "lowercase")]
pub enum RenderMode {
    /// A single stroked line.
    Rod,
    /// Nine dots along the hypothetical rod, which hides pixelation cues on
    /// low-resolution screens.
    #[default]
    Dots,
}

impl FromStr for RenderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RenderMode::iter()
            .find(|mode| mode.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownRenderMode(s.to_string()))
    }
}

/// The three response keys. Deserializes from a table of named keys, any
/// of which may be left out, or from a `[clockwise, counterclockwise,
/// confirm]` array; either form takes names or browser key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawKeyBindings")]
pub struct KeyBindings {
    pub clockwise: Key,
    pub counterclockwise: Key,
    pub confirm: Key,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Code(u32),
    Named(Key),
}

impl TryFrom<RawKey> for Key {
    type Error = ConfigError;

    fn try_from(raw: RawKey) -> Result<Self, Self::Error> {
        match raw {
            RawKey::Code(code) => Key::from_key_code(code).ok_or_else(|| ConfigError::UnknownKey(code.to_string())),
            RawKey::Named(key) => Ok(key),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKeyBindings {
    Ordered([RawKey; 3]),
    Table {
        clockwise: Option<RawKey>,
        counterclockwise: Option<RawKey>,
        confirm: Option<RawKey>,
    },
}

impl TryFrom<RawKeyBindings> for KeyBindings {
    type Error = ConfigError;

    fn try_from(raw: RawKeyBindings) -> Result<Self, Self::Error> {
        let pick = |key: Option<RawKey>, default: fn() -> Key| key.map_or_else(|| Ok(default()), Key::try_from);
        match raw {
            RawKeyBindings::Ordered([clockwise, counterclockwise, confirm]) => Ok(Self {
                clockwise: clockwise.try_into()?,
                counterclockwise: counterclockwise.try_into()?,
                confirm: confirm.try_into()?,
            }),
            RawKeyBindings::Table {
                clockwise,
                counterclockwise,
                confirm,
            } => Ok(Self {
                clockwise: pick(clockwise, default_clockwise)?,
                counterclockwise: pick(counterclockwise, default_counterclockwise)?,
                confirm: pick(confirm, default_confirm)?,
            }),
        }
    }
}

impl KeyBindings {
    pub fn as_array(&self) -> [Key; 3] {
        [self.clockwise, self.counterclockwise, self.confirm]
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            clockwise: default_clockwise(),
            counterclockwise: default_counterclockwise(),
            confirm: default_confirm(),
        }
    }
}

fn default_clockwise() -> Key {
    Key::Char('e')
}
fn default_counterclockwise() -> Key {
    Key::Char('i')
}
fn default_confirm() -> Key {
    Key::Space
}
fn default_frame_stroke() -> f64 {
    4.0
}
fn default_rotation_step() -> f64 {
    0.2
}
fn default_rod_stroke() -> f64 {
    8.0
}
fn default_target_angle() -> f64 {
    90.0
}
fn default_circle_color() -> Color {
    Color::BLACK
}
fn default_foreground() -> Color {
    Color::WHITE
}
fn default_canvas_background() -> Color {
    Color::WHITE
}
fn default_true() -> bool {
    true
}

/// Fully resolved parameters of one rod-and-frame trial.
///
/// Angles follow the unit circle: 0° points right, 90° points up. The
/// aliases accept the parameter names of older task definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    #[serde(alias = "frame_dims")]
    pub frame_size_px: f64,
    #[serde(alias = "frame_angle")]
    pub frame_angle_deg: f64,
    #[serde(default = "default_frame_stroke", alias = "frame_stroke")]
    pub frame_stroke_width: f64,

    #[serde(alias = "rod_length")]
    pub rod_length_px: f64,
    #[serde(alias = "rod_starting_angle")]
    pub rod_start_angle_deg: f64,
    #[serde(default = "default_rotation_step", alias = "rotation_step")]
    pub rotation_step_deg: f64,
    /// Dot diameter in dot mode; the rod line is drawn at half this width.
    #[serde(default = "default_rod_stroke", alias = "rod_stroke")]
    pub rod_stroke_width: f64,

    #[serde(default = "default_target_angle", alias = "target_angle")]
    pub target_angle_deg: f64,
    #[serde(default, alias = "rod_or_dots")]
    pub render_mode: RenderMode,

    #[serde(default = "default_circle_color", alias = "circle_col")]
    pub circle_color: Color,
    #[serde(default = "default_foreground", alias = "rod_col")]
    pub rod_color: Color,
    #[serde(default = "default_foreground", alias = "frame_col")]
    pub frame_color: Color,
    #[serde(default = "default_canvas_background")]
    pub canvas_background: Color,

    #[serde(default, alias = "keys", alias = "choices")]
    pub key_bindings: KeyBindings,
    #[serde(default, alias = "break_duration")]
    pub break_duration_ms: Option<u64>,
    /// Ignore the confirm key until the rod has been turned at least once.
    #[serde(default = "default_true", alias = "min_input")]
    pub require_minimum_input: bool,

    /// Text shown below the canvas.
    #[serde(default)]
    pub prompt: Option<String>,
}

impl TrialConfig {
    /// A configuration with the required geometry and every other field at its default.
    pub fn new(frame_size_px: f64, frame_angle_deg: f64, rod_length_px: f64, rod_start_angle_deg: f64) -> Self {
        Self {
            frame_size_px,
            frame_angle_deg,
            frame_stroke_width: default_frame_stroke(),
            rod_length_px,
            rod_start_angle_deg,
            rotation_step_deg: default_rotation_step(),
            rod_stroke_width: default_rod_stroke(),
            target_angle_deg: default_target_angle(),
            render_mode: RenderMode::default(),
            circle_color: default_circle_color(),
            rod_color: default_foreground(),
            frame_color: default_foreground(),
            canvas_background: default_canvas_background(),
            key_bindings: KeyBindings::default(),
            break_duration_ms: None,
            require_minimum_input: true,
            prompt: None,
        }
    }

    /// Checks what the trial controller takes for granted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("frame_size_px", self.frame_size_px)?;
        positive("rod_length_px", self.rod_length_px)?;
        positive("rotation_step_deg", self.rotation_step_deg)?;
        non_negative("frame_stroke_width", self.frame_stroke_width)?;
        non_negative("rod_stroke_width", self.rod_stroke_width)?;
        finite("frame_angle_deg", self.frame_angle_deg)?;
        finite("rod_start_angle_deg", self.rod_start_angle_deg)?;
        finite("target_angle_deg", self.target_angle_deg)?;

        let keys = self.key_bindings.as_array();
        for (i, key) in keys.iter().enumerate() {
            if keys[i + 1..].contains(key) {
                return Err(ConfigError::DuplicateKey(*key));
            }
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_fields() {
        let config: TrialConfig = toml::from_str(
            r#"
            frame_size_px = 300
            frame_angle_deg = 18
            rod_length_px = 200
            rod_start_angle_deg = 70
            "#,
        )
        .unwrap();
        assert_eq!(config, TrialConfig::new(300.0, 18.0, 200.0, 70.0));
        assert_eq!(config.render_mode, RenderMode::Dots);
        assert!(config.require_minimum_input);
        assert_eq!(config.key_bindings.as_array(), [Key::Char('e'), Key::Char('i'), Key::Space]);
        config.validate().unwrap();
    }

    #[test]
    fn accepts_legacy_parameter_names() {
        let config: TrialConfig = toml::from_str(
            r##"
            frame_dims = 250
            frame_angle = -18
            rod_length = 150
            rod_starting_angle = 100
            rotation_step = 0.5
            rod_or_dots = "Rod"
            circle_col = "transparent"
            frame_col = "#ff0000"
            break_duration = 500
            min_input = false
            keys = { clockwise = "69", counterclockwise = "73", confirm = "32" }
            "##,
        )
        .unwrap();
        assert_eq!(config.render_mode, RenderMode::Rod);
        assert!(config.circle_color.is_transparent());
        assert_eq!(config.frame_color, Color::rgb(255, 0, 0));
        assert_eq!(config.break_duration_ms, Some(500));
        assert!(!config.require_minimum_input);
        assert_eq!(config.key_bindings, KeyBindings::default());
    }

    #[test]
    fn key_choices_accept_code_arrays() {
        let base = "frame_size_px = 250\nframe_angle_deg = 0\nrod_length_px = 150\nrod_start_angle_deg = 0\n";
        let config: TrialConfig = toml::from_str(&format!("{base}choices = [69, 73, 32]\n")).unwrap();
        assert_eq!(config.key_bindings, KeyBindings::default());

        let config: TrialConfig = toml::from_str(&format!("{base}choices = [37, \"right\", 13]\n")).unwrap();
        assert_eq!(
            config.key_bindings.as_array(),
            [Key::ArrowLeft, Key::ArrowRight, Key::Enter]
        );

        let config: TrialConfig = toml::from_str(&format!("{base}[key_bindings]\nconfirm = 13\n")).unwrap();
        assert_eq!(config.key_bindings.clockwise, Key::Char('e'));
        assert_eq!(config.key_bindings.confirm, Key::Enter);

        assert!(toml::from_str::<TrialConfig>(&format!("{base}choices = [69, 73]\n")).is_err());
        assert!(toml::from_str::<TrialConfig>(&format!("{base}choices = [69, 73, 7]\n")).is_err());
    }

    #[test]
    fn canvas_background_defaults_to_white() {
        let config = TrialConfig::new(250.0, 0.0, 150.0, 0.0);
        assert_eq!(config.canvas_background, Color::WHITE);
        assert_eq!(config.rod_color, Color::WHITE);
        assert_eq!(config.circle_color, Color::BLACK);
    }

    #[test]
    fn missing_geometry_is_rejected() {
        let err = toml::from_str::<TrialConfig>("frame_size_px = 300\nframe_angle_deg = 0\n");
        assert!(err.is_err());
    }

    #[test]
    fn unknown_render_mode_fails_fast() {
        assert_eq!(
            "lines".parse::<RenderMode>(),
            Err(ConfigError::UnknownRenderMode("lines".into()))
        );
        assert_eq!(" DOTS ".parse::<RenderMode>(), Ok(RenderMode::Dots));
    }

    #[test]
    fn validate_rejects_bad_step_and_duplicate_keys() {
        let mut config = TrialConfig::new(300.0, 0.0, 200.0, 0.0);
        config.rotation_step_deg = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "rotation_step_deg", .. })
        ));

        let mut config = TrialConfig::new(300.0, 0.0, 200.0, 0.0);
        config.key_bindings.confirm = Key::Char('e');
        assert_eq!(config.validate(), Err(ConfigError::DuplicateKey(Key::Char('e'))));

        let mut config = TrialConfig::new(300.0, f64::NAN, 200.0, 0.0);
        assert!(config.validate().is_err());
        config.frame_angle_deg = 0.0;
        config.rod_stroke_width = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn serializes_to_json() {
        let config = TrialConfig::new(300.0, 18.0, 200.0, 70.0);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["render_mode"], "dots");
        assert_eq!(json["circle_color"], "#000000");
        assert_eq!(json["key_bindings"]["confirm"], "space");
    }
}
