use serde::{Deserialize, Serialize};

use crate::config::TrialConfig;
use crate::phase::TrialPhase;
use crate::scoring::{bounded_error, min_adjustments};

/// Mutable state of one trial.
///
/// `current_angle_deg` is never normalized: it is the literal sum of the
/// participant's keypresses, and may run past ±360°.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialState {
    pub current_angle_deg: f64,
    /// Rotation keypresses so far (NOA).
    pub adjustment_count: u64,
    pub phase: TrialPhase,
    pub reaction_time_ms: Option<f64>,
}

impl TrialState {
    pub fn new(config: &TrialConfig) -> Self {
        Self {
            current_angle_deg: config.rod_start_angle_deg,
            adjustment_count: 0,
            phase: TrialPhase::Adjusting,
            reaction_time_ms: None,
        }
    }
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub reaction_time_ms: Option<f64>,
    /// Deviation from the target in (-90, 90].
    pub response_error_deg: f64,
    pub rod_final_angle_deg: f64,
    pub rod_start_angle_deg: f64,
    pub frame_angle_deg: f64,
    pub adjustment_count: u64,
    /// Keypresses an ideal participant would need to reach the target.
    pub min_adjustments_to_target: f64,
    /// Keypresses needed to reach the participant's own final angle directly.
    pub min_adjustments_to_participant_final: f64,
}

impl TrialResult {
    pub fn score(config: &TrialConfig, state: &TrialState) -> Self {
        let step = config.rotation_step_deg;
        let start = config.rod_start_angle_deg;
        Self {
            reaction_time_ms: state.reaction_time_ms,
            response_error_deg: bounded_error(state.current_angle_deg - config.target_angle_deg),
            rod_final_angle_deg: state.current_angle_deg,
            rod_start_angle_deg: start,
            frame_angle_deg: config.frame_angle_deg,
            adjustment_count: state.adjustment_count,
            min_adjustments_to_target: min_adjustments(start, config.target_angle_deg, step),
            min_adjustments_to_participant_final: min_adjustments(start, state.current_angle_deg, step),
        }
    }
}
