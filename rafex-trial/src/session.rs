use rafex_core::{Surface, TrialConfig, TrialResult};
use rafex_timing::Timer;
use serde::{Deserialize, Serialize};

use crate::controller::TrialController;
use crate::error::TrialError;
use crate::input::{KeyDispatcher, KeyPress};

/// A trial result tagged with its position in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub trial_index: usize,
    #[serde(flatten)]
    pub result: TrialResult,
}

/// Runs a fixed list of trials back to back, in list order.
pub struct Session<S, T>
where
    S: Surface,
    T: Timer<Timestamp = u64>,
{
    configs: Vec<TrialConfig>,
    surface: S,
    keyboard: KeyDispatcher,
    timer: T,
    current: Option<TrialController<T>>,
    current_index: usize,
    records: Vec<SessionRecord>,
    aborted: bool,
}

impl<S, T> Session<S, T>
where
    S: Surface,
    T: Timer<Timestamp = u64>,
{
    pub fn new(configs: Vec<TrialConfig>, surface: S, timer: T) -> Result<Self, TrialError> {
        if configs.is_empty() {
            return Err(TrialError::EmptySession);
        }
        for (index, config) in configs.iter().enumerate() {
            config
                .validate()
                .map_err(|source| TrialError::InvalidConfig { index, source })?;
        }
        Ok(Self {
            configs,
            surface,
            keyboard: KeyDispatcher::new(),
            timer,
            current: None,
            current_index: 0,
            records: Vec::new(),
            aborted: false,
        })
    }

    /// Shows the first trial.
    pub fn start(&mut self) -> Result<(), TrialError> {
        if self.current.is_some() || !self.records.is_empty() {
            return Ok(());
        }
        log::info!("session of {} trials started", self.configs.len());
        self.start_trial(0)
    }

    pub fn key_press(&mut self, press: KeyPress) -> Result<Option<SessionRecord>, TrialError> {
        for response in self.keyboard.dispatch(&press) {
            let Some(controller) = self.current.as_mut() else {
                break;
            };
            if let Some(result) = controller.handle_key(&response, &mut self.surface, &mut self.keyboard)? {
                return self.complete(result).map(Some);
            }
        }
        Ok(None)
    }

    /// Lets a running break expire. Call on every frame.
    pub fn update(&mut self) -> Result<Option<SessionRecord>, TrialError> {
        let Some(controller) = self.current.as_mut() else {
            return Ok(None);
        };
        match controller.update(&mut self.surface)? {
            Some(result) => self.complete(result).map(Some),
            None => Ok(None),
        }
    }

    /// Stops the session, dropping the trial in progress.
    pub fn abort(&mut self) {
        if let Some(mut controller) = self.current.take() {
            controller.abandon(&mut self.surface, &mut self.keyboard);
        }
        self.aborted = true;
    }

    fn complete(&mut self, result: TrialResult) -> Result<SessionRecord, TrialError> {
        let record = SessionRecord {
            trial_index: self.current_index,
            result,
        };
        self.records.push(record.clone());
        self.current = None;

        let next = self.current_index + 1;
        if next < self.configs.len() {
            self.start_trial(next)?;
        } else {
            log::info!("session finished, {} results", self.records.len());
        }
        Ok(record)
    }

    fn start_trial(&mut self, index: usize) -> Result<(), TrialError> {
        self.current_index = index;
        let controller = TrialController::start(
            self.configs[index].clone(),
            &mut self.surface,
            &mut self.keyboard,
            self.timer.clone(),
        )?;
        self.current = Some(controller);
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.aborted || self.records.len() == self.configs.len()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn current(&self) -> Option<&TrialController<T>> {
        self.current.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn trial_count(&self) -> usize {
        self.configs.len()
    }

    /// Earliest moment `update` has work to do.
    pub fn next_deadline_ns(&self) -> Option<u64> {
        self.current.as_ref().and_then(|c| c.break_deadline_ns())
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn keyboard(&self) -> &KeyDispatcher {
        &self.keyboard
    }
}
