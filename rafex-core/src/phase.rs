/// Defines trial phases and how they advance
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn allows_input(&self) -> bool;
    fn next(&self) -> Option<Self>;

    fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

/// Lifecycle of a single rod-and-frame trial. Strictly linear.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum TrialPhase {
    /// Rod follows the rotation keys.
    #[default]
    Adjusting,
    /// Response accepted; input is closed, an optional break is running.
    Ending,
    /// Result emitted.
    Done,
}

impl Phase for TrialPhase {
    fn allows_input(&self) -> bool {
        matches!(self, Self::Adjusting)
    }

    fn next(&self) -> Option<Self> {
        use TrialPhase::*;
        Some(match self {
            Adjusting => Ending,
            Ending => Done,
            Done => return None,
        })
    }
}
