//! Per-step outcomes of a multi-register sequence.

use heapless::Vec;

use crate::Error;

/// Longest sequence the controller runs (configuration: three reads, four writes).
pub const MAX_STEPS: usize = 8;

/// A single driver operation inside a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Sensor reset
    Reset,
    /// Interrupt clear
    ClearInterrupt,
    /// Sensor initialization
    SensorInit,
    /// Offset correction write
    SetOffset,
    /// Crosstalk correction write
    SetCrosstalk,
    /// Distance mode read
    GetDistanceMode,
    /// Distance mode write
    SetDistanceMode,
    /// Inter-measurement period read
    GetInterMeasurement,
    /// Inter-measurement period write
    SetInterMeasurement,
    /// Timing budget read
    GetTimingBudget,
    /// Timing budget write
    SetTimingBudget,
    /// Distance threshold write
    SetDistanceThreshold,
    /// Interrupt routing
    EnableInterrupt,
    /// Start command
    StartRanging,
}

/// Result of one step.
#[derive(Debug, PartialEq, Eq)]
pub struct StepOutcome<E: core::fmt::Debug> {
    /// Which operation ran
    pub step: Step,
    /// What it returned
    pub result: Result<(), Error<E>>,
}

/// Ordered record of the steps a sequence attempted.
///
/// Steps skipped under [`FailurePolicy::Abort`](crate::FailurePolicy::Abort)
/// do not appear.
#[derive(Debug)]
pub struct Report<E: core::fmt::Debug> {
    outcomes: Vec<StepOutcome<E>, MAX_STEPS>,
}

impl<E: core::fmt::Debug> Default for Report<E> {
    fn default() -> Self {
        Self { outcomes: Vec::new() }
    }
}

impl<E: core::fmt::Debug> Report<E> {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the outcome of `step` and returns whether it succeeded.
    pub fn record<T>(&mut self, step: Step, result: Result<T, Error<E>>) -> bool {
        let result = result.map(|_| ());
        let ok = result.is_ok();
        if !ok {
            warn!("Step {:?} failed", step);
        }
        if self.outcomes.push(StepOutcome { step, result }).is_err() {
            warn!("Step report full, dropping {:?}", step);
        }
        ok
    }

    /// True when every recorded step succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Number of failed steps, the counterpart of the summed result code.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Failed steps, in execution order.
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome<E>> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// All recorded steps, in execution order.
    #[must_use]
    pub fn outcomes(&self) -> &[StepOutcome<E>] {
        &self.outcomes
    }

    /// Outcome of `step`, if it ran.
    #[must_use]
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome<E>> {
        self.outcomes.iter().find(|o| o.step == step)
    }

    /// Steps that ran, in execution order.
    pub fn steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.outcomes.iter().map(|o| o.step)
    }
}
