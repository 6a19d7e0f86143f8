use crate::{
    export::pipeline::ExportArtifact,
    foundation::error::{StripError, StripResult},
};

/// Lifecycle of a single export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExportState {
    /// Nothing started yet.
    #[default]
    Idle,
    /// Sources are being prepared for drawing.
    LoadingSources,
    /// Frame size or composite layout is being computed.
    LayingOut,
    /// Draw lists are being rasterized.
    Drawing,
    /// Frames are being encoded.
    Encoding,
    /// The artifact is ready.
    Done,
    /// The export aborted with an error.
    Failed,
}

impl ExportState {
    /// `true` for [`ExportState::Done`] and [`ExportState::Failed`].
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `self -> next` is a legal step.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ExportState::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Idle, LoadingSources)
            | (LoadingSources, LayingOut)
            | (LayingOut, Drawing)
            | (Drawing, Encoding)
            | (Encoding, Done) => true,
            _ => false,
        }
    }
}

/// Coarse phase attached to each progress report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportPhase {
    /// Preparing source rasters.
    Loading,
    /// Rasterizing frames or the composite.
    Drawing,
    /// Running the encoder.
    Encoding,
}

/// Receives export events. Every method defaults to a no-op.
pub trait ExportObserver {
    /// The export entered `state`.
    fn on_state(&mut self, state: ExportState) {
        let _ = state;
    }

    /// Overall completion in `[0, 1]`; never decreases within one export.
    fn on_progress(&mut self, phase: ExportPhase, fraction: f64) {
        let _ = (phase, fraction);
    }

    /// The artifact is ready.
    fn on_finished(&mut self, artifact: &ExportArtifact) {
        let _ = artifact;
    }
}

impl ExportObserver for () {}

/// One recorded observer callback.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportEvent {
    /// See [`ExportObserver::on_state`].
    State(ExportState),
    /// See [`ExportObserver::on_progress`].
    Progress(ExportPhase, f64),
    /// See [`ExportObserver::on_finished`]; carries the artifact file name.
    Finished(String),
}

/// In-memory observer for tests and debugging.
#[derive(Debug, Default)]
pub struct ExportEventLog {
    pub(crate) events: Vec<ExportEvent>,
}

impl ExportEventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events in arrival order.
    pub fn events(&self) -> &[ExportEvent] {
        &self.events
    }

    /// Only the state changes.
    pub fn states(&self) -> Vec<ExportState> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ExportEvent::State(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Only the progress fractions.
    pub fn fractions(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ExportEvent::Progress(_, f) => Some(*f),
                _ => None,
            })
            .collect()
    }
}

impl ExportObserver for ExportEventLog {
    fn on_state(&mut self, state: ExportState) {
        self.events.push(ExportEvent::State(state));
    }

    fn on_progress(&mut self, phase: ExportPhase, fraction: f64) {
        self.events.push(ExportEvent::Progress(phase, fraction));
    }

    fn on_finished(&mut self, artifact: &ExportArtifact) {
        self.events
            .push(ExportEvent::Finished(artifact.file_name.clone()));
    }
}

/// Drives the state machine of one export and filters progress before it reaches the observer.
///
/// Reported fractions are clamped to `[0, 1]`, never decrease, and `1.0` is delivered at most
/// once. Use a new tracker for every export.
pub struct ProgressTracker<'o> {
    observer: &'o mut dyn ExportObserver,
    state: ExportState,
    last: Option<f64>,
}

impl std::fmt::Debug for ProgressTracker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("state", &self.state)
            .field("last", &self.last)
            .finish()
    }
}

impl<'o> ProgressTracker<'o> {
    /// Tracker in [`ExportState::Idle`] forwarding to `observer`.
    pub fn new(observer: &'o mut dyn ExportObserver) -> Self {
        Self {
            observer,
            state: ExportState::Idle,
            last: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Last fraction delivered to the observer, or 0.
    pub fn fraction(&self) -> f64 {
        self.last.unwrap_or(0.0)
    }

    /// Move to `next`, notifying the observer; illegal steps are rejected without effect.
    pub fn transition(&mut self, next: ExportState) -> StripResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(StripError::Other(anyhow::anyhow!(
                "illegal export state transition {:?} -> {:?}",
                self.state,
                next
            )));
        }
        tracing::debug!(from = ?self.state, to = ?next, "export state");
        self.state = next;
        self.observer.on_state(next);
        Ok(())
    }

    /// Report overall completion; out-of-order or repeated values are dropped.
    pub fn report(&mut self, phase: ExportPhase, fraction: f64) {
        if self.state.is_terminal() || !fraction.is_finite() {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        match self.last {
            Some(last) if fraction <= last => return,
            _ => {}
        }
        self.last = Some(fraction);
        self.observer.on_progress(phase, fraction);
    }

    /// Report `1.0` unless it was already delivered.
    pub fn complete(&mut self, phase: ExportPhase) {
        self.report(phase, 1.0);
    }

    /// Hand the finished artifact to the observer.
    pub fn finished(&mut self, artifact: &ExportArtifact) {
        self.observer.on_finished(artifact);
    }

    /// Enter [`ExportState::Failed`] after `err`; a no-op once terminal.
    pub fn fail(&mut self, err: &StripError) {
        if self.state.is_terminal() {
            return;
        }
        tracing::warn!(state = ?self.state, error = %err, "export failed");
        self.state = ExportState::Failed;
        self.observer.on_state(ExportState::Failed);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/progress.rs"]
mod tests;
