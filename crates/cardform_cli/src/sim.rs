//! Simulated editors and scroll surface
//!
//! Editors sit side by side on a horizontal strip and answer measurement
//! requests only when the simulation says layout has finished.

use std::sync::{Arc, Mutex};

use cardform_core::{FieldId, MeasureError};
use cardform_layout::{
    FieldConfiguration, FieldHandle, MeasureRequest, ScrollCommand, ScrollState, ScrollSurface,
};
use serde::Serialize;

/// One observable step of a simulated focus walk
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    Target { field: FieldId },
    Measure { field: FieldId },
    Scroll { x: f32, generation: u64, animated: bool },
    Focus { field: FieldId },
    Settled { generation: u64, offset: f32, elapsed_ms: u32 },
    Stale { count: usize },
    Diagnostic { message: String },
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Target { field } => write!(f, "target   {}", field),
            Step::Measure { field } => write!(f, "measure  {}", field),
            Step::Scroll {
                x,
                generation,
                animated,
            } => write!(
                f,
                "scroll   x={:.1} #{}{}",
                x,
                generation,
                if *animated { "" } else { " (instant)" }
            ),
            Step::Focus { field } => write!(f, "focus    {}", field),
            Step::Settled {
                generation,
                offset,
                elapsed_ms,
            } => write!(
                f,
                "settled  #{} at x={:.1} after {}ms",
                generation, offset, elapsed_ms
            ),
            Step::Stale { count } => write!(f, "stale    {} measurement(s) discarded", count),
            Step::Diagnostic { message } => write!(f, "warning  {}", message),
        }
    }
}

/// Shared, ordered record of simulation steps
#[derive(Clone, Debug, Default)]
pub struct Timeline(Arc<Mutex<Vec<Step>>>);

impl Timeline {
    pub fn push(&self, step: Step) {
        if let Ok(mut steps) = self.0.lock() {
            steps.push(step);
        }
    }

    pub fn steps(&self) -> Vec<Step> {
        self.0.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

/// Editor positioned at a fixed offset on the strip
#[derive(Debug)]
pub struct SimField {
    field: FieldId,
    x: f32,
    fail: bool,
    timeline: Timeline,
    pending: Mutex<Vec<MeasureRequest>>,
}

impl SimField {
    pub fn new(field: FieldId, x: f32, fail: bool, timeline: Timeline) -> Self {
        Self {
            field,
            x,
            fail,
            timeline,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn field(&self) -> FieldId {
        self.field
    }

    /// Finish layout: answer every held request, oldest first
    pub fn lay_out(&self) -> usize {
        let pending = self
            .pending
            .lock()
            .map(|mut p| std::mem::take(&mut *p))
            .unwrap_or_default();
        let count = pending.len();
        for request in pending {
            if self.fail {
                request.fail(MeasureError::NotLaidOut);
            } else {
                request.resolve(self.x);
            }
        }
        count
    }
}

impl FieldHandle for SimField {
    fn focus(&self) {
        self.timeline.push(Step::Focus { field: self.field });
    }

    fn measure(&self, request: MeasureRequest) {
        self.timeline.push(Step::Measure { field: self.field });
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(request);
        }
    }

    fn render(&self, config: &FieldConfiguration) {
        tracing::trace!(
            "render '{}' (value: {:?}, status: {:?})",
            self.field,
            config.value,
            config.status
        );
    }
}

/// Headless scroll surface that records every command
#[derive(Debug)]
pub struct SimSurface {
    pub state: ScrollState,
    timeline: Timeline,
}

impl SimSurface {
    pub fn new(state: ScrollState, timeline: Timeline) -> Self {
        Self { state, timeline }
    }
}

impl ScrollSurface for SimSurface {
    fn scroll_to(&mut self, command: ScrollCommand) {
        self.timeline.push(Step::Scroll {
            x: command.x,
            generation: command.generation.get(),
            animated: command.animated,
        });
        self.state.scroll_to(command);
    }
}
