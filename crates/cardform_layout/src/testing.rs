//! Recording doubles for field editors and the scroll surface
//!
//! Every double appends to a shared [`CallLog`] so tests can assert the exact
//! order of measure, scroll and focus calls across collaborators.

use std::sync::{Arc, Mutex};

use cardform_core::{FieldId, MeasureError};

use crate::composer::FieldConfiguration;
use crate::measure::MeasureRequest;
use crate::registry::FieldHandle;
use crate::scroll::{ScrollCommand, ScrollSurface};

/// One observable call made by the form
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Measure(FieldId),
    Scroll(f32),
    Focus(FieldId),
}

/// Shared, ordered record of calls
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn focused(&self) -> Vec<FieldId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Focus(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn scrolls(&self) -> Vec<f32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Scroll(x) => Some(x),
                _ => None,
            })
            .collect()
    }

    pub fn measured(&self) -> Vec<FieldId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Measure(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.0.lock() {
            calls.clear();
        }
    }
}

/// How a [`RecordingField`] answers measurement requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasureMode {
    /// Answer inside `measure()`
    Immediate,
    /// Hold requests until [`RecordingField::answer_pending`]
    Deferred,
    /// Fail inside `measure()`
    Fail,
    /// Drop the request unanswered
    Drop,
}

/// Field editor double positioned at a fixed horizontal offset
#[derive(Debug)]
pub struct RecordingField {
    field: FieldId,
    x: f32,
    mode: MeasureMode,
    log: CallLog,
    pending: Mutex<Vec<MeasureRequest>>,
    rendered: Mutex<Vec<FieldConfiguration>>,
}

impl RecordingField {
    pub fn new(field: FieldId, x: f32, mode: MeasureMode, log: CallLog) -> Self {
        Self {
            field,
            x,
            mode,
            log,
            pending: Mutex::new(Vec::new()),
            rendered: Mutex::new(Vec::new()),
        }
    }

    pub fn field(&self) -> FieldId {
        self.field
    }

    /// Answer every held request with this field's offset, oldest first
    pub fn answer_pending(&self) -> usize {
        let pending = self
            .pending
            .lock()
            .map(|mut p| std::mem::take(&mut *p))
            .unwrap_or_default();
        let count = pending.len();
        for request in pending {
            request.resolve(self.x);
        }
        count
    }

    /// Fail every held request, oldest first
    pub fn fail_pending(&self, error: MeasureError) -> usize {
        let pending = self
            .pending
            .lock()
            .map(|mut p| std::mem::take(&mut *p))
            .unwrap_or_default();
        let count = pending.len();
        for request in pending {
            request.fail(error.clone());
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Configurations received through `render()`, oldest first
    pub fn rendered(&self) -> Vec<FieldConfiguration> {
        self.rendered.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last_rendered(&self) -> Option<FieldConfiguration> {
        self.rendered.lock().ok()?.last().cloned()
    }
}

impl FieldHandle for RecordingField {
    fn focus(&self) {
        self.log.push(Call::Focus(self.field));
    }

    fn measure(&self, request: MeasureRequest) {
        self.log.push(Call::Measure(self.field));
        match self.mode {
            MeasureMode::Immediate => request.resolve(self.x),
            MeasureMode::Fail => request.fail(MeasureError::NotLaidOut),
            MeasureMode::Drop => drop(request),
            MeasureMode::Deferred => {
                if let Ok(mut pending) = self.pending.lock() {
                    pending.push(request);
                }
            }
        }
    }

    fn render(&self, config: &FieldConfiguration) {
        if let Ok(mut rendered) = self.rendered.lock() {
            rendered.push(config.clone());
        }
    }
}

/// Scroll surface double
#[derive(Debug)]
pub struct RecordingSurface {
    log: CallLog,
    commands: Arc<Mutex<Vec<ScrollCommand>>>,
}

impl RecordingSurface {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn commands(&self) -> Vec<ScrollCommand> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// A second surface sharing this one's command record
    pub fn share(&self) -> Self {
        Self {
            log: self.log.clone(),
            commands: self.commands.clone(),
        }
    }
}

impl ScrollSurface for RecordingSurface {
    fn scroll_to(&mut self, command: ScrollCommand) {
        self.log.push(Call::Scroll(command.x));
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }
    }
}
