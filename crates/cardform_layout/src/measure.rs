//! Generation-tagged field measurement
//!
//! Measuring a field is asynchronous: the coordinator hands a
//! [`MeasureRequest`] to the field's editor and the answer comes back later
//! through the [`MeasureInbox`], outside the call that asked for it. Success
//! and failure travel through the same queue as a [`Measurement`].
//!
//! Every request carries the [`Generation`] of the focus change that issued
//! it, so the coordinator can tell a stale answer from the current one.

use std::fmt;

use cardform_core::{FieldId, MeasureError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Monotonic tag identifying one focus request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub const ZERO: Generation = Generation(0);

    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Answer to a measurement request
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub field: FieldId,
    pub generation: Generation,
    /// Horizontal offset of the field relative to the scroll surface
    pub result: Result<f32, MeasureError>,
}

/// One outstanding request for a field's position
///
/// Answer it with [`resolve`](Self::resolve) or [`fail`](Self::fail). A
/// request dropped without an answer reports [`MeasureError::Dropped`].
#[derive(Debug)]
pub struct MeasureRequest {
    field: FieldId,
    generation: Generation,
    reply: Option<UnboundedSender<Measurement>>,
}

impl MeasureRequest {
    pub fn field(&self) -> FieldId {
        self.field
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Report the field's horizontal offset within the scroll surface
    pub fn resolve(mut self, x: f32) {
        self.send(Ok(x));
    }

    pub fn fail(mut self, error: MeasureError) {
        self.send(Err(error));
    }

    fn send(&mut self, result: Result<f32, MeasureError>) {
        if let Some(reply) = self.reply.take() {
            let measurement = Measurement {
                field: self.field,
                generation: self.generation,
                result,
            };
            if reply.send(measurement).is_err() {
                tracing::trace!(
                    "measurement {} for '{}' arrived after teardown",
                    self.generation,
                    self.field
                );
            }
        }
    }
}

impl Drop for MeasureRequest {
    fn drop(&mut self) {
        self.send(Err(MeasureError::Dropped));
    }
}

/// Receiving end for measurement answers
pub struct MeasureInbox {
    tx: UnboundedSender<Measurement>,
    rx: UnboundedReceiver<Measurement>,
}

impl fmt::Debug for MeasureInbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasureInbox").finish_non_exhaustive()
    }
}

impl Default for MeasureInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasureInbox {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self { tx, rx }
    }

    /// Create a request whose answer will land in this inbox
    pub fn request(&self, field: FieldId, generation: Generation) -> MeasureRequest {
        MeasureRequest {
            field,
            generation,
            reply: Some(self.tx.clone()),
        }
    }

    /// Next answer, if one has arrived
    pub fn try_next(&mut self) -> Option<Measurement> {
        self.rx.try_recv().ok()
    }

    /// Take every answer that has arrived, in arrival order
    pub fn drain(&mut self) -> Vec<Measurement> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_monotonic() {
        let g1 = Generation::ZERO.next();
        let g2 = g1.next();
        assert!(g2 > g1);
        assert_eq!(g2.get(), 2);
        assert_eq!(g2.to_string(), "#2");
    }

    #[test]
    fn test_answer_arrives_through_inbox() {
        let mut inbox = MeasureInbox::new();
        let request = inbox.request(FieldId::Cvc, Generation::ZERO.next());
        assert!(inbox.try_next().is_none());

        request.resolve(300.0);

        let measurement = inbox.try_next().unwrap();
        assert_eq!(measurement.field, FieldId::Cvc);
        assert_eq!(measurement.generation.get(), 1);
        assert_eq!(measurement.result, Ok(300.0));
        assert!(inbox.try_next().is_none());
    }

    #[test]
    fn test_failure_uses_the_same_queue() {
        let mut inbox = MeasureInbox::new();
        inbox
            .request(FieldId::Name, Generation::ZERO)
            .fail(MeasureError::NotLaidOut);

        let drained = inbox.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].result, Err(MeasureError::NotLaidOut));
    }

    #[test]
    fn test_dropped_request_reports_once() {
        let mut inbox = MeasureInbox::new();
        drop(inbox.request(FieldId::Expiry, Generation::ZERO));

        let drained = inbox.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].result, Err(MeasureError::Dropped));
    }

    #[test]
    fn test_answered_request_does_not_report_drop() {
        let mut inbox = MeasureInbox::new();
        inbox.request(FieldId::Number, Generation::ZERO).resolve(0.0);
        assert_eq!(inbox.drain().len(), 1);
    }
}
