//! Focus-driven scroll coordination
//!
//! Moving focus to a field is a three-step sequence: measure the field,
//! scroll the surface so the field is in view, then give the field keyboard
//! focus. Measuring is asynchronous, so the sequence is driven by a small
//! state machine:
//!
//! ```text
//!            request_focus(t)              measured(g) ok
//!   Idle ─────────────────────► Measuring ───────────────► Settling
//!    ▲                           │   ▲                       │
//!    │      measured(g) failed   │   │ request_focus(t')     │ scroll_settled(g)
//!    └───────────────────────────┘   └─── (any state) ───    │
//!    └───────────────────────────────────────────────────────┘
//! ```
//!
//! Every request gets a fresh [`Generation`]. A measurement or settle
//! notification whose generation is not the current one belongs to a
//! superseded request and is discarded, so the latest requested field always
//! wins regardless of the order answers arrive in.
//!
//! Focus is delegated right after the scroll command is issued, without
//! waiting for the animation to settle.

use cardform_core::{CardFormError, FieldId, MeasureError, VisibleFields};

use crate::measure::{Generation, MeasureInbox, Measurement};
use crate::registry::FieldRegistry;
use crate::scroll::{scroll_offset_for, ScrollCommand, ScrollSurface};

/// Where the coordinator is in the focus sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusPhase {
    /// No focus change in progress
    Idle,
    /// Waiting for the target's position
    Measuring {
        target: FieldId,
        generation: Generation,
    },
    /// Scroll issued and focus delegated; waiting for the surface to settle
    Settling {
        target: FieldId,
        generation: Generation,
    },
}

impl FocusPhase {
    pub fn target(&self) -> Option<FieldId> {
        match self {
            FocusPhase::Idle => None,
            FocusPhase::Measuring { target, .. } | FocusPhase::Settling { target, .. } => {
                Some(*target)
            }
        }
    }

    pub fn generation(&self) -> Option<Generation> {
        match self {
            FocusPhase::Idle => None,
            FocusPhase::Measuring { generation, .. } | FocusPhase::Settling { generation, .. } => {
                Some(*generation)
            }
        }
    }
}

/// What happened to one measurement answer
#[derive(Debug)]
pub enum MeasureOutcome {
    /// The surface was scrolled to `offset` and the field focused
    Scrolled {
        target: FieldId,
        generation: Generation,
        offset: f32,
    },
    /// Measuring failed; the scroll was skipped but the field was focused
    FocusedWithoutScroll {
        target: FieldId,
        generation: Generation,
        error: CardFormError,
    },
    /// The field unmounted while it was being measured; nothing was done
    Unmounted { target: FieldId },
    /// The answer belongs to a superseded request and was discarded
    Stale {
        field: FieldId,
        generation: Generation,
    },
}

/// Drives measure → scroll → focus for the current focus target
#[derive(Debug)]
pub struct ScrollCoordinator {
    phase: FocusPhase,
    generation: Generation,
    inbox: MeasureInbox,
    animated: bool,
}

impl Default for ScrollCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollCoordinator {
    pub fn new() -> Self {
        Self {
            phase: FocusPhase::Idle,
            generation: Generation::ZERO,
            inbox: MeasureInbox::new(),
            animated: true,
        }
    }

    /// Whether scroll commands ask the surface to animate (default: true)
    pub fn with_animation(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    pub fn phase(&self) -> FocusPhase {
        self.phase
    }

    /// Generation of the most recent request
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Start the focus sequence for `target`
    ///
    /// Every earlier request becomes stale, including when `target` is
    /// refused for being outside `visible` or having no mounted editor.
    pub fn request_focus(
        &mut self,
        target: FieldId,
        visible: &VisibleFields,
        registry: &FieldRegistry,
    ) -> Result<Generation, CardFormError> {
        if !visible.contains(target) {
            self.cancel();
            return Err(CardFormError::HiddenField { field: target });
        }
        let Some(handle) = registry.get(target).cloned() else {
            self.cancel();
            return Err(CardFormError::NotMounted { field: target });
        };

        self.generation = self.generation.next();
        let generation = self.generation;
        self.phase = FocusPhase::Measuring { target, generation };
        tracing::debug!("measuring '{}' for focus {}", target, generation);

        handle.measure(self.inbox.request(target, generation));
        Ok(generation)
    }

    /// Apply every measurement that has arrived since the last call
    pub fn process_measurements(
        &mut self,
        registry: &FieldRegistry,
        surface: &mut dyn ScrollSurface,
    ) -> Vec<MeasureOutcome> {
        let mut outcomes = Vec::new();
        while let Some(measurement) = self.inbox.try_next() {
            outcomes.push(self.on_measured(measurement, registry, surface));
        }
        outcomes
    }

    /// Continue the sequence with one measurement answer
    pub fn on_measured(
        &mut self,
        measurement: Measurement,
        registry: &FieldRegistry,
        surface: &mut dyn ScrollSurface,
    ) -> MeasureOutcome {
        let Measurement {
            field,
            generation,
            result,
        } = measurement;

        let current = matches!(
            self.phase,
            FocusPhase::Measuring { target, generation: g } if target == field && g == generation
        );
        if !current {
            tracing::trace!(
                "discarding stale measurement {} for '{}' (phase: {:?})",
                generation,
                field,
                self.phase
            );
            return MeasureOutcome::Stale { field, generation };
        }

        let Some(handle) = registry.get(field).cloned() else {
            tracing::debug!("'{}' unmounted before its measurement arrived", field);
            self.phase = FocusPhase::Idle;
            return MeasureOutcome::Unmounted { target: field };
        };

        let result = result.and_then(|x| {
            if x.is_finite() {
                Ok(x)
            } else {
                Err(MeasureError::Platform(format!("non-finite offset {}", x)))
            }
        });

        match result {
            Ok(x) => {
                let offset = scroll_offset_for(x);
                surface.scroll_to(ScrollCommand {
                    x: offset,
                    animated: self.animated,
                    generation,
                });
                handle.focus();
                self.phase = FocusPhase::Settling {
                    target: field,
                    generation,
                };
                MeasureOutcome::Scrolled {
                    target: field,
                    generation,
                    offset,
                }
            }
            Err(source) => {
                handle.focus();
                self.phase = FocusPhase::Idle;
                MeasureOutcome::FocusedWithoutScroll {
                    target: field,
                    generation,
                    error: CardFormError::Measurement { field, source },
                }
            }
        }
    }

    /// The surface finished scrolling for `generation`
    ///
    /// Returns false if the notification is stale.
    pub fn on_scroll_settled(&mut self, generation: Generation) -> bool {
        match self.phase {
            FocusPhase::Settling { target, generation: g } if g == generation => {
                tracing::trace!("scroll for '{}' settled ({})", target, generation);
                self.phase = FocusPhase::Idle;
                true
            }
            _ => {
                tracing::trace!("ignoring stale scroll settle {}", generation);
                false
            }
        }
    }

    /// Abandon any sequence in flight
    ///
    /// Answers still outstanding become stale.
    pub fn cancel(&mut self) {
        if self.phase != FocusPhase::Idle {
            tracing::debug!("cancelling focus sequence {:?}", self.phase);
        }
        self.generation = self.generation.next();
        self.phase = FocusPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, CallLog, MeasureMode, RecordingField, RecordingSurface};
    use cardform_core::{resolve, RequirementFlags};
    use std::sync::Arc;

    struct Harness {
        log: CallLog,
        fields: Vec<Arc<RecordingField>>,
        registry: FieldRegistry,
        surface: RecordingSurface,
        coordinator: ScrollCoordinator,
        visible: VisibleFields,
    }

    impl Harness {
        fn new(mode: MeasureMode) -> Self {
            let log = CallLog::default();
            let mut registry = FieldRegistry::new();
            let mut fields = Vec::new();
            let visible = resolve(RequirementFlags::all());
            for (i, field) in visible.iter().enumerate() {
                let editor = Arc::new(RecordingField::new(
                    field,
                    100.0 * i as f32,
                    mode,
                    log.clone(),
                ));
                registry.register(field, editor.clone());
                fields.push(editor);
            }
            Self {
                surface: RecordingSurface::new(log.clone()),
                log,
                fields,
                registry,
                coordinator: ScrollCoordinator::new(),
                visible,
            }
        }

        fn request(&mut self, field: FieldId) -> Result<Generation, CardFormError> {
            self.coordinator
                .request_focus(field, &self.visible, &self.registry)
        }

        fn process(&mut self) -> Vec<MeasureOutcome> {
            self.coordinator
                .process_measurements(&self.registry, &mut self.surface)
        }

        fn field(&self, field: FieldId) -> &RecordingField {
            self.fields.iter().find(|f| f.field() == field).unwrap()
        }
    }

    #[test]
    fn test_measure_then_scroll_then_focus() {
        let mut h = Harness::new(MeasureMode::Immediate);
        let generation = h.request(FieldId::Cvc).unwrap();

        // answer is queued, nothing scrolled yet
        assert_eq!(h.log.calls(), vec![Call::Measure(FieldId::Cvc)]);
        assert_eq!(
            h.coordinator.phase(),
            FocusPhase::Measuring {
                target: FieldId::Cvc,
                generation
            }
        );

        let outcomes = h.process();
        assert!(matches!(
            outcomes.as_slice(),
            [MeasureOutcome::Scrolled { target: FieldId::Cvc, offset, .. }] if *offset == 160.0
        ));
        assert_eq!(
            h.log.calls(),
            vec![
                Call::Measure(FieldId::Cvc),
                Call::Scroll(160.0),
                Call::Focus(FieldId::Cvc)
            ]
        );
        assert_eq!(h.coordinator.phase().target(), Some(FieldId::Cvc));

        assert!(h.coordinator.on_scroll_settled(generation));
        assert_eq!(h.coordinator.phase(), FocusPhase::Idle);
    }

    #[test]
    fn test_first_field_scrolls_to_zero() {
        let mut h = Harness::new(MeasureMode::Immediate);
        h.request(FieldId::Number).unwrap();
        h.process();
        assert!(h.log.calls().contains(&Call::Scroll(0.0)));
    }

    #[test]
    fn test_hidden_field_is_refused() {
        let mut h = Harness::new(MeasureMode::Immediate);
        h.visible = resolve(RequirementFlags::default());

        let err = h.request(FieldId::PostalCode).unwrap_err();
        assert!(matches!(
            err,
            CardFormError::HiddenField {
                field: FieldId::PostalCode
            }
        ));
        assert_eq!(h.coordinator.phase(), FocusPhase::Idle);
        assert!(h.log.calls().is_empty());
    }

    #[test]
    fn test_unmounted_field_is_refused() {
        let mut h = Harness::new(MeasureMode::Immediate);
        h.registry.unregister(FieldId::Name);

        assert!(matches!(
            h.request(FieldId::Name),
            Err(CardFormError::NotMounted { field: FieldId::Name })
        ));
        assert!(h.log.calls().is_empty());
    }

    #[test]
    fn test_hidden_target_supersedes_in_flight_request() {
        let mut h = Harness::new(MeasureMode::Deferred);
        h.request(FieldId::Expiry).unwrap();
        h.visible = resolve(RequirementFlags::default());
        assert!(h.request(FieldId::Name).is_err());
        assert_eq!(h.coordinator.phase(), FocusPhase::Idle);

        h.field(FieldId::Expiry).answer_pending();
        let outcomes = h.process();

        assert!(matches!(outcomes[0], MeasureOutcome::Stale { field: FieldId::Expiry, .. }));
        assert!(h.log.scrolls().is_empty());
        assert!(h.log.focused().is_empty());
    }

    #[test]
    fn test_unmounted_target_supersedes_in_flight_request() {
        let mut h = Harness::new(MeasureMode::Deferred);
        h.request(FieldId::Expiry).unwrap();
        h.registry.unregister(FieldId::Cvc);
        assert!(h.request(FieldId::Cvc).is_err());

        h.field(FieldId::Expiry).answer_pending();
        h.process();
        assert!(h.log.scrolls().is_empty());
        assert!(h.log.focused().is_empty());
    }

    #[test]
    fn test_non_finite_offset_focuses_without_scroll() {
        let log = CallLog::default();
        let mut registry = FieldRegistry::new();
        registry.register(
            FieldId::Expiry,
            Arc::new(RecordingField::new(
                FieldId::Expiry,
                f32::NAN,
                MeasureMode::Immediate,
                log.clone(),
            )),
        );
        let mut surface = RecordingSurface::new(log.clone());
        let mut coordinator = ScrollCoordinator::new();
        let visible = resolve(RequirementFlags::default());

        coordinator
            .request_focus(FieldId::Expiry, &visible, &registry)
            .unwrap();
        let outcomes = coordinator.process_measurements(&registry, &mut surface);

        assert!(matches!(
            &outcomes[0],
            MeasureOutcome::FocusedWithoutScroll {
                error: CardFormError::Measurement {
                    field: FieldId::Expiry,
                    source: MeasureError::Platform(_),
                },
                ..
            }
        ));
        assert!(log.scrolls().is_empty());
        assert_eq!(log.focused(), vec![FieldId::Expiry]);
        assert_eq!(coordinator.phase(), FocusPhase::Idle);
    }

    #[test]
    fn test_stale_measurement_is_discarded_when_it_arrives_first() {
        let mut h = Harness::new(MeasureMode::Deferred);
        let g_a = h.request(FieldId::Expiry).unwrap();
        let g_b = h.request(FieldId::Name).unwrap();
        assert!(g_b > g_a);

        // A resolves before B
        h.field(FieldId::Expiry).answer_pending();
        h.field(FieldId::Name).answer_pending();

        let outcomes = h.process();
        assert!(matches!(outcomes[0], MeasureOutcome::Stale { field: FieldId::Expiry, .. }));
        assert!(matches!(outcomes[1], MeasureOutcome::Scrolled { target: FieldId::Name, .. }));
        assert_eq!(h.log.focused(), vec![FieldId::Name]);
        assert_eq!(h.log.scrolls(), vec![260.0]);
    }

    #[test]
    fn test_stale_measurement_is_discarded_when_it_arrives_last() {
        let mut h = Harness::new(MeasureMode::Deferred);
        h.request(FieldId::Expiry).unwrap();
        h.request(FieldId::Name).unwrap();

        // B resolves before A
        h.field(FieldId::Name).answer_pending();
        h.process();
        h.field(FieldId::Expiry).answer_pending();
        let outcomes = h.process();

        assert!(matches!(outcomes[0], MeasureOutcome::Stale { field: FieldId::Expiry, .. }));
        assert_eq!(h.log.focused(), vec![FieldId::Name]);
        assert_eq!(h.log.scrolls().len(), 1);
    }

    #[test]
    fn test_refocusing_same_field_supersedes_earlier_request() {
        let mut h = Harness::new(MeasureMode::Deferred);
        h.request(FieldId::Cvc).unwrap();
        let latest = h.request(FieldId::Cvc).unwrap();

        h.field(FieldId::Cvc).answer_pending();
        let outcomes = h.process();

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], MeasureOutcome::Stale { .. }));
        assert!(matches!(
            outcomes[1],
            MeasureOutcome::Scrolled { generation, .. } if generation == latest
        ));
        assert_eq!(h.log.focused(), vec![FieldId::Cvc]);
    }

    #[test]
    fn test_failed_measurement_still_focuses() {
        let mut h = Harness::new(MeasureMode::Fail);
        h.request(FieldId::Cvc).unwrap();

        let outcomes = h.process();
        assert!(matches!(
            &outcomes[0],
            MeasureOutcome::FocusedWithoutScroll {
                target: FieldId::Cvc,
                error: CardFormError::Measurement { .. },
                ..
            }
        ));
        assert_eq!(
            h.log.calls(),
            vec![Call::Measure(FieldId::Cvc), Call::Focus(FieldId::Cvc)]
        );
        assert_eq!(h.coordinator.phase(), FocusPhase::Idle);
    }

    #[test]
    fn test_dropped_request_counts_as_failure() {
        let mut h = Harness::new(MeasureMode::Drop);
        h.request(FieldId::Expiry).unwrap();

        let outcomes = h.process();
        assert!(matches!(
            &outcomes[0],
            MeasureOutcome::FocusedWithoutScroll {
                error: CardFormError::Measurement {
                    source: MeasureError::Dropped,
                    ..
                },
                ..
            }
        ));
        assert_eq!(h.log.focused(), vec![FieldId::Expiry]);
    }

    #[test]
    fn test_unmount_during_measurement() {
        let mut h = Harness::new(MeasureMode::Deferred);
        h.request(FieldId::Name).unwrap();
        assert!(h.registry.unregister(FieldId::Name).is_some());

        h.field(FieldId::Name).answer_pending();
        let outcomes = h.process();

        assert!(matches!(
            outcomes[0],
            MeasureOutcome::Unmounted {
                target: FieldId::Name
            }
        ));
        assert!(h.log.focused().is_empty());
        assert_eq!(h.coordinator.phase(), FocusPhase::Idle);
    }

    #[test]
    fn test_stale_settle_is_ignored() {
        let mut h = Harness::new(MeasureMode::Immediate);
        let g_a = h.request(FieldId::Number).unwrap();
        h.process();
        let g_b = h.request(FieldId::Expiry).unwrap();
        h.process();

        assert!(!h.coordinator.on_scroll_settled(g_a));
        assert!(h.coordinator.phase() != FocusPhase::Idle);
        assert!(h.coordinator.on_scroll_settled(g_b));
    }

    #[test]
    fn test_cancel_makes_outstanding_answers_stale() {
        let mut h = Harness::new(MeasureMode::Deferred);
        h.request(FieldId::Cvc).unwrap();
        h.coordinator.cancel();

        h.field(FieldId::Cvc).answer_pending();
        let outcomes = h.process();
        assert!(matches!(outcomes[0], MeasureOutcome::Stale { .. }));
        assert!(h.log.focused().is_empty());
    }

    #[test]
    fn test_instant_scroll_when_animation_disabled() {
        let mut h = Harness::new(MeasureMode::Immediate);
        h.coordinator = ScrollCoordinator::new().with_animation(false);
        h.request(FieldId::Cvc).unwrap();
        h.process();
        assert!(!h.surface.commands()[0].animated);
    }
}
