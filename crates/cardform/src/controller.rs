//! Form controller - lifecycle glue
//!
//! The controller owns the field registry, the scroll coordinator and the
//! field event bus. The host drives it:
//!
//! 1. [`activate`](FormController::activate) once with the initial props
//! 2. [`update`](FormController::update) whenever the owner's state changes
//! 3. [`pump`](FormController::pump) on every turn of the event loop to apply
//!    measurements and deliver field events
//! 4. [`on_scroll_settled`](FormController::on_scroll_settled) when the scroll
//!    surface finishes an animation
//! 5. [`teardown`](FormController::teardown) when the form goes away
//!
//! Problems with focus targets and measurements never interrupt the form.
//! They are logged and kept as diagnostics until the owner takes them.

use cardform_core::{
    resolve, CardFormError, FieldEvent, FieldEventBus, FieldId, FormConfig, SubscriptionId,
    VisibleFields,
};
use cardform_layout::{
    compose, ComposeInput, FieldConfiguration, FieldRegistry, FocusPhase, Generation,
    MeasureOutcome, ScrollCoordinator, ScrollSurface, SharedFieldHandle,
};

use crate::preview::{CardPreview, CardPreviewProps};
use crate::props::FormProps;

/// Diagnostics kept before the oldest are dropped
const MAX_DIAGNOSTICS: usize = 64;

/// Counts of the work done by one [`FormController::pump`] call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Measurements that scrolled and/or focused a field
    pub applied: usize,
    /// Measurements discarded as stale
    pub stale: usize,
    /// Field events delivered to subscribers
    pub events: usize,
}

/// Top-level card form orchestrator
pub struct FormController<S: ScrollSurface> {
    config: FormConfig,
    props: Option<FormProps>,
    registry: FieldRegistry,
    coordinator: ScrollCoordinator,
    surface: S,
    preview: Option<Box<dyn CardPreview>>,
    events: FieldEventBus,
    configurations: Vec<FieldConfiguration>,
    diagnostics: Vec<CardFormError>,
    /// Focus target refused because its editor was not mounted yet
    deferred_focus: Option<FieldId>,
}

impl<S: ScrollSurface> std::fmt::Debug for FormController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("active", &self.is_active())
            .field("phase", &self.coordinator.phase())
            .field("registry", &self.registry)
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}

impl<S: ScrollSurface> FormController<S> {
    pub fn new(config: FormConfig, surface: S) -> Self {
        Self {
            config,
            props: None,
            registry: FieldRegistry::new(),
            coordinator: ScrollCoordinator::new(),
            surface,
            preview: None,
            events: FieldEventBus::new(),
            configurations: Vec::new(),
            diagnostics: Vec::new(),
            deferred_focus: None,
        }
    }

    pub fn with_preview(mut self, preview: impl CardPreview + 'static) -> Self {
        self.preview = Some(Box::new(preview));
        self
    }

    /// Whether scroll commands animate (default: true)
    pub fn with_animated_scroll(mut self, animated: bool) -> Self {
        self.coordinator = ScrollCoordinator::new().with_animation(animated);
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn props(&self) -> Option<&FormProps> {
        self.props.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.props.is_some()
    }

    /// Fields in the form for the current requirement flags
    pub fn visible_fields(&self) -> VisibleFields {
        resolve(self.props.as_ref().map(|p| p.flags).unwrap_or_default())
    }

    /// Configurations composed by the latest activate/update
    pub fn configurations(&self) -> &[FieldConfiguration] {
        &self.configurations
    }

    pub fn configuration(&self, field: FieldId) -> Option<&FieldConfiguration> {
        self.configurations.iter().find(|c| c.field == field)
    }

    pub fn phase(&self) -> FocusPhase {
        self.coordinator.phase()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &[CardFormError] {
        &self.diagnostics
    }

    /// Take every diagnostic reported since the last call
    pub fn take_diagnostics(&mut self) -> Vec<CardFormError> {
        std::mem::take(&mut self.diagnostics)
    }

    // =========================================================================
    // Editors and subscribers
    // =========================================================================

    /// Register the editor for `field`
    ///
    /// An editor mounted while the form is active immediately receives its
    /// current configuration. If the current focus target was refused
    /// earlier for lack of this editor, the focus sequence runs now.
    pub fn mount_field(&mut self, field: FieldId, handle: SharedFieldHandle) {
        tracing::debug!("mounting editor for '{}'", field);
        if let Some(config) = self.configurations.iter().find(|c| c.field == field) {
            handle.render(config);
        }
        self.registry.register(field, handle);

        let focused = self.props.as_ref().and_then(|p| p.focused);
        if self.deferred_focus == Some(field)
            && focused == Some(field)
            && self.coordinator.phase() == FocusPhase::Idle
        {
            tracing::debug!("'{}' mounted; running deferred focus", field);
            self.focus(field);
        }
    }

    pub fn unmount_field(&mut self, field: FieldId) -> Option<SharedFieldHandle> {
        tracing::debug!("unmounting editor for '{}'", field);
        self.registry.unregister(field)
    }

    /// Receive every field event on subsequent [`pump`](Self::pump) calls
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&FieldEvent) + Send + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// First render; focuses the initial target if one is set
    pub fn activate(&mut self, props: FormProps) {
        if self.is_active() {
            tracing::warn!("activate called on an active form; treating as update");
            self.update(props);
            return;
        }

        tracing::debug!("activating card form (focused: {:?})", props.focused);
        let focused = props.focused;
        self.props = Some(props);
        self.render();

        if let Some(target) = focused {
            self.focus(target);
        }
    }

    /// Apply new owner state
    ///
    /// Configurations are recomposed on every call. The focus sequence runs
    /// only when the focus target changed to a field; clearing the target
    /// does nothing.
    pub fn update(&mut self, props: FormProps) {
        let Some(previous) = self.props.as_ref().map(|p| p.focused) else {
            tracing::debug!("update before activate; activating");
            self.activate(props);
            return;
        };

        let next = props.focused;
        self.props = Some(props);
        self.render();

        if previous != next {
            match next {
                Some(target) => self.focus(target),
                None => {
                    tracing::debug!("focus target cleared (was {:?})", previous);
                    self.deferred_focus = None;
                }
            }
        }
    }

    /// One turn of the event loop: apply arrived measurements, then deliver
    /// queued field events
    pub fn pump(&mut self) -> PumpReport {
        let mut report = PumpReport::default();

        let outcomes = self
            .coordinator
            .process_measurements(&self.registry, &mut self.surface);
        for outcome in outcomes {
            match outcome {
                MeasureOutcome::Scrolled {
                    target, offset, ..
                } => {
                    tracing::debug!("scrolled to x={} and focused '{}'", offset, target);
                    report.applied += 1;
                }
                MeasureOutcome::FocusedWithoutScroll { error, .. } => {
                    report.applied += 1;
                    self.report(error);
                }
                MeasureOutcome::Unmounted { target } => {
                    self.report(CardFormError::NotMounted { field: target });
                }
                MeasureOutcome::Stale { .. } => report.stale += 1,
            }
        }

        report.events = self.events.dispatch();
        report
    }

    /// The scroll surface finished the animation for `generation`
    pub fn on_scroll_settled(&mut self, generation: Generation) -> bool {
        self.coordinator.on_scroll_settled(generation)
    }

    /// Drop owner state, invalidate in-flight focus work and forget editors
    pub fn teardown(&mut self) {
        tracing::debug!("tearing down card form");
        self.coordinator.cancel();
        self.props = None;
        self.deferred_focus = None;
        self.configurations.clear();
        self.registry.clear();
        let dropped = self.events.clear();
        if dropped > 0 {
            tracing::trace!("dropped {} undelivered field events", dropped);
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn render(&mut self) {
        let Some(props) = self.props.as_ref() else {
            return;
        };

        let visible = resolve(props.flags);
        let input = ComposeInput {
            config: &self.config,
            values: &props.values,
            status: &props.status,
            events: &self.events,
        };
        self.configurations = compose(input, &visible);

        for config in &self.configurations {
            match self.registry.get(config.field) {
                Some(handle) => handle.render(config),
                None => tracing::trace!("no editor mounted for '{}' yet", config.field),
            }
        }

        if let Some(preview) = self.preview.as_mut() {
            preview.render(&CardPreviewProps::new(&self.config, props));
        }
    }

    fn focus(&mut self, target: FieldId) {
        self.deferred_focus = None;
        let visible = self.visible_fields();
        if let Err(err) = self
            .coordinator
            .request_focus(target, &visible, &self.registry)
        {
            if let CardFormError::NotMounted { field } = &err {
                self.deferred_focus = Some(*field);
            }
            self.report(err);
        }
    }

    fn report(&mut self, error: CardFormError) {
        tracing::warn!("{}", error);
        if self.diagnostics.len() == MAX_DIAGNOSTICS {
            self.diagnostics.remove(0);
        }
        self.diagnostics.push(error);
    }
}
