//! Card Form Layout
//!
//! Everything between the owner's focus target and the field editors:
//!
//! - [`FieldRegistry`] - mounted editors by field identifier
//! - [`MeasureInbox`] - generation-tagged asynchronous measurements
//! - [`ScrollSurface`] / [`ScrollState`] - scroll commands and a headless animated surface
//! - [`ScrollCoordinator`] - the measure → scroll → focus state machine
//! - [`compose`] - per-field configuration for each update

pub mod composer;
pub mod coordinator;
pub mod measure;
pub mod registry;
pub mod scroll;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use composer::{compose, compose_field, ComposeInput, FieldConfiguration};
pub use coordinator::{FocusPhase, MeasureOutcome, ScrollCoordinator};
pub use measure::{Generation, MeasureInbox, MeasureRequest, Measurement};
pub use registry::{FieldHandle, FieldRegistry, SharedFieldHandle};
pub use scroll::{
    scroll_offset_for, ScrollCommand, ScrollSpringConfig, ScrollState, ScrollSurface,
    PREVIOUS_FIELD_OFFSET,
};
