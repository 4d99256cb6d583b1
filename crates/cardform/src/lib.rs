//! Card Form
//!
//! A payment-card entry form that keeps the focused field in view. When the
//! owner moves the focus target, the form measures the target editor,
//! scrolls the horizontal strip so the previous field peeks in from the
//! left, and then focuses the editor.
//!
//! # Architecture
//!
//! - [`FormController`] receives owner state as [`FormProps`] and drives the
//!   rest of the form
//! - [`cardform_layout::ScrollCoordinator`] runs the measure → scroll → focus
//!   sequence; every measurement carries a generation and stale answers are
//!   discarded
//! - [`cardform_layout::compose`] builds each editor's configuration on every
//!   update
//! - [`CardPreview`] draws the card face from the same state
//!
//! # Example
//!
//! ```rust
//! use cardform::prelude::*;
//!
//! let mut form = FormController::new(FormConfig::default(), ScrollState::new());
//! form.activate(FormProps::new(RequirementFlags::default().with_cvc(true)));
//!
//! let fields: Vec<_> = form.configurations().iter().map(|c| c.field).collect();
//! assert_eq!(fields, vec![FieldId::Number, FieldId::Expiry, FieldId::Cvc]);
//! ```

pub mod controller;
pub mod logging;
pub mod preview;
pub mod props;

pub use controller::{FormController, PumpReport};
pub use preview::{CardFace, CardPreview, CardPreviewProps};
pub use props::FormProps;

pub use cardform_core::{CardFormError, FieldEvent, FieldId, FieldStatus, FormConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::controller::{FormController, PumpReport};
    pub use crate::preview::{CardFace, CardPreview, CardPreviewProps};
    pub use crate::props::FormProps;

    pub use cardform_core::{
        CardFormError, FieldEvent, FieldId, FieldStatus, FormConfig, MeasureError,
        RequirementFlags,
    };
    pub use cardform_layout::{
        FieldConfiguration, FieldHandle, FocusPhase, Generation, MeasureRequest, ScrollCommand,
        ScrollState, ScrollSurface, SharedFieldHandle,
    };
}
