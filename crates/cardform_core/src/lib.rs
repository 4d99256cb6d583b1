//! Card Form Core
//!
//! Foundational types for the card entry form:
//!
//! - **Fields**: identifiers, validity and per-field state
//! - **Visibility**: requirement flags and the ordered list of active fields
//! - **Theme**: colors and layered text/container styles
//! - **Configuration**: labels, placeholders and overrides loaded from TOML
//! - **Events**: field-scoped event emitters and the bus that dispatches them
//!
//! # Example
//!
//! ```rust
//! use cardform_core::visibility::{resolve, RequirementFlags};
//! use cardform_core::FieldId;
//!
//! let visible = resolve(RequirementFlags::default().with_cvc(true));
//! assert_eq!(
//!     visible.as_slice(),
//!     &[FieldId::Number, FieldId::Expiry, FieldId::Cvc]
//! );
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod field;
pub mod theme;
pub mod visibility;

pub use config::{CardViewConfig, FieldText, FormConfig};
pub use error::{CardFormError, MeasureError, Result};
pub use events::{FieldEmitter, FieldEvent, FieldEventBus, SubscriptionId};
pub use field::{FieldId, FieldState, FieldStatus, FieldStatuses, FieldValues, KeyboardKind};
pub use theme::{Color, ContainerStyle, FormTheme, TextStyle};
pub use visibility::{resolve, RequirementFlags, VisibleFields};
