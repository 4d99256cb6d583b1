//! Owner-supplied form state

use cardform_core::{FieldId, FieldStatus, FieldStatuses, FieldValues, RequirementFlags};
use serde::{Deserialize, Serialize};

/// Snapshot of the owning state container, passed on every update
///
/// The form never changes these values itself. Field edits come back to the
/// owner as [`FieldEvent`](cardform_core::FieldEvent)s and return here on the
/// next update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormProps {
    pub values: FieldValues,
    pub status: FieldStatuses,
    /// Field the form should scroll to and focus
    pub focused: Option<FieldId>,
    #[serde(flatten)]
    pub flags: RequirementFlags,
    /// Card brand detected by the owner, forwarded to the preview
    pub card_type: Option<String>,
}

impl FormProps {
    pub fn new(flags: RequirementFlags) -> Self {
        Self {
            flags,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, field: FieldId, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn with_status(mut self, field: FieldId, status: FieldStatus) -> Self {
        self.status.insert(field, status);
        self
    }

    pub fn with_focus(mut self, focused: Option<FieldId>) -> Self {
        self.focused = focused;
        self
    }

    pub fn with_card_type(mut self, card_type: impl Into<String>) -> Self {
        self.card_type = Some(card_type.into());
        self
    }

    pub fn value(&self, field: FieldId) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }
}
