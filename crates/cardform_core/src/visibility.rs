//! Field visibility rules
//!
//! Requirement flags decide which optional fields take part in the form.
//! `number` and `expiry` are always present.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::field::FieldId;

/// Flags controlling which optional fields participate in the form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementFlags {
    pub requires_cvc: bool,
    pub requires_name: bool,
    pub requires_postal_code: bool,
}

impl RequirementFlags {
    /// Flags with every optional field enabled
    pub const fn all() -> Self {
        Self {
            requires_cvc: true,
            requires_name: true,
            requires_postal_code: true,
        }
    }

    pub fn with_cvc(mut self, required: bool) -> Self {
        self.requires_cvc = required;
        self
    }

    pub fn with_name(mut self, required: bool) -> Self {
        self.requires_name = required;
        self
    }

    pub fn with_postal_code(mut self, required: bool) -> Self {
        self.requires_postal_code = required;
        self
    }
}

/// Ordered list of the fields currently in the form
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleFields(SmallVec<[FieldId; 5]>);

impl VisibleFields {
    pub fn contains(&self, field: FieldId) -> bool {
        self.0.contains(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[FieldId] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a VisibleFields {
    type Item = FieldId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, FieldId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

/// Resolve requirement flags into the ordered list of active fields
pub fn resolve(flags: RequirementFlags) -> VisibleFields {
    let mut fields: SmallVec<[FieldId; 5]> = SmallVec::new();
    fields.push(FieldId::Number);
    fields.push(FieldId::Expiry);
    if flags.requires_cvc {
        fields.push(FieldId::Cvc);
    }
    if flags.requires_name {
        fields.push(FieldId::Name);
    }
    if flags.requires_postal_code {
        fields.push(FieldId::PostalCode);
    }
    VisibleFields(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cvc_only() {
        let visible = resolve(RequirementFlags::default().with_cvc(true));
        assert_eq!(
            visible.as_slice(),
            &[FieldId::Number, FieldId::Expiry, FieldId::Cvc]
        );
    }

    #[test]
    fn test_no_optional_fields() {
        let visible = resolve(RequirementFlags::default());
        assert_eq!(visible.as_slice(), &[FieldId::Number, FieldId::Expiry]);
        assert!(!visible.contains(FieldId::Cvc));
    }

    #[test]
    fn test_every_combination_is_ordered_subsequence() {
        for bits in 0u8..8 {
            let flags = RequirementFlags {
                requires_cvc: bits & 1 != 0,
                requires_name: bits & 2 != 0,
                requires_postal_code: bits & 4 != 0,
            };
            let visible = resolve(flags);

            // Deterministic
            assert_eq!(visible, resolve(flags));

            // Same relative order as FieldId::ALL
            let positions: Vec<usize> = visible
                .iter()
                .map(|f| FieldId::ALL.iter().position(|a| *a == f).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));

            assert_eq!(visible.contains(FieldId::Cvc), flags.requires_cvc);
            assert_eq!(visible.contains(FieldId::Name), flags.requires_name);
            assert_eq!(
                visible.contains(FieldId::PostalCode),
                flags.requires_postal_code
            );
            assert!(visible.contains(FieldId::Number));
            assert!(visible.contains(FieldId::Expiry));
        }
    }

    #[test]
    fn test_all_fields() {
        let visible = resolve(RequirementFlags::all());
        assert_eq!(visible.as_slice(), &FieldId::ALL);
    }
}
