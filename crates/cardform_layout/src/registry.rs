//! Registry of mounted field editors

use std::sync::Arc;

use cardform_core::FieldId;
use rustc_hash::FxHashMap;

use crate::composer::FieldConfiguration;
use crate::measure::MeasureRequest;

/// Capabilities the form needs from a mounted field editor
pub trait FieldHandle {
    /// Give the editor keyboard focus
    fn focus(&self);

    /// Report the editor's horizontal offset relative to the scroll surface
    ///
    /// The answer may be given immediately or later; either way it is
    /// delivered through the request, never through the return value.
    fn measure(&self, request: MeasureRequest);

    /// Receive the configuration composed for the current update
    fn render(&self, _config: &FieldConfiguration) {}
}

/// Shared handle to a mounted editor
pub type SharedFieldHandle = Arc<dyn FieldHandle + Send + Sync>;

/// Mapping from field identifier to the editor mounted for it
///
/// Populated as editors mount and emptied as they unmount.
#[derive(Default)]
pub struct FieldRegistry {
    handles: FxHashMap<FieldId, SharedFieldHandle>,
}

impl std::fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("mounted", &self.mounted())
            .finish()
    }
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the editor for `field`
    ///
    /// If an editor is already registered the old one is replaced (last-wins).
    /// Returns the replaced handle.
    pub fn register(
        &mut self,
        field: FieldId,
        handle: SharedFieldHandle,
    ) -> Option<SharedFieldHandle> {
        let previous = self.handles.insert(field, handle);
        if previous.is_some() {
            tracing::warn!("Duplicate editor registered for field '{}'", field);
        }
        previous
    }

    pub fn unregister(&mut self, field: FieldId) -> Option<SharedFieldHandle> {
        self.handles.remove(&field)
    }

    pub fn get(&self, field: FieldId) -> Option<&SharedFieldHandle> {
        self.handles.get(&field)
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.handles.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }

    /// Mounted fields in form order
    pub fn mounted(&self) -> Vec<FieldId> {
        FieldId::ALL
            .into_iter()
            .filter(|f| self.handles.contains_key(f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingField {
        focused: AtomicUsize,
    }

    impl FieldHandle for CountingField {
        fn focus(&self) {
            self.focused.fetch_add(1, Ordering::SeqCst);
        }

        fn measure(&self, request: MeasureRequest) {
            request.resolve(0.0);
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = FieldRegistry::new();
        let field = Arc::new(CountingField::default());
        registry.register(FieldId::Cvc, field.clone());

        assert!(registry.contains(FieldId::Cvc));
        assert!(!registry.contains(FieldId::Name));

        registry.get(FieldId::Cvc).unwrap().focus();
        assert_eq!(field.focused.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_registration_last_wins() {
        let mut registry = FieldRegistry::new();
        let first = Arc::new(CountingField::default());
        let second = Arc::new(CountingField::default());

        assert!(registry.register(FieldId::Number, first.clone()).is_none());
        assert!(registry.register(FieldId::Number, second.clone()).is_some());
        assert_eq!(registry.len(), 1);

        registry.get(FieldId::Number).unwrap().focus();
        assert_eq!(first.focused.load(Ordering::SeqCst), 0);
        assert_eq!(second.focused.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_and_clear() {
        let mut registry = FieldRegistry::new();
        registry.register(FieldId::PostalCode, Arc::new(CountingField::default()));
        registry.register(FieldId::Number, Arc::new(CountingField::default()));
        assert_eq!(
            registry.mounted(),
            vec![FieldId::Number, FieldId::PostalCode]
        );

        assert!(registry.unregister(FieldId::PostalCode).is_some());
        assert!(registry.unregister(FieldId::PostalCode).is_none());
        assert_eq!(registry.mounted(), vec![FieldId::Number]);

        registry.clear();
        assert!(registry.is_empty());
    }
}
