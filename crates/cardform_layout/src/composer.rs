//! Per-field configuration composition
//!
//! The composer keeps no state between calls. Each update it projects the
//! owner's current values and statuses plus the static [`FormConfig`] into one
//! [`FieldConfiguration`] per visible field.

use cardform_core::{
    Color, ContainerStyle, FieldEmitter, FieldEventBus, FieldId, FieldStatus, FieldStatuses,
    FieldValues, FormConfig, KeyboardKind, TextStyle, VisibleFields,
};
use serde::Serialize;

/// Everything a field editor renders with for one update
#[derive(Clone, Debug, Serialize)]
pub struct FieldConfiguration {
    pub field: FieldId,

    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub status: Option<FieldStatus>,

    pub label_style: TextStyle,
    pub input_style: TextStyle,
    pub container_style: ContainerStyle,
    pub valid_color: Option<Color>,
    pub invalid_color: Option<Color>,
    pub placeholder_color: Option<Color>,
    pub keyboard: KeyboardKind,

    /// Field-scoped event emitter
    #[serde(skip)]
    pub events: FieldEmitter,
}

impl FieldConfiguration {
    /// Text color for the field's current status, if the theme sets one
    pub fn text_color(&self) -> Option<Color> {
        match self.status? {
            FieldStatus::Valid => self.valid_color,
            FieldStatus::Invalid => self.invalid_color,
            FieldStatus::Incomplete => None,
        }
    }
}

/// Owner state the composer reads on every update
#[derive(Clone, Copy, Debug)]
pub struct ComposeInput<'a> {
    pub config: &'a FormConfig,
    pub values: &'a FieldValues,
    pub status: &'a FieldStatuses,
    pub events: &'a FieldEventBus,
}

/// Build the configuration for one field
pub fn compose_field(input: ComposeInput<'_>, field: FieldId) -> FieldConfiguration {
    let config = input.config;

    let base_container = if field == FieldId::Number {
        ContainerStyle::first_row(config.field_width)
    } else {
        ContainerStyle::row(config.field_width)
    };

    FieldConfiguration {
        field,
        label: config.label(field).map(str::to_string),
        placeholder: config.placeholder(field).map(str::to_string),
        value: input.values.get(&field).cloned(),
        status: input.status.get(&field).copied(),
        label_style: TextStyle::label().merged(&config.label_style),
        input_style: TextStyle::input().merged(&config.input_style),
        container_style: base_container.merged(&config.input_container_style),
        valid_color: config.valid_color,
        invalid_color: config.invalid_color,
        placeholder_color: config.placeholder_color,
        keyboard: field.keyboard(),
        events: input.events.emitter(field),
    }
}

/// Build the configuration for every visible field, in form order
pub fn compose(input: ComposeInput<'_>, visible: &VisibleFields) -> Vec<FieldConfiguration> {
    visible
        .iter()
        .map(|field| compose_field(input, field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardform_core::{resolve, FieldEvent, RequirementFlags};

    struct Fixture {
        config: FormConfig,
        values: FieldValues,
        status: FieldStatuses,
        events: FieldEventBus,
    }

    impl Fixture {
        fn new(config: FormConfig) -> Self {
            Self {
                config,
                values: FieldValues::default(),
                status: FieldStatuses::default(),
                events: FieldEventBus::new(),
            }
        }

        fn input(&self) -> ComposeInput<'_> {
            ComposeInput {
                config: &self.config,
                values: &self.values,
                status: &self.status,
                events: &self.events,
            }
        }
    }

    #[test]
    fn test_missing_entries_degrade_to_none() {
        let config = FormConfig::default()
            .with_labels([(FieldId::Number, "Card")])
            .with_placeholders(std::iter::empty::<(FieldId, String)>());
        let mut fx = Fixture::new(config);
        fx.values.insert(FieldId::Number, "4242".to_string());

        let number = compose_field(fx.input(), FieldId::Number);
        assert_eq!(number.label.as_deref(), Some("Card"));
        assert_eq!(number.placeholder, None);
        assert_eq!(number.value.as_deref(), Some("4242"));
        assert_eq!(number.status, None);

        let expiry = compose_field(fx.input(), FieldId::Expiry);
        assert_eq!(expiry.label, None);
        assert_eq!(expiry.value, None);
    }

    #[test]
    fn test_one_configuration_per_visible_field() {
        let fx = Fixture::new(FormConfig::default());
        let visible = resolve(RequirementFlags::default().with_name(true));

        let configs = compose(fx.input(), &visible);
        let fields: Vec<_> = configs.iter().map(|c| c.field).collect();
        assert_eq!(fields, vec![FieldId::Number, FieldId::Expiry, FieldId::Name]);
        assert_eq!(configs[2].keyboard, KeyboardKind::Default);
        assert_eq!(configs[0].keyboard, KeyboardKind::Numeric);
    }

    #[test]
    fn test_styles_are_layered_over_base() {
        let mut config = FormConfig::default();
        config.input_style.height = Some(48.0);
        config.input_container_style.background = Some(Color::WHITE);
        config.field_width = Some(360.0);
        let fx = Fixture::new(config);

        let number = compose_field(fx.input(), FieldId::Number);
        assert_eq!(number.input_style.height, Some(48.0));
        assert_eq!(number.input_style.padding_left, Some(10.0));
        assert_eq!(number.label_style.font_size, Some(17.0));
        assert_eq!(number.container_style.border_top_width, Some(1.0));
        assert_eq!(number.container_style.background, Some(Color::WHITE));
        assert_eq!(number.container_style.width, Some(360.0));

        let cvc = compose_field(fx.input(), FieldId::Cvc);
        assert_eq!(cvc.container_style.border_top_width, None);
        assert_eq!(cvc.container_style.border_bottom_width, Some(1.0));
    }

    #[test]
    fn test_value_and_status_follow_owner_state() {
        let mut fx = Fixture::new(FormConfig::default());
        fx.values.insert(FieldId::Expiry, "12/2".to_string());
        fx.status.insert(FieldId::Expiry, FieldStatus::Invalid);

        let expiry = compose_field(fx.input(), FieldId::Expiry);
        assert_eq!(expiry.status, Some(FieldStatus::Invalid));
        assert_eq!(expiry.text_color(), Some(Color::RED));

        fx.status.insert(FieldId::Expiry, FieldStatus::Valid);
        let expiry = compose_field(fx.input(), FieldId::Expiry);
        // default theme leaves the valid color unset
        assert_eq!(expiry.text_color(), None);
    }

    #[test]
    fn test_emitter_is_scoped_to_field() {
        let mut fx = Fixture::new(FormConfig::default());
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        fx.events
            .subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        let cvc = compose_field(fx.input(), FieldId::Cvc);
        cvc.events.change("12");
        fx.events.dispatch();

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[FieldEvent::Change {
                field: FieldId::Cvc,
                value: "12".to_string()
            }]
        );
    }
}
