//! Card preview collaborator
//!
//! The preview draws the card face from the current values. It has no
//! feedback path into the form.

use cardform_core::{FieldId, FormConfig};
use serde::Serialize;

use crate::props::FormProps;

/// Which side of the card the preview should show
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFace {
    Front,
    /// The verification code is printed on the back
    Back,
}

/// Everything the card preview renders with
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CardPreviewProps {
    pub focused: Option<FieldId>,
    pub brand: Option<String>,
    pub scale: f32,
    pub font_family: Option<String>,
    pub image_front: Option<String>,
    pub image_back: Option<String>,
    pub number: Option<String>,
    pub expiry: Option<String>,
    pub cvc: Option<String>,
    /// A single space when the form does not ask for a name
    pub name: Option<String>,
}

impl CardPreviewProps {
    pub fn new(config: &FormConfig, props: &FormProps) -> Self {
        let value = |field: FieldId| props.value(field).map(str::to_string);
        let name = if props.flags.requires_name {
            value(FieldId::Name)
        } else {
            Some(" ".to_string())
        };

        Self {
            focused: props.focused,
            brand: props.card_type.clone(),
            scale: config.card.scale,
            font_family: config.card.font_family.clone(),
            image_front: config.card.image_front.clone(),
            image_back: config.card.image_back.clone(),
            number: value(FieldId::Number),
            expiry: value(FieldId::Expiry),
            cvc: value(FieldId::Cvc),
            name,
        }
    }

    pub fn face(&self) -> CardFace {
        if self.focused == Some(FieldId::Cvc) {
            CardFace::Back
        } else {
            CardFace::Front
        }
    }
}

/// Presentational card face
pub trait CardPreview {
    fn render(&mut self, props: &CardPreviewProps);
}

impl<F> CardPreview for F
where
    F: FnMut(&CardPreviewProps),
{
    fn render(&mut self, props: &CardPreviewProps) {
        self(props)
    }
}
