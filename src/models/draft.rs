//! Report form input and validated drafts.

use super::{EncodedImage, ItemStatus};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A field of the report form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    /// Item name.
    Name,
    /// Item description.
    Description,
    /// Where the item was lost or found.
    Location,
    /// Lost or found.
    Status,
    /// Reporter contact details.
    Contact,
    /// Optional photo attachment.
    Image,
}

impl FormField {
    /// Required fields in form order. The first missing one is reported.
    pub const REQUIRED: [Self; 5] = [
        Self::Name,
        Self::Description,
        Self::Location,
        Self::Status,
        Self::Contact,
    ];

    /// Returns the field as a lowercase string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Location => "location",
            Self::Status => "status",
            Self::Contact => "contact",
            Self::Image => "image",
        }
    }

    /// Returns the message shown when the field is left empty.
    #[must_use]
    pub const fn required_message(&self) -> &'static str {
        match self {
            Self::Name => "Item name is required.",
            Self::Description => "Description is required.",
            Self::Location => "Location is required.",
            Self::Status => "Status is required.",
            Self::Contact => "Contact is required.",
            Self::Image => "Image is required.",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw report form values, exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftForm {
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: String,
    /// Where the item was lost or found.
    pub location: String,
    /// `lost` or `found`; empty when nothing was selected.
    pub status: String,
    /// Reporter contact details.
    pub contact: String,
    /// Path of an attached photo.
    pub image: Option<PathBuf>,
}

impl DraftForm {
    /// Returns true if every field is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
            && self.description.is_empty()
            && self.location.is_empty()
            && self.status.is_empty()
            && self.contact.is_empty()
            && self.image.is_none()
    }

    /// Sets a text field by name. Setting [`FormField::Image`] stores a path.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Description => self.description = value,
            FormField::Location => self.location = value,
            FormField::Status => self.status = value,
            FormField::Contact => self.contact = value,
            FormField::Image => {
                self.image = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            },
        }
    }

    /// Validates the form and produces a draft without an image.
    ///
    /// Fields are trimmed. The first empty required field, in form order,
    /// fails with [`Error::Validation`]. A status other than `lost` or `found`
    /// fails on the status field too.
    pub fn validate(&self) -> Result<Draft> {
        for field in FormField::REQUIRED {
            let value = match field {
                FormField::Name => &self.name,
                FormField::Description => &self.description,
                FormField::Location => &self.location,
                FormField::Status => &self.status,
                FormField::Contact => &self.contact,
                FormField::Image => continue,
            };
            if value.trim().is_empty() {
                return Err(Error::Validation {
                    field,
                    message: field.required_message().to_string(),
                });
            }
        }

        let status = ItemStatus::parse(&self.status).ok_or_else(|| Error::Validation {
            field: FormField::Status,
            message: format!("Status must be 'lost' or 'found', got '{}'.", self.status.trim()),
        })?;

        Ok(Draft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            status,
            contact: self.contact.trim().to_string(),
            image: None,
        })
    }
}

/// Validated, not yet persisted item data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// Item name (trimmed, non-empty).
    pub name: String,
    /// Item description (trimmed, non-empty).
    pub description: String,
    /// Location (trimmed, non-empty).
    pub location: String,
    /// Lost or found.
    pub status: ItemStatus,
    /// Contact details (trimmed, non-empty).
    pub contact: String,
    /// Encoded photo, if one was attached.
    pub image: Option<EncodedImage>,
}

impl Draft {
    /// Attaches an encoded image.
    #[must_use]
    pub fn with_image(mut self, image: EncodedImage) -> Self {
        self.image = Some(image);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn wallet_form() -> DraftForm {
        DraftForm {
            name: "  Wallet ".to_string(),
            description: "Brown leather".to_string(),
            location: "Library".to_string(),
            status: "lost".to_string(),
            contact: "555-0100".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let draft = wallet_form().validate().unwrap();
        assert_eq!(draft.name, "Wallet");
        assert_eq!(draft.status, ItemStatus::Lost);
        assert!(draft.image.is_none());
    }

    #[test_case(FormField::Name; "name")]
    #[test_case(FormField::Description; "description")]
    #[test_case(FormField::Location; "location")]
    #[test_case(FormField::Status; "status")]
    #[test_case(FormField::Contact; "contact")]
    fn test_blank_required_field_is_reported(field: FormField) {
        let mut form = wallet_form();
        form.set(field, "   ");

        match form.validate() {
            Err(Error::Validation { field: got, message }) => {
                assert_eq!(got, field);
                assert_eq!(message, field.required_message());
            },
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_first_missing_field_wins() {
        let form = DraftForm {
            location: "Library".to_string(),
            ..DraftForm::default()
        };

        match form.validate() {
            Err(Error::Validation { field, .. }) => assert_eq!(field, FormField::Name),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut form = wallet_form();
        form.status = "misplaced".to_string();

        assert!(matches!(
            form.validate(),
            Err(Error::Validation {
                field: FormField::Status,
                ..
            })
        ));
    }

    #[test]
    fn test_set_image_path() {
        let mut form = DraftForm::default();
        assert!(form.is_blank());
        form.set(FormField::Image, "/tmp/photo.png");
        assert_eq!(form.image, Some(PathBuf::from("/tmp/photo.png")));
        form.set(FormField::Image, "");
        assert!(form.image.is_none());
    }
}
