//! Item field validation.
//!
//! Pure functions over [`CreateItemFields`] and [`ItemPatch`]. Every rule is
//! checked, so a caller gets the full list of field errors at once.
//!
//! | Field | Rules |
//! |-------|-------|
//! | `title` | required, 3 to 100 characters |
//! | `description` | required, 10 to 500 characters |
//! | `imageUrl` | required, an `http(s)://` image URL or a base64 `data:image/` URL |
//!
//! Lengths count characters of the trimmed value.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::models::{CreateItemFields, ItemPatch};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Description,
    ImageUrl,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::ImageUrl => "imageUrl",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} is required")]
    Required { field: Field },
    #[error("{field} must be at least {min} characters (got {actual})")]
    TooShort {
        field: Field,
        min: usize,
        actual: usize,
    },
    #[error("{field} must be at most {max} characters (got {actual})")]
    TooLong {
        field: Field,
        max: usize,
        actual: usize,
    },
    #[error(
        "{field} must be an http(s) URL ending in .jpg, .jpeg, .png, .gif or .webp, \
         or a base64 data:image URL"
    )]
    NotImageReference { field: Field },
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::Required { field }
            | FieldError::TooShort { field, .. }
            | FieldError::TooLong { field, .. }
            | FieldError::NotImageReference { field } => *field,
        }
    }
}

/// All field errors found for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| e.field() == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "invalid item: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate the fields of a new item.
pub fn validate_new_item(fields: &CreateItemFields) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    check_title(&fields.title, &mut errors);
    check_description(&fields.description, &mut errors);
    check_image(&fields.image_url, &mut errors);
    finish(errors)
}

/// Validate a partial update. Absent fields are not checked.
pub fn validate_patch(patch: &ItemPatch) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if let Some(ref title) = patch.title {
        check_title(title, &mut errors);
    }
    if let Some(ref description) = patch.description {
        check_description(description, &mut errors);
    }
    if let Some(ref image_url) = patch.image_url {
        check_image(image_url, &mut errors);
    }
    finish(errors)
}

/// Whether `value` is an acceptable image reference.
pub fn is_image_reference(value: &str) -> bool {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix("data:image/") {
        return is_base64_image(rest);
    }
    is_http_image_url(value)
}

fn is_base64_image(rest: &str) -> bool {
    let Some((header, payload)) = rest.split_once(',') else {
        return false;
    };
    let Some(subtype) = header.strip_suffix(";base64") else {
        return false;
    };
    !subtype.is_empty() && !payload.is_empty() && STANDARD.decode(payload).is_ok()
}

fn is_http_image_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    let Some(rest) = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
    else {
        return false;
    };
    if rest.contains(['\n', '\r']) {
        return false;
    }
    IMAGE_EXTENSIONS.iter().any(|ext| {
        rest.strip_suffix(ext)
            .and_then(|head| head.strip_suffix('.'))
            .is_some_and(|head| !head.is_empty())
    })
}

fn check_title(value: &str, errors: &mut Vec<FieldError>) {
    check_text(Field::Title, value, TITLE_MIN_CHARS, TITLE_MAX_CHARS, errors);
}

fn check_description(value: &str, errors: &mut Vec<FieldError>) {
    check_text(
        Field::Description,
        value,
        DESCRIPTION_MIN_CHARS,
        DESCRIPTION_MAX_CHARS,
        errors,
    );
}

fn check_text(field: Field, value: &str, min: usize, max: usize, errors: &mut Vec<FieldError>) {
    let chars = value.trim().chars().count();
    if chars == 0 {
        errors.push(FieldError::Required { field });
    } else if chars < min {
        errors.push(FieldError::TooShort {
            field,
            min,
            actual: chars,
        });
    } else if chars > max {
        errors.push(FieldError::TooLong {
            field,
            max,
            actual: chars,
        });
    }
}

fn check_image(value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::Required {
            field: Field::ImageUrl,
        });
    } else if !is_image_reference(value) {
        errors.push(FieldError::NotImageReference {
            field: Field::ImageUrl,
        });
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}
