//! Animal enums and the wire-facing models exchanged over HTTP.
//!
//! Enums travel over JSON as their member names (`"Cat"`) and are persisted
//! as lowercase text (`"cat"`). [`AnimalKind::as_str`] / [`FromStr`] convert
//! to and from the stored form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;

/// Maximum length of an animal name, in characters.
pub const MAX_NAME_LENGTH: u64 = 50;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The kind of animal held by the shelter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimalKind {
    #[default]
    Unspecified,
    Dog,
    Cat,
}

impl AnimalKind {
    /// All members, in declaration order.
    pub const ALL: [AnimalKind; 3] = [Self::Unspecified, Self::Dog, Self::Cat];

    /// The stored (lowercase) form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Dog => "dog",
            Self::Cat => "cat",
        }
    }
}

impl FromStr for AnimalKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unspecified" => Ok(Self::Unspecified),
            "dog" => Ok(Self::Dog),
            "cat" => Ok(Self::Cat),
            other => Err(CoreError::Validation(format!(
                "Unknown animal kind '{other}'"
            ))),
        }
    }
}

impl fmt::Display for AnimalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sex of an animal, `Unknown` until someone records it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimalSex {
    #[default]
    Unknown,
    Male,
    Female,
}

impl AnimalSex {
    /// All members, in declaration order.
    pub const ALL: [AnimalSex; 3] = [Self::Unknown, Self::Male, Self::Female];

    /// The stored (lowercase) form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl FromStr for AnimalSex {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(CoreError::Validation(format!(
                "Unknown animal sex '{other}'"
            ))),
        }
    }
}

impl fmt::Display for AnimalSex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Wire models
// ---------------------------------------------------------------------------

/// An animal as sent and received over HTTP.
///
/// The id is not part of the body: it travels in the URL (and in the
/// `Location` header after a create). `images` is read-only from the
/// client's perspective and is omitted from JSON when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AnimalModel {
    /// May be null, but never empty.
    #[validate(
        length(
            min = 1,
            max = MAX_NAME_LENGTH,
            message = "Name must be between 1 and 50 characters, inclusive."
        ),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: AnimalKind,
    #[serde(default)]
    pub sex: AnimalSex,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<AnimalImageModel>,
}

impl AnimalModel {
    /// Run the declarative field checks, collapsing failures into a
    /// [`CoreError::Validation`].
    pub fn ensure_valid(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|errors| CoreError::Validation(errors.to_string()))
    }
}

fn not_blank(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Name must not be blank.".into()));
    }
    Ok(())
}

/// An image attached to an animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalImageModel {
    pub location: String,
}
