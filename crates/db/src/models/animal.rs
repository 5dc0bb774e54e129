//! Animal and animal image entities.

use serde::Serialize;
use sheltered_core::animal::{AnimalKind, AnimalSex};
use sheltered_core::types::{AnimalId, ImageId};
use sqlx::types::uuid::fmt::Hyphenated;
use sqlx::FromRow;

/// A stored animal with its images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Animal {
    pub id: AnimalId,
    pub name: Option<String>,
    pub kind: AnimalKind,
    pub sex: AnimalSex,
    pub images: Vec<AnimalImage>,
}

/// An animal that has not been inserted yet. The id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnimal {
    pub name: Option<String>,
    pub kind: AnimalKind,
    pub sex: AnimalSex,
}

/// A row from the `animal_images` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimalImage {
    pub id: ImageId,
    pub animal_id: AnimalId,
    pub location: String,
}

/// Raw `animals` row. Enum columns are stored as lowercase text.
#[derive(Debug, FromRow)]
pub(crate) struct AnimalRow {
    pub id: Hyphenated,
    pub name: Option<String>,
    pub kind: String,
    pub sex: String,
}

impl AnimalRow {
    /// Attach `images` and decode the enum columns.
    pub fn into_animal(self, images: Vec<AnimalImage>) -> Result<Animal, sqlx::Error> {
        let kind = self
            .kind
            .parse::<AnimalKind>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let sex = self
            .sex
            .parse::<AnimalSex>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Animal {
            id: self.id.into_uuid(),
            name: self.name,
            kind,
            sex,
            images,
        })
    }
}

/// Raw `animal_images` row.
#[derive(Debug, FromRow)]
pub(crate) struct AnimalImageRow {
    pub id: Hyphenated,
    pub animal_id: Hyphenated,
    pub location: String,
}

impl From<AnimalImageRow> for AnimalImage {
    fn from(row: AnimalImageRow) -> Self {
        Self {
            id: row.id.into_uuid(),
            animal_id: row.animal_id.into_uuid(),
            location: row.location,
        }
    }
}
