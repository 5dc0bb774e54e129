//! Conversions between wire models and storage entities.
//!
//! Pure field copying with no business rules; models are validated at the
//! HTTP boundary before they get here.

use std::collections::BTreeMap;

use sheltered_core::animal::{AnimalImageModel, AnimalModel};
use sheltered_core::types::AnimalId;
use sheltered_db::models::animal::{Animal, AnimalImage, NewAnimal};
use uuid::Uuid;

pub struct AnimalMapper;

impl AnimalMapper {
    /// Build an unsaved entity from a model. Images are not copied; they
    /// are only attached through [`add_image`](Self::add_image).
    pub fn create(model: &AnimalModel) -> NewAnimal {
        NewAnimal {
            name: model.name.clone(),
            kind: model.kind,
            sex: model.sex,
        }
    }

    pub fn map(entity: &Animal) -> AnimalModel {
        AnimalModel {
            name: entity.name.clone(),
            kind: entity.kind,
            sex: entity.sex,
            images: entity.images.iter().map(Self::map_image).collect(),
        }
    }

    pub fn map_image(image: &AnimalImage) -> AnimalImageModel {
        AnimalImageModel {
            location: image.location.clone(),
        }
    }

    /// Key every animal by id, the shape returned by `GET /animal`.
    pub fn map_all(entities: &[Animal]) -> BTreeMap<AnimalId, AnimalModel> {
        entities
            .iter()
            .map(|entity| (entity.id, Self::map(entity)))
            .collect()
    }

    /// Overwrite the mutable fields of `entity` from `model`.
    pub fn update(entity: &mut Animal, model: &AnimalModel) {
        entity.name = model.name.clone();
        entity.kind = model.kind;
        entity.sex = model.sex;
    }

    /// Append a new image record owned by `entity`.
    pub fn add_image(entity: &mut Animal, location: String) {
        entity.images.push(AnimalImage {
            id: Uuid::new_v4(),
            animal_id: entity.id,
            location,
        });
    }
}
