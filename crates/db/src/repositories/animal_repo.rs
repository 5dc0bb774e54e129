//! Repository for the `animals` table and its `animal_images` children.

use std::collections::HashMap;

use sheltered_core::types::AnimalId;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::models::animal::{Animal, AnimalImage, AnimalImageRow, AnimalRow, NewAnimal};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, kind, sex";

/// Column list for `animal_images`.
const IMAGE_COLUMNS: &str = "id, animal_id, location";

/// Existence, read, list, add, update and remove for animals.
///
/// Operations take the connection of an open
/// [`Session`](crate::session::Session); nothing is durable until the session
/// is saved.
pub struct AnimalRepo;

impl AnimalRepo {
    /// Whether an animal with `id` exists.
    pub async fn exists_by_id(conn: &mut SqliteConnection, id: AnimalId) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM animals WHERE id = ?")
            .bind(id.hyphenated())
            .fetch_one(&mut *conn)
            .await?;
        Ok(count > 0)
    }

    /// Find an animal by id, images included. Absence is `Ok(None)`.
    pub async fn get_by_id(
        conn: &mut SqliteConnection,
        id: AnimalId,
    ) -> Result<Option<Animal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM animals WHERE id = ?");
        let row = sqlx::query_as::<_, AnimalRow>(&query)
            .bind(id.hyphenated())
            .fetch_optional(&mut *conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let images = Self::list_images(conn, id).await?;
        row.into_animal(images).map(Some)
    }

    /// List every animal with its images. No ordering is guaranteed.
    pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Animal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM animals");
        let rows = sqlx::query_as::<_, AnimalRow>(&query)
            .fetch_all(&mut *conn)
            .await?;

        let query = format!("SELECT {IMAGE_COLUMNS} FROM animal_images");
        let image_rows = sqlx::query_as::<_, AnimalImageRow>(&query)
            .fetch_all(&mut *conn)
            .await?;

        let mut images_by_animal: HashMap<AnimalId, Vec<AnimalImage>> = HashMap::new();
        for image in image_rows.into_iter().map(AnimalImage::from) {
            images_by_animal
                .entry(image.animal_id)
                .or_default()
                .push(image);
        }

        rows.into_iter()
            .map(|row| {
                let images = images_by_animal
                    .remove(&row.id.into_uuid())
                    .unwrap_or_default();
                row.into_animal(images)
            })
            .collect()
    }

    /// List the images belonging to one animal.
    pub async fn list_images(
        conn: &mut SqliteConnection,
        animal_id: AnimalId,
    ) -> Result<Vec<AnimalImage>, sqlx::Error> {
        let query = format!("SELECT {IMAGE_COLUMNS} FROM animal_images WHERE animal_id = ?");
        let rows = sqlx::query_as::<_, AnimalImageRow>(&query)
            .bind(animal_id.hyphenated())
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(AnimalImage::from).collect())
    }

    /// Insert a new animal, assigning its id. Returns the staged row.
    pub async fn add(conn: &mut SqliteConnection, input: &NewAnimal) -> Result<Animal, sqlx::Error> {
        let query = format!(
            "INSERT INTO animals (id, name, kind, sex)
             VALUES (?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, AnimalRow>(&query)
            .bind(Uuid::new_v4().hyphenated())
            .bind(&input.name)
            .bind(input.kind.as_str())
            .bind(input.sex.as_str())
            .fetch_one(&mut *conn)
            .await?;

        let animal = row.into_animal(Vec::new())?;
        tracing::debug!(animal_id = %animal.id, "Animal insert staged");
        Ok(animal)
    }

    /// Overwrite name, kind and sex, and insert any images of `animal` that
    /// are not stored yet.
    ///
    /// This is a whole-record write, not a patch. Updating an animal that is
    /// not present fails with [`sqlx::Error::RowNotFound`].
    pub async fn update(conn: &mut SqliteConnection, animal: &Animal) -> Result<(), sqlx::Error> {
        let result = sqlx::query("UPDATE animals SET name = ?, kind = ?, sex = ? WHERE id = ?")
            .bind(&animal.name)
            .bind(animal.kind.as_str())
            .bind(animal.sex.as_str())
            .bind(animal.id.hyphenated())
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        for image in &animal.images {
            sqlx::query(
                "INSERT INTO animal_images (id, animal_id, location)
                 VALUES (?, ?, ?)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(image.id.hyphenated())
            .bind(image.animal_id.hyphenated())
            .bind(&image.location)
            .execute(&mut *conn)
            .await?;
        }

        tracing::debug!(animal_id = %animal.id, images = animal.images.len(), "Animal update staged");
        Ok(())
    }

    /// Delete an animal; its images cascade.
    ///
    /// Removing an id that is not present fails with
    /// [`sqlx::Error::RowNotFound`], so a double remove never passes silently.
    pub async fn remove(conn: &mut SqliteConnection, id: AnimalId) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM animals WHERE id = ?")
            .bind(id.hyphenated())
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        tracing::debug!(animal_id = %id, "Animal delete staged");
        Ok(())
    }
}
