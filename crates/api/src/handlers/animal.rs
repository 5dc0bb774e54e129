//! Handlers for the `/animal` resource.
//!
//! Every request works inside its own [`Session`]; nothing is durable until
//! the handler calls `save_changes`. Handlers that write open their session
//! with [`Session::begin_write`].

use std::collections::BTreeMap;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::Json;
use sheltered_core::animal::AnimalModel;
use sheltered_core::error::CoreError;
use sheltered_core::image_store::StagedImage;
use sheltered_core::types::AnimalId;
use sheltered_db::models::animal::Animal;
use sheltered_db::repositories::AnimalRepo;
use sheltered_db::session::Session;

use crate::error::{AppError, AppResult};
use crate::mapper::AnimalMapper;
use crate::state::AppState;

/// Multipart field carrying the uploaded image.
const IMAGE_FIELD: &str = "image";

fn not_found(id: AnimalId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Animal",
        id,
    })
}

/// Relative URL of a single animal, used for the `Location` header.
pub fn animal_path(id: AnimalId) -> String {
    format!("/animal/{id}")
}

/// Fetch an animal inside `session` or fail with 404.
async fn find_animal(session: &mut Session, id: AnimalId) -> AppResult<Animal> {
    AnimalRepo::get_by_id(session.conn(), id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// HEAD /animal/{id}
///
/// 204 if the animal exists, 404 otherwise. No body either way.
pub async fn exists(
    State(state): State<AppState>,
    Path(id): Path<AnimalId>,
) -> AppResult<StatusCode> {
    let mut session = Session::begin(&state.pool).await?;
    let exists = AnimalRepo::exists_by_id(session.conn(), id).await?;
    Ok(if exists {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    })
}

/// GET /animal/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<AnimalId>,
) -> AppResult<Json<AnimalModel>> {
    let mut session = Session::begin(&state.pool).await?;
    let animal = find_animal(&mut session, id).await?;
    Ok(Json(AnimalMapper::map(&animal)))
}

/// GET /animal
///
/// Every animal, keyed by id. Not paginated.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<BTreeMap<AnimalId, AnimalModel>>> {
    let mut session = Session::begin(&state.pool).await?;
    let animals = AnimalRepo::list(session.conn()).await?;
    Ok(Json(AnimalMapper::map_all(&animals)))
}

/// POST /animal
///
/// Creates an animal and returns 201 with the stored representation and a
/// `Location` header pointing at it.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<AnimalModel>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<AnimalModel>)> {
    input.ensure_valid()?;

    let mut session = Session::begin_write(&state.pool).await?;
    let added = AnimalRepo::add(session.conn(), &AnimalMapper::create(&input)).await?;
    session.save_changes().await?;

    // Read back through a fresh session so the response reflects what was committed.
    let mut session = Session::begin(&state.pool).await?;
    let created = AnimalRepo::get_by_id(session.conn(), added.id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!("Animal {} missing after commit", added.id))
        })?;

    tracing::info!(animal_id = %created.id, "Animal created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, animal_path(created.id))],
        Json(AnimalMapper::map(&created)),
    ))
}

/// PUT /animal/{id}
///
/// Whole-record replacement of name, kind and sex. 204 on success.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<AnimalId>,
    Json(input): Json<AnimalModel>,
) -> AppResult<StatusCode> {
    input.ensure_valid()?;

    let mut session = Session::begin_write(&state.pool).await?;
    let mut animal = find_animal(&mut session, id).await?;
    AnimalMapper::update(&mut animal, &input);
    AnimalRepo::update(session.conn(), &animal).await?;
    session.save_changes().await?;

    tracing::info!(animal_id = %id, "Animal updated");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /animal/{id}/image
///
/// Accepts a multipart form with a required `image` field. The file is
/// written to the image store first; if recording it against the animal
/// fails, the file is deleted again and the request fails with 500.
pub async fn add_image(
    State(state): State<AppState>,
    Path(id): Path<AnimalId>,
    mut multipart: Multipart,
) -> AppResult<StatusCode> {
    let (content_type, data) = read_image_field(&mut multipart).await?;

    let mut session = Session::begin_write(&state.pool).await?;
    let mut animal = find_animal(&mut session, id).await?;

    let staged = StagedImage::stage(state.image_store.as_ref(), &data, &content_type).await?;

    let persisted = async {
        AnimalMapper::add_image(&mut animal, staged.location().to_string());
        AnimalRepo::update(session.conn(), &animal).await?;
        session.save_changes().await
    }
    .await;

    match persisted {
        Ok(()) => {
            let location = staged.commit();
            tracing::info!(animal_id = %id, %location, "Animal image added");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) => {
            staged.rollback().await;
            Err(AppError::InternalError(format!(
                "Failed to record image for animal {id}: {err}"
            )))
        }
    }
}

/// DELETE /animal/{id}
///
/// Removes the animal (its image rows cascade), then deletes the image files
/// on a best-effort basis.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<AnimalId>,
) -> AppResult<StatusCode> {
    let mut session = Session::begin_write(&state.pool).await?;
    let animal = find_animal(&mut session, id).await?;
    AnimalRepo::remove(session.conn(), id).await?;
    session.save_changes().await?;

    for image in &animal.images {
        if let Err(err) = state.image_store.delete(&image.location).await {
            tracing::warn!(
                animal_id = %id,
                location = %image.location,
                error = %err,
                "Failed to delete image file of removed animal"
            );
        }
    }

    tracing::info!(animal_id = %id, images = animal.images.len(), "Animal deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Pull the `image` field out of a multipart body, returning its content
/// type and bytes. Unknown fields are ignored.
async fn read_image_field(multipart: &mut Multipart) -> AppResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("The 'image' field has no content type".into()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        return Ok((content_type, data.to_vec()));
    }

    Err(AppError::BadRequest(format!(
        "Missing required '{IMAGE_FIELD}' field"
    )))
}
