//! Typed HTTP client for the sheltered animal API.
//!
//! Wraps the `/animal` endpoints using [`reqwest`]. Status codes the API
//! documents as ordinary outcomes (404 for a missing animal) come back as
//! `false`/`None`; anything else unexpected is a [`ClientError`].

use std::collections::BTreeMap;

use reqwest::{Method, Response, StatusCode, Url};
use sheltered_core::animal::AnimalModel;
use sheltered_core::types::AnimalId;

/// Multipart field name the add-image endpoint reads.
const IMAGE_FIELD: &str = "image";

/// Connection settings for [`ShelteredClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the API, e.g. `http://localhost:3000`.
    pub base_url: String,
}

/// Errors from the client layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL or a derived endpoint URL is not valid.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The API answered with a status the operation does not expect.
    #[error("Unexpected status {status} from {method} {url}")]
    UnexpectedStatus {
        method: Method,
        url: String,
        status: StatusCode,
    },

    /// A 201 response arrived without a `Location` header.
    #[error("Created response is missing a Location header")]
    MissingLocation,

    /// The `Location` header does not end in an animal id.
    #[error("Location '{0}' does not end in an animal id")]
    InvalidLocation(String),
}

/// HTTP client for one API instance.
#[derive(Debug, Clone)]
pub struct ShelteredClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ShelteredClient {
    /// Create a client from `options`.
    ///
    /// The base URL gets a trailing `/` appended when it lacks one so that
    /// endpoint paths resolve beneath it rather than replacing its last
    /// segment.
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), options)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, options: ClientOptions) -> Result<Self, ClientError> {
        let mut base = options.base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| ClientError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, base_url })
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `HEAD /animal/{id}`: whether the animal exists.
    pub async fn animal_exists_by_id(&self, id: AnimalId) -> Result<bool, ClientError> {
        let url = self.endpoint(&format!("animal/{id}"))?;
        let response = self.client.head(url).send().await?;
        Self::found(Method::HEAD, response)
    }

    /// `GET /animal/{id}`: the animal, or `None` when it does not exist.
    pub async fn get_animal_by_id(&self, id: AnimalId) -> Result<Option<AnimalModel>, ClientError> {
        let url = self.endpoint(&format!("animal/{id}"))?;
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::unexpected(Method::GET, &response)),
        }
    }

    /// `GET /animal`: every animal keyed by id.
    pub async fn list_animals(&self) -> Result<BTreeMap<AnimalId, AnimalModel>, ClientError> {
        let url = self.endpoint("animal")?;
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(Self::unexpected(Method::GET, &response));
        }
        Ok(response.json().await?)
    }

    /// `POST /animal`: create an animal.
    ///
    /// Returns the stored representation together with the id taken from the
    /// last path segment of the `Location` header.
    pub async fn create_animal(
        &self,
        animal: &AnimalModel,
    ) -> Result<(AnimalModel, AnimalId), ClientError> {
        let url = self.endpoint("animal")?;
        let response = self.client.post(url).json(animal).send().await?;
        if response.status() != StatusCode::CREATED {
            return Err(Self::unexpected(Method::POST, &response));
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .ok_or(ClientError::MissingLocation)?
            .to_str()
            .map_err(|_| ClientError::InvalidLocation("<non-ascii>".into()))?
            .to_string();
        let id = parse_location_id(&location)?;

        let created = response.json().await?;
        tracing::debug!(animal_id = %id, "Created animal");
        Ok((created, id))
    }

    /// `PUT /animal/{id}`: replace the animal's fields. `false` when it does
    /// not exist.
    pub async fn update_animal_by_id(
        &self,
        id: AnimalId,
        animal: &AnimalModel,
    ) -> Result<bool, ClientError> {
        let url = self.endpoint(&format!("animal/{id}"))?;
        let response = self.client.put(url).json(animal).send().await?;
        Self::found(Method::PUT, response)
    }

    /// `DELETE /animal/{id}`. `false` when it does not exist.
    pub async fn delete_animal_by_id(&self, id: AnimalId) -> Result<bool, ClientError> {
        let url = self.endpoint(&format!("animal/{id}"))?;
        let response = self.client.delete(url).send().await?;
        Self::found(Method::DELETE, response)
    }

    /// `PUT /animal/{id}/image`: attach an image as a multipart upload.
    /// `false` when the animal does not exist.
    pub async fn add_image(
        &self,
        animal_id: AnimalId,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<bool, ClientError> {
        let url = self.endpoint(&format!("animal/{animal_id}/image"))?;
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(IMAGE_FIELD)
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part(IMAGE_FIELD, part);

        let response = self.client.put(url).multipart(form).send().await?;
        Self::found(Method::PUT, response)
    }

    // ---- private helpers ----

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// Map 204 to `true` and 404 to `false`.
    fn found(method: Method, response: Response) -> Result<bool, ClientError> {
        match response.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::unexpected(method, &response)),
        }
    }

    fn unexpected(method: Method, response: &Response) -> ClientError {
        let err = ClientError::UnexpectedStatus {
            method,
            url: response.url().to_string(),
            status: response.status(),
        };
        tracing::warn!(error = %err, "Unexpected API response");
        err
    }
}

/// Extract the animal id from the last path segment of a `Location` value.
fn parse_location_id(location: &str) -> Result<AnimalId, ClientError> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| ClientError::InvalidLocation(location.to_string()))
}
