//! Domain types shared by the Sheltered server, storage layer and client.

pub mod animal;
pub mod error;
pub mod image_store;
pub mod types;
