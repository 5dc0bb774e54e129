//! Repository layer: one concrete repository per aggregate.
//!
//! Repositories are stateless unit structs; every operation runs on a
//! connection borrowed from a [`Session`](crate::session::Session), so work
//! is staged until the session is saved.

pub mod animal_repo;

pub use animal_repo::AnimalRepo;
