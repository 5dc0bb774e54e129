/// All primary keys are UUIDs, generated by the storage layer on insert.
pub type DbId = uuid::Uuid;

/// Identifier of an animal row.
pub type AnimalId = DbId;

/// Identifier of an animal image row.
pub type ImageId = DbId;
