//! Common repository traits
//!
//! Generic seams for store operations; repositories implement these where
//! the plain CRUD shape fits and add entity-specific methods beside them.

/// Create a new entity; the store assigns the id.
pub trait Create<Entity, CreateDTO> {
    /// Returns the created entity with its store-assigned id.
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Read a single entity by primary key.
///
/// `Id` may be composite, e.g. `(i64, i64)` for pivot tables.
pub trait Read<Entity, Id> {
    /// `Ok(None)` when no entity has that key.
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Partially update an existing entity; only `Some(_)` fields of the DTO
/// are touched.
pub trait Update<Entity, UpdateDTO, Id> {
    /// Returns the updated entity; `Err(RowNotFound)` when the key is
    /// absent.
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Delete an entity by primary key.
pub trait Delete<Id> {
    async fn delete(&self, id: &Id) -> Result<(), sqlx::Error>;
}
