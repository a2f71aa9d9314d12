// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Storage gateway contract.
//!
//! The engine never talks to a database. Everything it needs from
//! persistence goes through [`StorageGateway`], implemented by the host.
//! [`MemoryGateway`](crate::MemoryGateway) is an in-process implementation.
//!
//! | Method | Used by |
//! |--------|---------|
//! | `load` | reference lookup on build and parse |
//! | `find_associated` | many-reference `selected` set |
//! | `find_complement` | option lists and `unselected` set |
//! | `save` / `create` | persisting the working copy |
//! | `clear_association` / `replace_association` | staged relation updates |
//! | `write_blob` | file uploads |
//!
//! All calls are blocking; timeouts and pooling belong to the host.

use std::io::Read;

use crate::{
    entity::{EntityRecord, EntityType},
    error::GatewayError,
    value::Identifier
};

/// Identifier and display label of a stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    /// Identifier.
    pub id: Identifier,

    /// Label shown in option lists.
    pub label: String
}

impl Record {
    /// Create a record.
    pub fn new(id: impl Into<Identifier>, label: impl Into<String>) -> Self {
        Self {
            id:    id.into(),
            label: label.into()
        }
    }
}

/// Many-to-many relation of one owner instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Association {
    /// Owning entity type.
    pub owner: EntityType,

    /// Owning entity identifier.
    pub owner_id: Identifier,

    /// Relation field on the owner.
    pub field: &'static str,

    /// Related entity type.
    pub target: EntityType
}

/// Location of a stored upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredBlob {
    /// Storage path.
    pub path: String,

    /// Public URL.
    pub url: String
}

/// Persistence boundary.
///
/// Object safe; the engine holds it as `&dyn StorageGateway`.
pub trait StorageGateway: Send + Sync {
    /// Load an entity's record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the query fails. A missing entity is
    /// `Ok(None)`.
    fn load(&self, entity: EntityType, id: &Identifier) -> Result<Option<Record>, GatewayError>;

    /// Entities currently associated with the owner.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the query fails.
    fn find_associated(&self, association: &Association) -> Result<Vec<Record>, GatewayError>;

    /// All entities of a type except the excluded identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the query fails.
    fn find_complement(
        &self,
        entity: EntityType,
        exclude: &[Identifier]
    ) -> Result<Vec<Record>, GatewayError>;

    /// Persist an existing entity, keyed by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the entity is not stored.
    fn save(&self, entity: &dyn EntityRecord) -> Result<(), GatewayError>;

    /// Persist a new entity and assign its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the insert fails.
    fn create(&self, entity: &mut dyn EntityRecord) -> Result<(), GatewayError>;

    /// Remove every association of the owner's relation field.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the update fails.
    fn clear_association(&self, association: &Association) -> Result<(), GatewayError>;

    /// Replace the owner's associations with `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the update fails.
    fn replace_association(
        &self,
        association: &Association,
        targets: &[Record]
    ) -> Result<(), GatewayError>;

    /// Store an uploaded stream.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Io`] if the stream cannot be read or written.
    fn write_blob(&self, name: &str, content: &mut dyn Read) -> Result<StoredBlob, GatewayError>;
}
