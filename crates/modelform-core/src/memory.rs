// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-process [`StorageGateway`].
//!
//! Keeps entities, associations and blobs in memory. Identifiers are
//! assigned on create according to the entity's identifier shape:
//!
//! | Shape | Assigned |
//! |-------|----------|
//! | `Integer` / `Unsigned` | per-type counter starting at 1 |
//! | `Uuid` | UUID v7 |
//! | `Text` | `{entity}-{counter}` |
//!
//! Entities created with a non-zero identifier keep it, and the counter
//! moves past it.

use std::{collections::HashMap, io::Read};

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::trace;
use uuid::Uuid;

use crate::{
    entity::{EntityRecord, EntityType, FormEntity},
    error::GatewayError,
    gateway::{Association, Record, StorageGateway, StoredBlob},
    kind::TypeShape,
    value::Identifier
};

type AssociationKey = (EntityType, Identifier, &'static str);

#[derive(Default)]
struct State {
    entities:     IndexMap<(EntityType, Identifier), Box<dyn EntityRecord>>,
    associations: HashMap<AssociationKey, Vec<Identifier>>,
    counters:     HashMap<EntityType, u64>,
    blobs:        IndexMap<String, Vec<u8>>
}

impl State {
    fn next(&mut self, entity: EntityType) -> u64 {
        let counter = self.counters.entry(entity).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Advance the counter past an identifier chosen by the caller.
    fn observe(&mut self, entity: EntityType, id: &Identifier) {
        let taken = match id {
            Identifier::Int(v) => u64::try_from(*v).ok(),
            Identifier::UInt(v) => Some(*v),
            Identifier::Text(v) => v
                .strip_prefix(&format!("{}-", entity.name().to_lowercase()))
                .and_then(|n| n.parse().ok()),
            Identifier::Uuid(_) => None
        };
        if let Some(taken) = taken {
            let counter = self.counters.entry(entity).or_insert(0);
            *counter = (*counter).max(taken);
        }
    }

    fn assign(&mut self, entity: EntityType, shape: &TypeShape) -> Result<Identifier, GatewayError> {
        Ok(match shape.unwrap_optional() {
            TypeShape::Integer => Identifier::Int(self.next(entity).try_into().map_err(|_| {
                GatewayError::Backend(format!("{entity} identifier space exhausted"))
            })?),
            TypeShape::Unsigned => Identifier::UInt(self.next(entity)),
            TypeShape::Uuid => Identifier::Uuid(Uuid::now_v7()),
            TypeShape::Text => Identifier::Text(format!(
                "{}-{}",
                entity.name().to_lowercase(),
                self.next(entity)
            )),
            other => {
                return Err(GatewayError::Backend(format!(
                    "cannot generate {other} identifiers for {entity}"
                )));
            }
        })
    }
}

/// In-memory gateway for tests and prototyping.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<State>
}

impl MemoryGateway {
    /// Empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entity, assigning an identifier if it has none, and return
    /// the stored copy.
    ///
    /// # Errors
    ///
    /// Same as [`StorageGateway::create`].
    pub fn insert<T: FormEntity>(&self, mut entity: T) -> Result<T, GatewayError> {
        self.create(&mut entity)?;
        Ok(entity)
    }

    /// Stored copy of an entity.
    pub fn get<T: FormEntity>(&self, id: impl Into<Identifier>) -> Option<T> {
        let state = self.state.lock();
        state
            .entities
            .get(&(EntityType::of::<T>(), id.into()))
            .and_then(|record| record.as_any().downcast_ref::<T>())
            .cloned()
    }

    /// Identifiers associated with an owner's relation field, in stored
    /// order.
    pub fn associated_ids<T: FormEntity>(
        &self,
        owner_id: impl Into<Identifier>,
        field: &'static str
    ) -> Vec<Identifier> {
        let key = (EntityType::of::<T>(), owner_id.into(), field);
        self.state
            .lock()
            .associations
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    /// Stored blob content.
    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().blobs.get(path).cloned()
    }

    /// Number of stored entities of `T`.
    pub fn count<T: FormEntity>(&self) -> usize {
        let entity = EntityType::of::<T>();
        self.state
            .lock()
            .entities
            .keys()
            .filter(|(stored, _)| *stored == entity)
            .count()
    }
}

impl std::fmt::Debug for MemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryGateway")
            .field("entities", &state.entities.len())
            .field("associations", &state.associations.len())
            .field("blobs", &state.blobs.len())
            .finish()
    }
}

fn association_key(association: &Association) -> AssociationKey {
    (
        association.owner,
        association.owner_id.clone(),
        association.field
    )
}

impl StorageGateway for MemoryGateway {
    fn load(&self, entity: EntityType, id: &Identifier) -> Result<Option<Record>, GatewayError> {
        let state = self.state.lock();
        Ok(state
            .entities
            .get(&(entity, id.clone()))
            .and_then(|stored| stored.record()))
    }

    fn find_associated(&self, association: &Association) -> Result<Vec<Record>, GatewayError> {
        let state = self.state.lock();
        let Some(ids) = state.associations.get(&association_key(association)) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| state.entities.get(&(association.target, id.clone())))
            .filter_map(|stored| stored.record())
            .collect())
    }

    fn find_complement(
        &self,
        entity: EntityType,
        exclude: &[Identifier]
    ) -> Result<Vec<Record>, GatewayError> {
        let state = self.state.lock();
        Ok(state
            .entities
            .iter()
            .filter(|((stored, id), _)| *stored == entity && !exclude.contains(id))
            .filter_map(|(_, stored)| stored.record())
            .collect())
    }

    fn save(&self, entity: &dyn EntityRecord) -> Result<(), GatewayError> {
        let entity_type = entity.entity_type();
        let id = entity.record_id().ok_or_else(|| GatewayError::NotFound {
            entity: entity_type.name(),
            id:     String::new()
        })?;
        let mut state = self.state.lock();
        match state.entities.get_mut(&(entity_type, id.clone())) {
            Some(slot) => {
                *slot = entity.clone_boxed();
                trace!(entity = %entity_type, %id, "entity saved");
                Ok(())
            }
            None => Err(GatewayError::NotFound {
                entity: entity_type.name(),
                id:     id.to_string()
            })
        }
    }

    fn create(&self, entity: &mut dyn EntityRecord) -> Result<(), GatewayError> {
        let entity_type = entity.entity_type();
        let mut state = self.state.lock();
        let id = match entity.record_id() {
            Some(id) => {
                state.observe(entity_type, &id);
                id
            }
            None => {
                let id = state.assign(entity_type, &entity.id_shape())?;
                entity
                    .assign_id(id.clone())
                    .map_err(|err| GatewayError::Backend(err.to_string()))?;
                id
            }
        };
        let key = (entity_type, id.clone());
        if state.entities.contains_key(&key) {
            return Err(GatewayError::Backend(format!(
                "{entity_type} `{id}` already exists"
            )));
        }
        state.entities.insert(key, entity.clone_boxed());
        trace!(entity = %entity_type, %id, "entity created");
        Ok(())
    }

    fn clear_association(&self, association: &Association) -> Result<(), GatewayError> {
        self.state
            .lock()
            .associations
            .remove(&association_key(association));
        Ok(())
    }

    fn replace_association(
        &self,
        association: &Association,
        targets: &[Record]
    ) -> Result<(), GatewayError> {
        let ids = targets.iter().map(|record| record.id.clone()).collect();
        self.state
            .lock()
            .associations
            .insert(association_key(association), ids);
        Ok(())
    }

    fn write_blob(&self, name: &str, content: &mut dyn Read) -> Result<StoredBlob, GatewayError> {
        let mut data = Vec::new();
        content.read_to_end(&mut data)?;
        let mut state = self.state.lock();
        let path = format!("uploads/{}-{name}", state.blobs.len() + 1);
        let url = format!("/{path}");
        state.blobs.insert(path.clone(), data);
        Ok(StoredBlob {
            path,
            url
        })
    }
}
