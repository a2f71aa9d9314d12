// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity contract.
//!
//! [`FormEntity`] is what `#[derive(Form)]` implements. It exposes the
//! field registrations the registry turns into descriptors, plus by-name
//! access to field values through [`Value`].
//!
//! The storage gateway works with entities of types it does not know at
//! compile time, through the object-safe [`EntityRecord`] view every
//! `FormEntity` gets for free.

use std::{
    any::{Any, TypeId},
    fmt
};

use crate::{
    descriptor::{FieldSpec, OptionProvider},
    error::ValueError,
    gateway::Record,
    kind::TypeShape,
    value::{Identifier, Value}
};

/// Runtime identity of an entity type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityType {
    name: &'static str,
    id:   TypeId
}

impl EntityType {
    /// Identity of `T`.
    pub fn of<T: FormEntity>() -> Self {
        Self {
            name: T::NAME,
            id:   TypeId::of::<T>()
        }
    }

    /// Display name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying type id.
    pub const fn type_id(&self) -> TypeId {
        self.id
    }

    /// Check if this is the identity of `T`.
    pub fn is<T: FormEntity>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({})", self.name)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Domain entity that can be presented and edited through forms.
///
/// Usually derived:
///
/// ```rust,ignore
/// use modelform::prelude::*;
///
/// #[derive(Debug, Clone, Default, Form)]
/// #[form(label = "name")]
/// pub struct Group {
///     #[id]
///     pub id: i64,
///
///     #[field(required)]
///     pub name: String
/// }
/// ```
///
/// The identifier field is not a form field. It is read and written through
/// [`identifier`](Self::identifier) and
/// [`assign_identifier`](Self::assign_identifier).
pub trait FormEntity: Any + Clone + Send + Sync {
    /// Display name of the entity type.
    const NAME: &'static str;

    /// Field registrations in declaration order.
    fn field_specs() -> Vec<FieldSpec>;

    /// Named option providers referenced by `options_from` directives.
    fn option_sources() -> Vec<(&'static str, OptionProvider)> {
        Vec::new()
    }

    /// Shape of the identifier field.
    fn id_shape() -> TypeShape;

    /// Current identifier, `None` while unsaved.
    fn identifier(&self) -> Option<Identifier>;

    /// Store a gateway-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when the identifier does not fit the field.
    fn assign_identifier(&mut self, id: Identifier) -> Result<(), ValueError>;

    /// Read a form field by name.
    fn get(&self, field: &str) -> Option<Value>;

    /// Write a form field by name.
    ///
    /// # Errors
    ///
    /// - [`ValueError::UnknownField`] if no such field exists
    /// - [`ValueError::Mismatch`] / [`ValueError::OutOfRange`] if the value
    ///   does not fit
    fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError>;

    /// Human-readable label used in relationship option lists.
    fn label(&self) -> String {
        self.identifier().map(|id| id.to_string()).unwrap_or_default()
    }
}

/// Object-safe view of a [`FormEntity`].
pub trait EntityRecord: Send + Sync {
    /// Runtime type identity.
    fn entity_type(&self) -> EntityType;

    /// Shape of the identifier field.
    fn id_shape(&self) -> TypeShape;

    /// Current identifier.
    fn record_id(&self) -> Option<Identifier>;

    /// Store a gateway-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when the identifier does not fit the field.
    fn assign_id(&mut self, id: Identifier) -> Result<(), ValueError>;

    /// Identifier and label, `None` while unsaved.
    fn record(&self) -> Option<Record>;

    /// Read a form field by name.
    fn field_value(&self, field: &str) -> Option<Value>;

    /// Clone into a box.
    fn clone_boxed(&self) -> Box<dyn EntityRecord>;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;
}

impl<T: FormEntity> EntityRecord for T {
    fn entity_type(&self) -> EntityType {
        EntityType::of::<T>()
    }

    fn id_shape(&self) -> TypeShape {
        T::id_shape()
    }

    fn record_id(&self) -> Option<Identifier> {
        self.identifier()
    }

    fn assign_id(&mut self, id: Identifier) -> Result<(), ValueError> {
        self.assign_identifier(id)
    }

    fn record(&self) -> Option<Record> {
        self.identifier().map(|id| Record {
            id,
            label: self.label()
        })
    }

    fn field_value(&self, field: &str) -> Option<Value> {
        self.get(field)
    }

    fn clone_boxed(&self) -> Box<dyn EntityRecord> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Requesting user, already authorized by the host.
pub trait Actor {
    /// Check if the actor holds the elevated role required by
    /// `needs_admin` fields.
    fn is_elevated(&self) -> bool;
}

/// Minimal [`Actor`] for hosts without their own user type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ActorRole {
    /// Regular user.
    #[default]
    Standard,
    /// Administrator.
    Elevated
}

impl Actor for ActorRole {
    fn is_elevated(&self) -> bool {
        matches!(self, Self::Elevated)
    }
}
