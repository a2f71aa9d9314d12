// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Type descriptor cache.
//!
//! The [`Registry`] maps an entity type to its ordered
//! [`FieldDescriptor`] list. Descriptors are computed on first request from
//! [`FormEntity::field_specs`] and shared afterwards.
//!
//! | Operation | Fails | Notes |
//! |-----------|-------|-------|
//! | [`describe`](Registry::describe) | never | unusable fields are excluded |
//! | [`register`](Registry::register) | [`ConfigError`] | validates relation identifiers and option sources |
//! | [`shutdown`](Registry::shutdown) | never | drops every cached entry |
//!
//! Concurrent first requests for the same type may compute twice; the first
//! stored result wins and both callers observe it.

use std::{
    any::TypeId,
    collections::HashMap,
    sync::Arc
};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::{
    descriptor::{FieldDescriptor, FieldSpec, OptionProvider},
    directive::FieldFlags,
    entity::FormEntity,
    error::ConfigError,
    kind::{FieldKind, infer_kind}
};

#[derive(Debug, Clone)]
struct Entry {
    descriptors: Arc<[FieldDescriptor]>,
    problem:     Option<ConfigError>
}

/// Descriptor cache keyed by entity type.
#[derive(Debug, Default)]
pub struct Registry {
    entries: RwLock<HashMap<TypeId, Entry>>
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered form field descriptors of `T`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let registry = Registry::new();
    /// let first = registry.describe::<User>();
    /// let again = registry.describe::<User>();
    /// assert!(Arc::ptr_eq(&first, &again));
    /// ```
    pub fn describe<T: FormEntity>(&self) -> Arc<[FieldDescriptor]> {
        Arc::clone(&self.entry::<T>().descriptors)
    }

    /// Describe `T` and validate its configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnsupportedIdentifier`] when a relation targets an
    ///   entity whose identifier is not an integer, string or UUID
    /// - [`ConfigError::UnknownOptionSource`] when `options_from` names a
    ///   provider `T` does not declare
    pub fn register<T: FormEntity>(&self) -> Result<Arc<[FieldDescriptor]>, ConfigError> {
        let entry = self.entry::<T>();
        match entry.problem {
            Some(problem) => Err(problem),
            None => Ok(entry.descriptors)
        }
    }

    /// Check if `T` has been described.
    pub fn contains<T: FormEntity>(&self) -> bool {
        self.entries.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of described entity types.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if nothing has been described.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every cached descriptor list.
    pub fn shutdown(&self) {
        let mut entries = self.entries.write();
        debug!(types = entries.len(), "registry shut down");
        entries.clear();
    }

    fn entry<T: FormEntity>(&self) -> Entry {
        let key = TypeId::of::<T>();
        if let Some(entry) = self.entries.read().get(&key) {
            return entry.clone();
        }

        let computed = compute::<T>();
        let mut entries = self.entries.write();
        entries.entry(key).or_insert(computed).clone()
    }
}

fn compute<T: FormEntity>() -> Entry {
    let sources = T::option_sources();
    let mut problem = None;
    let mut descriptors = Vec::new();

    for (structural_index, spec) in T::field_specs().into_iter().enumerate() {
        match describe_field::<T>(structural_index, spec, &sources) {
            Ok(Some(descriptor)) => descriptors.push(descriptor),
            Ok(None) => {}
            Err(error) => {
                warn!(entity = T::NAME, %error, "field excluded");
                problem.get_or_insert(error);
            }
        }
    }

    debug!(
        entity = T::NAME,
        fields = descriptors.len(),
        "entity described"
    );
    Entry {
        descriptors: descriptors.into(),
        problem
    }
}

fn describe_field<T: FormEntity>(
    structural_index: usize,
    spec: FieldSpec,
    sources: &[(&'static str, OptionProvider)]
) -> Result<Option<FieldDescriptor>, ConfigError> {
    let Some(mut kind) = infer_kind(&spec.shape, &spec.directives) else {
        return Ok(None);
    };
    // An installed provider upgrades plain inputs to a select.
    if spec.hooks.options.is_some() && (kind.is_textual() || kind == FieldKind::Number) {
        kind = FieldKind::Select;
    }
    let flags = FieldFlags::from_table(&spec.directives);
    let mut hooks = spec.hooks;

    if kind.is_reference()
        && let Some(target) = spec.shape.relation()
        && !target.id.is_identifier()
    {
        return Err(ConfigError::UnsupportedIdentifier {
            entity: T::NAME,
            field:  spec.name,
            shape:  target.id.to_string()
        });
    }

    if hooks.options.is_none()
        && let Some(provider) = &flags.options_from
    {
        let found = sources
            .iter()
            .find(|(name, _)| *name == provider.as_str())
            .map(|(_, source)| *source);
        match found {
            Some(source) => hooks.options = Some(source),
            None => {
                return Err(ConfigError::UnknownOptionSource {
                    entity:   T::NAME,
                    field:    spec.name,
                    provider: provider.clone()
                });
            }
        }
    }

    Ok(Some(FieldDescriptor {
        name: spec.name,
        kind,
        directives: spec.directives,
        structural_index,
        shape: spec.shape,
        flags,
        hooks
    }))
}
