// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Diff engine.
//!
//! On update, every processed field of the working copy is compared with
//! the previously loaded entity. Changed fields are recorded in declaration
//! order and, under [`MergePolicy::RevertChanged`], the previous value is
//! written back into the working copy.
//!
//! # Equality
//!
//! | Values | Equal when |
//! |--------|------------|
//! | lists | same length and element-wise equal |
//! | `Null` vs anything | both `Null` |
//! | scalars | structurally equal |

use crate::{
    config::MergePolicy,
    descriptor::FieldDescriptor,
    entity::FormEntity,
    error::FormError,
    value::Value
};

/// Kind-aware value equality.
pub fn values_equal(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (a, b) => a == b
    }
}

/// Compare `working` with `previous` over the processed fields.
///
/// Returns the changed field names in descriptor order, each at most once.
///
/// # Errors
///
/// Returns [`FormError::Field`] if a previous value cannot be restored.
pub fn merge_changes<T: FormEntity>(
    descriptors: &[FieldDescriptor],
    processed: &[&'static str],
    previous: &T,
    working: &mut T,
    policy: MergePolicy
) -> Result<Vec<&'static str>, FormError> {
    let mut changed = Vec::new();
    for descriptor in descriptors {
        if !processed.contains(&descriptor.name) {
            continue;
        }
        let old = previous.get(descriptor.name).unwrap_or_default();
        let new = working.get(descriptor.name).unwrap_or_default();
        if values_equal(&old, &new) {
            continue;
        }
        changed.push(descriptor.name);
        if policy == MergePolicy::RevertChanged {
            working
                .set(descriptor.name, old)
                .map_err(|err| FormError::field(descriptor.name, err))?;
        }
    }
    Ok(changed)
}
