// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Relationship resolver.
//!
//! Turns reference fields into option data by querying the
//! [`StorageGateway`]:
//!
//! - single references get an option list with at most one selected entry
//! - many references get a [`Partition`] of selected and unselected
//!   entities
//!
//! The partition is disjoint by construction: complement entries whose
//! identifier is already selected are dropped even when the gateway ignores
//! the exclusion filter.

use std::collections::HashSet;

use tracing::warn;

use crate::{
    descriptor::SelectOption,
    entity::EntityType,
    error::GatewayError,
    gateway::{Association, Record, StorageGateway},
    kind::RelationTarget,
    value::Identifier
};

/// Selected and unselected entities of a many-reference field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Entities associated with the owner.
    pub selected: Vec<SelectOption>,

    /// Every other entity of the related type.
    pub unselected: Vec<SelectOption>
}

impl Partition {
    /// Build a partition, dropping complement entries that are selected.
    pub fn new(selected: Vec<Record>, complement: Vec<Record>) -> Self {
        let taken: HashSet<&Identifier> = selected.iter().map(|record| &record.id).collect();
        let unselected = complement
            .iter()
            .filter(|record| !taken.contains(&record.id))
            .map(|record| option(record, false))
            .collect();
        let selected = selected.iter().map(|record| option(record, true)).collect();
        Self {
            selected,
            unselected
        }
    }

    /// Total number of related entities.
    pub fn len(&self) -> usize {
        self.selected.len() + self.unselected.len()
    }

    /// Check if there are no related entities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selected entries followed by unselected ones.
    pub fn options(&self) -> Vec<SelectOption> {
        self.selected
            .iter()
            .chain(&self.unselected)
            .cloned()
            .collect()
    }
}

fn option(record: &Record, selected: bool) -> SelectOption {
    SelectOption::new(record.id.to_string(), record.label.clone()).with_selected(selected)
}

/// Options of a single reference field.
///
/// An unset reference gets a leading, selected "none" option labelled
/// `none_label`. A reference to a missing entity is treated as unset.
///
/// # Errors
///
/// Propagates gateway failures.
pub fn reference_options(
    gateway: &dyn StorageGateway,
    target: &RelationTarget,
    current: Option<&Identifier>,
    none_label: &str
) -> Result<Vec<SelectOption>, GatewayError> {
    let current = match current {
        Some(id) => {
            let found = gateway.load(target.entity, id)?;
            if found.is_none() {
                warn!(entity = %target.entity, %id, "dangling reference");
            }
            found
        }
        None => None
    };

    let mut options = Vec::new();
    let exclude: Vec<Identifier> = match &current {
        Some(record) => {
            options.push(option(record, true));
            vec![record.id.clone()]
        }
        None => {
            options.push(SelectOption::new("", none_label).with_selected(true));
            Vec::new()
        }
    };

    options.extend(
        gateway
            .find_complement(target.entity, &exclude)?
            .iter()
            .filter(|record| !exclude.contains(&record.id))
            .map(|record| option(record, false))
    );
    Ok(options)
}

/// Partition of a many-reference field.
///
/// Unsaved owners have nothing selected.
///
/// # Errors
///
/// Propagates gateway failures.
pub fn partition(
    gateway: &dyn StorageGateway,
    owner: EntityType,
    owner_id: Option<&Identifier>,
    field: &'static str,
    target: &RelationTarget
) -> Result<Partition, GatewayError> {
    let selected = match owner_id {
        Some(owner_id) => gateway.find_associated(&Association {
            owner,
            owner_id: owner_id.clone(),
            field,
            target: target.entity
        })?,
        None => Vec::new()
    };
    let exclude: Vec<Identifier> = selected.iter().map(|record| record.id.clone()).collect();
    let complement = gateway.find_complement(target.entity, &exclude)?;
    Ok(Partition::new(selected, complement))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        kind::TypeShape,
        memory::MemoryGateway,
        testing::{Group, User}
    };

    fn group_target() -> RelationTarget {
        RelationTarget {
            entity: EntityType::of::<Group>(),
            id:     Box::new(TypeShape::Integer)
        }
    }

    fn seeded(names: &[&str]) -> MemoryGateway {
        let gateway = MemoryGateway::new();
        for name in names {
            gateway.insert(Group::named(name)).unwrap();
        }
        gateway
    }

    #[test]
    fn unset_reference_has_none_option() {
        let gateway = seeded(&["a", "b"]);
        let options = reference_options(&gateway, &group_target(), None, "None").unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].label, "None");
        assert!(options[0].selected);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn set_reference_is_selected_once() {
        let gateway = seeded(&["a", "b", "c"]);
        let current = Identifier::Int(2);
        let options =
            reference_options(&gateway, &group_target(), Some(&current), "None").unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].value, "2");
        assert!(options[0].selected);
        assert!(options[1..].iter().all(|o| !o.selected));
    }

    #[test]
    fn dangling_reference_is_unset() {
        let gateway = seeded(&["a"]);
        let missing = Identifier::Int(40);
        let options =
            reference_options(&gateway, &group_target(), Some(&missing), "-").unwrap();
        assert_eq!(options[0].value, "");
        assert!(options[0].selected);
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn unsaved_owner_selects_nothing() {
        let gateway = seeded(&["a", "b"]);
        let partition = partition(
            &gateway,
            EntityType::of::<User>(),
            None,
            "roles",
            &group_target()
        )
        .unwrap();
        assert!(partition.selected.is_empty());
        assert_eq!(partition.unselected.len(), 2);
    }

    #[test]
    fn partition_uses_associations() {
        let gateway = seeded(&["a", "b", "c"]);
        let owner_id = Identifier::Int(1);
        let association = Association {
            owner:    EntityType::of::<User>(),
            owner_id: owner_id.clone(),
            field:    "roles",
            target:   EntityType::of::<Group>()
        };
        gateway
            .replace_association(&association, &[Record::new(3_i64, "c")])
            .unwrap();

        let partition = partition(
            &gateway,
            EntityType::of::<User>(),
            Some(&owner_id),
            "roles",
            &group_target()
        )
        .unwrap();
        assert_eq!(partition.selected, vec![SelectOption::new("3", "c").with_selected(true)]);
        let unselected: Vec<_> = partition.unselected.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(unselected, ["a", "b"]);
        assert_eq!(partition.options().len(), 3);
    }

    proptest! {
        #[test]
        fn partition_is_disjoint_and_exhaustive(
            total in 0_usize..24,
            mask in proptest::collection::vec(any::<bool>(), 24),
            leak in any::<bool>()
        ) {
            let all: Vec<Record> = (1..=total as i64)
                .map(|id| Record::new(id, format!("g{id}")))
                .collect();
            let selected: Vec<Record> = all
                .iter()
                .zip(&mask)
                .filter(|(_, chosen)| **chosen)
                .map(|(record, _)| record.clone())
                .collect();
            // A leaky gateway returns everything, ignoring the exclusion.
            let complement: Vec<Record> = if leak {
                all.clone()
            } else {
                all.iter()
                    .filter(|record| !selected.contains(record))
                    .cloned()
                    .collect()
            };

            let partition = Partition::new(selected, complement);

            prop_assert_eq!(partition.len(), total);
            let chosen: HashSet<_> = partition.selected.iter().map(|o| o.value.clone()).collect();
            let rest: HashSet<_> = partition.unselected.iter().map(|o| o.value.clone()).collect();
            prop_assert!(chosen.is_disjoint(&rest));
            prop_assert_eq!(chosen.len() + rest.len(), total);
        }
    }
}
