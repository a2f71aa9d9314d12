// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Form assembler.
//!
//! A [`Form`] binds an entity instance to its descriptors and holds the
//! ordered [`PresentationField`]s a template renders. Forms are built by
//! [`FormEngine::build`](crate::FormEngine::build) and live for one request.
//!
//! # Presentation Rules
//!
//! | Kind | `value` | extra data |
//! |------|---------|------------|
//! | `Checkbox` | always empty | `checked` |
//! | `Password` | always empty | |
//! | `Select` | rendered current value | `options`, matching entries selected |
//! | `ForeignReference` | current identifier | `options` with a "none" entry when unset |
//! | `ManyReference` | | `groups`, `options` (selected first) |
//! | `MultiGroupField` | | `groups` |
//! | `File` | stored URL | |
//! | others | rendered current value | |
//!
//! `readonlyfull` / `disabledfull` fields are presented read-only/disabled
//! once they hold a value. `needs_admin` fields are omitted for
//! non-elevated actors.

use std::sync::Arc;

use convert_case::{Case, Casing};

use crate::{
    audit::{AuditEvent, AuditRecord},
    descriptor::{FieldDescriptor, SelectOption},
    entity::{Actor, EntityType, FormEntity},
    error::GatewayError,
    gateway::StorageGateway,
    kind::FieldKind,
    resolve::{self, Partition},
    value::{Identifier, Value}
};

/// Whether the form creates a new entity or edits a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormAction {
    /// New entity.
    Create,
    /// Existing entity.
    Update
}

impl FormAction {
    /// Check if this is [`FormAction::Update`].
    pub const fn is_update(&self) -> bool {
        matches!(self, Self::Update)
    }
}

/// One field, bound to the current entity, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationField {
    /// Field name.
    pub name: &'static str,

    /// Presentation kind.
    pub kind: FieldKind,

    /// Display label.
    pub label: String,

    /// Rendered current value.
    pub value: String,

    /// Rendered current values of multi-valued fields.
    pub values: Vec<String>,

    /// Checkbox state.
    pub checked: bool,

    /// Select and reference options.
    pub options: Vec<SelectOption>,

    /// Selected/unselected split of many-reference fields.
    pub groups: Option<Partition>,

    /// `required`
    pub required: bool,

    /// `disabled`, or `disabledfull` with a stored value.
    pub disabled: bool,

    /// `readonly`, or `readonlyfull` with a stored value.
    pub read_only: bool,

    /// `hidden`
    pub hidden: bool,

    /// Accepts several values.
    pub multiple: bool,

    /// `needs_admin`
    pub needs_elevated_role: bool,

    /// Input CSS classes.
    pub class: Vec<String>,

    /// Label CSS classes.
    pub label_class: Vec<String>,

    /// Wrapper CSS classes.
    pub div_class: Vec<String>,

    /// Opaque attribute string.
    pub custom: Option<String>,

    /// Autocomplete hint.
    pub autocomplete: Option<String>,

    /// Placeholder text.
    pub placeholder: Option<String>,

    /// Help text.
    pub help: Option<String>
}

/// Entity bound to its presentation fields.
#[derive(Debug, Clone)]
pub struct Form<T: FormEntity> {
    pub(crate) entity:         T,
    pub(crate) action:         FormAction,
    pub(crate) fields:         Vec<PresentationField>,
    pub(crate) descriptors:    Arc<[FieldDescriptor]>,
    pub(crate) changed_fields: Vec<&'static str>
}

impl<T: FormEntity> Form<T> {
    /// Bound entity. After a successful save this is the persisted state.
    pub const fn entity(&self) -> &T {
        &self.entity
    }

    /// Take the bound entity.
    pub fn into_entity(self) -> T {
        self.entity
    }

    /// Form action.
    pub const fn action(&self) -> FormAction {
        self.action
    }

    /// Presentation fields in declaration order.
    pub fn fields(&self) -> &[PresentationField] {
        &self.fields
    }

    /// Presentation field by name.
    pub fn field(&self, name: &str) -> Option<&PresentationField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Descriptors of every form field, including ones hidden from the
    /// current actor.
    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    /// Fields changed by the last successful update. Always empty for
    /// creates.
    pub fn changed_fields(&self) -> &[&'static str] {
        &self.changed_fields
    }

    /// Audit data for the host's log.
    pub fn audit_record(&self) -> AuditRecord {
        let event = match self.action {
            FormAction::Create => AuditEvent::Created,
            FormAction::Update => AuditEvent::Updated
        };
        AuditRecord {
            entity: T::NAME,
            id: self.entity.identifier(),
            event,
            changed_fields: self.changed_fields.clone()
        }
    }
}

/// Build presentation fields for `entity`.
pub(crate) fn assemble<T: FormEntity>(
    descriptors: &[FieldDescriptor],
    entity: &T,
    actor: &dyn Actor,
    gateway: &dyn StorageGateway,
    none_label: &str
) -> Result<Vec<PresentationField>, (&'static str, GatewayError)> {
    let owner_id = entity.identifier();
    descriptors
        .iter()
        .filter(|descriptor| !descriptor.flags.needs_admin || actor.is_elevated())
        .map(|descriptor| {
            let current = entity.get(descriptor.name).unwrap_or_default();
            present::<T>(descriptor, current, owner_id.as_ref(), gateway, none_label)
                .map_err(|err| (descriptor.name, err))
        })
        .collect()
}

fn present<T: FormEntity>(
    descriptor: &FieldDescriptor,
    current: Value,
    owner_id: Option<&Identifier>,
    gateway: &dyn StorageGateway,
    none_label: &str
) -> Result<PresentationField, GatewayError> {
    let flags = &descriptor.flags;
    let filled = !current.is_zero();
    let mut field = PresentationField {
        name:                descriptor.name,
        kind:                descriptor.kind,
        label:               flags
            .label
            .clone()
            .unwrap_or_else(|| descriptor.name.to_case(Case::Title)),
        value:               current.render(),
        values:              Vec::new(),
        checked:             false,
        options:             Vec::new(),
        groups:              None,
        required:            flags.required,
        disabled:            flags.disabled || (flags.disabled_full && filled),
        read_only:           flags.readonly || (flags.readonly_full && filled),
        hidden:              flags.hidden,
        multiple:            descriptor.is_multiple(),
        needs_elevated_role: flags.needs_admin,
        class:               flags.class.clone(),
        label_class:         flags.label_class.clone(),
        div_class:           flags.div_class.clone(),
        custom:              flags.custom.clone(),
        autocomplete:        flags.autocomplete.clone(),
        placeholder:         flags.placeholder.clone(),
        help:                flags.help.clone()
    };
    if field.multiple {
        field.values = current.rendered_items();
    }

    match descriptor.kind {
        FieldKind::Checkbox => {
            field.checked = matches!(current, Value::Bool(true));
            field.value.clear();
        }
        FieldKind::Password => field.value.clear(),
        FieldKind::Select => {
            let chosen = current.rendered_items();
            field.options = descriptor
                .static_options()
                .into_iter()
                .map(|option| {
                    let selected = chosen.contains(&option.value);
                    option.with_selected(selected)
                })
                .collect();
        }
        FieldKind::ForeignReference => {
            if let Some(target) = descriptor.relation() {
                let id = Identifier::from_value(&current);
                field.options =
                    resolve::reference_options(gateway, target, id.as_ref(), none_label)?;
            }
        }
        FieldKind::ManyReference | FieldKind::MultiGroupField => {
            field.value.clear();
            if let Some(target) = descriptor.relation() {
                let groups = resolve::partition(
                    gateway,
                    EntityType::of::<T>(),
                    owner_id,
                    descriptor.name,
                    target
                )?;
                field.values = groups.selected.iter().map(|o| o.value.clone()).collect();
                if descriptor.kind == FieldKind::ManyReference {
                    field.options = groups.options();
                }
                field.groups = Some(groups);
            }
        }
        _ => {}
    }
    Ok(field)
}
