// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Form engine.
//!
//! [`FormEngine`] ties the registry, the storage gateway and the
//! configuration together:
//!
//! ```text
//! build ──► render (host) ──► parse ──► save
//!                              │          ├─ diff (update)
//!                              │          ├─ gateway save / create
//!                              │          └─ staged relation updates
//!                              └─ fail-fast, working copy only
//! ```
//!
//! # Field Processing
//!
//! Fields are processed in form order. The first failure aborts the whole
//! submission and the bound entity stays untouched.
//!
//! 1. Locked fields (`disabled`, `readonly`, `hidden`, `needs_admin` for
//!    non-elevated actors) are skipped; a required one with neither a
//!    posted nor a stored value fails with `Required`
//! 2. `readonlyfull` / `disabledfull` fields are skipped once they hold a
//!    value
//! 3. `bcrypt` fields hash a posted value that differs from the stored hash;
//!    an empty post keeps the stored hash
//! 4. The value is coerced by kind, validated, then assigned
//!
//! Absent keys leave fields untouched, except checkboxes whose absence
//! means unchecked. A required field with an absent key fails with
//! `Required` unless the entity already holds a value for it.

use tracing::{debug, info, trace, warn};

use crate::{
    coerce,
    config::FormConfig,
    descriptor::FieldDescriptor,
    diff,
    entity::{Actor, EntityType, FormEntity},
    error::{FieldError, FormError, GatewayError},
    form::{Form, FormAction, assemble},
    gateway::{Association, StorageGateway},
    kind::{FieldKind, TypeShape},
    registry::Registry,
    submit::{AssociationOp, Parsed, Submission, SubmissionValue},
    value::{Blob, Identifier, Value}
};

enum Outcome {
    Skip,
    Write(Value),
    Relate {
        value:     Option<Value>,
        operation: AssociationOp
    }
}

/// Builds forms and applies submissions.
///
/// # Example
///
/// ```rust,ignore
/// let registry = Registry::new();
/// let gateway = MemoryGateway::new();
/// let engine = FormEngine::new(&registry, &gateway);
///
/// let mut form = engine.build(user, FormAction::Update, &ActorRole::Standard)?;
/// let submission = engine.submission([("name", "Bob")]);
/// engine.submit(&mut form, &submission, &ActorRole::Standard)?;
/// audit_log.push(form.audit_record());
/// ```
pub struct FormEngine<'a> {
    registry: &'a Registry,
    gateway:  &'a dyn StorageGateway,
    config:   FormConfig
}

impl<'a> FormEngine<'a> {
    /// Engine with the default configuration.
    pub fn new(registry: &'a Registry, gateway: &'a dyn StorageGateway) -> Self {
        Self {
            registry,
            gateway,
            config: FormConfig::default()
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub const fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Descriptor registry.
    pub const fn registry(&self) -> &Registry {
        self.registry
    }

    /// Collect posted pairs using the configured field prefix.
    pub fn submission<I, K, V>(&self, pairs: I) -> Submission
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>
    {
        Submission::from_pairs(&self.config.field_prefix, pairs)
    }

    /// Build the form of `entity`.
    ///
    /// # Errors
    ///
    /// - [`FormError::Config`] if `T` is misconfigured
    /// - [`FormError::Field`] with [`FieldError::Lookup`] if a relation
    ///   query fails
    pub fn build<T: FormEntity>(
        &self,
        entity: T,
        action: FormAction,
        actor: &dyn Actor
    ) -> Result<Form<T>, FormError> {
        let descriptors = self.registry.register::<T>()?;
        let fields = assemble(
            &descriptors,
            &entity,
            actor,
            self.gateway,
            &self.config.none_label
        )
        .map_err(|(field, err)| FormError::field(field, FieldError::Lookup(err)))?;

        debug!(
            entity = T::NAME,
            ?action,
            fields = fields.len(),
            "form built"
        );
        Ok(Form {
            entity,
            action,
            fields,
            descriptors,
            changed_fields: Vec::new()
        })
    }

    /// Parse a submission into a working copy of the form's entity.
    ///
    /// The form is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Field`] for the first field that fails.
    pub fn parse<T: FormEntity>(
        &self,
        form: &Form<T>,
        submission: &Submission,
        actor: &dyn Actor
    ) -> Result<Parsed<T>, FormError> {
        let mut working = form.entity.clone();
        let mut processed = Vec::new();
        let mut operations = Vec::new();

        for descriptor in form.descriptors.iter() {
            let name = descriptor.name;
            let stored = form.entity.get(name).unwrap_or_default();
            let result = self
                .parse_field(descriptor, submission.get(name), &stored, form.action, actor)
                .and_then(|outcome| apply(descriptor, outcome, &mut working));

            match result {
                Ok(Applied::Skipped) => trace!(entity = T::NAME, field = name, "field skipped"),
                Ok(Applied::Written) => processed.push(name),
                Ok(Applied::Staged(operation)) => operations.push(operation),
                Err(error) => {
                    let error = FormError::field(name, error);
                    warn!(entity = T::NAME, %error, "submission rejected");
                    return Err(error);
                }
            }
        }

        debug!(
            entity = T::NAME,
            processed = processed.len(),
            staged = operations.len(),
            "submission parsed"
        );
        Ok(Parsed {
            entity: working,
            processed,
            operations
        })
    }

    /// Persist a parsed submission and bind the result to the form.
    ///
    /// On update the diff pass runs first and fills
    /// [`Form::changed_fields`]; on create the gateway assigns the
    /// identifier and no fields are recorded. Staged relation updates run
    /// last, against the owner's identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Persistence`] if the gateway fails.
    pub fn save<T: FormEntity>(&self, form: &mut Form<T>, parsed: Parsed<T>) -> Result<(), FormError> {
        let Parsed {
            mut entity,
            processed,
            operations
        } = parsed;

        let changed = match form.action {
            FormAction::Update => {
                let changed = diff::merge_changes(
                    &form.descriptors,
                    &processed,
                    &form.entity,
                    &mut entity,
                    self.config.merge_policy
                )?;
                self.gateway.save(&entity).map_err(FormError::Persistence)?;
                changed
            }
            FormAction::Create => {
                self.gateway
                    .create(&mut entity)
                    .map_err(FormError::Persistence)?;
                Vec::new()
            }
        };

        if !operations.is_empty() {
            let owner_id = entity.identifier().ok_or_else(|| {
                FormError::Persistence(GatewayError::Backend(format!(
                    "{} has no identifier after save",
                    T::NAME
                )))
            })?;
            for operation in &operations {
                self.run_operation::<T>(operation, &owner_id)?;
            }
        }

        if changed.is_empty() {
            debug!(entity = T::NAME, action = ?form.action, "entity saved");
        } else {
            info!(
                entity = T::NAME,
                id = ?entity.identifier(),
                changed = ?changed,
                "entity updated"
            );
        }
        form.entity = entity;
        form.changed_fields = changed;
        Ok(())
    }

    /// [`parse`](Self::parse) then [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Any error of either step.
    pub fn submit<T: FormEntity>(
        &self,
        form: &mut Form<T>,
        submission: &Submission,
        actor: &dyn Actor
    ) -> Result<(), FormError> {
        let parsed = self.parse(form, submission, actor)?;
        self.save(form, parsed)
    }

    fn run_operation<T: FormEntity>(
        &self,
        operation: &AssociationOp,
        owner_id: &Identifier
    ) -> Result<(), FormError> {
        let association = Association {
            owner:    EntityType::of::<T>(),
            owner_id: owner_id.clone(),
            field:    operation.field(),
            target:   operation.target()
        };
        let result = match operation {
            AssociationOp::Clear { .. } => self.gateway.clear_association(&association),
            AssociationOp::Replace { records, .. } => {
                self.gateway.replace_association(&association, records)
            }
        };
        trace!(entity = T::NAME, field = association.field, "association updated");
        result.map_err(FormError::Persistence)
    }

    fn parse_field(
        &self,
        descriptor: &FieldDescriptor,
        posted: Option<&SubmissionValue>,
        stored: &Value,
        action: FormAction,
        actor: &dyn Actor
    ) -> Result<Outcome, FieldError> {
        let flags = &descriptor.flags;

        if flags.is_locked() || (flags.needs_admin && !actor.is_elevated()) {
            let posted = posted.is_some_and(SubmissionValue::has_content);
            if flags.required && stored.is_zero() && !posted {
                return Err(FieldError::Required);
            }
            return Ok(Outcome::Skip);
        }
        if flags.has_full_override() && !stored.is_zero() {
            return Ok(Outcome::Skip);
        }
        // An absent key keeps the stored value, so that value has to satisfy `required`.
        if posted.is_none()
            && descriptor.kind != FieldKind::Checkbox
            && flags.required
            && stored.is_zero()
        {
            return Err(FieldError::Required);
        }

        match descriptor.kind {
            FieldKind::Checkbox => Ok(Outcome::Write(Value::Bool(posted.is_some()))),
            FieldKind::File => self.parse_file(descriptor, posted, stored),
            FieldKind::ForeignReference => self.parse_reference(descriptor, posted),
            FieldKind::ManyReference | FieldKind::MultiGroupField => {
                self.parse_many(descriptor, posted, action)
            }
            _ if flags.bcrypt => self.parse_secret(descriptor, posted, stored),
            _ => parse_scalar_field(descriptor, posted)
        }
    }

    fn parse_secret(
        &self,
        descriptor: &FieldDescriptor,
        posted: Option<&SubmissionValue>,
        stored: &Value
    ) -> Result<Outcome, FieldError> {
        let Some(raw) = posted.and_then(SubmissionValue::first) else {
            return Ok(Outcome::Skip);
        };
        if raw.is_empty() {
            if descriptor.flags.required && stored.is_zero() {
                return Err(FieldError::Required);
            }
            return Ok(Outcome::Skip);
        }
        if matches!(stored, Value::Text(current) if current == raw) {
            return Ok(Outcome::Skip);
        }
        let hashed = bcrypt::hash(raw, self.config.bcrypt_cost)
            .map_err(|err| FieldError::Hash(err.to_string()))?;
        Ok(Outcome::Write(Value::Text(hashed)))
    }

    fn parse_file(
        &self,
        descriptor: &FieldDescriptor,
        posted: Option<&SubmissionValue>,
        stored: &Value
    ) -> Result<Outcome, FieldError> {
        let upload = posted.and_then(|posted| posted.files.iter().find(|file| !file.is_empty()));
        let Some(upload) = upload else {
            if descriptor.flags.required && stored.is_zero() {
                return Err(FieldError::Required);
            }
            return Ok(Outcome::Skip);
        };
        let written = self
            .gateway
            .write_blob(&upload.filename, &mut upload.data.as_slice())
            .map_err(FieldError::Upload)?;
        Ok(Outcome::Write(Value::Blob(Blob {
            path: written.path,
            url:  written.url
        })))
    }

    fn parse_reference(
        &self,
        descriptor: &FieldDescriptor,
        posted: Option<&SubmissionValue>
    ) -> Result<Outcome, FieldError> {
        let (Some(posted), Some(target)) = (posted, descriptor.relation()) else {
            return Ok(Outcome::Skip);
        };
        let raw = posted.first().unwrap_or_default();
        let id = Identifier::parse(&target.id, raw)
            .map_err(|reason| FieldError::parse(descriptor.kind, raw, reason))?;
        let Some(id) = id else {
            if descriptor.flags.required {
                return Err(FieldError::Required);
            }
            return Ok(Outcome::Skip);
        };
        let record = self.lookup(target.entity, id)?;
        Ok(Outcome::Write(Value::Ref(record)))
    }

    fn parse_many(
        &self,
        descriptor: &FieldDescriptor,
        posted: Option<&SubmissionValue>,
        action: FormAction
    ) -> Result<Outcome, FieldError> {
        let (Some(posted), Some(target)) = (posted, descriptor.relation()) else {
            return Ok(Outcome::Skip);
        };
        let sentinel = self.config.clear_sentinel.as_str();
        let raws: Vec<&str> = posted
            .values
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .collect();

        if raws == [sentinel] {
            if !action.is_update() {
                return Ok(Outcome::Skip);
            }
            return Ok(Outcome::Relate {
                value:     None,
                operation: AssociationOp::Clear {
                    field:  descriptor.name,
                    target: target.entity
                }
            });
        }

        let mut records = Vec::with_capacity(raws.len());
        for raw in raws.into_iter().filter(|raw| *raw != sentinel) {
            let id = Identifier::parse(&target.id, raw)
                .map_err(|reason| FieldError::parse(descriptor.kind, raw, reason))?;
            if let Some(id) = id {
                let record = self
                    .gateway
                    .load(target.entity, &id)
                    .map_err(FieldError::Lookup)?
                    .ok_or_else(|| FieldError::NotFound {
                        entity: target.entity.name(),
                        id:     id.to_string()
                    })?;
                records.push(record);
            }
        }
        if records.is_empty() && descriptor.flags.required {
            return Err(FieldError::Required);
        }

        let value = Value::List(records.iter().map(|r| Value::Ref(r.id.clone())).collect());
        Ok(Outcome::Relate {
            value:     Some(value),
            operation: AssociationOp::Replace {
                field: descriptor.name,
                target: target.entity,
                records
            }
        })
    }

    fn lookup(&self, entity: EntityType, id: Identifier) -> Result<Identifier, FieldError> {
        match self.gateway.load(entity, &id).map_err(FieldError::Lookup)? {
            Some(record) => Ok(record.id),
            None => Err(FieldError::NotFound {
                entity: entity.name(),
                id:     id.to_string()
            })
        }
    }
}

enum Applied {
    Skipped,
    Written,
    Staged(AssociationOp)
}

fn apply<T: FormEntity>(
    descriptor: &FieldDescriptor,
    outcome: Outcome,
    working: &mut T
) -> Result<Applied, FieldError> {
    let (value, staged) = match outcome {
        Outcome::Skip => return Ok(Applied::Skipped),
        Outcome::Write(value) => (value, None),
        Outcome::Relate {
            value: None,
            operation
        } => return Ok(Applied::Staged(operation)),
        Outcome::Relate {
            value: Some(value),
            operation
        } => (value, Some(operation))
    };

    if let Some(validate) = descriptor.hooks.validate {
        validate(&value).map_err(FieldError::Invalid)?;
    }
    working.set(descriptor.name, value)?;
    Ok(staged.map_or(Applied::Written, Applied::Staged))
}

fn parse_scalar_field(
    descriptor: &FieldDescriptor,
    posted: Option<&SubmissionValue>
) -> Result<Outcome, FieldError> {
    let Some(posted) = posted else {
        return Ok(Outcome::Skip);
    };
    let required = descriptor.flags.required;

    if descriptor.is_collection() {
        let items = posted
            .values
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| coerce_one(descriptor, raw))
            .collect::<Result<Vec<_>, _>>()?;
        if items.is_empty() && required {
            return Err(FieldError::Required);
        }
        return Ok(Outcome::Write(Value::List(items)));
    }

    let raw = posted.first().unwrap_or_default();
    if raw.trim().is_empty() {
        if required {
            return Err(FieldError::Required);
        }
        if descriptor.kind.is_textual() && descriptor.element_shape() == &TypeShape::Text {
            return Ok(Outcome::Write(Value::Text(raw.to_string())));
        }
        return Ok(Outcome::Write(Value::Null));
    }
    coerce_one(descriptor, raw).map(Outcome::Write)
}

fn coerce_one(descriptor: &FieldDescriptor, raw: &str) -> Result<Value, FieldError> {
    match descriptor.hooks.parse {
        Some(hook) => hook(raw).map_err(|reason| FieldError::parse(descriptor.kind, raw, reason)),
        None => coerce::parse_scalar(descriptor.kind, descriptor.element_shape(), raw)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};

    use super::*;
    use crate::{
        config::MergePolicy,
        entity::ActorRole,
        memory::MemoryGateway,
        submit::UploadedFile,
        testing::{Enrollment, Group, User}
    };

    const STANDARD: ActorRole = ActorRole::Standard;

    fn engine<'a>(registry: &'a Registry, gateway: &'a MemoryGateway) -> FormEngine<'a> {
        FormEngine::new(registry, gateway).with_config(FormConfig {
            bcrypt_cost: 4,
            ..FormConfig::default()
        })
    }

    fn stored_user(gateway: &MemoryGateway) -> User {
        gateway
            .insert(User {
                name: "Alice".into(),
                plan: "free".into(),
                age: Some(30),
                ..User::default()
            })
            .unwrap()
    }

    fn draft() -> User {
        User {
            name: "Draft".into(),
            ..User::default()
        }
    }

    #[test]
    fn create_never_records_changes() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let mut form = engine.build(User::default(), FormAction::Create, &STANDARD).unwrap();

        let submission = Submission::new()
            .with("name", "Carol")
            .with("age", "41")
            .with("birthday", "2024-01-15")
            .with("session", "1h30m");
        engine.submit(&mut form, &submission, &STANDARD).unwrap();

        assert!(form.changed_fields().is_empty());
        let saved = gateway.get::<User>(form.entity().id).unwrap();
        assert_eq!(saved.name, "Carol");
        assert_eq!(saved.age, Some(41));
        assert_eq!(saved.birthday, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(saved.session, TimeDelta::minutes(90));
    }

    #[test]
    fn update_records_changed_field_once() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let user = stored_user(&gateway);

        let mut form = engine.build(user, FormAction::Update, &STANDARD).unwrap();
        let submission = Submission::new().with("name", "Bob").with("age", "30");
        engine.submit(&mut form, &submission, &STANDARD).unwrap();
        assert_eq!(form.changed_fields(), ["name"]);
    }

    #[test]
    fn identical_resubmission_changes_nothing() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let user = stored_user(&gateway);

        let mut form = engine.build(user, FormAction::Update, &STANDARD).unwrap();
        let submission = Submission::new().with("name", "Alice").with("plan", "free");
        engine.submit(&mut form, &submission, &STANDARD).unwrap();
        assert!(form.changed_fields().is_empty());
        assert!(form.audit_record().is_noop());
    }

    #[test]
    fn default_policy_restores_previous_values() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let user = stored_user(&gateway);

        let mut form = engine.build(user, FormAction::Update, &STANDARD).unwrap();
        engine
            .submit(&mut form, &Submission::new().with("name", "Bob"), &STANDARD)
            .unwrap();
        assert_eq!(form.changed_fields(), ["name"]);
        assert_eq!(form.entity().name, "Alice");
        assert_eq!(gateway.get::<User>(form.entity().id).unwrap().name, "Alice");
    }

    #[test]
    fn keep_submitted_policy_persists_changes() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway).with_config(FormConfig {
            merge_policy: MergePolicy::KeepSubmitted,
            bcrypt_cost: 4,
            ..FormConfig::default()
        });
        let user = stored_user(&gateway);

        let mut form = engine.build(user, FormAction::Update, &STANDARD).unwrap();
        engine
            .submit(&mut form, &Submission::new().with("name", "Bob"), &STANDARD)
            .unwrap();
        assert_eq!(form.changed_fields(), ["name"]);
        assert_eq!(gateway.get::<User>(form.entity().id).unwrap().name, "Bob");
    }

    #[test]
    fn first_failing_field_wins_and_entity_is_untouched() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let user = stored_user(&gateway);
        let form = engine.build(user.clone(), FormAction::Update, &STANDARD).unwrap();

        let submission = Submission::new()
            .with("name", "Changed")
            .with("age", "old")
            .with("birthday", "yesterday");
        let err = engine.parse(&form, &submission, &STANDARD).unwrap_err();
        assert_eq!(err.field_name(), Some("age"));
        assert!(err.is_validation());
        assert_eq!(form.entity().name, user.name);
    }

    #[test]
    fn required_fields() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let form = engine.build(User::default(), FormAction::Create, &STANDARD).unwrap();

        let err = engine
            .parse(&form, &Submission::new().with("name", "  "), &STANDARD)
            .unwrap_err();
        assert_eq!(err.field_name(), Some("name"));
        assert!(matches!(err, FormError::Field { error: FieldError::Required, .. }));
    }

    #[test]
    fn absent_required_scalar_rejects_create() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let mut form = engine.build(User::default(), FormAction::Create, &STANDARD).unwrap();

        let err = engine
            .submit(&mut form, &Submission::new().with("age", "3"), &STANDARD)
            .unwrap_err();
        assert!(matches!(err, FormError::Field { field: "name", error: FieldError::Required }));
        assert_eq!(gateway.count::<User>(), 0);
    }

    #[test]
    fn absent_required_relations_reject_create() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let staff = gateway.insert(Group::named("Staff")).unwrap();
        let id = staff.id.to_string();
        let form = engine
            .build(Enrollment::default(), FormAction::Create, &STANDARD)
            .unwrap();

        let err = engine
            .parse(&form, &Submission::new().with("roles", id.as_str()), &STANDARD)
            .unwrap_err();
        assert!(matches!(err, FormError::Field { field: "group", error: FieldError::Required }));

        let err = engine
            .parse(&form, &Submission::new().with("group", id.as_str()), &STANDARD)
            .unwrap_err();
        assert!(matches!(err, FormError::Field { field: "roles", error: FieldError::Required }));

        let both = Submission::new().with("group", id.as_str()).with("roles", id.as_str());
        let parsed = engine.parse(&form, &both, &STANDARD).unwrap();
        assert!(parsed.entity().group.is_set());
        assert_eq!(parsed.entity().roles.len(), 1);
    }

    #[test]
    fn absent_required_key_keeps_stored_value_on_update() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let user = stored_user(&gateway);
        let form = engine.build(user, FormAction::Update, &STANDARD).unwrap();

        let parsed = engine
            .parse(&form, &Submission::new().with("age", "31"), &STANDARD)
            .unwrap();
        assert_eq!(parsed.entity().name, "Alice");
        assert_eq!(parsed.entity().age, Some(31));
    }

    #[test]
    fn absent_keys_leave_fields_untouched() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let user = stored_user(&gateway);
        let form = engine.build(user, FormAction::Update, &STANDARD).unwrap();

        let parsed = engine.parse(&form, &Submission::new(), &STANDARD).unwrap();
        assert_eq!(parsed.entity().age, Some(30));
        assert_eq!(parsed.processed(), ["active"]);
    }

    #[test]
    fn empty_optional_number_is_none() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let user = stored_user(&gateway);
        let form = engine.build(user, FormAction::Update, &STANDARD).unwrap();

        let parsed = engine
            .parse(&form, &Submission::new().with("age", ""), &STANDARD)
            .unwrap();
        assert_eq!(parsed.entity().age, None);
    }

    #[test]
    fn integer_fields_reject_fractions() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let form = engine.build(draft(), FormAction::Create, &STANDARD).unwrap();

        let parsed = engine
            .parse(&form, &Submission::new().with("age", "42.0"), &STANDARD)
            .unwrap();
        assert_eq!(parsed.entity().age, Some(42));

        let err = engine
            .parse(&form, &Submission::new().with("age", "42.5"), &STANDARD)
            .unwrap_err();
        assert!(matches!(err, FormError::Field { error: FieldError::Value(_), .. }));
    }

    #[test]
    fn needs_admin_fields_require_elevation() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let form = engine.build(draft(), FormAction::Create, &ActorRole::Elevated).unwrap();
        let submission = Submission::new().with("score", "9.5");

        let standard = engine.parse(&form, &submission, &STANDARD).unwrap();
        assert_eq!(standard.entity().score, 0.0);
        let elevated = engine.parse(&form, &submission, &ActorRole::Elevated).unwrap();
        assert_eq!(elevated.entity().score, 9.5);
    }

    #[test]
    fn full_override_fields_are_write_once() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let submission = Submission::new().with("joined", "2024-03-01 10:00:00");

        let form = engine.build(draft(), FormAction::Create, &STANDARD).unwrap();
        let parsed = engine.parse(&form, &submission, &STANDARD).unwrap();
        let first = parsed.entity().joined;
        assert!(first.is_some());

        let filled = User {
            joined: first,
            ..draft()
        };
        let form = engine.build(filled, FormAction::Update, &STANDARD).unwrap();
        let parsed = engine
            .parse(&form, &Submission::new().with("joined", "2030-01-01 00:00:00"), &STANDARD)
            .unwrap();
        assert_eq!(parsed.entity().joined, first);
    }

    #[test]
    fn bcrypt_hashes_new_passwords_only() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let form = engine.build(draft(), FormAction::Create, &STANDARD).unwrap();

        let parsed = engine
            .parse(&form, &Submission::new().with("password", "hunter2"), &STANDARD)
            .unwrap();
        let hash = parsed.entity().password.clone();
        assert_ne!(hash, "hunter2");
        assert!(bcrypt::verify("hunter2", &hash).unwrap());

        let stored = User {
            password: hash.clone(),
            ..draft()
        };
        let form = engine.build(stored, FormAction::Update, &STANDARD).unwrap();
        for posted in ["", hash.as_str()] {
            let parsed = engine
                .parse(&form, &Submission::new().with("password", posted), &STANDARD)
                .unwrap();
            assert_eq!(parsed.entity().password, hash);
            assert!(!parsed.processed().contains(&"password"));
        }
    }

    #[test]
    fn references_are_looked_up() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let staff = gateway.insert(Group::named("Staff")).unwrap();
        let form = engine.build(draft(), FormAction::Create, &STANDARD).unwrap();

        let parsed = engine
            .parse(&form, &Submission::new().with("group", staff.id.to_string()), &STANDARD)
            .unwrap();
        assert_eq!(parsed.entity().group.id(), Some(&Identifier::Int(staff.id)));

        let err = engine
            .parse(&form, &Submission::new().with("group", "77"), &STANDARD)
            .unwrap_err();
        assert!(err.is_lookup());

        let parsed = engine
            .parse(&form, &Submission::new().with("group", "0"), &STANDARD)
            .unwrap();
        assert!(!parsed.entity().group.is_set());
    }

    #[test]
    fn many_references_are_staged_until_save() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let a = gateway.insert(Group::named("a")).unwrap();
        let b = gateway.insert(Group::named("b")).unwrap();
        let mut form = engine.build(User::default(), FormAction::Create, &STANDARD).unwrap();

        let submission = Submission::new()
            .with("name", "Dan")
            .with("roles", a.id.to_string())
            .with("roles", b.id.to_string());
        let parsed = engine.parse(&form, &submission, &STANDARD).unwrap();
        assert_eq!(parsed.operations().len(), 1);
        assert_eq!(parsed.entity().roles.len(), 2);

        engine.save(&mut form, parsed).unwrap();
        let owner = form.entity().id;
        assert_eq!(
            gateway.associated_ids::<User>(owner, "roles"),
            [Identifier::Int(a.id), Identifier::Int(b.id)]
        );
    }

    #[test]
    fn clear_sentinel_clears_on_update_only() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let group = gateway.insert(Group::named("a")).unwrap();
        let user = stored_user(&gateway);
        gateway
            .replace_association(
                &Association {
                    owner:    EntityType::of::<User>(),
                    owner_id: Identifier::Int(user.id),
                    field:    "roles",
                    target:   EntityType::of::<Group>()
                },
                &[crate::gateway::Record::new(group.id, "a")]
            )
            .unwrap();

        let mut form = engine.build(user.clone(), FormAction::Update, &STANDARD).unwrap();
        assert_eq!(form.field("roles").unwrap().groups.as_ref().unwrap().selected.len(), 1);
        engine
            .submit(&mut form, &Submission::new().with("roles", "-"), &STANDARD)
            .unwrap();
        assert!(gateway.associated_ids::<User>(user.id, "roles").is_empty());
        assert!(form.changed_fields().is_empty());

        let create = engine.build(draft(), FormAction::Create, &STANDARD).unwrap();
        let parsed = engine
            .parse(&create, &Submission::new().with("roles", "-"), &STANDARD)
            .unwrap();
        assert!(parsed.operations().is_empty());
    }

    #[test]
    fn uploads_go_through_gateway() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let form = engine.build(draft(), FormAction::Create, &STANDARD).unwrap();

        let submission = Submission::new().with_file("avatar", UploadedFile::new("me.png", b"img".to_vec()));
        let parsed = engine.parse(&form, &submission, &STANDARD).unwrap();
        let avatar = &parsed.entity().avatar;
        assert_eq!(avatar.url, "/uploads/1-me.png");
        assert_eq!(gateway.blob(&avatar.path).unwrap(), b"img");
    }

    #[test]
    fn multi_select_and_validation_hook() {
        let registry = Registry::new();
        let gateway = MemoryGateway::new();
        let engine = engine(&registry, &gateway);
        let form = engine.build(draft(), FormAction::Create, &STANDARD).unwrap();

        let parsed = engine
            .parse(&form, &Submission::new().with("tags", "a").with("tags", "c"), &STANDARD)
            .unwrap();
        assert_eq!(parsed.entity().tags, ["a", "c"]);

        let err = engine
            .parse(&form, &Submission::new().with("plan", "enterprise"), &STANDARD)
            .unwrap_err();
        assert!(matches!(err, FormError::Field { field: "plan", error: FieldError::Invalid(_) }));
    }
}
