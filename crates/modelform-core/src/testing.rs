// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Hand-written entities for unit tests.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::{
    descriptor::{FieldSpec, OptionProvider, SelectOption},
    entity::FormEntity,
    error::ValueError,
    kind::TypeShape,
    value::{Blob, FormValue, Identifier, Ref, Timestamps, Value, assign}
};

fn int_id(id: i64) -> Option<Identifier> {
    (id != 0).then_some(Identifier::Int(id))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub id:   i64,
    pub name: String
}

impl Group {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string()
        }
    }

    pub fn named(name: &str) -> Self {
        Self::new(0, name)
    }
}

impl FormEntity for Group {
    const NAME: &'static str = "Group";

    fn field_specs() -> Vec<FieldSpec> {
        vec![FieldSpec::of::<String>("name").required()]
    }

    fn id_shape() -> TypeShape {
        TypeShape::Integer
    }

    fn identifier(&self) -> Option<Identifier> {
        int_id(self.id)
    }

    fn assign_identifier(&mut self, id: Identifier) -> Result<(), ValueError> {
        assign(&mut self.id, id.into_value())
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "name" => Some(self.name.to_value()),
            _ => None
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match field {
            "name" => assign(&mut self.name, value),
            _ => Err(ValueError::UnknownField(field.to_string()))
        }
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub slug: String,
    pub name: String
}

impl Tag {
    pub fn named(name: &str) -> Self {
        Self {
            slug: String::new(),
            name: name.to_string()
        }
    }
}

impl FormEntity for Tag {
    const NAME: &'static str = "Tag";

    fn field_specs() -> Vec<FieldSpec> {
        vec![FieldSpec::of::<String>("name")]
    }

    fn id_shape() -> TypeShape {
        TypeShape::Text
    }

    fn identifier(&self) -> Option<Identifier> {
        (!self.slug.is_empty()).then(|| Identifier::Text(self.slug.clone()))
    }

    fn assign_identifier(&mut self, id: Identifier) -> Result<(), ValueError> {
        assign(&mut self.slug, id.into_value())
    }

    fn get(&self, field: &str) -> Option<Value> {
        (field == "name").then(|| self.name.to_value())
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match field {
            "name" => assign(&mut self.name, value),
            _ => Err(ValueError::UnknownField(field.to_string()))
        }
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

fn tiers() -> Vec<SelectOption> {
    vec![
        SelectOption::new("t1", "Tier one"),
        SelectOption::new("t2", "Tier two"),
    ]
}

fn known_plan(value: &Value) -> Result<(), String> {
    match value {
        Value::Null => Ok(()),
        Value::Text(plan) if ["free", "pro", "team"].contains(&plan.as_str()) => Ok(()),
        other => Err(format!("unknown plan `{}`", other.render()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id:       i64,
    pub name:     String,
    pub email:    Option<String>,
    pub password: String,
    pub age:      Option<i32>,
    pub score:    f64,
    pub active:   bool,
    pub birthday: Option<NaiveDate>,
    pub plan:     String,
    pub tier:     String,
    pub group:    Ref<Group>,
    pub roles:    Vec<Ref<Group>>,
    pub avatar:   Blob,
    pub session:  TimeDelta,
    pub tags:     Vec<String>,
    pub internal: String,
    pub meta:     Timestamps,
    pub joined:   Option<NaiveDateTime>
}

impl FormEntity for User {
    const NAME: &'static str = "User";

    fn field_specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::of::<String>("name").required(),
            FieldSpec::of::<Option<String>>("email")
                .flag("email")
                .set("label", ["E-mail"])
                .set("placeholder", ["you@example.com"]),
            FieldSpec::of::<String>("password").flag("bcrypt"),
            FieldSpec::of::<Option<i32>>("age"),
            FieldSpec::of::<f64>("score").flag("needs_admin"),
            FieldSpec::of::<bool>("active"),
            FieldSpec::of::<Option<NaiveDate>>("birthday"),
            FieldSpec::of::<String>("plan")
                .options(["free", "pro", "team"])
                .set("class", ["wide"])
                .validate_with(known_plan),
            FieldSpec::of::<String>("tier").set("options_from", ["tiers"]),
            FieldSpec::of::<Ref<Group>>("group"),
            FieldSpec::of::<Vec<Ref<Group>>>("roles"),
            FieldSpec::of::<Blob>("avatar"),
            FieldSpec::of::<TimeDelta>("session"),
            FieldSpec::of::<Vec<String>>("tags").options(["a", "b", "c"]),
            FieldSpec::of::<String>("internal").skip(),
            FieldSpec::of::<Timestamps>("meta"),
            FieldSpec::of::<Option<NaiveDateTime>>("joined").flag("readonlyfull"),
        ]
    }

    fn option_sources() -> Vec<(&'static str, OptionProvider)> {
        vec![("tiers", tiers as OptionProvider)]
    }

    fn id_shape() -> TypeShape {
        TypeShape::Integer
    }

    fn identifier(&self) -> Option<Identifier> {
        int_id(self.id)
    }

    fn assign_identifier(&mut self, id: Identifier) -> Result<(), ValueError> {
        assign(&mut self.id, id.into_value())
    }

    fn get(&self, field: &str) -> Option<Value> {
        Some(match field {
            "name" => self.name.to_value(),
            "email" => self.email.to_value(),
            "password" => self.password.to_value(),
            "age" => self.age.to_value(),
            "score" => self.score.to_value(),
            "active" => self.active.to_value(),
            "birthday" => self.birthday.to_value(),
            "plan" => self.plan.to_value(),
            "tier" => self.tier.to_value(),
            "group" => self.group.to_value(),
            "roles" => self.roles.to_value(),
            "avatar" => self.avatar.to_value(),
            "session" => self.session.to_value(),
            "tags" => self.tags.to_value(),
            "joined" => self.joined.to_value(),
            _ => return None
        })
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match field {
            "name" => assign(&mut self.name, value),
            "email" => assign(&mut self.email, value),
            "password" => assign(&mut self.password, value),
            "age" => assign(&mut self.age, value),
            "score" => assign(&mut self.score, value),
            "active" => assign(&mut self.active, value),
            "birthday" => assign(&mut self.birthday, value),
            "plan" => assign(&mut self.plan, value),
            "tier" => assign(&mut self.tier, value),
            "group" => assign(&mut self.group, value),
            "roles" => assign(&mut self.roles, value),
            "avatar" => assign(&mut self.avatar, value),
            "session" => assign(&mut self.session, value),
            "tags" => assign(&mut self.tags, value),
            "joined" => assign(&mut self.joined, value),
            _ => Err(ValueError::UnknownField(field.to_string()))
        }
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

/// Entity whose relations are both required.
#[derive(Debug, Clone, Default)]
pub struct Enrollment {
    pub id:    i64,
    pub group: Ref<Group>,
    pub roles: Vec<Ref<Group>>
}

impl FormEntity for Enrollment {
    const NAME: &'static str = "Enrollment";

    fn field_specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::of::<Ref<Group>>("group").required(),
            FieldSpec::of::<Vec<Ref<Group>>>("roles").required(),
        ]
    }

    fn id_shape() -> TypeShape {
        TypeShape::Integer
    }

    fn identifier(&self) -> Option<Identifier> {
        int_id(self.id)
    }

    fn assign_identifier(&mut self, id: Identifier) -> Result<(), ValueError> {
        assign(&mut self.id, id.into_value())
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "group" => Some(self.group.to_value()),
            "roles" => Some(self.roles.to_value()),
            _ => None
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match field {
            "group" => assign(&mut self.group, value),
            "roles" => assign(&mut self.roles, value),
            _ => Err(ValueError::UnknownField(field.to_string()))
        }
    }
}

/// Entity with an identifier the resolver cannot filter on.
#[derive(Debug, Clone, Default)]
pub struct Measurement {
    pub id: f64
}

impl FormEntity for Measurement {
    const NAME: &'static str = "Measurement";

    fn field_specs() -> Vec<FieldSpec> {
        Vec::new()
    }

    fn id_shape() -> TypeShape {
        TypeShape::Float
    }

    fn identifier(&self) -> Option<Identifier> {
        None
    }

    fn assign_identifier(&mut self, id: Identifier) -> Result<(), ValueError> {
        Err(ValueError::mismatch("f64", &id.into_value()))
    }

    fn get(&self, _: &str) -> Option<Value> {
        None
    }

    fn set(&mut self, field: &str, _: Value) -> Result<(), ValueError> {
        Err(ValueError::UnknownField(field.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BadRelation {
    pub id:     i64,
    pub target: Ref<Measurement>
}

impl FormEntity for BadRelation {
    const NAME: &'static str = "BadRelation";

    fn field_specs() -> Vec<FieldSpec> {
        vec![FieldSpec::of::<Ref<Measurement>>("target")]
    }

    fn id_shape() -> TypeShape {
        TypeShape::Integer
    }

    fn identifier(&self) -> Option<Identifier> {
        int_id(self.id)
    }

    fn assign_identifier(&mut self, id: Identifier) -> Result<(), ValueError> {
        assign(&mut self.id, id.into_value())
    }

    fn get(&self, field: &str) -> Option<Value> {
        (field == "target").then(|| self.target.to_value())
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match field {
            "target" => assign(&mut self.target, value),
            _ => Err(ValueError::UnknownField(field.to_string()))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BadOptions {
    pub id:   i64,
    pub kind: String
}

impl FormEntity for BadOptions {
    const NAME: &'static str = "BadOptions";

    fn field_specs() -> Vec<FieldSpec> {
        vec![FieldSpec::of::<String>("kind").directives("options_from:missing")]
    }

    fn id_shape() -> TypeShape {
        TypeShape::Integer
    }

    fn identifier(&self) -> Option<Identifier> {
        int_id(self.id)
    }

    fn assign_identifier(&mut self, id: Identifier) -> Result<(), ValueError> {
        assign(&mut self.id, id.into_value())
    }

    fn get(&self, field: &str) -> Option<Value> {
        (field == "kind").then(|| self.kind.to_value())
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match field {
            "kind" => assign(&mut self.kind, value),
            _ => Err(ValueError::UnknownField(field.to_string()))
        }
    }
}
