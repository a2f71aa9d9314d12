// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use modelform_core::{FieldKind, FormEntity, Identifier, Ref, Registry, Value};
use modelform_derive::Form;

#[derive(Debug, Clone, Default, Form)]
#[form(label = "name")]
pub struct Group {
    #[id]
    pub id: i64,

    #[field(required)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Form)]
pub struct Member {
    #[id]
    pub id: i64,

    #[field(required, label = "Full name", placeholder = "Jane Doe")]
    pub name: String,

    #[field(bcrypt)]
    pub password: String,

    #[field(options = "free,pro,team", class = "wide")]
    pub plan: String,

    pub age: Option<i32>,

    pub active: bool,

    pub group: Ref<Group>,

    pub roles: Vec<Ref<Group>>,

    #[field(skip)]
    pub cache: Vec<u8>,
}

fn main() {
    assert_eq!(Member::NAME, "Member");

    let registry = Registry::new();
    let descriptors = registry.describe::<Member>();
    let names: Vec<_> = descriptors.iter().map(|d| d.name).collect();
    assert_eq!(names, ["name", "password", "plan", "age", "active", "group", "roles"]);
    assert_eq!(descriptors[1].kind, FieldKind::Password);
    assert_eq!(descriptors[2].kind, FieldKind::Select);
    assert_eq!(descriptors[5].kind, FieldKind::ForeignReference);
    assert_eq!(descriptors[6].kind, FieldKind::ManyReference);

    let mut member = Member::default();
    assert_eq!(member.identifier(), None);
    member.assign_identifier(Identifier::Int(7)).unwrap();
    assert_eq!(member.identifier(), Some(Identifier::Int(7)));

    member.set("name", Value::Text("Ada".into())).unwrap();
    assert_eq!(member.get("name"), Some(Value::Text("Ada".into())));
    assert!(member.get("cache").is_none());
    assert!(member.set("cache", Value::Null).is_err());

    let group = Group {
        id:   3,
        name: "Admins".into(),
    };
    assert_eq!(group.label(), "Admins");
    assert_eq!(member.label(), "7");
}
