// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use modelform_core::{FormEntity, Identifier, TypeShape};
use modelform_derive::Form;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Form)]
#[form(name = "Document")]
pub struct Doc {
    #[id]
    pub id: Uuid,

    #[field(textarea)]
    pub body: String,
}

#[derive(Debug, Clone, Default, Form)]
pub struct Tag {
    #[id]
    pub slug: String,

    pub title: String,
}

#[derive(Debug, Clone, Default, Form)]
pub struct Counter {
    #[id]
    pub id: u64,
}

fn main() {
    assert_eq!(Doc::NAME, "Document");
    assert_eq!(Doc::id_shape(), TypeShape::Uuid);
    assert_eq!(Tag::id_shape(), TypeShape::Text);
    assert_eq!(Counter::id_shape(), TypeShape::Unsigned);

    let mut doc = Doc::default();
    assert!(doc.identifier().is_none());
    let id = Uuid::now_v7();
    doc.assign_identifier(Identifier::Uuid(id)).unwrap();
    assert_eq!(doc.identifier(), Some(Identifier::Uuid(id)));

    let tag = Tag {
        slug:  "rust".into(),
        title: "Rust".into(),
    };
    assert_eq!(tag.identifier(), Some(Identifier::Text("rust".into())));
    assert!(Counter::field_specs().is_empty());
}
