// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Attribute parsing for the Form derive macro.
//!
//! Entity-level attributes like `#[form(name = "Account", label = "email")]`
//! are parsed with darling. Field-level `#[field(...)]` attributes mix bare
//! flags (`required`, `bcrypt`) with key-value pairs (`label = "..."`) and
//! are parsed manually with `parse_nested_meta`.
//!
//! # Data Structures
//!
//! ```text
//! FormDef
//! ├── ident: Ident              (struct name, e.g., "User")
//! ├── generics: Generics
//! ├── name: String              (entity name, defaults to the struct name)
//! ├── label: Option<Ident>      (field rendered as the entity label)
//! ├── sources: Vec<OptionSource>
//! └── fields: Vec<FieldDef>
//!     └── FieldDef
//!         ├── ident: Ident
//!         ├── ty: Type
//!         ├── is_id: bool           (#[id] present)
//!         ├── skip: bool            (#[field(skip)])
//!         ├── raw: Option<String>   (#[field(directives = "...")])
//!         ├── directives: Vec<Directive>
//!         └── hooks: FieldHooks     (parse / validate / options_with)
//! ```

mod entity;
mod field;
mod source;

pub use entity::FormDef;
pub use field::{Directive, FieldDef, FieldHooks};
pub use source::OptionSource;
