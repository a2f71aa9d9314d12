// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! # modelform-derive
//!
//! `#[derive(Form)]` for modelform entities.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use modelform::Form;
//!
//! #[derive(Clone, Default, Form)]
//! #[form(label = "name", source(name = "tiers", with = "tier_options"))]
//! pub struct User {
//!     #[id]
//!     pub id: i64,
//!
//!     #[field(required, placeholder = "Jane Doe")]
//!     pub name: String,
//!
//!     #[field(bcrypt)]
//!     pub password: String,
//!
//!     #[field(options_from = "tiers")]
//!     pub tier: String,
//!
//!     pub group: Ref<Group>,
//!
//!     #[field(skip)]
//!     pub cache: Vec<u8>,
//! }
//! ```
//!
//! Generates the `FormEntity` impl: the field registrations in declaration
//! order, the identifier accessors and by-name field access.

mod form;

use proc_macro::TokenStream;

/// Derive macro implementing `modelform_core::FormEntity`.
#[proc_macro_derive(Form, attributes(form, field, id))]
pub fn derive_form(input: TokenStream) -> TokenStream {
    form::derive(input)
}
